//! Runtime-agnostic input event types.
//!
//! The terminal runtime converts crossterm events into these types before
//! calling the shared reducer, so the reducer can be driven from tests.

/// Runtime-agnostic key codes used by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppKeyCode {
    Char(char),
    Up,
    Down,
    Left,
    Right,
    Tab,
    BackTab,
    Enter,
    Esc,
    Home,
    End,
    PageUp,
    PageDown,
}

/// A runtime-agnostic keyboard event.
#[derive(Debug, Clone, Copy)]
pub struct AppKeyEvent {
    pub code: AppKeyCode,
    /// Ctrl, or Cmd/Super on platforms that report it.
    pub ctrl: bool,
    pub shift: bool,
    /// `true` when the key was released (ignored by the reducer).
    pub is_release: bool,
}

impl AppKeyEvent {
    pub fn new(code: AppKeyCode) -> Self {
        Self {
            code,
            ctrl: false,
            shift: false,
            is_release: false,
        }
    }
}

/// The kind of a runtime-agnostic mouse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMouseKind {
    Move,
    LeftDown,
    /// Pointer moved with the left button held.
    Drag,
    LeftUp,
    ScrollUp,
    ScrollDown,
}

/// A runtime-agnostic mouse event in terminal cell coordinates.
#[derive(Debug, Clone, Copy)]
pub struct AppMouseEvent {
    pub kind: AppMouseKind,
    pub column: u16,
    pub row: u16,
    pub ctrl: bool,
    pub shift: bool,
}

impl AppMouseEvent {
    pub fn new(kind: AppMouseKind, column: u16, row: u16) -> Self {
        Self {
            kind,
            column,
            row,
            ctrl: false,
            shift: false,
        }
    }
}
