//! Shared event reducer: pure-ish handlers for key and mouse events.
//!
//! The runtime calls these functions after converting its platform-specific
//! events to [`AppKeyEvent`] / [`AppMouseEvent`], then drains the actions the
//! controller queued.

use crate::app_core::input::{AppKeyCode, AppKeyEvent, AppMouseEvent, AppMouseKind};
use crate::app_core::state::{AppState, FocusPane};
use crate::selection::{Modifiers, SelectionKey};

pub const SCROLL_LINES: u16 = 1;

fn selection_key(code: AppKeyCode) -> Option<SelectionKey> {
    match code {
        AppKeyCode::Up => Some(SelectionKey::Up),
        AppKeyCode::Down => Some(SelectionKey::Down),
        AppKeyCode::Esc => Some(SelectionKey::Escape),
        AppKeyCode::Char(' ') => Some(SelectionKey::Space),
        AppKeyCode::Char(c) => Some(SelectionKey::Char(c)),
        _ => None,
    }
}

/// Handle a runtime-agnostic key event, mutating `app` in place.
pub fn handle_key_event(app: &mut AppState, event: AppKeyEvent) {
    if event.is_release {
        return;
    }

    let code = event.code;
    let modifiers = Modifiers {
        ctrl: event.ctrl,
        shift: event.shift,
    };

    if app.inspect_items.is_some() {
        match code {
            AppKeyCode::Esc | AppKeyCode::Enter | AppKeyCode::Char('q') => app.close_inspect(),
            AppKeyCode::Up => app.scroll_inspect_by_lines(1, false),
            AppKeyCode::Down => app.scroll_inspect_by_lines(1, true),
            AppKeyCode::PageUp => app.inspect_scroll.scroll_page_up(),
            AppKeyCode::PageDown => app.inspect_scroll.scroll_page_down(),
            _ => {}
        }
        return;
    }

    if app.show_help {
        if matches!(code, AppKeyCode::Char('?') | AppKeyCode::Esc) {
            app.show_help = false;
        }
        return;
    }

    if code == AppKeyCode::Tab || code == AppKeyCode::BackTab {
        app.cycle_focus();
        return;
    }

    match app.focused_pane {
        FocusPane::Table => match code {
            AppKeyCode::Char('q') if !modifiers.ctrl => app.should_quit = true,
            AppKeyCode::Char('?') => app.show_help = true,
            AppKeyCode::Home => app.selection.focus_row(0),
            AppKeyCode::End => app.move_focus(usize::MAX, true),
            AppKeyCode::PageUp => app.move_focus(app.page_size(), false),
            AppKeyCode::PageDown => app.move_focus(app.page_size(), true),
            _ => {
                if let Some(key) = selection_key(code) {
                    app.selection.handle_key(key, modifiers);
                }
            }
        },
        FocusPane::ActionBar => match code {
            AppKeyCode::Char('q') if !modifiers.ctrl => app.should_quit = true,
            AppKeyCode::Char('?') => app.show_help = true,
            AppKeyCode::Left | AppKeyCode::Up => app.selection.focus_prev_button(),
            AppKeyCode::Right | AppKeyCode::Down => app.selection.focus_next_button(),
            AppKeyCode::Enter | AppKeyCode::Char(' ') => app.selection.invoke_focused_button(),
            AppKeyCode::Esc => app.selection.clear(),
            _ => {}
        },
    }

    app.sync_view();
}

/// Handle a runtime-agnostic mouse event.
///
/// Returns `true` when the event changed something worth redrawing.
pub fn handle_mouse_event(app: &mut AppState, event: AppMouseEvent) -> bool {
    if app.inspect_items.is_some() {
        return match event.kind {
            AppMouseKind::ScrollUp => {
                app.scroll_inspect_by_lines(SCROLL_LINES, false);
                true
            }
            AppMouseKind::ScrollDown => {
                app.scroll_inspect_by_lines(SCROLL_LINES, true);
                true
            }
            _ => false,
        };
    }
    if app.show_help {
        return false;
    }

    let column = event.column;
    let row = event.row;
    let modifiers = Modifiers {
        ctrl: event.ctrl,
        shift: event.shift,
    };

    let transitioned = match event.kind {
        AppMouseKind::LeftDown => {
            if let Some(position) = app.button_at(column, row) {
                app.focused_pane = FocusPane::ActionBar;
                app.selection.invoke_button(position);
                true
            } else if let Some(index) = app.row_at(column, row) {
                app.focused_pane = FocusPane::Table;
                app.selection.pointer_down(index, modifiers);
                true
            } else if app
                .action_bar_area
                .is_some_and(|area| area.contains((column, row).into()))
            {
                app.focused_pane = FocusPane::ActionBar;
                true
            } else {
                false
            }
        }
        AppMouseKind::Drag => {
            if app.selection.is_dragging() {
                let index = app.row_at(column, row);
                app.selection.pointer_enter(index);
                true
            } else {
                false
            }
        }
        AppMouseKind::LeftUp => {
            let was_dragging = app.selection.is_dragging();
            app.selection.pointer_up();
            was_dragging
        }
        AppMouseKind::ScrollUp | AppMouseKind::ScrollDown => {
            let over_table = app
                .table_area
                .is_some_and(|area| area.contains((column, row).into()));
            if over_table {
                app.move_focus(
                    SCROLL_LINES as usize,
                    event.kind == AppMouseKind::ScrollDown,
                );
            }
            over_table
        }
        AppMouseKind::Move => false,
    };

    if transitioned {
        app.sync_view();
    }
    transitioned
}
