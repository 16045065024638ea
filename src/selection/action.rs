//! Bulk actions and the action bar shown while a selection exists.

use serde_json::Value;
use std::fmt;

/// Label of the implicit button that clears the selection.
pub const CLEAR_LABEL: &str = "Clear Selection";

/// Callback run against the materialized selected items.
pub type ActionEffect = Box<dyn FnMut(&[Value])>;

/// Visual emphasis of an action bar button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActionVariant {
    #[default]
    Primary,
    Secondary,
    Ghost,
    Danger,
}

/// A caller-defined operation surfaced as an action bar button.
pub struct BulkAction {
    pub label: String,
    pub icon: Option<String>,
    pub variant: ActionVariant,
    effect: ActionEffect,
}

impl BulkAction {
    pub fn new(label: impl Into<String>, effect: impl FnMut(&[Value]) + 'static) -> Self {
        Self {
            label: label.into(),
            icon: None,
            variant: ActionVariant::default(),
            effect: Box::new(effect),
        }
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn variant(mut self, variant: ActionVariant) -> Self {
        self.variant = variant;
        self
    }

    pub(crate) fn run(&mut self, items: &[Value]) {
        (self.effect)(items);
    }
}

impl fmt::Debug for BulkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BulkAction")
            .field("label", &self.label)
            .field("icon", &self.icon)
            .field("variant", &self.variant)
            .finish_non_exhaustive()
    }
}

/// What pressing a bar button does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonKind {
    /// Runs the bulk action at this registry position.
    Bulk(usize),
    /// Clears the selection.
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarButton {
    pub label: String,
    pub icon: Option<String>,
    pub variant: ActionVariant,
    pub kind: ButtonKind,
}

impl BarButton {
    /// Button caption including the icon, if any.
    pub fn caption(&self) -> String {
        match &self.icon {
            Some(icon) => format!("{} {}", icon, self.label),
            None => self.label.clone(),
        }
    }
}

/// The transient bar listing bulk actions for the current selection.
///
/// Built once when the selection becomes non-empty. While it lives only
/// `count` changes, so `focused` survives selection updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionBar {
    /// Distinguishes separate constructions of the bar.
    pub serial: u64,
    pub count: usize,
    pub focused: usize,
    pub buttons: Vec<BarButton>,
}

impl ActionBar {
    pub(crate) fn build(serial: u64, count: usize, actions: &[BulkAction]) -> Self {
        let mut buttons: Vec<BarButton> = actions
            .iter()
            .enumerate()
            .map(|(idx, action)| BarButton {
                label: action.label.clone(),
                icon: action.icon.clone(),
                variant: action.variant,
                kind: ButtonKind::Bulk(idx),
            })
            .collect();
        buttons.push(BarButton {
            label: CLEAR_LABEL.to_string(),
            icon: None,
            variant: ActionVariant::Ghost,
            kind: ButtonKind::Clear,
        });
        Self {
            serial,
            count,
            focused: 0,
            buttons,
        }
    }

    pub fn count_label(&self) -> String {
        if self.count == 1 {
            "1 row selected".to_string()
        } else {
            format!("{} rows selected", self.count)
        }
    }

    pub fn focused_button(&self) -> Option<&BarButton> {
        self.buttons.get(self.focused)
    }

    pub(crate) fn focus_next(&mut self) {
        if !self.buttons.is_empty() {
            self.focused = (self.focused + 1) % self.buttons.len();
        }
    }

    pub(crate) fn focus_prev(&mut self) {
        if !self.buttons.is_empty() {
            self.focused = (self.focused + self.buttons.len() - 1) % self.buttons.len();
        }
    }
}
