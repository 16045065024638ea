//! Shared application state, types, and state-mutation methods.
//!
//! This module is runtime-agnostic: file IO requested by bulk actions is left
//! to the runtime, which drains [`AppAction`]s after every event.

use crate::model::{self, TableRow};
use crate::selection::{
    ActionVariant, BulkAction, RowId, SelectionConfig, SelectionController, resolve_row_id,
};
use crate::theme::ThemeConfig;
use foldhash::HashSet;
use ratatui::layout::Rect;
use ratatui::widgets::TableState;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use tui_scrollview::ScrollViewState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Table,
    ActionBar,
}

/// Requests raised by bulk-action effects and the selection listener.
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    SelectionChanged(Vec<RowId>),
    Inspect(Vec<Value>),
    Export(Vec<Value>),
    Remove(Vec<Value>),
}

/// Application state for the Ratatui app.
pub struct AppState {
    /// Selection controller bound to the rendered rows
    pub selection: SelectionController<TableRow>,
    /// Column keys shown in the table header
    pub columns: Vec<String>,
    /// Table cursor and scroll offset managed by ratatui
    pub table_state: TableState,
    /// Which pane currently has keyboard focus
    pub focused_pane: FocusPane,
    pub theme: ThemeConfig,
    /// Where the rows came from, shown in the table title
    pub source_label: String,
    /// Warnings accumulated during source loading
    pub source_warnings: Vec<String>,
    /// Last message from a bulk action
    pub status_message: Option<String>,
    pub show_help: bool,
    /// Items shown by the Inspect modal while it is open
    pub inspect_items: Option<Vec<Value>>,
    pub inspect_scroll: ScrollViewState,
    /// Directory the Export action writes into
    pub export_dir: PathBuf,
    /// Screen region of the table pane (including borders)
    pub table_area: Option<Rect>,
    /// Screen region of the table body rows (below the header)
    pub table_content_area: Option<Rect>,
    /// Screen region of the action bar, while it is shown
    pub action_bar_area: Option<Rect>,
    /// Screen regions of the action bar buttons, in bar order
    pub button_areas: Vec<Rect>,
    /// Flag to quit app
    pub should_quit: bool,
    actions: Receiver<AppAction>,
}

impl AppState {
    pub fn new(
        items: Vec<Value>,
        theme: ThemeConfig,
        source_label: String,
        export_dir: PathBuf,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        let listener_tx = tx.clone();
        let config = SelectionConfig {
            on_selection_change: Some(Box::new(move |ids: &[RowId]| {
                forward(&listener_tx, AppAction::SelectionChanged(ids.to_vec()));
            })),
            bulk_actions: demo_actions(&tx),
        };

        let mut app = Self {
            selection: SelectionController::new(config),
            columns: Vec::new(),
            table_state: TableState::default(),
            focused_pane: FocusPane::Table,
            theme,
            source_label,
            source_warnings: Vec::new(),
            status_message: None,
            show_help: false,
            inspect_items: None,
            inspect_scroll: ScrollViewState::default(),
            export_dir,
            table_area: None,
            table_content_area: None,
            action_bar_area: None,
            button_areas: Vec::new(),
            should_quit: false,
            actions: rx,
        };
        app.load_items(items);
        app
    }

    /// Rebuilds columns and rows for `items` and re-attaches the controller.
    /// Selected ids that still resolve stay selected.
    pub fn load_items(&mut self, items: Vec<Value>) {
        self.columns = model::discover_columns(&items);
        let rows = model::build_rows(&items, &self.columns);
        self.selection.attach(rows, items);
        if self.selection.focused().is_none() {
            self.selection.focus_row(0);
        }
        self.sync_view();
    }

    /// Collects the actions queued since the last call.
    pub fn take_actions(&mut self) -> Vec<AppAction> {
        self.actions.try_iter().collect()
    }

    /// Re-derives view state from the controller after a mutation.
    pub fn sync_view(&mut self) {
        if self.focused_pane == FocusPane::ActionBar && self.selection.action_bar().is_none() {
            self.focused_pane = FocusPane::Table;
        }
        if self.selection.action_bar().is_none() {
            self.action_bar_area = None;
            self.button_areas.clear();
        }
        self.table_state.select(self.selection.focused());
    }

    /// Moves focus between the table and the action bar. The bar can only be
    /// focused while it exists.
    pub fn cycle_focus(&mut self) {
        self.focused_pane = match self.focused_pane {
            FocusPane::Table if self.selection.action_bar().is_some() => FocusPane::ActionBar,
            _ => FocusPane::Table,
        };
    }

    /// Moves the focused row by `lines`, clamped to the table.
    pub fn move_focus(&mut self, lines: usize, down: bool) {
        let len = self.selection.len();
        if len == 0 {
            return;
        }
        let current = self.selection.focused().unwrap_or(0);
        let target = if down {
            current.saturating_add(lines).min(len - 1)
        } else {
            current.saturating_sub(lines)
        };
        self.selection.focus_row(target);
        self.sync_view();
    }

    /// Number of body rows visible at once.
    pub fn page_size(&self) -> usize {
        self.table_content_area
            .map(|area| area.height as usize)
            .unwrap_or(1)
            .max(1)
    }

    /// Row index under the given cell, if any.
    pub fn row_at(&self, column: u16, row: u16) -> Option<usize> {
        let area = self.table_content_area?;
        if !area.contains((column, row).into()) {
            return None;
        }
        let index = self.table_state.offset() + (row - area.y) as usize;
        (index < self.selection.len()).then_some(index)
    }

    /// Action bar button under the given cell, if any.
    pub fn button_at(&self, column: u16, row: u16) -> Option<usize> {
        self.button_areas
            .iter()
            .position(|area| area.contains((column, row).into()))
    }

    pub fn note_selection_change(&self, ids: &[RowId]) {
        log::info!("selection changed: {} rows", ids.len());
        log::debug!("selected ids: {:?}", ids);
    }

    pub fn open_inspect(&mut self, items: Vec<Value>) {
        self.inspect_scroll = ScrollViewState::default();
        self.inspect_items = Some(items);
    }

    pub fn close_inspect(&mut self) {
        self.inspect_items = None;
    }

    pub fn scroll_inspect_by_lines(&mut self, lines: u16, down: bool) {
        for _ in 0..lines {
            if down {
                self.inspect_scroll.scroll_down();
            } else {
                self.inspect_scroll.scroll_up();
            }
        }
    }

    /// Drops every row whose id matches one of `items` and re-attaches.
    pub fn remove_items(&mut self, items: &[Value]) {
        let doomed: HashSet<RowId> = items.iter().map(resolve_row_id).collect();
        let before = self.selection.len();
        let remaining: Vec<Value> = self
            .selection
            .data()
            .iter()
            .filter(|item| !doomed.contains(&resolve_row_id(item)))
            .cloned()
            .collect();
        let removed = before - remaining.len();

        self.load_items(remaining);
        log::info!("removed {} rows", removed);
        self.status_message = Some(format!(
            "Removed {} {}",
            removed,
            if removed == 1 { "row" } else { "rows" }
        ));
    }
}

/// Queues `action` for the runtime. Returns `false` if the runtime side of
/// the channel is gone and the action was dropped.
fn forward(tx: &Sender<AppAction>, action: AppAction) -> bool {
    match tx.send(action) {
        Ok(()) => true,
        Err(err) => {
            log::warn!("dropping {} action, runtime channel closed", action_name(&err.0));
            false
        }
    }
}

fn action_name(action: &AppAction) -> &'static str {
    match action {
        AppAction::SelectionChanged(_) => "selection changed",
        AppAction::Inspect(_) => "inspect",
        AppAction::Export(_) => "export",
        AppAction::Remove(_) => "remove",
    }
}

/// Inspect, Export and Remove, each forwarding the selected items to the
/// runtime through `tx`.
fn demo_actions(tx: &Sender<AppAction>) -> Vec<BulkAction> {
    let inspect_tx = tx.clone();
    let export_tx = tx.clone();
    let remove_tx = tx.clone();
    vec![
        BulkAction::new("Inspect", move |items| {
            forward(&inspect_tx, AppAction::Inspect(items.to_vec()));
        })
        .icon("◆")
        .variant(ActionVariant::Primary),
        BulkAction::new("Export", move |items| {
            forward(&export_tx, AppAction::Export(items.to_vec()));
        })
        .icon("⇩")
        .variant(ActionVariant::Secondary),
        BulkAction::new("Remove", move |items| {
            forward(&remove_tx, AppAction::Remove(items.to_vec()));
        })
        .icon("✕")
        .variant(ActionVariant::Danger),
    ]
}
