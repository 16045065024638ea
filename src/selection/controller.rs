//! The row selection controller: selection set, anchor, bindings, action bar.
//!
//! Every mutating operation runs the same tail: mark the affected rows, bring
//! the action bar in line with the selection size, then notify the listener
//! exactly once with the selected ids in row order.

use crate::selection::action::{ActionBar, BulkAction, ButtonKind};
use crate::selection::record::{RowHandle, RowId, RowRecord, is_fallback_id};
use foldhash::{HashMap, HashSet};
use log::{debug, trace, warn};
use serde_json::Value;

/// Callback receiving the full selection after every mutation.
pub type SelectionListener = Box<dyn FnMut(&[RowId])>;

/// Construction-time wiring of the controller's collaborators.
#[derive(Default)]
pub struct SelectionConfig {
    pub on_selection_change: Option<SelectionListener>,
    pub bulk_actions: Vec<BulkAction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DragState {
    /// Row the pointer is currently over, `None` while outside the rows.
    pub(crate) last: Option<usize>,
}

pub struct SelectionController<H: RowHandle> {
    rows: Vec<H>,
    data: Vec<Value>,
    records: Vec<RowRecord>,
    by_id: HashMap<RowId, usize>,
    selected: HashSet<RowId>,
    anchor: Option<usize>,
    pub(crate) focused: Option<usize>,
    pub(crate) drag: Option<DragState>,
    bar: Option<ActionBar>,
    bar_serial: u64,
    attached: bool,
    listener: Option<SelectionListener>,
    actions: Vec<BulkAction>,
}

impl<H: RowHandle> SelectionController<H> {
    pub fn new(config: SelectionConfig) -> Self {
        Self {
            rows: Vec::new(),
            data: Vec::new(),
            records: Vec::new(),
            by_id: HashMap::default(),
            selected: HashSet::default(),
            anchor: None,
            focused: None,
            drag: None,
            bar: None,
            bar_serial: 0,
            attached: false,
            listener: config.on_selection_change,
            actions: config.bulk_actions,
        }
    }

    /// Binds a new row source, replacing the previous one.
    ///
    /// `rows` and `data` are paired by position. Selected ids that still
    /// resolve stay selected and are marked on the new handles; the rest are
    /// dropped, which counts as a mutation.
    pub fn attach(&mut self, mut rows: Vec<H>, mut data: Vec<Value>) {
        if rows.len() != data.len() {
            warn!(
                "row source mismatch: {} rows for {} items, extra entries ignored",
                rows.len(),
                data.len()
            );
        }
        let len = rows.len().min(data.len());
        rows.truncate(len);
        data.truncate(len);

        let anchor_id = self
            .anchor
            .and_then(|idx| self.records.get(idx))
            .map(|record| record.id.clone());

        let mut records = Vec::with_capacity(len);
        let mut by_id: HashMap<RowId, usize> = HashMap::default();
        for (index, item) in data.iter().enumerate() {
            let record = RowRecord::resolve(item, index);
            if by_id.contains_key(&record.id) {
                warn!("duplicate row id {:?} at index {}, keeping first", record.id, index);
            } else {
                by_id.insert(record.id.clone(), index);
            }
            records.push(record);
        }

        let structural = records.iter().filter(|r| is_fallback_id(&r.id)).count();
        if structural > 0 {
            debug!("{} rows have no id field, using structural ids", structural);
        }

        let before = self.selected.len();
        self.selected.retain(|id| by_id.contains_key(id));
        let pruned = self.selected.len() != before;

        for (row, record) in rows.iter_mut().zip(&records) {
            row.bind(record);
            row.set_selected(is_marked(&self.selected, &by_id, record));
        }

        self.rows = rows;
        self.data = data;
        self.records = records;
        self.by_id = by_id;
        self.attached = true;
        self.drag = None;
        self.anchor = anchor_id
            .filter(|id| self.selected.contains(id))
            .and_then(|id| self.by_id.get(&id).copied());
        self.focused = match self.focused {
            Some(idx) if len > 0 => Some(idx.min(len - 1)),
            _ => None,
        };

        debug!(
            "attached {} rows, {} selected ({} pruned)",
            len,
            self.selected.len(),
            before - self.selected.len()
        );

        if pruned {
            self.after_mutation();
        }
    }

    /// Releases the row source and every binding.
    ///
    /// A non-empty selection is cleared and reported once. Interactions are
    /// ignored until the next [`attach`](Self::attach).
    pub fn detach(&mut self) {
        let had_selection = !self.selected.is_empty();
        self.rows.clear();
        self.data.clear();
        self.records.clear();
        self.by_id.clear();
        self.selected.clear();
        self.anchor = None;
        self.focused = None;
        self.drag = None;
        self.attached = false;
        debug!("detached row source");
        if had_selection {
            self.after_mutation();
        } else {
            self.bar = None;
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Number of bound rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn rows(&self) -> &[H] {
        &self.rows
    }

    pub fn data(&self) -> &[Value] {
        &self.data
    }

    pub fn record(&self, index: usize) -> Option<&RowRecord> {
        self.records.get(index)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn selection_len(&self) -> usize {
        self.selected.len()
    }

    /// Selected ids in row order.
    pub fn selected_ids(&self) -> Vec<RowId> {
        self.selected_indices()
            .into_iter()
            .map(|idx| self.records[idx].id.clone())
            .collect()
    }

    /// Selected data items in row order.
    pub fn selected_items(&self) -> Vec<Value> {
        self.selected_indices()
            .into_iter()
            .map(|idx| self.data[idx].clone())
            .collect()
    }

    fn selected_indices(&self) -> Vec<usize> {
        self.records
            .iter()
            .filter(|record| is_marked(&self.selected, &self.by_id, record))
            .map(|record| record.index)
            .collect()
    }

    pub fn anchor(&self) -> Option<usize> {
        self.anchor
    }

    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    /// Moves keyboard focus to `index` without touching the selection.
    pub fn focus_row(&mut self, index: usize) {
        if index < self.records.len() {
            self.focused = Some(index);
        }
    }

    pub fn action_bar(&self) -> Option<&ActionBar> {
        self.bar.as_ref()
    }

    // ------------------------------------------------------------------
    // Primitive operations
    // ------------------------------------------------------------------

    /// Adds `id` if absent, removes it otherwise.
    ///
    /// Adding moves the anchor to the row; removing the anchor row clears it.
    pub fn toggle(&mut self, id: &str) {
        if let Some(index) = self.index_of(id) {
            self.toggle_index(index);
        }
    }

    pub(crate) fn toggle_index(&mut self, index: usize) {
        let Some(record) = self.records.get(index) else {
            return;
        };
        let id = record.id.clone();
        let index = self.by_id.get(&id).copied().unwrap_or(index);

        if self.selected.remove(&id) {
            if self.anchor == Some(index) {
                self.anchor = None;
            }
            trace!("deselected {:?}", id);
        } else {
            trace!("selected {:?}", id);
            self.selected.insert(id);
            self.anchor = Some(index);
        }

        self.sync_row(index);
        self.after_mutation();
    }

    /// Adds every row between `start` and `end` inclusive, in either order.
    ///
    /// Rows already selected stay selected and rows outside the range are
    /// untouched. Bounds past the last row are clamped.
    pub fn select_range(&mut self, start: usize, end: usize) {
        let lo = start.min(end);
        if lo >= self.records.len() {
            return;
        }
        let hi = start.max(end).min(self.records.len() - 1);

        for record in &self.records[lo..=hi] {
            self.selected.insert(record.id.clone());
        }
        trace!("selected range {}..={}", lo, hi);

        self.sync_rows();
        self.after_mutation();
    }

    pub fn select_all(&mut self) {
        if !self.attached {
            return;
        }
        for record in &self.records {
            self.selected.insert(record.id.clone());
        }
        trace!("selected all {} rows", self.records.len());

        self.sync_rows();
        self.after_mutation();
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.anchor = None;
        trace!("cleared selection");

        self.sync_rows();
        self.after_mutation();
    }

    /// Replaces the selection with `id` alone: a clear followed by a toggle,
    /// reported as a single change.
    pub fn select_only(&mut self, id: &str) {
        if let Some(index) = self.index_of(id) {
            self.select_only_index(index);
        }
    }

    pub(crate) fn select_only_index(&mut self, index: usize) {
        let Some(record) = self.records.get(index) else {
            return;
        };
        let id = record.id.clone();
        let index = self.by_id.get(&id).copied().unwrap_or(index);

        self.selected.clear();
        trace!("selected only {:?}", id);
        self.selected.insert(id);
        self.anchor = Some(index);

        self.sync_rows();
        self.after_mutation();
    }

    // ------------------------------------------------------------------
    // Action bar
    // ------------------------------------------------------------------

    pub fn focus_next_button(&mut self) {
        if let Some(bar) = self.bar.as_mut() {
            bar.focus_next();
        }
    }

    pub fn focus_prev_button(&mut self) {
        if let Some(bar) = self.bar.as_mut() {
            bar.focus_prev();
        }
    }

    /// Presses the bar button at `position`. No bar or no such button: no-op.
    pub fn invoke_button(&mut self, position: usize) {
        let Some(bar) = self.bar.as_mut() else {
            return;
        };
        let Some(kind) = bar.buttons.get(position).map(|button| button.kind) else {
            return;
        };
        bar.focused = position;

        match kind {
            ButtonKind::Bulk(action_idx) => {
                let items = self.selected_items();
                if let Some(action) = self.actions.get_mut(action_idx) {
                    debug!("running {:?} on {} items", action.label, items.len());
                    action.run(&items);
                }
            }
            ButtonKind::Clear => self.clear(),
        }
    }

    pub fn invoke_focused_button(&mut self) {
        if let Some(position) = self.bar.as_ref().map(|bar| bar.focused) {
            self.invoke_button(position);
        }
    }

    // ------------------------------------------------------------------
    // Mutation tail
    // ------------------------------------------------------------------

    fn sync_row(&mut self, index: usize) {
        if let (Some(row), Some(record)) = (self.rows.get_mut(index), self.records.get(index)) {
            row.set_selected(is_marked(&self.selected, &self.by_id, record));
        }
    }

    fn sync_rows(&mut self) {
        for (row, record) in self.rows.iter_mut().zip(&self.records) {
            row.set_selected(is_marked(&self.selected, &self.by_id, record));
        }
    }

    fn after_mutation(&mut self) {
        if self.selected.is_empty() {
            self.anchor = None;
        }
        self.sync_action_bar();
        self.notify();
    }

    fn sync_action_bar(&mut self) {
        let count = self.selected.len();
        if count == 0 {
            if self.bar.take().is_some() {
                trace!("action bar removed");
            }
        } else if let Some(bar) = self.bar.as_mut() {
            bar.count = count;
        } else {
            self.bar_serial += 1;
            self.bar = Some(ActionBar::build(self.bar_serial, count, &self.actions));
            trace!("action bar #{} created", self.bar_serial);
        }
    }

    fn notify(&mut self) {
        let ids = self.selected_ids();
        if let Some(listener) = self.listener.as_mut() {
            listener(&ids);
        }
    }
}

/// A row is marked when its id is selected and it is the row the id resolves
/// to; later duplicates of an id are never marked.
fn is_marked(selected: &HashSet<RowId>, by_id: &HashMap<RowId, usize>, record: &RowRecord) -> bool {
    selected.contains(&record.id) && by_id.get(&record.id) == Some(&record.index)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::selection::action::{ActionVariant, CLEAR_LABEL};
    use crate::selection::interaction::Modifiers;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Default, Clone)]
    pub(crate) struct TestRow {
        pub(crate) record: Option<RowRecord>,
        pub(crate) selected: bool,
    }

    impl RowHandle for TestRow {
        fn bind(&mut self, record: &RowRecord) {
            self.record = Some(record.clone());
        }

        fn set_selected(&mut self, selected: bool) {
            self.selected = selected;
        }
    }

    pub(crate) type Calls = Rc<RefCell<Vec<Vec<RowId>>>>;

    pub(crate) fn items(ids: &[&str]) -> Vec<Value> {
        ids.iter().map(|id| json!({ "id": id })).collect()
    }

    pub(crate) fn make_controller(ids: &[&str]) -> (SelectionController<TestRow>, Calls) {
        make_controller_with_actions(ids, Vec::new())
    }

    pub(crate) fn make_controller_with_actions(
        ids: &[&str],
        bulk_actions: Vec<BulkAction>,
    ) -> (SelectionController<TestRow>, Calls) {
        let calls: Calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        let mut controller = SelectionController::new(SelectionConfig {
            on_selection_change: Some(Box::new(move |ids: &[RowId]| {
                sink.borrow_mut().push(ids.to_vec());
            })),
            bulk_actions,
        });
        controller.attach(vec![TestRow::default(); ids.len()], items(ids));
        (controller, calls)
    }

    fn marked(controller: &SelectionController<TestRow>) -> Vec<usize> {
        controller
            .rows()
            .iter()
            .enumerate()
            .filter(|(_, row)| row.selected)
            .map(|(idx, _)| idx)
            .collect()
    }

    #[test]
    fn test_attach_binds_records() {
        let (controller, calls) = make_controller(&["a", "b", "c"]);
        assert!(controller.is_attached());
        assert_eq!(controller.len(), 3);
        assert_eq!(
            controller.rows()[1].record,
            Some(RowRecord {
                id: "b".to_string(),
                index: 1
            })
        );
        assert_eq!(controller.index_of("c"), Some(2));
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_toggle_adds_and_sets_anchor() {
        let (mut controller, calls) = make_controller(&["a", "b", "c"]);
        controller.toggle("b");

        assert!(controller.is_selected("b"));
        assert_eq!(controller.anchor(), Some(1));
        assert_eq!(marked(&controller), vec![1]);
        assert_eq!(*calls.borrow(), vec![vec!["b".to_string()]]);
    }

    #[test]
    fn test_toggle_twice_restores_membership() {
        let (mut controller, calls) = make_controller(&["a", "b", "c"]);
        controller.toggle("a");
        controller.toggle("c");
        controller.toggle("c");

        assert_eq!(controller.selected_ids(), vec!["a"]);
        assert_eq!(marked(&controller), vec![0]);
        assert_eq!(calls.borrow().len(), 3);
    }

    #[test]
    fn test_toggle_off_non_anchor_keeps_anchor() {
        let (mut controller, _) = make_controller(&["a", "b", "c"]);
        controller.toggle("a");
        controller.toggle("c");
        assert_eq!(controller.anchor(), Some(2));

        controller.toggle("a");
        assert_eq!(controller.anchor(), Some(2));
    }

    #[test]
    fn test_toggle_off_anchor_clears_anchor() {
        let (mut controller, _) = make_controller(&["a", "b", "c"]);
        controller.toggle("a");
        controller.toggle("c");
        controller.toggle("c");

        assert_eq!(controller.anchor(), None);
        assert_eq!(controller.selected_ids(), vec!["a"]);
    }

    #[test]
    fn test_toggle_unknown_id_is_noop() {
        let (mut controller, calls) = make_controller(&["a"]);
        controller.toggle("zzz");
        assert_eq!(controller.selection_len(), 0);
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_select_range_is_commutative_and_idempotent() {
        let ids = ["a", "b", "c", "d", "e"];
        let (mut forward, _) = make_controller(&ids);
        let (mut backward, _) = make_controller(&ids);

        forward.select_range(1, 3);
        backward.select_range(3, 1);
        assert_eq!(forward.selected_ids(), backward.selected_ids());
        assert_eq!(forward.selected_ids(), vec!["b", "c", "d"]);

        forward.select_range(1, 3);
        assert_eq!(forward.selected_ids(), vec!["b", "c", "d"]);
    }

    #[test]
    fn test_select_range_keeps_outside_and_does_not_toggle() {
        let (mut controller, _) = make_controller(&["a", "b", "c", "d", "e"]);
        controller.toggle("a");
        controller.toggle("c");
        controller.select_range(2, 3);

        assert_eq!(controller.selected_ids(), vec!["a", "c", "d"]);
        assert_eq!(controller.anchor(), Some(2));
        assert_eq!(marked(&controller), vec![0, 2, 3]);
    }

    #[test]
    fn test_select_range_clamps_and_ignores_out_of_range() {
        let (mut controller, calls) = make_controller(&["a", "b", "c"]);
        controller.select_range(1, 99);
        assert_eq!(controller.selected_ids(), vec!["b", "c"]);

        controller.select_range(10, 20);
        assert_eq!(controller.selected_ids(), vec!["b", "c"]);
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn test_select_all_then_clear() {
        let (mut controller, calls) = make_controller(&["x", "y", "z"]);
        controller.toggle("y");
        controller.select_all();
        assert_eq!(controller.selected_ids(), vec!["x", "y", "z"]);
        assert_eq!(marked(&controller), vec![0, 1, 2]);

        controller.clear();
        assert_eq!(controller.selection_len(), 0);
        assert_eq!(controller.anchor(), None);
        assert!(marked(&controller).is_empty());
        assert_eq!(calls.borrow().last(), Some(&Vec::new()));
    }

    #[test]
    fn test_listener_called_once_per_mutation_with_current_set() {
        let (mut controller, calls) = make_controller(&["a", "b", "c", "d"]);
        controller.toggle("d");
        controller.select_range(0, 1);
        controller.select_only("c");
        controller.select_all();
        controller.clear();

        let calls = calls.borrow();
        assert_eq!(calls.len(), 5);
        assert_eq!(calls[0], vec!["d"]);
        assert_eq!(calls[1], vec!["a", "b", "d"]);
        assert_eq!(calls[2], vec!["c"]);
        assert_eq!(calls[3], vec!["a", "b", "c", "d"]);
        assert!(calls[4].is_empty());
    }

    #[test]
    fn test_select_only_replaces_selection() {
        let (mut controller, calls) = make_controller(&["a", "b", "c"]);
        controller.select_all();
        controller.select_only("b");

        assert_eq!(controller.selected_ids(), vec!["b"]);
        assert_eq!(controller.anchor(), Some(1));
        assert_eq!(marked(&controller), vec![1]);
        assert_eq!(calls.borrow().len(), 2);
    }

    #[test]
    fn test_action_bar_lifecycle() {
        let (mut controller, _) = make_controller(&["a", "b", "c"]);
        assert!(controller.action_bar().is_none());

        controller.toggle("a");
        let serial = controller.action_bar().map(|bar| bar.serial);
        assert!(serial.is_some());
        assert_eq!(controller.action_bar().map(|bar| bar.count), Some(1));

        controller.toggle("b");
        controller.select_all();
        let bar = controller.action_bar().expect("bar while selected");
        assert_eq!(bar.serial, serial.unwrap_or_default());
        assert_eq!(bar.count, 3);

        controller.clear();
        assert!(controller.action_bar().is_none());

        controller.toggle("c");
        let new_serial = controller.action_bar().map(|bar| bar.serial);
        assert_ne!(new_serial, serial);
    }

    #[test]
    fn test_action_bar_tracks_size_at_every_step() {
        let (mut controller, _) = make_controller(&["a", "b", "c"]);
        type Ctl = SelectionController<TestRow>;
        let steps: Vec<Box<dyn Fn(&mut Ctl)>> = vec![
            Box::new(|c: &mut Ctl| c.toggle("a")),
            Box::new(|c: &mut Ctl| c.toggle("a")),
            Box::new(|c: &mut Ctl| c.select_range(0, 2)),
            Box::new(|c: &mut Ctl| c.toggle("b")),
            Box::new(|c: &mut Ctl| c.select_only("c")),
            Box::new(|c: &mut Ctl| c.toggle("c")),
            Box::new(|c: &mut Ctl| c.clear()),
        ];
        for step in steps {
            step(&mut controller);
            assert_eq!(
                controller.action_bar().is_some(),
                controller.selection_len() > 0
            );
            if let Some(bar) = controller.action_bar() {
                assert_eq!(bar.count, controller.selection_len());
            }
        }
    }

    #[test]
    fn test_plain_click_replacement_keeps_bar() {
        let (mut controller, _) = make_controller(&["a", "b"]);
        controller.toggle("a");
        let serial = controller.action_bar().map(|bar| bar.serial);

        controller.select_only("b");
        assert_eq!(controller.action_bar().map(|bar| bar.serial), serial);
    }

    #[test]
    fn test_bar_focus_survives_count_patch() {
        let actions = vec![
            BulkAction::new("Inspect", |_| {}),
            BulkAction::new("Export", |_| {}),
        ];
        let (mut controller, _) = make_controller_with_actions(&["a", "b", "c"], actions);
        controller.toggle("a");
        controller.focus_next_button();
        controller.focus_next_button();
        assert_eq!(
            controller
                .action_bar()
                .and_then(|bar| bar.focused_button())
                .map(|b| b.label.as_str()),
            Some(CLEAR_LABEL)
        );

        controller.toggle("b");
        assert_eq!(controller.action_bar().map(|bar| bar.focused), Some(2));
    }

    #[test]
    fn test_bulk_action_receives_selected_items_in_row_order() {
        let received: Rc<RefCell<Vec<Value>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&received);
        let actions = vec![
            BulkAction::new("Export", move |items: &[Value]| {
                sink.borrow_mut().extend_from_slice(items);
            })
            .variant(ActionVariant::Secondary),
        ];
        let (mut controller, calls) = make_controller_with_actions(&["a", "b", "c"], actions);
        controller.toggle("c");
        controller.toggle("a");
        let notified = calls.borrow().len();

        controller.invoke_button(0);
        assert_eq!(*received.borrow(), vec![json!({"id": "a"}), json!({"id": "c"})]);
        assert_eq!(calls.borrow().len(), notified);
        assert_eq!(controller.selection_len(), 2);
    }

    #[test]
    fn test_clear_button_clears_selection() {
        let (mut controller, calls) = make_controller(&["x", "y", "z"]);
        controller.select_all();
        let clear_position = controller
            .action_bar()
            .map(|bar| bar.buttons.len() - 1)
            .unwrap_or_default();

        controller.invoke_button(clear_position);
        assert_eq!(controller.selection_len(), 0);
        assert!(controller.action_bar().is_none());
        assert_eq!(calls.borrow().last(), Some(&Vec::new()));
    }

    #[test]
    fn test_invoke_without_bar_is_noop() {
        let (mut controller, calls) = make_controller(&["x"]);
        controller.invoke_button(0);
        controller.invoke_focused_button();
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_reattach_keeps_resolvable_selection() {
        let (mut controller, calls) = make_controller(&["a", "b", "c"]);
        controller.toggle("a");
        controller.toggle("c");
        let before = calls.borrow().len();

        controller.attach(vec![TestRow::default(); 3], items(&["c", "a", "b"]));
        assert_eq!(controller.selected_ids(), vec!["c", "a"]);
        assert_eq!(marked(&controller), vec![0, 1]);
        assert_eq!(controller.anchor(), Some(0));
        assert_eq!(calls.borrow().len(), before);
    }

    #[test]
    fn test_reattach_prunes_stale_ids() {
        let (mut controller, calls) = make_controller(&["a", "b", "c"]);
        controller.toggle("a");
        controller.toggle("b");

        controller.attach(vec![TestRow::default(); 2], items(&["b", "d"]));
        assert_eq!(controller.selected_ids(), vec!["b"]);
        assert_eq!(controller.anchor(), Some(0));
        assert_eq!(calls.borrow().last(), Some(&vec!["b".to_string()]));
        assert_eq!(controller.action_bar().map(|bar| bar.count), Some(1));

        controller.attach(vec![TestRow::default(); 1], items(&["e"]));
        assert_eq!(controller.selection_len(), 0);
        assert_eq!(controller.anchor(), None);
        assert!(controller.action_bar().is_none());
    }

    #[test]
    fn test_reattach_drops_anchor_when_its_row_is_pruned() {
        let (mut controller, calls) = make_controller(&["a", "b", "c"]);
        controller.toggle("b");
        controller.toggle("a");
        assert_eq!(controller.anchor(), Some(0));

        controller.attach(vec![TestRow::default(); 2], items(&["b", "c"]));
        assert_eq!(controller.selected_ids(), vec!["b"]);
        assert_eq!(controller.anchor(), None);
        assert_eq!(calls.borrow().last(), Some(&vec!["b".to_string()]));
        assert_eq!(controller.action_bar().map(|bar| bar.count), Some(1));

        // Without an anchor, shift+click acts as a plain click.
        controller.pointer_down(1, Modifiers::SHIFT);
        assert_eq!(controller.selected_ids(), vec!["c"]);
        assert_eq!(controller.anchor(), Some(1));
    }

    #[test]
    fn test_attach_mismatched_lengths_pairs_prefix() {
        let (mut controller, _) = make_controller(&[]);
        controller.attach(vec![TestRow::default(); 2], items(&["a", "b", "c"]));
        assert_eq!(controller.len(), 2);
        assert_eq!(controller.data().len(), 2);
    }

    #[test]
    fn test_duplicate_ids_keep_first_row() {
        let (mut controller, _) = make_controller(&["a", "b", "a"]);
        assert_eq!(controller.index_of("a"), Some(0));

        controller.toggle("a");
        assert_eq!(marked(&controller), vec![0]);
        assert_eq!(controller.selected_items(), vec![json!({"id": "a"})]);
    }

    #[test]
    fn test_items_without_id_use_structural_fallback() {
        let (mut controller, _) = make_controller(&[]);
        let data = vec![json!({"height": 1}), json!({"height": 2})];
        controller.attach(vec![TestRow::default(); 2], data);

        let id = controller.record(1).map(|r| r.id.clone()).unwrap_or_default();
        controller.toggle(&id);
        assert_eq!(controller.selected_items(), vec![json!({"height": 2})]);
    }

    #[test]
    fn test_detach_releases_everything() {
        let (mut controller, calls) = make_controller(&["a", "b"]);
        controller.toggle("a");
        controller.focus_row(1);

        controller.detach();
        assert!(!controller.is_attached());
        assert!(controller.is_empty());
        assert_eq!(controller.focused(), None);
        assert!(controller.action_bar().is_none());
        assert_eq!(calls.borrow().last(), Some(&Vec::new()));

        controller.select_all();
        assert_eq!(controller.selection_len(), 0);
    }

    #[test]
    fn test_focus_clamped_on_reattach() {
        let (mut controller, _) = make_controller(&["a", "b", "c"]);
        controller.focus_row(2);
        controller.focus_row(7);
        assert_eq!(controller.focused(), Some(2));

        controller.attach(vec![TestRow::default(); 2], items(&["a", "b"]));
        assert_eq!(controller.focused(), Some(1));
    }
}
