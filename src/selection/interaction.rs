//! Pointer and keyboard gestures mapped onto the selection primitives.
//!
//! | Gesture                    | Effect                                  |
//! |----------------------------|-----------------------------------------|
//! | click                      | select only the row                     |
//! | ctrl/cmd + click           | toggle the row                          |
//! | shift + click              | range from the anchor (plain click if none) |
//! | drag                       | toggle every newly entered row          |
//! | up/down                    | move focus, shift extends the range     |
//! | space                      | toggle the focused row                  |
//! | ctrl/cmd + a               | select all                              |
//! | escape                     | clear                                   |

use crate::selection::controller::{DragState, SelectionController};
use crate::selection::record::RowHandle;

/// Modifier keys held during a gesture. `ctrl` also covers Cmd/Super.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
    };
    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        shift: false,
    };
    pub const SHIFT: Modifiers = Modifiers {
        ctrl: false,
        shift: true,
    };
}

/// Keys the controller reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKey {
    Up,
    Down,
    Space,
    Escape,
    Char(char),
}

impl<H: RowHandle> SelectionController<H> {
    /// Pointer pressed on the row at `index`. Also starts a drag.
    pub fn pointer_down(&mut self, index: usize, modifiers: Modifiers) {
        if !self.is_attached() || index >= self.len() {
            return;
        }
        self.focused = Some(index);

        if modifiers.shift
            && let Some(anchor) = self.anchor()
        {
            self.select_range(anchor, index);
        } else if modifiers.ctrl {
            self.toggle_index(index);
        } else {
            self.select_only_index(index);
        }

        self.drag = Some(DragState { last: Some(index) });
    }

    /// Pointer moved with the button held; `None` means it left the rows.
    ///
    /// Each row entered during a drag is toggled, so crossing back over a row
    /// deselects it again.
    pub fn pointer_enter(&mut self, index: Option<usize>) {
        let len = self.len();
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        let index = index.filter(|&idx| idx < len);
        if drag.last == index {
            return;
        }
        drag.last = index;

        if let Some(index) = index {
            self.focused = Some(index);
            self.toggle_index(index);
        }
    }

    pub fn pointer_up(&mut self) {
        self.drag = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Handles a key press. Returns `true` when the key was consumed.
    pub fn handle_key(&mut self, key: SelectionKey, modifiers: Modifiers) -> bool {
        if !self.is_attached() {
            return false;
        }

        match key {
            SelectionKey::Up | SelectionKey::Down => {
                let Some(current) = self.focused else {
                    return false;
                };
                let target = if key == SelectionKey::Up {
                    current.checked_sub(1)
                } else {
                    Some(current + 1).filter(|&next| next < self.len())
                };
                let Some(target) = target else {
                    return true;
                };
                self.focused = Some(target);
                if modifiers.shift {
                    self.select_range(current, target);
                }
                true
            }
            SelectionKey::Space => {
                let Some(current) = self.focused else {
                    return false;
                };
                self.toggle_index(current);
                true
            }
            SelectionKey::Char('a' | 'A') if modifiers.ctrl => {
                self.select_all();
                true
            }
            SelectionKey::Escape => {
                self.clear();
                true
            }
            SelectionKey::Char(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::controller::tests::{TestRow, items, make_controller};

    #[test]
    fn test_click_scenario() {
        let (mut controller, calls) = make_controller(&["a", "b", "c", "d", "e"]);

        controller.pointer_down(2, Modifiers::NONE);
        controller.pointer_up();
        assert_eq!(controller.selected_ids(), vec!["c"]);
        assert_eq!(controller.anchor(), Some(2));

        controller.pointer_down(4, Modifiers::SHIFT);
        controller.pointer_up();
        assert_eq!(controller.selected_ids(), vec!["c", "d", "e"]);

        controller.pointer_down(0, Modifiers::CTRL);
        controller.pointer_up();
        assert_eq!(controller.selected_ids(), vec!["a", "c", "d", "e"]);

        assert!(controller.handle_key(SelectionKey::Escape, Modifiers::NONE));
        assert_eq!(controller.selection_len(), 0);
        assert!(controller.action_bar().is_none());
        assert_eq!(calls.borrow().len(), 4);
    }

    #[test]
    fn test_select_all_scenario() {
        let (mut controller, calls) = make_controller(&["x", "y", "z"]);

        assert!(controller.handle_key(SelectionKey::Char('a'), Modifiers::CTRL));
        assert_eq!(controller.selected_ids(), vec!["x", "y", "z"]);
        assert_eq!(calls.borrow().last(), Some(&vec![
            "x".to_string(),
            "y".to_string(),
            "z".to_string()
        ]));

        controller.invoke_focused_button();
        assert_eq!(controller.selection_len(), 0);
        assert_eq!(calls.borrow().last(), Some(&Vec::new()));
    }

    #[test]
    fn test_shift_click_without_anchor_acts_as_plain_click() {
        let (mut controller, _) = make_controller(&["a", "b", "c"]);
        controller.toggle("a");
        controller.toggle("a");
        assert_eq!(controller.anchor(), None);

        controller.pointer_down(2, Modifiers::SHIFT);
        assert_eq!(controller.selected_ids(), vec!["c"]);
        assert_eq!(controller.anchor(), Some(2));
    }

    #[test]
    fn test_plain_click_notifies_once() {
        let (mut controller, calls) = make_controller(&["a", "b", "c"]);
        controller.select_all();
        controller.pointer_down(1, Modifiers::NONE);

        assert_eq!(calls.borrow().len(), 2);
        assert_eq!(calls.borrow().last(), Some(&vec!["b".to_string()]));
    }

    #[test]
    fn test_click_focuses_row() {
        let (mut controller, _) = make_controller(&["a", "b", "c"]);
        controller.pointer_down(1, Modifiers::CTRL);
        assert_eq!(controller.focused(), Some(1));
    }

    #[test]
    fn test_click_out_of_range_is_ignored() {
        let (mut controller, calls) = make_controller(&["a"]);
        controller.pointer_down(5, Modifiers::NONE);
        assert!(!controller.is_dragging());
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_drag_toggles_each_entered_row() {
        let (mut controller, _) = make_controller(&["a", "b", "c", "d"]);

        controller.pointer_down(0, Modifiers::NONE);
        assert!(controller.is_dragging());
        controller.pointer_enter(Some(0));
        controller.pointer_enter(Some(1));
        controller.pointer_enter(Some(2));
        assert_eq!(controller.selected_ids(), vec!["a", "b", "c"]);

        // Dragging back over a row toggles it off again.
        controller.pointer_enter(Some(1));
        assert_eq!(controller.selected_ids(), vec!["a", "c"]);

        controller.pointer_up();
        controller.pointer_enter(Some(3));
        assert_eq!(controller.selected_ids(), vec!["a", "c"]);
    }

    #[test]
    fn test_drag_reentering_same_row_toggles_again() {
        let (mut controller, _) = make_controller(&["a", "b"]);
        controller.pointer_down(0, Modifiers::NONE);
        controller.pointer_enter(Some(1));
        controller.pointer_enter(None);
        controller.pointer_enter(Some(1));

        assert_eq!(controller.selected_ids(), vec!["a"]);
    }

    #[test]
    fn test_drag_does_not_fill_skipped_rows() {
        let (mut controller, _) = make_controller(&["a", "b", "c", "d"]);
        controller.pointer_down(0, Modifiers::NONE);
        controller.pointer_enter(Some(3));

        assert_eq!(controller.selected_ids(), vec!["a", "d"]);
    }

    #[test]
    fn test_arrow_moves_focus_without_selecting() {
        let (mut controller, calls) = make_controller(&["a", "b", "c"]);
        controller.focus_row(0);

        assert!(controller.handle_key(SelectionKey::Down, Modifiers::NONE));
        assert_eq!(controller.focused(), Some(1));
        assert!(calls.borrow().is_empty());

        assert!(controller.handle_key(SelectionKey::Up, Modifiers::NONE));
        assert!(controller.handle_key(SelectionKey::Up, Modifiers::NONE));
        assert_eq!(controller.focused(), Some(0));
    }

    #[test]
    fn test_shift_arrow_extends_range() {
        let (mut controller, _) = make_controller(&["a", "b", "c", "d"]);
        controller.pointer_down(1, Modifiers::NONE);
        controller.pointer_up();

        controller.handle_key(SelectionKey::Down, Modifiers::SHIFT);
        controller.handle_key(SelectionKey::Down, Modifiers::SHIFT);
        assert_eq!(controller.selected_ids(), vec!["b", "c", "d"]);
        assert_eq!(controller.focused(), Some(3));

        // Moving back keeps rows: range select never deselects.
        controller.handle_key(SelectionKey::Up, Modifiers::SHIFT);
        assert_eq!(controller.selected_ids(), vec!["b", "c", "d"]);
    }

    #[test]
    fn test_arrow_without_focus_is_not_consumed() {
        let (mut controller, _) = make_controller(&["a"]);
        assert!(!controller.handle_key(SelectionKey::Down, Modifiers::NONE));
        assert!(!controller.handle_key(SelectionKey::Space, Modifiers::NONE));
    }

    #[test]
    fn test_space_toggles_focused_row() {
        let (mut controller, _) = make_controller(&["a", "b"]);
        controller.focus_row(1);
        controller.handle_key(SelectionKey::Space, Modifiers::NONE);
        assert_eq!(controller.selected_ids(), vec!["b"]);
        controller.handle_key(SelectionKey::Space, Modifiers::NONE);
        assert_eq!(controller.selection_len(), 0);
    }

    #[test]
    fn test_plain_char_not_consumed() {
        let (mut controller, calls) = make_controller(&["a"]);
        assert!(!controller.handle_key(SelectionKey::Char('a'), Modifiers::NONE));
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_keys_ignored_after_detach() {
        let (mut controller, _) = make_controller(&["a", "b"]);
        controller.detach();
        assert!(!controller.handle_key(SelectionKey::Char('a'), Modifiers::CTRL));
        assert!(!controller.handle_key(SelectionKey::Escape, Modifiers::NONE));

        controller.attach(vec![TestRow::default(); 2], items(&["a", "b"]));
        assert!(controller.handle_key(SelectionKey::Char('a'), Modifiers::CTRL));
        assert_eq!(controller.selection_len(), 2);
    }
}
