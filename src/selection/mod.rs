//! Multi-row selection for tabular views.
//!
//! [`SelectionController`] owns the selected ids, the range anchor and the
//! action bar for one row source. Rows are opaque [`RowHandle`]s, so the
//! controller works the same for a terminal table or any other surface and
//! can be exercised in tests without rendering anything.

pub mod action;
pub mod controller;
pub mod interaction;
pub mod record;

pub use action::{ActionBar, ActionVariant, BarButton, BulkAction, ButtonKind};
pub use controller::{SelectionConfig, SelectionController, SelectionListener};
pub use interaction::{Modifiers, SelectionKey};
pub use record::{RowHandle, RowId, RowRecord, resolve_row_id};
