//! Row identity: records bound to row handles and identifier resolution.

use serde_json::Value;
use std::hash::BuildHasher;

/// Identifier of a row within one attached snapshot.
pub type RowId = String;

/// Fields consulted, in order, when resolving a row identifier.
pub const ID_FIELDS: &[&str] = &["id", "_id", "rowId"];

/// Prefix marking identifiers derived from item content instead of an id field.
pub const FALLBACK_ID_PREFIX: char = '#';

const FALLBACK_SEED: u64 = 0x5e1e_c7ed_0000_0001;

/// Identity of a bound row: its resolved id and dense 0-based position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowRecord {
    pub id: RowId,
    pub index: usize,
}

impl RowRecord {
    /// Resolves the record for `item` placed at `index`.
    pub fn resolve(item: &Value, index: usize) -> Self {
        Self {
            id: resolve_row_id(item),
            index,
        }
    }
}

/// A rendered row the controller binds to and marks.
///
/// Implementors are the visual side of a row (a table line, a DOM element);
/// the controller never inspects them beyond these two calls.
pub trait RowHandle {
    /// Stores the resolved identity on the handle.
    fn bind(&mut self, record: &RowRecord);

    /// Reflects whether the row is currently part of the selection.
    fn set_selected(&mut self, selected: bool);
}

/// Resolves the identifier of a data item.
///
/// The first of `id`, `_id` and `rowId` holding a non-empty string or a number
/// wins. Items without one get a structural identifier hashed from their JSON
/// serialization, so identical items always resolve to the same id.
pub fn resolve_row_id(item: &Value) -> RowId {
    for field in ID_FIELDS {
        match item.get(field) {
            Some(Value::String(s)) if !s.is_empty() => return s.clone(),
            Some(Value::Number(n)) => return n.to_string(),
            _ => {}
        }
    }
    structural_id(item)
}

fn structural_id(item: &Value) -> RowId {
    let hasher = foldhash::fast::FixedState::with_seed(FALLBACK_SEED);
    // Value's Display is the compact JSON form and cannot fail.
    let digest = hasher.hash_one(item.to_string());
    format!("{}{:016x}", FALLBACK_ID_PREFIX, digest)
}

/// Returns `true` if `id` was produced by the structural fallback.
pub fn is_fallback_id(id: &str) -> bool {
    id.starts_with(FALLBACK_ID_PREFIX)
}
