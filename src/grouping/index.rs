//! Per-column value index.
//!
//! Maps `column → value → slot`. A slot is either seen-but-unassigned or bound
//! to a target. A key with no entry at all is [`KeyState::Absent`]. Columns
//! are small dense integers, so the outer level is a vector indexed by column.

use rustc_hash::FxHashMap;

use crate::record::FieldKey;

/// Stored state of a field key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySlot<T> {
    /// The key has been seen but carries no binding yet.
    Unassigned,
    /// The key links to `T` (a group or an owning record).
    Bound(T),
}

/// Observed state of a field key, including absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState<T> {
    /// Never seen.
    Absent,
    /// Seen, no binding.
    Unassigned,
    /// Bound to `T`.
    Bound(T),
}

impl<T> From<Option<&KeySlot<T>>> for KeyState<T>
where
    T: Copy,
{
    fn from(slot: Option<&KeySlot<T>>) -> Self {
        match slot {
            None => Self::Absent,
            Some(KeySlot::Unassigned) => Self::Unassigned,
            Some(KeySlot::Bound(target)) => Self::Bound(*target),
        }
    }
}

/// Column → value → slot index.
#[derive(Debug, Clone)]
pub struct ColumnIndex<T> {
    columns: Vec<FxHashMap<Box<str>, KeySlot<T>>>,
    keys: usize,
}

impl<T> Default for ColumnIndex<T> {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            keys: 0,
        }
    }
}

impl<T: Copy + PartialEq> ColumnIndex<T> {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of `key`.
    #[must_use]
    pub fn state(&self, key: FieldKey<'_>) -> KeyState<T> {
        self.columns
            .get(key.column)
            .and_then(|values| values.get(key.value))
            .into()
    }

    /// Record `key` as seen, returning its state before the call.
    ///
    /// An absent key becomes [`KeySlot::Unassigned`]; existing slots are left
    /// untouched.
    pub fn mark_seen(&mut self, key: FieldKey<'_>) -> KeyState<T> {
        let values = self.column_mut(key.column);
        if let Some(slot) = values.get(key.value) {
            return Some(slot).into();
        }
        values.insert(Box::from(key.value), KeySlot::Unassigned);
        self.keys += 1;
        KeyState::Absent
    }

    /// Bind `key` to `target`, returning the previous state.
    pub fn bind(&mut self, key: FieldKey<'_>, target: T) -> KeyState<T> {
        let values = self.column_mut(key.column);
        if let Some(slot) = values.get_mut(key.value) {
            let previous = KeyState::from(Some(&*slot));
            *slot = KeySlot::Bound(target);
            return previous;
        }
        values.insert(Box::from(key.value), KeySlot::Bound(target));
        self.keys += 1;
        KeyState::Absent
    }

    /// Number of distinct field keys stored.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.keys
    }

    /// Number of columns that hold at least one key.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.iter().filter(|values| !values.is_empty()).count()
    }

    /// Number of keys still unassigned.
    #[must_use]
    pub fn unassigned_count(&self) -> usize {
        self.columns
            .iter()
            .flat_map(|values| values.values())
            .filter(|slot| matches!(slot, KeySlot::Unassigned))
            .count()
    }

    fn column_mut(&mut self, column: usize) -> &mut FxHashMap<Box<str>, KeySlot<T>> {
        if column >= self.columns.len() {
            self.columns.resize_with(column + 1, FxHashMap::default);
        }
        &mut self.columns[column]
    }
}
