//! Insertion-ordered set of unique records.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::grouping::RecordOrder;

/// One record string, shared between the dedup set and the groups.
pub type Record = Arc<str>;

/// Unique records in first-arrival order.
///
/// Inserting a record that is already present is a no-op, so each distinct
/// line is kept exactly once at the position where it was first seen.
#[derive(Debug, Default, Clone)]
pub struct RecordSet {
    seen: FxHashSet<Record>,
    records: Vec<Record>,
}

impl RecordSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, returning `true` if it was not present before.
    pub fn insert(&mut self, record: &str) -> bool {
        if self.seen.contains(record) {
            return false;
        }
        let record: Record = Arc::from(record);
        self.seen.insert(Arc::clone(&record));
        self.records.push(record);
        true
    }

    /// Whether the set contains `record`.
    #[must_use]
    pub fn contains(&self, record: &str) -> bool {
        self.seen.contains(record)
    }

    /// Number of unique records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate the records in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// Consume the set, returning its records in the requested order.
    #[must_use]
    pub fn into_ordered(self, order: RecordOrder) -> Vec<Record> {
        let Self { seen, mut records } = self;
        drop(seen);
        if order == RecordOrder::Sorted {
            records.sort_unstable();
        }
        records
    }
}

impl<'a> FromIterator<&'a str> for RecordSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = Self::new();
        for record in iter {
            set.insert(record);
        }
        set
    }
}

impl<'a> Extend<&'a str> for RecordSet {
    fn extend<I: IntoIterator<Item = &'a str>>(&mut self, iter: I) {
        for record in iter {
            self.insert(record);
        }
    }
}
