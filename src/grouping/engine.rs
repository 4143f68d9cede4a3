//! First-match grouping engine.
//!
//! # Overview
//!
//! Records are processed one at a time. For each record:
//!
//! 1. Its non-empty field keys are scanned in ascending column order.
//! 2. The first key already bound to a group selects that group and the scan
//!    stops. Keys passed over on the way are recorded as seen-unassigned.
//! 3. Without a match a new group is allocated.
//! 4. Every key of the record is then bound to the chosen group, so later
//!    records can join through any of its values.
//!
//! Two existing groups are never merged. A record whose keys point at two
//! different groups joins the first one found; the second group keeps its
//! members. See [`crate::grouping::union_find`] for the transitive variant.
//!
//! # Example
//!
//! ```
//! use linegroup::grouping::GroupingEngine;
//! use linegroup::record::RecordFormat;
//!
//! let mut engine = GroupingEngine::new(&RecordFormat::default());
//! let a = engine.add("\"1\";\"5\"".into());
//! let b = engine.add("\"1\";\"6\"".into());
//! let c = engine.add("\"2\";\"6\"".into());
//! assert_eq!(a, b);
//! assert_eq!(b, c);
//!
//! let (groups, stats) = engine.finish();
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].len(), 3);
//! assert_eq!(stats.records, 3);
//! ```

use super::index::{ColumnIndex, KeyState};
use super::{Group, GroupId, GroupingStats};
use crate::input::Record;
use crate::record::{FieldKey, RecordFormat, RecordParser};

/// Stateful first-match grouping pass.
///
/// The index and membership lists are owned by one engine and dropped with it;
/// build a fresh engine for every pass.
#[derive(Debug)]
pub struct GroupingEngine {
    parser: RecordParser,
    index: ColumnIndex<GroupId>,
    groups: Vec<Vec<Record>>,
    stats: GroupingStats,
}

impl GroupingEngine {
    /// Create an engine for records in `format`.
    #[must_use]
    pub fn new(format: &RecordFormat) -> Self {
        Self {
            parser: RecordParser::new(format),
            index: ColumnIndex::new(),
            groups: Vec::new(),
            stats: GroupingStats::default(),
        }
    }

    /// Assign `record` to a group and return that group's identifier.
    ///
    /// Records are expected to be unique; adding the same record twice puts
    /// it into the same group twice.
    pub fn add(&mut self, record: Record) -> GroupId {
        self.stats.records += 1;
        let keys: Vec<FieldKey<'_>> = self.parser.parse(&record);

        if keys.is_empty() {
            self.stats.blank_records += 1;
        }

        let target = keys.iter().find_map(|key| match self.index.mark_seen(*key) {
            KeyState::Bound(id) => Some(id),
            KeyState::Absent | KeyState::Unassigned => None,
        });

        let group = match target {
            Some(id) => {
                self.stats.joined_existing += 1;
                id
            }
            None => {
                let id = GroupId::from_index(self.groups.len());
                self.groups.push(Vec::new());
                id
            }
        };

        for key in &keys {
            if let KeyState::Bound(previous) = self.index.bind(*key, group) {
                if previous != group {
                    self.stats.rebound_keys += 1;
                    log::trace!(
                        "Key {}@{} moved from group {} to {}",
                        key.value,
                        key.column,
                        previous,
                        group
                    );
                }
            }
        }
        drop(keys);

        self.groups[group.index()].push(record);
        group
    }

    /// Current state of a field key in the index.
    #[must_use]
    pub fn key_state(&self, key: FieldKey<'_>) -> KeyState<GroupId> {
        self.index.state(key)
    }

    /// Number of groups allocated so far.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Members of `id`, if allocated.
    #[must_use]
    pub fn members(&self, id: GroupId) -> Option<&[Record]> {
        self.groups.get(id.index()).map(Vec::as_slice)
    }

    /// End the pass, returning groups in allocation order.
    #[must_use]
    pub fn finish(self) -> (Vec<Group>, GroupingStats) {
        let Self {
            index,
            groups,
            mut stats,
            ..
        } = self;

        stats.distinct_keys = index.key_count();
        stats.columns = index.column_count();
        drop(index);

        let groups: Vec<Group> = groups
            .into_iter()
            .enumerate()
            .map(|(i, members)| Group::new(GroupId::from_index(i), members))
            .collect();
        stats.record_groups(&groups);

        (groups, stats)
    }
}
