//! Record grouping by shared column values.
//!
//! This module provides:
//! - [`GroupingEngine`]: the default first-match pass
//! - [`UnionFindGrouper`]: the transitive-closure variant
//! - [`group`]: runs a whole pass over a [`RecordSet`] with a [`GroupingConfig`]
//!
//! # Iteration order
//!
//! First-match results depend on order. Records are visited in the
//! [`RecordOrder`] from the configuration (first arrival by default) and each
//! record's field keys are scanned in ascending column order, so the same
//! input and configuration always produce the same partition.
//!
//! # Example
//!
//! ```
//! use linegroup::grouping::{group, GroupingConfig};
//! use linegroup::input::RecordSet;
//!
//! let records: RecordSet = ["\"1\";\"5\"", "\"1\";\"6\"", "\"2\";\"6\"", "\"7\";\"8\""]
//!     .into_iter()
//!     .collect();
//!
//! let (groups, stats) = group(records, &GroupingConfig::default());
//! assert_eq!(groups.len(), 2);
//! assert_eq!(stats.multi_member_groups, 1);
//! ```

pub mod engine;
pub mod index;
pub mod union_find;

use std::fmt;
use std::sync::Arc;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::input::{Record, RecordSet};
use crate::progress::ProgressCallback;
use crate::record::RecordFormat;

pub use engine::GroupingEngine;
pub use index::{ColumnIndex, KeySlot, KeyState};
pub use union_find::{DisjointSet, UnionFindGrouper};

/// Records between two progress updates.
const PROGRESS_INTERVAL: usize = 4096;

/// How records that match several groups are handled.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Join the first bound group found; never merge existing groups.
    #[default]
    FirstMatch,
    /// Merge every group a record links to (transitive closure).
    UnionFind,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::FirstMatch => write!(f, "first-match"),
            Strategy::UnionFind => write!(f, "union-find"),
        }
    }
}

/// Order in which records are fed to the grouping pass.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum RecordOrder {
    /// First-arrival order of the input.
    #[default]
    Arrival,
    /// Byte-wise lexicographic order of the record strings.
    Sorted,
}

impl fmt::Display for RecordOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordOrder::Arrival => write!(f, "arrival"),
            RecordOrder::Sorted => write!(f, "sorted"),
        }
    }
}

/// Group identifier, allocated sequentially from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GroupId(usize);

impl GroupId {
    /// The first identifier handed out.
    pub const FIRST: GroupId = GroupId(1);

    /// Identifier for the group stored at zero-based `index`.
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self(index + 1)
    }

    /// Zero-based storage index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 - 1
    }

    /// Numeric value.
    #[must_use]
    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One group of linked records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// Identifier assigned during the pass
    pub id: GroupId,
    /// Member records in the order they joined
    pub members: Vec<Record>,
}

impl Group {
    /// Create a group.
    #[must_use]
    pub fn new(id: GroupId, members: Vec<Record>) -> Self {
        Self { id, members }
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Check if this group links at least two records.
    #[must_use]
    pub fn has_multiple(&self) -> bool {
        self.members.len() > 1
    }

    /// Whether `record` is a member.
    #[must_use]
    pub fn contains(&self, record: &str) -> bool {
        self.members.iter().any(|m| m.as_ref() == record)
    }

    /// Iterate members as string slices.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.as_ref())
    }
}

/// Statistics from one grouping pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Records processed
    pub records: usize,
    /// Records whose fields were all empty
    pub blank_records: usize,
    /// Records that linked to at least one earlier record
    pub joined_existing: usize,
    /// Keys whose binding moved to another group on write-through (first-match)
    pub rebound_keys: usize,
    /// Successful set unions (union-find)
    pub merges: usize,
    /// Distinct field keys in the column index
    pub distinct_keys: usize,
    /// Columns holding at least one key
    pub columns: usize,
    /// Groups produced
    pub groups: usize,
    /// Groups with more than one member
    pub multi_member_groups: usize,
    /// Size of the largest group
    pub largest_group: usize,
}

impl GroupingStats {
    /// Fill the group-derived counters from the final groups.
    pub fn record_groups(&mut self, groups: &[Group]) {
        self.groups = groups.len();
        self.multi_member_groups = groups.iter().filter(|g| g.has_multiple()).count();
        self.largest_group = groups.iter().map(Group::len).max().unwrap_or(0);
    }

    /// Percentage of records that ended up sharing a group with another record.
    #[must_use]
    pub fn linked_rate(&self, groups: &[Group]) -> f64 {
        if self.records == 0 {
            return 0.0;
        }
        let linked: usize = groups
            .iter()
            .filter(|g| g.has_multiple())
            .map(Group::len)
            .sum();
        (linked as f64 / self.records as f64) * 100.0
    }
}

/// Configuration for a grouping pass.
#[derive(Clone, Default)]
pub struct GroupingConfig {
    /// Record layout
    pub format: RecordFormat,
    /// Matching strategy
    pub strategy: Strategy,
    /// Record iteration order
    pub order: RecordOrder,
    /// Optional progress callback
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl fmt::Debug for GroupingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupingConfig")
            .field("format", &self.format)
            .field("strategy", &self.strategy)
            .field("order", &self.order)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl GroupingConfig {
    /// Set the record format.
    #[must_use]
    pub fn with_format(mut self, format: RecordFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the matching strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the record order.
    #[must_use]
    pub fn with_order(mut self, order: RecordOrder) -> Self {
        self.order = order;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Partition a set of unique valid records into groups.
///
/// Every record lands in exactly one group. Groups are returned unsorted
/// (allocation order) and singletons are included.
#[must_use]
pub fn group(records: RecordSet, config: &GroupingConfig) -> (Vec<Group>, GroupingStats) {
    let records = records.into_ordered(config.order);
    group_ordered(records, config)
}

/// Partition records that are already in the desired order.
///
/// `config.order` is ignored; the caller's order is used as-is.
#[must_use]
pub fn group_ordered(
    records: Vec<Record>,
    config: &GroupingConfig,
) -> (Vec<Group>, GroupingStats) {
    let total = records.len();
    log::info!(
        "Grouping {} records (strategy: {}, order: {})",
        total,
        config.strategy,
        config.order
    );

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start("grouping", total);
    }
    let report = |done: usize| {
        if let Some(ref callback) = config.progress_callback {
            if done % PROGRESS_INTERVAL == 0 || done == total {
                callback.on_progress(done, "");
            }
        }
    };

    let (groups, stats) = match config.strategy {
        Strategy::FirstMatch => {
            let mut engine = GroupingEngine::new(&config.format);
            for (i, record) in records.into_iter().enumerate() {
                engine.add(record);
                report(i + 1);
            }
            engine.finish()
        }
        Strategy::UnionFind => {
            let mut grouper = UnionFindGrouper::new(&config.format);
            for (i, record) in records.into_iter().enumerate() {
                grouper.add(record);
                report(i + 1);
            }
            grouper.finish()
        }
    };

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end("grouping");
    }

    log::info!(
        "Grouping complete: {} groups, {} with more than one record (largest: {})",
        stats.groups,
        stats.multi_member_groups,
        stats.largest_group
    );
    log::debug!(
        "Index holds {} keys over {} columns; {} records joined existing groups",
        stats.distinct_keys,
        stats.columns,
        stats.joined_existing
    );

    (groups, stats)
}
