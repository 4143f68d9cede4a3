//! Transitive grouping with a disjoint-set forest.
//!
//! Every record is a node. The first record carrying a field key owns it;
//! each later record carrying the same key is unioned with the owner. Groups
//! are the connected components, so two groups *are* merged when a bridging
//! record links them. Union by rank with path halving keeps `find` near O(1).

use rustc_hash::FxHashMap;

use super::index::{ColumnIndex, KeyState};
use super::{Group, GroupId, GroupingStats};
use crate::input::Record;
use crate::record::{RecordFormat, RecordParser};

/// Disjoint-set forest over dense node indices.
#[derive(Debug, Clone, Default)]
pub struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
    sets: usize,
}

impl DisjointSet {
    /// Create an empty forest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a singleton node and return its index.
    pub fn make_set(&mut self) -> usize {
        let node = self.parent.len();
        self.parent.push(node);
        self.rank.push(0);
        self.sets += 1;
        node
    }

    /// Root of `node`, halving the path on the way.
    ///
    /// # Panics
    ///
    /// Panics if `node` was never created with [`Self::make_set`].
    pub fn find(&mut self, node: usize) -> usize {
        let mut current = node;
        while self.parent[current] != current {
            let grandparent = self.parent[self.parent[current]];
            self.parent[current] = grandparent;
            current = grandparent;
        }
        current
    }

    /// Merge the sets of `a` and `b`. Returns `false` if already merged.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return false;
        }

        match self.rank[root_a].cmp(&self.rank[root_b]) {
            std::cmp::Ordering::Less => self.parent[root_a] = root_b,
            std::cmp::Ordering::Greater => self.parent[root_b] = root_a,
            std::cmp::Ordering::Equal => {
                self.parent[root_a] = root_b;
                self.rank[root_b] = self.rank[root_b].saturating_add(1);
            }
        }
        self.sets -= 1;
        true
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// Check if the forest has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Number of disjoint sets.
    #[must_use]
    pub fn set_count(&self) -> usize {
        self.sets
    }
}

/// Grouping pass producing the full transitive closure.
#[derive(Debug)]
pub struct UnionFindGrouper {
    parser: RecordParser,
    owners: ColumnIndex<usize>,
    forest: DisjointSet,
    records: Vec<Record>,
    stats: GroupingStats,
}

impl UnionFindGrouper {
    /// Create a grouper for records in `format`.
    #[must_use]
    pub fn new(format: &RecordFormat) -> Self {
        Self {
            parser: RecordParser::new(format),
            owners: ColumnIndex::new(),
            forest: DisjointSet::new(),
            records: Vec::new(),
            stats: GroupingStats::default(),
        }
    }

    /// Add one record, linking it to every earlier record it shares a key with.
    pub fn add(&mut self, record: Record) {
        self.stats.records += 1;
        let node = self.forest.make_set();
        let mut linked = false;
        let mut blank = true;

        for key in self.parser.field_keys(&record) {
            blank = false;
            match self.owners.state(key) {
                KeyState::Bound(owner) => {
                    linked = true;
                    if self.forest.union(owner, node) {
                        self.stats.merges += 1;
                    }
                }
                KeyState::Absent | KeyState::Unassigned => {
                    self.owners.bind(key, node);
                }
            }
        }

        if blank {
            self.stats.blank_records += 1;
        }
        if linked {
            self.stats.joined_existing += 1;
        }
        self.records.push(record);
    }

    /// End the pass. Groups are ordered by their earliest record and keep
    /// members in record order.
    #[must_use]
    pub fn finish(self) -> (Vec<Group>, GroupingStats) {
        let Self {
            owners,
            mut forest,
            records,
            mut stats,
            ..
        } = self;

        stats.distinct_keys = owners.key_count();
        stats.columns = owners.column_count();
        drop(owners);

        let mut slot_of_root: FxHashMap<usize, usize> = FxHashMap::default();
        let mut members: Vec<Vec<Record>> = Vec::with_capacity(forest.set_count());

        for (node, record) in records.into_iter().enumerate() {
            let root = forest.find(node);
            let slot = *slot_of_root.entry(root).or_insert_with(|| {
                members.push(Vec::new());
                members.len() - 1
            });
            members[slot].push(record);
        }

        let groups: Vec<Group> = members
            .into_iter()
            .enumerate()
            .map(|(i, members)| Group::new(GroupId::from_index(i), members))
            .collect();
        stats.record_groups(&groups);

        (groups, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grouper() -> UnionFindGrouper {
        UnionFindGrouper::new(&RecordFormat::default())
    }

    #[test]
    fn test_disjoint_set_basics() {
        let mut set = DisjointSet::new();
        let a = set.make_set();
        let b = set.make_set();
        let c = set.make_set();
        assert_eq!(set.len(), 3);
        assert_eq!(set.set_count(), 3);

        assert!(set.union(a, b));
        assert!(!set.union(b, a));
        assert_eq!(set.find(a), set.find(b));
        assert_ne!(set.find(a), set.find(c));
        assert_eq!(set.set_count(), 2);
    }

    #[test]
    fn test_disjoint_set_long_chain() {
        let mut set = DisjointSet::new();
        let nodes: Vec<usize> = (0..1000).map(|_| set.make_set()).collect();
        for pair in nodes.windows(2) {
            set.union(pair[0], pair[1]);
        }
        let root = set.find(nodes[0]);
        assert!(nodes.iter().all(|&n| set.find(n) == root));
        assert_eq!(set.set_count(), 1);
    }

    #[test]
    fn test_bridge_merges_groups() {
        let mut grouper = grouper();
        grouper.add("\"1\";\"10\"".into());
        grouper.add("\"2\";\"20\"".into());
        grouper.add("\"1\";\"20\"".into());

        let (groups, stats) = grouper.finish();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 3);
        assert_eq!(stats.merges, 2);
        assert_eq!(stats.joined_existing, 1);
    }

    #[test]
    fn test_components_ordered_by_first_record() {
        let mut grouper = grouper();
        grouper.add("\"5\";\"1\"".into());
        grouper.add("\"6\";\"2\"".into());
        grouper.add("\"5\";\"3\"".into());

        let (groups, _) = grouper.finish();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].id, GroupId::FIRST);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(&*groups[1].members[0], "\"6\";\"2\"");
    }

    #[test]
    fn test_blank_records_stay_alone() {
        let mut grouper = grouper();
        grouper.add("\"\";\"\"".into());
        grouper.add("\"\"".into());

        let (groups, stats) = grouper.finish();
        assert_eq!(groups.len(), 2);
        assert_eq!(stats.blank_records, 2);
    }
}
