//! Carry expansion state from a previously persisted tree onto a fresh one.
//!
//! Groups are matched by their full joined path, never by position or
//! identity: a group that moved among its siblings keeps its state, a renamed
//! group (or one under a renamed ancestor) starts collapsed.

use std::collections::HashMap;

use crate::path;
use crate::tree::{Entry, GroupTree};

/// Outcome of applying an [`ExpansionIndex`] to a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Groups whose path was found in the index.
    pub matched: usize,
    /// Groups never seen before; left collapsed.
    pub fresh: usize,
    /// Indexed paths with no counterpart in the new tree.
    pub stale: usize,
}

/// Path → expansion flag lookup built once from an old tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionIndex {
    flags: HashMap<String, bool>,
}

impl ExpansionIndex {
    /// Index every group of `tree` by its joined path.
    #[must_use]
    pub fn from_tree(tree: &GroupTree) -> Self {
        let flags = tree
            .walk()
            .filter_map(|item| Some((item.path?, item.entry.as_group()?.is_expanded())))
            .collect();
        Self { flags }
    }

    /// Stored flag for `path`, if the old tree had that group.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<bool> {
        self.flags.get(path).copied()
    }

    /// Number of indexed groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Whether the index holds no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Copy stored flags onto every matching group of `tree`.
    ///
    /// Groups with no stored flag keep whatever flag they already have (the
    /// builder leaves them collapsed).
    pub fn apply(&self, tree: &mut GroupTree) -> ReconcileStats {
        let mut stats = ReconcileStats::default();
        apply_level(&self.flags, tree.entries_mut(), None, &mut stats);
        stats.stale = self.flags.len().saturating_sub(stats.matched);

        #[cfg(feature = "tracing")]
        tracing::trace!(
            matched = stats.matched,
            fresh = stats.fresh,
            stale = stats.stale,
            "applied expansion index"
        );
        stats
    }
}

fn apply_level(
    flags: &HashMap<String, bool>,
    entries: &mut [Entry],
    parent: Option<&str>,
    stats: &mut ReconcileStats,
) {
    for entry in entries {
        let Entry::Group(group) = entry else {
            continue;
        };
        let path = path::join(parent, group.name());
        match flags.get(&path) {
            Some(&expanded) => {
                group.expanded = expanded;
                stats.matched += 1;
            }
            None => stats.fresh += 1,
        }
        apply_level(flags, &mut group.children, Some(&path), stats);
    }
}

/// Copy expansion flags from `old` onto `new`, matched by path.
///
/// `old` is only read; it is a lookup aid and can be dropped afterward.
#[must_use]
pub fn reconcile(old: &GroupTree, new: GroupTree) -> GroupTree {
    reconcile_with_stats(old, new).0
}

/// [`reconcile`], also returning match statistics.
#[must_use]
pub fn reconcile_with_stats(old: &GroupTree, mut new: GroupTree) -> (GroupTree, ReconcileStats) {
    #[cfg(feature = "tracing")]
    let _span = tracing::debug_span!("tree_reconcile").entered();

    let stats = ExpansionIndex::from_tree(old).apply(&mut new);
    (new, stats)
}
