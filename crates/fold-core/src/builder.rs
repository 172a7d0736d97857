//! Build a [`GroupTree`] from an ordered field list and each field's path.
//!
//! Groups are created on demand while walking each path from the root, and
//! fields sharing a path prefix land in the same group instance. Enumeration
//! order is preserved at every level. Every group comes out collapsed;
//! restoring expansion state is the reconciler's job.

use crate::path::{self, PathError, SegmentPolicy};
use crate::tree::{Entry, Group, GroupTree, find_group};

/// Builds group trees under a [`SegmentPolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeBuilder {
    policy: SegmentPolicy,
}

impl TreeBuilder {
    /// Create a permissive builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the segment policy.
    #[must_use]
    pub fn with_policy(mut self, policy: SegmentPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The active segment policy.
    #[must_use]
    pub fn policy(&self) -> SegmentPolicy {
        self.policy
    }

    /// Build a tree, discarding any reported path errors.
    pub fn build<'a, I>(&self, fields: I) -> GroupTree
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        self.build_checked(fields).0
    }

    /// Build a tree and report the paths the policy rejected.
    ///
    /// Under [`SegmentPolicy::Permissive`] the error list is always empty.
    /// Under [`SegmentPolicy::Strict`] a rejected field is kept as a root
    /// leaf so it is still drawn.
    pub fn build_checked<'a, I>(&self, fields: I) -> (GroupTree, Vec<PathError>)
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("tree_build", policy = ?self.policy).entered();

        let mut tree = GroupTree::new();
        let mut errors = Vec::new();

        for (id, group_path) in fields {
            let Some(group_path) = group_path else {
                tree.push(Entry::Leaf(id.to_owned()));
                continue;
            };

            if self.policy == SegmentPolicy::Strict
                && let Err(err) = path::validate(id, group_path)
            {
                #[cfg(feature = "tracing")]
                tracing::debug!(error = %err, "group path rejected, field left ungrouped");
                errors.push(err);
                tree.push(Entry::Leaf(id.to_owned()));
                continue;
            }

            insert(tree.entries_mut(), path::split(group_path), id);
        }

        (tree, errors)
    }
}

/// Build a tree with the permissive policy.
pub fn build<'a, I>(fields: I) -> GroupTree
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    TreeBuilder::new().build(fields)
}

/// Descend through `segments`, creating missing groups, and append `id` to
/// the innermost one.
fn insert<'s>(entries: &mut Vec<Entry>, segments: impl Iterator<Item = &'s str>, id: &str) {
    let mut level = entries;
    for segment in segments {
        let idx = match find_group(level, segment) {
            Some(idx) => idx,
            None => {
                level.push(Entry::Group(Group::new(segment)));
                level.len() - 1
            }
        };
        // find_group only returns group positions.
        let Entry::Group(group) = &mut level[idx] else {
            return;
        };
        level = &mut group.children;
    }
    level.push(Entry::Leaf(id.to_owned()));
}
