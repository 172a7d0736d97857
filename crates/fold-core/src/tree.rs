//! Group tree data model.
//!
//! A [`GroupTree`] is an ordered list of [`Entry`] values at the root. Each
//! entry is either a leaf (a field identifier) or a [`Group`] that owns its
//! own ordered entries. Order is render order and survives every
//! build/encode/decode cycle.
//!
//! # Example
//!
//! ```
//! use fold_core::tree::{Group, GroupTree};
//!
//! let tree = GroupTree::new()
//!     .leaf("name")
//!     .child(Group::new("Stats")
//!         .with_expanded(true)
//!         .child(Group::new("Combat").leaf("attack"))
//!         .leaf("health"));
//!
//! assert_eq!(tree.group("Stats/Combat").map(|g| g.name()), Some("Combat"));
//! assert_eq!(tree.leaf_count(), 3);
//! ```

use crate::path;

/// One slot in a group's (or the root's) ordered children.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Entry {
    /// A field identifier. Carries no state of its own.
    Leaf(String),
    /// A nested collapsible group.
    Group(Group),
}

impl Entry {
    /// The field identifier, if this is a leaf.
    #[must_use]
    pub fn as_leaf(&self) -> Option<&str> {
        match self {
            Self::Leaf(id) => Some(id),
            Self::Group(_) => None,
        }
    }

    /// The group, if this is one.
    #[must_use]
    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Self::Group(group) => Some(group),
            Self::Leaf(_) => None,
        }
    }

    /// Mutable access to the group, if this is one.
    pub fn as_group_mut(&mut self) -> Option<&mut Group> {
        match self {
            Self::Group(group) => Some(group),
            Self::Leaf(_) => None,
        }
    }

    /// Whether this entry is a group.
    #[must_use]
    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }
}

/// A named, collapsible container of leaves and nested groups.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Group {
    name: String,
    /// Whether the group's children are drawn.
    pub(crate) expanded: bool,
    /// Ordered leaves and nested groups.
    pub(crate) children: Vec<Entry>,
}

impl Group {
    /// Create a collapsed, empty group.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expanded: false,
            children: Vec::new(),
        }
    }

    /// Set whether this group is expanded.
    #[must_use]
    pub fn with_expanded(mut self, expanded: bool) -> Self {
        self.expanded = expanded;
        self
    }

    /// Append a leaf.
    #[must_use]
    pub fn leaf(mut self, id: impl Into<String>) -> Self {
        self.children.push(Entry::Leaf(id.into()));
        self
    }

    /// Append a nested group.
    #[must_use]
    pub fn child(mut self, group: Group) -> Self {
        self.children.push(Entry::Group(group));
        self
    }

    /// Replace the children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Entry>) -> Self {
        self.children = children;
        self
    }

    /// The group's own name (one path segment).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the group is expanded.
    #[must_use]
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Set the expanded flag.
    pub fn set_expanded(&mut self, expanded: bool) {
        self.expanded = expanded;
    }

    /// Flip the expanded flag.
    pub fn toggle_expanded(&mut self) {
        self.expanded = !self.expanded;
    }

    /// The ordered children.
    #[must_use]
    pub fn children(&self) -> &[Entry] {
        &self.children
    }

    /// Rows drawn for this group: its header, plus its children when expanded.
    #[must_use]
    pub fn visible_count(&self) -> usize {
        let mut count = 1;
        if self.expanded {
            count += visible_count(&self.children);
        }
        count
    }
}

/// Position of the sibling group called `name`, if any.
pub(crate) fn find_group(entries: &[Entry], name: &str) -> Option<usize> {
    entries
        .iter()
        .position(|entry| matches!(entry, Entry::Group(g) if g.name == name))
}

fn visible_count(entries: &[Entry]) -> usize {
    entries
        .iter()
        .map(|entry| match entry {
            Entry::Leaf(_) => 1,
            Entry::Group(group) => group.visible_count(),
        })
        .sum()
}

/// Root of a group hierarchy. Has no name and is always expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupTree {
    entries: Vec<Entry>,
}

impl GroupTree {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tree from root entries.
    #[must_use]
    pub fn from_entries(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    /// Append a root-level leaf.
    #[must_use]
    pub fn leaf(mut self, id: impl Into<String>) -> Self {
        self.entries.push(Entry::Leaf(id.into()));
        self
    }

    /// Append a root-level group.
    #[must_use]
    pub fn child(mut self, group: Group) -> Self {
        self.entries.push(Entry::Group(group));
        self
    }

    /// Append an entry at the root.
    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// Root entries in order.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub(crate) fn entries_mut(&mut self) -> &mut Vec<Entry> {
        &mut self.entries
    }

    /// Whether the root has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Root-level groups in order, skipping root leaves.
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.entries.iter().filter_map(Entry::as_group)
    }

    /// Look up a group by its joined path (`"A/B"`).
    #[must_use]
    pub fn group(&self, path: &str) -> Option<&Group> {
        let mut segments = path::split(path);
        let first = segments.next()?;
        let mut current = self.entries[find_group(&self.entries, first)?].as_group()?;
        for segment in segments {
            let idx = find_group(&current.children, segment)?;
            current = current.children[idx].as_group()?;
        }
        Some(current)
    }

    /// Mutable lookup by joined path.
    pub fn group_mut(&mut self, path: &str) -> Option<&mut Group> {
        let mut segments = path::split(path);
        let first = segments.next()?;
        let idx = find_group(&self.entries, first)?;
        let mut current = self.entries[idx].as_group_mut()?;
        for segment in segments {
            let idx = find_group(&current.children, segment)?;
            current = current.children[idx].as_group_mut()?;
        }
        Some(current)
    }

    /// Set the expanded flag of the group at `path`.
    ///
    /// Returns `false` if no such group exists.
    pub fn set_expanded(&mut self, path: &str, expanded: bool) -> bool {
        match self.group_mut(path) {
            Some(group) => {
                group.expanded = expanded;
                true
            }
            None => false,
        }
    }

    /// Depth-first, pre-order walk over every entry.
    #[must_use]
    pub fn walk(&self) -> Walk<'_> {
        Walk::new(&self.entries, false)
    }

    /// Like [`walk`](Self::walk), but does not descend into collapsed groups.
    ///
    /// Yields exactly the rows a renderer draws.
    #[must_use]
    pub fn walk_visible(&self) -> Walk<'_> {
        Walk::new(&self.entries, true)
    }

    /// The part of the tree the persisted encoding carries: root leaves dropped.
    #[must_use]
    pub fn persisted_view(&self) -> GroupTree {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|entry| entry.is_group())
                .cloned()
                .collect(),
        }
    }

    /// Number of drawn rows (root leaves, headers, and children of expanded groups).
    #[must_use]
    pub fn visible_count(&self) -> usize {
        visible_count(&self.entries)
    }

    /// Number of leaves anywhere in the tree.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.walk().filter(|item| !item.entry.is_group()).count()
    }

    /// Number of groups anywhere in the tree.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.walk().filter(|item| item.entry.is_group()).count()
    }

    /// Paths of every expanded group, in walk order.
    #[must_use]
    pub fn expanded_paths(&self) -> Vec<String> {
        self.walk()
            .filter(|item| item.entry.as_group().is_some_and(Group::is_expanded))
            .filter_map(|item| item.path)
            .collect()
    }
}

/// One entry yielded by [`Walk`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeItem<'a> {
    /// Nesting depth; root entries are depth 0.
    pub depth: usize,
    /// Joined path of the enclosing group, `None` at the root.
    ///
    /// A root group named `""` has path `""`, so its children have
    /// `Some("")` here, distinct from root entries.
    pub parent: Option<String>,
    /// A group's own joined path; `None` for a leaf.
    pub path: Option<String>,
    /// The entry itself.
    pub entry: &'a Entry,
}

struct Level<'a> {
    entries: core::slice::Iter<'a, Entry>,
    depth: usize,
    parent: Option<String>,
}

/// Pre-order iterator over a [`GroupTree`].
pub struct Walk<'a> {
    stack: Vec<Level<'a>>,
    visible_only: bool,
}

impl<'a> Walk<'a> {
    fn new(entries: &'a [Entry], visible_only: bool) -> Self {
        Self {
            stack: vec![Level {
                entries: entries.iter(),
                depth: 0,
                parent: None,
            }],
            visible_only,
        }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = TreeItem<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let level = self.stack.last_mut()?;
            let Some(entry) = level.entries.next() else {
                self.stack.pop();
                continue;
            };
            let depth = level.depth;
            let parent = level.parent.clone();
            return match entry {
                Entry::Leaf(_) => Some(TreeItem {
                    depth,
                    parent,
                    path: None,
                    entry,
                }),
                Entry::Group(group) => {
                    let path = path::join(parent.as_deref(), &group.name);
                    if !self.visible_only || group.expanded {
                        self.stack.push(Level {
                            entries: group.children.iter(),
                            depth: depth + 1,
                            parent: Some(path.clone()),
                        });
                    }
                    Some(TreeItem {
                        depth,
                        parent,
                        path: Some(path),
                        entry,
                    })
                }
            };
        }
    }
}
