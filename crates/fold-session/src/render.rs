//! Renderer contract.
//!
//! The session walks the reconciled tree in render order and calls back into
//! a [`Renderer`] for every visible row. A renderer paints; it never mutates
//! the tree. The only thing it reports back is the expansion state the user
//! asked for on each header, which the session applies and persists.

use fold_core::Group;

use crate::config::FieldFlags;

/// Paints field rows and group headers.
pub trait Renderer {
    /// Draw one field at `depth` (0 for root fields).
    fn field(&mut self, field: &str, depth: usize, flags: FieldFlags);

    /// Draw the header of `group`, reachable at `path`.
    ///
    /// Returns the expansion state requested by the user: the group's current
    /// state when nothing was clicked, its negation when the header toggled.
    /// Children are drawn only when this returns `true`.
    fn group_header(&mut self, group: &Group, path: &str, depth: usize) -> bool;

    /// Called after a group's header and any drawn children.
    fn group_end(&mut self, _path: &str, _depth: usize) {}
}
