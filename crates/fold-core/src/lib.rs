#![forbid(unsafe_code)]

//! Core of grouped field foldouts.
//!
//! A flat, ordered list of fields, each optionally annotated with a
//! `/`-delimited group path, becomes a nested tree of collapsible groups.
//! Only the groups' expansion flags outlive a redraw: they are persisted as a
//! compact string and copied onto the next freshly built tree by path.
//!
//! # Pipeline
//!
//! ```text
//! persisted text ──decode──▶ old tree ─┐
//!                                      ├─reconcile──▶ tree ──encode──▶ persisted text
//! field list ─────build────▶ new tree ─┘
//! ```
//!
//! ```
//! use fold_core::{build, decode_or_default, encode, reconcile};
//!
//! let fields = [("name", None), ("hp", Some("Stats")), ("atk", Some("Stats/Combat"))];
//! let old = decode_or_default("[Stats{1,hp,Combat{0,atk}}]");
//! let tree = reconcile(&old, build(fields));
//!
//! assert!(tree.group("Stats").unwrap().is_expanded());
//! assert_eq!(encode(&tree), "[Stats{1,hp,Combat{0,atk}}]");
//! ```

pub mod builder;
pub mod codec;
pub mod path;
pub mod reconcile;
pub mod tree;

pub use builder::{TreeBuilder, build};
pub use codec::{DecodeError, decode, decode_or_default, encode};
pub use path::{PathError, SegmentPolicy};
pub use reconcile::{ExpansionIndex, ReconcileStats, reconcile};
pub use tree::{Entry, Group, GroupTree, TreeItem};
