//! Persisted text encoding of a [`GroupTree`].
//!
//! ```text
//! document    := '[' group-list ']'
//! group-list  := (group (',' group)*)?
//! group       := name '{' expand-flag (',' member-list)? '}'
//! member-list := member (',' member)*
//! member      := group | leaf-path
//! expand-flag := '1' | '0'
//! ```
//!
//! Only groups are written at the top level. Root leaves carry nothing the
//! next rebuild cannot recompute, so the encoding drops them; inside a group
//! both leaves and nested groups are written in order.
//!
//! Decoding is a depth-aware split: commas at brace depth 0 separate items,
//! deeper commas belong to the item being read. Each group body is split the
//! same way, recursively.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | [`DecodeError::Unbalanced`] | truncated or hand-edited text | `decode` errors, `decode_or_default` returns an empty tree |
//! | [`DecodeError::MissingBrackets`] | not wrapped in `[` `]` | same |
//! | [`DecodeError::InvalidFlag`] | flag other than `0`/`1` | same |
//! | [`DecodeError::TooDeep`] | nesting past [`MAX_DEPTH`] | same, rejected before recursing |
//!
//! ```
//! use fold_core::codec::{decode, encode};
//! use fold_core::tree::{Group, GroupTree};
//!
//! let tree = GroupTree::new()
//!     .child(Group::new("Stats").with_expanded(true).leaf("hp").child(Group::new("Combat").leaf("atk")));
//! let text = encode(&tree);
//! assert_eq!(text, "[Stats{1,hp,Combat{0,atk}}]");
//! assert_eq!(decode(&text).unwrap(), tree);
//! ```

use core::fmt;
use core::str::FromStr;

use crate::tree::{Entry, Group, GroupTree};

/// The document for a tree with no groups.
pub const EMPTY_DOCUMENT: &str = "[]";

/// Deepest group nesting `decode` accepts.
///
/// Checked over the whole document before any group is decoded, so hostile
/// text is rejected without recursing into it.
pub const MAX_DEPTH: usize = 256;

/// Errors raised while decoding persisted text.
///
/// Offsets are byte positions in the decoded text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The document is not wrapped in `[` … `]`.
    MissingBrackets,
    /// A `}` without a matching `{`, or a `{` never closed.
    Unbalanced { offset: usize },
    /// A `[` or `]` inside the document.
    UnexpectedBracket { offset: usize },
    /// Two adjacent commas, or a comma at the start or end of a list.
    EmptyItem { offset: usize },
    /// A top-level item that is not a group.
    ExpectedGroup { offset: usize },
    /// Text after a group's closing brace.
    TrailingText { offset: usize },
    /// A group body with no expansion flag.
    MissingFlag { offset: usize },
    /// An expansion flag other than `0` or `1`.
    InvalidFlag { offset: usize, found: String },
    /// Groups nested deeper than [`MAX_DEPTH`].
    TooDeep { offset: usize },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingBrackets => write!(f, "document is not wrapped in '[' and ']'"),
            Self::Unbalanced { offset } => write!(f, "unbalanced braces at byte {offset}"),
            Self::UnexpectedBracket { offset } => {
                write!(f, "unexpected bracket at byte {offset}")
            }
            Self::EmptyItem { offset } => write!(f, "empty item at byte {offset}"),
            Self::ExpectedGroup { offset } => {
                write!(f, "expected a group at byte {offset}")
            }
            Self::TrailingText { offset } => {
                write!(f, "text after closing brace at byte {offset}")
            }
            Self::MissingFlag { offset } => {
                write!(f, "missing expansion flag at byte {offset}")
            }
            Self::InvalidFlag { offset, found } => {
                write!(f, "invalid expansion flag '{found}' at byte {offset}")
            }
            Self::TooDeep { offset } => {
                write!(f, "groups nested deeper than {MAX_DEPTH} at byte {offset}")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// Result type for decoding.
pub type DecodeResult<T> = Result<T, DecodeError>;

// ─────────────────────────────────────────────────────────────────────────────
// Encode
// ─────────────────────────────────────────────────────────────────────────────

/// Encode a tree to its canonical persisted form.
#[must_use]
pub fn encode(tree: &GroupTree) -> String {
    #[cfg(feature = "tracing")]
    let _span = tracing::debug_span!("tree_encode").entered();

    let mut out = String::with_capacity(64);
    out.push('[');
    for (i, group) in tree.groups().enumerate() {
        if i > 0 {
            out.push(',');
        }
        encode_group(group, &mut out);
    }
    out.push(']');
    out
}

fn encode_group(group: &Group, out: &mut String) {
    out.push_str(group.name());
    out.push('{');
    out.push(if group.expanded { '1' } else { '0' });
    for child in &group.children {
        out.push(',');
        match child {
            Entry::Leaf(id) => out.push_str(id),
            Entry::Group(nested) => encode_group(nested, out),
        }
    }
    out.push('}');
}

// ─────────────────────────────────────────────────────────────────────────────
// Decode
// ─────────────────────────────────────────────────────────────────────────────

/// Decode persisted text back into a tree.
pub fn decode(text: &str) -> DecodeResult<GroupTree> {
    #[cfg(feature = "tracing")]
    let _span = tracing::debug_span!("tree_decode", len = text.len()).entered();

    let inner = text
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or(DecodeError::MissingBrackets)?;

    let mut tree = GroupTree::new();
    for (offset, item) in split_top_level(inner, 1)? {
        if !item.contains('{') {
            return Err(DecodeError::ExpectedGroup { offset });
        }
        tree.push(Entry::Group(decode_group(item, offset)?));
    }
    Ok(tree)
}

/// Decode, falling back to an empty tree when the text is corrupt.
///
/// Corrupt persisted state must never block editing; the caller rebuilds with
/// every group collapsed.
#[must_use]
pub fn decode_or_default(text: &str) -> GroupTree {
    match decode(text) {
        Ok(tree) => tree,
        Err(_err) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %_err, "discarding corrupt persisted group state");
            GroupTree::new()
        }
    }
}

/// Split `text` at commas found at brace depth 0.
///
/// Returns each item with its absolute byte offset (`base` is the offset of
/// `text` inside the whole document). Nesting past [`MAX_DEPTH`] is an error;
/// the first call scans the whole document, so the limit holds before
/// [`decode_group`] recurses.
fn split_top_level(text: &str, base: usize) -> DecodeResult<Vec<(usize, &str)>> {
    let mut items = Vec::new();
    if text.is_empty() {
        return Ok(items);
    }

    let mut depth = 0usize;
    let mut start = 0;
    for (i, ch) in text.char_indices() {
        match ch {
            '{' => {
                depth += 1;
                if depth > MAX_DEPTH {
                    return Err(DecodeError::TooDeep { offset: base + i });
                }
            }
            '}' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or(DecodeError::Unbalanced { offset: base + i })?;
            }
            '[' | ']' => return Err(DecodeError::UnexpectedBracket { offset: base + i }),
            ',' if depth == 0 => {
                push_item(&mut items, text, start, i, base)?;
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(DecodeError::Unbalanced {
            offset: base + text.len(),
        });
    }
    push_item(&mut items, text, start, text.len(), base)?;
    Ok(items)
}

fn push_item<'a>(
    items: &mut Vec<(usize, &'a str)>,
    text: &'a str,
    start: usize,
    end: usize,
    base: usize,
) -> DecodeResult<()> {
    if start == end {
        return Err(DecodeError::EmptyItem {
            offset: base + start,
        });
    }
    items.push((base + start, &text[start..end]));
    Ok(())
}

/// Index of the `}` matching the `{` at `open`.
fn matching_close(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, ch) in text[open..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

fn decode_group(item: &str, offset: usize) -> DecodeResult<Group> {
    let open = item
        .find('{')
        .ok_or(DecodeError::ExpectedGroup { offset })?;
    let close = matching_close(item, open).ok_or(DecodeError::Unbalanced {
        offset: offset + item.len(),
    })?;
    if close + 1 != item.len() {
        return Err(DecodeError::TrailingText {
            offset: offset + close + 1,
        });
    }

    let body_offset = offset + open + 1;
    let mut members = split_top_level(&item[open + 1..close], body_offset)?.into_iter();

    let (flag_offset, flag) = members.next().ok_or(DecodeError::MissingFlag {
        offset: body_offset,
    })?;
    let expanded = match flag {
        "1" => true,
        "0" => false,
        other => {
            return Err(DecodeError::InvalidFlag {
                offset: flag_offset,
                found: other.to_owned(),
            });
        }
    };

    let mut group = Group::new(&item[..open]).with_expanded(expanded);
    for (member_offset, member) in members {
        let entry = if member.contains('{') {
            Entry::Group(decode_group(member, member_offset)?)
        } else {
            Entry::Leaf(member.to_owned())
        };
        group.children.push(entry);
    }
    Ok(group)
}

impl fmt::Display for GroupTree {
    /// Writes the canonical persisted form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(self))
    }
}

impl FromStr for GroupTree {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s)
    }
}
