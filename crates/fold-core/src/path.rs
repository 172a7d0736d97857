//! Group path splitting and validation.
//!
//! A group path is a `/`-delimited chain of group names (`"Stats/Combat"`).
//! Paths are split without any escaping; what happens to awkward segments
//! (empty names, characters the persisted encoding reserves) is decided by a
//! [`SegmentPolicy`].

use core::fmt;

/// Separator between group names in a path.
pub const SEPARATOR: char = '/';

/// Characters the persisted encoding uses as delimiters.
pub const RESERVED: [char; 5] = ['{', '}', '[', ']', ','];

/// Split a group path into its segments, in order.
///
/// Splitting is permissive: `"A//B"` yields `["A", "", "B"]`.
pub fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split(SEPARATOR)
}

/// Append `name` to the joined path of its parent group.
///
/// `None` is the root. `Some("")` is a group whose name is empty, so
/// `join(Some(""), "B")` is `"/B"`, matching what [`split`] produces.
#[must_use]
pub fn join(parent: Option<&str>, name: &str) -> String {
    match parent {
        None => name.to_owned(),
        Some(prefix) => {
            let mut path = String::with_capacity(prefix.len() + 1 + name.len());
            path.push_str(prefix);
            path.push(SEPARATOR);
            path.push_str(name);
            path
        }
    }
}

/// Whether `text` contains a character reserved by the encoding.
#[must_use]
pub fn has_reserved(text: &str) -> bool {
    text.contains(RESERVED)
}

/// How the builder treats path segments that cannot round-trip cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SegmentPolicy {
    /// Store every segment as a group name, even empty or reserved ones.
    #[default]
    Permissive,
    /// Reject the path and keep the field ungrouped at the root.
    Strict,
}

/// A group path (or the field it belongs to) that could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// A segment is the empty string (`"/B"`, `"A//B"`, `"A/"`).
    EmptySegment { field: String, path: String },
    /// A segment contains one of `{ } [ ] ,`.
    ReservedInSegment { field: String, path: String, segment: String },
    /// The field identifier itself contains one of `{ } [ ] ,`.
    ReservedInIdentifier { field: String },
}

impl PathError {
    /// The field whose annotation produced this error.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::EmptySegment { field, .. }
            | Self::ReservedInSegment { field, .. }
            | Self::ReservedInIdentifier { field } => field,
        }
    }
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySegment { field, path } => {
                write!(f, "field '{field}': group path '{path}' has an empty segment")
            }
            Self::ReservedInSegment {
                field,
                path,
                segment,
            } => write!(
                f,
                "field '{field}': segment '{segment}' of group path '{path}' contains a reserved character"
            ),
            Self::ReservedInIdentifier { field } => {
                write!(f, "field '{field}' contains a reserved character")
            }
        }
    }
}

impl std::error::Error for PathError {}

/// Check a field's path under the strict policy.
///
/// Returns the first problem found; `Ok(())` means every segment and the
/// identifier survive an encode/decode cycle unchanged.
pub fn validate(field: &str, path: &str) -> Result<(), PathError> {
    if has_reserved(field) {
        return Err(PathError::ReservedInIdentifier {
            field: field.to_owned(),
        });
    }
    for segment in split(path) {
        if segment.is_empty() {
            return Err(PathError::EmptySegment {
                field: field.to_owned(),
                path: path.to_owned(),
            });
        }
        if has_reserved(segment) {
            return Err(PathError::ReservedInSegment {
                field: field.to_owned(),
                path: path.to_owned(),
                segment: segment.to_owned(),
            });
        }
    }
    Ok(())
}
