//! Collaborators the session consumes: the edited object and its annotations.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `ModelError::NoStateField` | write to an object without a state field | returned to caller |
//! | `ModelError::Io` | file-backed object failed to write | returned, in-memory tree unaffected |
//! | `ModelError::Serialization` | object document could not be encoded/decoded | returned |

use std::collections::HashMap;
use std::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Errors raised by an [`ObjectModel`].
#[derive(Debug)]
pub enum ModelError {
    /// I/O failure while reading or committing the object.
    Io(std::io::Error),
    /// The object's serialized form could not be encoded or decoded.
    Serialization(String),
    /// The object declares no persisted-state field to write to.
    NoStateField,
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Io(e) => write!(f, "I/O error: {e}"),
            ModelError::Serialization(msg) => write!(f, "serialization error: {msg}"),
            ModelError::NoStateField => write!(f, "object has no persisted-state field"),
        }
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ModelError::Io(e) => Some(e),
            ModelError::Serialization(_) | ModelError::NoStateField => None,
        }
    }
}

impl From<std::io::Error> for ModelError {
    fn from(e: std::io::Error) -> Self {
        ModelError::Io(e)
    }
}

/// Result type for object model operations.
pub type ModelResult<T> = Result<T, ModelError>;

// ─────────────────────────────────────────────────────────────────────────────
// Traits
// ─────────────────────────────────────────────────────────────────────────────

/// The object being edited.
pub trait ObjectModel {
    /// The live, ordered field enumeration for this redraw.
    fn list_fields(&self) -> Vec<String>;

    /// Current persisted group state.
    ///
    /// `None` means the object declares no state field at all; the session
    /// then lays every field out flat and persists nothing.
    fn read_persisted_text(&self) -> Option<String>;

    /// Commit new persisted group state.
    fn write_persisted_text(&mut self, text: &str) -> ModelResult<()>;
}

/// Source of each field's declared group path.
pub trait AnnotationResolver {
    /// The group path declared for `field`, or `None` if it is ungrouped.
    fn group_path_for(&self, field: &str) -> Option<String>;
}

impl<F> AnnotationResolver for F
where
    F: Fn(&str) -> Option<String>,
{
    fn group_path_for(&self, field: &str) -> Option<String> {
        self(field)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Annotation Table
// ─────────────────────────────────────────────────────────────────────────────

/// Explicit per-field group path table.
///
/// A table may chain to a base table holding annotations of inherited fields.
/// Lookup checks this table first, then each base in turn, so a derived
/// declaration shadows an inherited one.
///
/// ```
/// use fold_session::model::{AnnotationResolver, AnnotationTable};
///
/// let base = AnnotationTable::new().with("hp", "Stats").with("seed", "Advanced");
/// let derived = AnnotationTable::new().with("hp", "Stats/Core").with_base(base);
///
/// assert_eq!(derived.group_path_for("hp").as_deref(), Some("Stats/Core"));
/// assert_eq!(derived.group_path_for("seed").as_deref(), Some("Advanced"));
/// assert_eq!(derived.group_path_for("name"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationTable {
    paths: HashMap<String, String>,
    base: Option<Box<AnnotationTable>>,
}

impl AnnotationTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `field` as belonging to `path`.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, path: impl Into<String>) -> Self {
        self.insert(field, path);
        self
    }

    /// Chain a base table consulted for fields this table does not declare.
    #[must_use]
    pub fn with_base(mut self, base: AnnotationTable) -> Self {
        self.base = Some(Box::new(base));
        self
    }

    /// Declare `field` as belonging to `path`, replacing any previous entry.
    pub fn insert(&mut self, field: impl Into<String>, path: impl Into<String>) {
        self.paths.insert(field.into(), path.into());
    }

    /// Declared path for `field`, searching the base chain.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        let mut table = Some(self);
        while let Some(current) = table {
            if let Some(path) = current.paths.get(field) {
                return Some(path.as_str());
            }
            table = current.base.as_deref();
        }
        None
    }

    /// Number of declarations in this table, excluding bases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether this table (excluding bases) declares nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for AnnotationTable
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (field, path) in iter {
            table.insert(field, path);
        }
        table
    }
}

impl AnnotationResolver for AnnotationTable {
    fn group_path_for(&self, field: &str) -> Option<String> {
        self.get(field).map(str::to_owned)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Object
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory object for tests and ephemeral editing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryObject {
    fields: Vec<String>,
    state: Option<String>,
    writes: usize,
}

impl MemoryObject {
    /// Create an object with the given fields and an empty (`"[]"`) state field.
    #[must_use]
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            state: Some(fold_core::codec::EMPTY_DOCUMENT.to_owned()),
            writes: 0,
        }
    }

    /// Replace the persisted text.
    #[must_use]
    pub fn with_state(mut self, text: impl Into<String>) -> Self {
        self.state = Some(text.into());
        self
    }

    /// Remove the state field, forcing the flat layout.
    #[must_use]
    pub fn without_state(mut self) -> Self {
        self.state = None;
        self
    }

    /// Replace the field list, as if the object's type changed between redraws.
    pub fn set_fields<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
    }

    /// Current persisted text, if the object has a state field.
    #[must_use]
    pub fn persisted_text(&self) -> Option<&str> {
        self.state.as_deref()
    }

    /// Number of committed writes.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl ObjectModel for MemoryObject {
    fn list_fields(&self) -> Vec<String> {
        self.fields.clone()
    }

    fn read_persisted_text(&self) -> Option<String> {
        self.state.clone()
    }

    fn write_persisted_text(&mut self, text: &str) -> ModelResult<()> {
        let state = self.state.as_mut().ok_or(ModelError::NoStateField)?;
        text.clone_into(state);
        self.writes += 1;
        Ok(())
    }
}
