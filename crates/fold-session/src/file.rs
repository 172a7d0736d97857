//! File-backed object model.
//!
//! An object document is stored as JSON and rewritten whole on every commit.
//!
//! # File Format
//!
//! ```json
//! {
//!   "fields": [
//!     { "name": "m_Script" },
//!     { "name": "health", "group": "Stats" },
//!     { "name": "attack", "group": "Stats/Combat" }
//!   ],
//!   "state": "[Stats{1,Combat{0,attack},health}]"
//! }
//! ```
//!
//! Omitting `state` declares an object without a persisted-state field, which
//! the session lays out flat.
//!
//! # Atomic Writes
//!
//! Commits write `{path}.tmp`, flush and sync it, then rename it over
//! `{path}`. A failed commit leaves both the file and the in-memory document
//! unchanged.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::{AnnotationTable, ModelError, ModelResult, ObjectModel};

/// One declared field of an object document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    /// Field identifier.
    pub name: String,
    /// Declared group path, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl FieldDecl {
    /// A field with no group.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: None,
        }
    }

    /// Set the declared group path.
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// The serialized form of an edited object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectDocument {
    /// Fields in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    /// Persisted group state; `None` when the object has no state field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl ObjectDocument {
    /// The document's group declarations as an annotation table.
    #[must_use]
    pub fn annotations(&self) -> AnnotationTable {
        self.fields
            .iter()
            .filter_map(|field| Some((field.name.as_str(), field.group.as_deref()?)))
            .collect()
    }
}

/// An object document stored as JSON on disk.
#[derive(Debug, Clone)]
pub struct FileObject {
    path: PathBuf,
    document: ObjectDocument,
}

impl FileObject {
    /// Load the document at `path`.
    pub fn open(path: impl AsRef<Path>) -> ModelResult<Self> {
        let path = path.as_ref().to_path_buf();
        let document = read_document(&path)?;
        tracing::debug!(
            path = %path.display(),
            fields = document.fields.len(),
            has_state = document.state.is_some(),
            "loaded object document"
        );
        Ok(Self { path, document })
    }

    /// Write `document` to `path`, creating parent directories, and open it.
    pub fn create(path: impl AsRef<Path>, document: ObjectDocument) -> ModelResult<Self> {
        let object = Self {
            path: path.as_ref().to_path_buf(),
            document,
        };
        object.save(&object.document)?;
        Ok(object)
    }

    /// Location of the document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The in-memory document.
    #[must_use]
    pub fn document(&self) -> &ObjectDocument {
        &self.document
    }

    /// Group declarations of the loaded document.
    #[must_use]
    pub fn annotations(&self) -> AnnotationTable {
        self.document.annotations()
    }

    /// Re-read the document from disk, picking up edits made by other code.
    pub fn reload(&mut self) -> ModelResult<()> {
        self.document = read_document(&self.path)?;
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone();
        tmp.set_extension("json.tmp");
        tmp
    }

    fn save(&self, document: &ObjectDocument) -> ModelResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.temp_path();
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, document).map_err(|e| {
                ModelError::Serialization(format!("failed to serialize object: {e}"))
            })?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        tracing::debug!(path = %self.path.display(), "saved object document");
        Ok(())
    }
}

fn read_document(path: &Path) -> ModelResult<ObjectDocument> {
    let reader = BufReader::new(File::open(path)?);
    serde_json::from_reader(reader)
        .map_err(|e| ModelError::Serialization(format!("failed to parse object document: {e}")))
}

impl ObjectModel for FileObject {
    fn list_fields(&self) -> Vec<String> {
        self.document
            .fields
            .iter()
            .map(|field| field.name.clone())
            .collect()
    }

    fn read_persisted_text(&self) -> Option<String> {
        self.document.state.clone()
    }

    fn write_persisted_text(&mut self, text: &str) -> ModelResult<()> {
        if self.document.state.is_none() {
            return Err(ModelError::NoStateField);
        }
        let mut next = self.document.clone();
        next.state = Some(text.to_owned());
        self.save(&next)?;
        self.document = next;
        Ok(())
    }
}
