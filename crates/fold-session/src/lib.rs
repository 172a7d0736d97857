#![forbid(unsafe_code)]

//! Redraw-cycle orchestration for grouped field foldouts.
//!
//! [`FoldoutSession`] connects the pure tree operations of `fold_core` to the
//! three collaborators of an editing host:
//!
//! - an [`ObjectModel`], the edited object with its field list and the one
//!   string field holding persisted group state;
//! - an [`AnnotationResolver`], which declares each field's group path;
//! - a [`Renderer`], which paints rows and reports header clicks.
//!
//! # Example
//!
//! ```
//! use fold_session::{AnnotationTable, FoldoutSession, MemoryObject, OutlineRenderer, SessionConfig};
//!
//! let mut object = MemoryObject::new(["m_Script", "hp", "atk"]);
//! let annotations = AnnotationTable::new().with("hp", "Stats").with("atk", "Stats");
//! let mut session = FoldoutSession::new(SessionConfig::default());
//! session.enable(&mut object, &annotations).unwrap();
//!
//! let mut outline = OutlineRenderer::new();
//! outline.click("Stats");
//! session.draw(&mut object, &mut outline).unwrap();
//! assert_eq!(object.persisted_text(), Some("[Stats{1,hp,atk}]"));
//! ```

pub mod config;
#[cfg(feature = "object-file")]
pub mod file;
pub mod model;
pub mod outline;
pub mod render;
pub mod session;

pub use config::{FieldFlags, SessionConfig};
#[cfg(feature = "object-file")]
pub use file::{FieldDecl, FileObject, ObjectDocument};
pub use model::{
    AnnotationResolver, AnnotationTable, MemoryObject, ModelError, ModelResult, ObjectModel,
};
pub use outline::{OutlineGuides, OutlineRenderer};
pub use render::Renderer;
pub use session::{CycleReport, FoldoutSession, Layout, SessionError, SessionResult};
