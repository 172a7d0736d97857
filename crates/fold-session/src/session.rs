//! The foldout session: one enable/redraw lifecycle over an edited object.
//!
//! Every cycle starts from the object's freshly read persisted text, never
//! from a cached tree, so fields added or removed by other code between
//! redraws are picked up immediately:
//!
//! ```text
//! read_persisted_text ─► decode ─► old tree ─┐
//! list_fields + annotations ─► build ─► new ─┴─► reconcile ─► layout
//! layout ─► draw ─► toggles ─► encode ─► write_persisted_text
//! ```
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Corrupt persisted text | `decode` fails | Warn, rebuild with everything collapsed |
//! | Rejected group path | `Strict` policy | Warn, field drawn at the root |
//! | No state field | `read_persisted_text` returns `None` | Flat layout, nothing persisted |
//! | Write failure | `write_persisted_text` errors | `SessionError::Model`, layout kept |
//!
//! None of these reach the renderer as a failure.

use std::fmt;

use fold_core::path;
use fold_core::reconcile::reconcile_with_stats;
use fold_core::{Entry, GroupTree, PathError, ReconcileStats, decode, encode};

use crate::config::{FieldFlags, SessionConfig};
use crate::model::{AnnotationResolver, ModelError, ObjectModel};
use crate::render::Renderer;

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Errors returned by [`FoldoutSession`] operations.
#[derive(Debug)]
pub enum SessionError {
    /// No group exists at the given path.
    UnknownGroup(String),
    /// The object has no state field, so there are no groups to toggle.
    FlatLayout,
    /// The object refused the write.
    Model(ModelError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::UnknownGroup(path) => write!(f, "no group at path {path:?}"),
            SessionError::FlatLayout => write!(f, "session is in flat layout"),
            SessionError::Model(e) => write!(f, "object model error: {e}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Model(e) => Some(e),
            SessionError::UnknownGroup(_) | SessionError::FlatLayout => None,
        }
    }
}

impl From<ModelError> for SessionError {
    fn from(e: ModelError) -> Self {
        SessionError::Model(e)
    }
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

// ─────────────────────────────────────────────────────────────────────────────
// Layout and Reports
// ─────────────────────────────────────────────────────────────────────────────

/// What the last refresh produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    /// Fields arranged into foldout groups.
    Grouped(GroupTree),
    /// Every visible field at depth 0; the object has no state field.
    Flat(Vec<String>),
}

impl Default for Layout {
    fn default() -> Self {
        Layout::Flat(Vec::new())
    }
}

/// Summary of one refresh (and, for [`FoldoutSession::redraw`], one draw).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Whether the grouped layout was used.
    pub grouped: bool,
    /// The persisted text was corrupt and was discarded.
    pub recovered_from_corruption: bool,
    /// Outcome of carrying expansion flags over.
    pub stats: ReconcileStats,
    /// Paths rejected by the segment policy.
    pub rejected: Vec<PathError>,
    /// `enable` rewrote the canonical encoding.
    pub wrote_back: bool,
    /// Headers toggled during the draw.
    pub toggled: usize,
}

// ─────────────────────────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────────────────────────

/// Drives the decode, build, reconcile, draw and persist cycle.
#[derive(Debug, Clone, Default)]
pub struct FoldoutSession {
    config: SessionConfig,
    layout: Layout,
}

impl FoldoutSession {
    /// Create a session. Nothing is laid out until [`enable`](Self::enable)
    /// or [`refresh`](Self::refresh) runs.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            layout: Layout::default(),
        }
    }

    /// The session configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The layout produced by the last refresh.
    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// The reconciled tree, if the layout is grouped.
    #[must_use]
    pub fn tree(&self) -> Option<&GroupTree> {
        match &self.layout {
            Layout::Grouped(tree) => Some(tree),
            Layout::Flat(_) => None,
        }
    }

    /// Rebuild the layout from the object's current fields and persisted text.
    ///
    /// Never fails: corrupt text and rejected paths degrade to defaults and
    /// are reported in the returned [`CycleReport`].
    pub fn refresh<M, A>(&mut self, model: &M, annotations: &A) -> CycleReport
    where
        M: ObjectModel + ?Sized,
        A: AnnotationResolver + ?Sized,
    {
        let _span = tracing::debug_span!("foldout_refresh").entered();

        let fields: Vec<String> = model
            .list_fields()
            .into_iter()
            .filter(|field| !self.config.flags_for(field).contains(FieldFlags::HIDDEN))
            .collect();

        let Some(text) = model.read_persisted_text() else {
            tracing::debug!(fields = fields.len(), "no state field, using flat layout");
            self.layout = Layout::Flat(fields);
            return CycleReport::default();
        };

        let (old, recovered_from_corruption) = match decode(&text) {
            Ok(tree) => (tree, false),
            Err(e) => {
                tracing::warn!(error = %e, "discarding corrupt persisted group state");
                (GroupTree::new(), true)
            }
        };

        let paths: Vec<Option<String>> = fields
            .iter()
            .map(|field| annotations.group_path_for(field))
            .collect();
        let (built, rejected) = self.config.tree_builder().build_checked(
            fields
                .iter()
                .map(String::as_str)
                .zip(paths.iter().map(Option::as_deref)),
        );
        for e in &rejected {
            tracing::warn!(error = %e, "group path rejected, field drawn at the root");
        }

        let (tree, stats) = reconcile_with_stats(&old, built);
        tracing::debug!(
            fields = fields.len(),
            groups = tree.group_count(),
            matched = stats.matched,
            fresh = stats.fresh,
            stale = stats.stale,
            "foldout layout rebuilt"
        );
        self.layout = Layout::Grouped(tree);

        CycleReport {
            grouped: true,
            recovered_from_corruption,
            stats,
            rejected,
            ..CycleReport::default()
        }
    }

    /// Start an edit session: refresh, then (if configured) write the
    /// canonical encoding back when it differs from the stored text.
    pub fn enable<M, A>(&mut self, model: &mut M, annotations: &A) -> SessionResult<CycleReport>
    where
        M: ObjectModel + ?Sized,
        A: AnnotationResolver + ?Sized,
    {
        let mut report = self.refresh(&*model, annotations);
        if self.config.write_back_on_enable
            && let Layout::Grouped(tree) = &self.layout
        {
            let canonical = encode(tree);
            if model.read_persisted_text().as_deref() != Some(canonical.as_str()) {
                write(model, &canonical)?;
                report.wrote_back = true;
            }
        }
        Ok(report)
    }

    /// Set the expansion flag of the group at `path` and persist the tree.
    ///
    /// Returns `Ok(false)` without writing when the flag already had that value.
    pub fn set_expanded<M>(
        &mut self,
        path: &str,
        expanded: bool,
        model: &mut M,
    ) -> SessionResult<bool>
    where
        M: ObjectModel + ?Sized,
    {
        let Layout::Grouped(tree) = &mut self.layout else {
            return Err(SessionError::FlatLayout);
        };
        let Some(group) = tree.group(path) else {
            return Err(SessionError::UnknownGroup(path.to_owned()));
        };
        if group.is_expanded() == expanded {
            return Ok(false);
        }
        tree.set_expanded(path, expanded);
        write(model, &encode(tree))?;
        Ok(true)
    }

    /// Flip the group at `path` and persist. Returns the new flag.
    pub fn toggle<M>(&mut self, path: &str, model: &mut M) -> SessionResult<bool>
    where
        M: ObjectModel + ?Sized,
    {
        let current = self
            .tree()
            .ok_or(SessionError::FlatLayout)?
            .group(path)
            .ok_or_else(|| SessionError::UnknownGroup(path.to_owned()))?
            .is_expanded();
        self.set_expanded(path, !current, model)?;
        Ok(!current)
    }

    /// Write the current tree's encoding unconditionally.
    pub fn persist<M>(&self, model: &mut M) -> SessionResult<()>
    where
        M: ObjectModel + ?Sized,
    {
        let tree = self.tree().ok_or(SessionError::FlatLayout)?;
        write(model, &encode(tree))
    }

    /// Walk the layout through `renderer`.
    ///
    /// Header toggles are collected during the walk and applied afterwards,
    /// followed by a single write. Returns the number of toggled headers.
    pub fn draw<M, R>(&mut self, model: &mut M, renderer: &mut R) -> SessionResult<usize>
    where
        M: ObjectModel + ?Sized,
        R: Renderer + ?Sized,
    {
        let _span = tracing::debug_span!("foldout_draw").entered();

        let tree = match &mut self.layout {
            Layout::Flat(fields) => {
                for field in fields.iter() {
                    renderer.field(field, 0, self.config.flags_for(field));
                }
                return Ok(0);
            }
            Layout::Grouped(tree) => tree,
        };

        let mut toggles = Vec::new();
        draw_level(tree.entries(), None, 0, &self.config, renderer, &mut toggles);
        if toggles.is_empty() {
            return Ok(0);
        }

        for (path, expanded) in &toggles {
            tree.set_expanded(path, *expanded);
        }
        tracing::debug!(toggled = toggles.len(), "persisting header toggles");
        write(model, &encode(tree))?;
        Ok(toggles.len())
    }

    /// One full redraw: refresh from the object, then draw.
    pub fn redraw<M, A, R>(
        &mut self,
        model: &mut M,
        annotations: &A,
        renderer: &mut R,
    ) -> SessionResult<CycleReport>
    where
        M: ObjectModel + ?Sized,
        A: AnnotationResolver + ?Sized,
        R: Renderer + ?Sized,
    {
        let mut report = self.refresh(&*model, annotations);
        report.toggled = self.draw(model, renderer)?;
        Ok(report)
    }
}

fn write<M: ObjectModel + ?Sized>(model: &mut M, text: &str) -> SessionResult<()> {
    model.write_persisted_text(text).map_err(|e| {
        tracing::warn!(error = %e, "failed to persist group state");
        SessionError::Model(e)
    })
}

fn draw_level<R: Renderer + ?Sized>(
    entries: &[Entry],
    parent: Option<&str>,
    depth: usize,
    config: &SessionConfig,
    renderer: &mut R,
    toggles: &mut Vec<(String, bool)>,
) {
    for entry in entries {
        match entry {
            Entry::Leaf(field) => renderer.field(field, depth, config.flags_for(field)),
            Entry::Group(group) => {
                let path = path::join(parent, group.name());
                let requested = renderer.group_header(group, &path, depth);
                if requested != group.is_expanded() {
                    toggles.push((path.clone(), requested));
                }
                if requested {
                    draw_level(group.children(), Some(&path), depth + 1, config, renderer, toggles);
                }
                renderer.group_end(&path, depth);
            }
        }
    }
}
