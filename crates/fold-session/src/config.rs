//! Session configuration.
//!
//! ```
//! use fold_session::config::{FieldFlags, SessionConfig};
//!
//! let config = SessionConfig::default().with_read_only(["m_Script", "id"]);
//! assert_eq!(config.flags_for("folders"), FieldFlags::HIDDEN);
//! assert_eq!(config.flags_for("id"), FieldFlags::READ_ONLY);
//! assert!(config.flags_for("health").is_empty());
//! ```

use bitflags::bitflags;
use fold_core::{SegmentPolicy, TreeBuilder};

/// Name of the string field that holds the persisted group state.
pub const DEFAULT_STATE_FIELD: &str = "folders";

/// Fields drawn but never editable.
pub const DEFAULT_READ_ONLY: &[&str] = &["m_Script"];

bitflags! {
    /// How a renderer should present one field row.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FieldFlags: u8 {
        /// Draw the field disabled.
        const READ_ONLY = 0b01;
        /// Do not draw the field at all.
        const HIDDEN    = 0b10;
    }
}

/// Configuration for a [`FoldoutSession`](crate::session::FoldoutSession).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SessionConfig {
    /// Field holding the persisted text. Always hidden from the layout.
    pub state_field: String,
    /// Fields drawn read-only.
    pub read_only: Vec<String>,
    /// Extra fields left out of the layout.
    pub hidden: Vec<String>,
    /// How the builder treats empty or reserved path segments.
    pub segment_policy: SegmentPolicy,
    /// Whether `enable` writes the canonical encoding back immediately.
    pub write_back_on_enable: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            state_field: DEFAULT_STATE_FIELD.to_owned(),
            read_only: DEFAULT_READ_ONLY.iter().map(|s| (*s).to_owned()).collect(),
            hidden: Vec::new(),
            segment_policy: SegmentPolicy::Permissive,
            write_back_on_enable: true,
        }
    }
}

impl SessionConfig {
    /// Set the persisted-state field name.
    #[must_use]
    pub fn with_state_field(mut self, name: impl Into<String>) -> Self {
        self.state_field = name.into();
        self
    }

    /// Replace the read-only field list.
    #[must_use]
    pub fn with_read_only<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.read_only = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the extra hidden field list.
    #[must_use]
    pub fn with_hidden<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hidden = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Set the segment policy.
    #[must_use]
    pub fn with_segment_policy(mut self, policy: SegmentPolicy) -> Self {
        self.segment_policy = policy;
        self
    }

    /// Set whether `enable` writes the canonical encoding back.
    #[must_use]
    pub fn with_write_back_on_enable(mut self, write_back: bool) -> Self {
        self.write_back_on_enable = write_back;
        self
    }

    /// Render flags for `field`.
    #[must_use]
    pub fn flags_for(&self, field: &str) -> FieldFlags {
        let mut flags = FieldFlags::empty();
        if field == self.state_field || self.hidden.iter().any(|f| f == field) {
            flags |= FieldFlags::HIDDEN;
        }
        if self.read_only.iter().any(|f| f == field) {
            flags |= FieldFlags::READ_ONLY;
        }
        flags
    }

    /// A tree builder using this config's segment policy.
    #[must_use]
    pub fn tree_builder(&self) -> TreeBuilder {
        TreeBuilder::new().with_policy(self.segment_policy)
    }
}
