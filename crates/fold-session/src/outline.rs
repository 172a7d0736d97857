//! Plain-text outline renderer.
//!
//! Draws one line per visible row with guide characters per depth level,
//! suitable for logs, snapshots and the command-line harness.
//!
//! # Example
//!
//! ```
//! use fold_session::config::SessionConfig;
//! use fold_session::model::{AnnotationTable, MemoryObject};
//! use fold_session::outline::{OutlineGuides, OutlineRenderer};
//! use fold_session::session::FoldoutSession;
//!
//! let mut object = MemoryObject::new(["name", "hp"]).with_state("[Stats{1,hp}]");
//! let annotations = AnnotationTable::new().with("hp", "Stats");
//! let mut session = FoldoutSession::new(SessionConfig::default());
//! session.enable(&mut object, &annotations).unwrap();
//!
//! let mut outline = OutlineRenderer::new().with_guides(OutlineGuides::Ascii);
//! session.draw(&mut object, &mut outline).unwrap();
//! assert_eq!(outline.lines(), ["name", "[-] Stats", "|   hp"]);
//! ```

use std::collections::HashSet;

use fold_core::Group;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::config::FieldFlags;
use crate::render::Renderer;

/// Guide character styles for outline rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutlineGuides {
    /// ASCII guides: `|`, `[+]`, `[-]`.
    Ascii,
    /// Unicode box-drawing guide and triangle markers (default).
    #[default]
    Unicode,
}

impl OutlineGuides {
    /// Indentation for one depth level.
    #[must_use]
    pub const fn indent(&self) -> &'static str {
        match self {
            Self::Ascii => "|   ",
            Self::Unicode => "\u{2502}   ",
        }
    }

    /// Header marker for an expanded group.
    #[must_use]
    pub const fn expanded(&self) -> &'static str {
        match self {
            Self::Ascii => "[-] ",
            Self::Unicode => "\u{25BE} ",
        }
    }

    /// Header marker for a collapsed group.
    #[must_use]
    pub const fn collapsed(&self) -> &'static str {
        match self {
            Self::Ascii => "[+] ",
            Self::Unicode => "\u{25B8} ",
        }
    }
}

/// Renders the visible rows of a session as text lines.
///
/// Toggles can be scripted with [`click`](Self::click): the next time the
/// named header is drawn, the renderer reports the opposite expansion state,
/// exactly as an interactive foldout would after a click.
#[derive(Debug, Clone, Default)]
pub struct OutlineRenderer {
    guides: OutlineGuides,
    max_width: Option<usize>,
    read_only_tag: Option<String>,
    pending: HashSet<String>,
    lines: Vec<String>,
}

impl OutlineRenderer {
    /// Create a renderer with Unicode guides and no width limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the guide style.
    #[must_use]
    pub fn with_guides(mut self, guides: OutlineGuides) -> Self {
        self.guides = guides;
        self
    }

    /// Truncate lines to `width` display columns.
    #[must_use]
    pub fn with_max_width(mut self, width: usize) -> Self {
        self.max_width = Some(width);
        self
    }

    /// Append `tag` to read-only field rows (e.g. `" (read-only)"`).
    #[must_use]
    pub fn with_read_only_tag(mut self, tag: impl Into<String>) -> Self {
        self.read_only_tag = Some(tag.into());
        self
    }

    /// Queue a click on the header at `path`.
    pub fn click(&mut self, path: impl Into<String>) {
        self.pending.insert(path.into());
    }

    /// Clicks queued but not yet consumed by a draw.
    pub fn pending_clicks(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(String::as_str)
    }

    /// Lines drawn so far.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Take the drawn lines, leaving the renderer empty for the next frame.
    pub fn take_lines(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines)
    }

    /// Drawn lines joined with newlines.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }

    fn push_line(&mut self, depth: usize, marker: &str, label: &str, suffix: &str) {
        let mut line = self.guides.indent().repeat(depth);
        line.push_str(marker);
        line.push_str(label);
        line.push_str(suffix);
        if let Some(max) = self.max_width {
            line = truncate_to_width(&line, max);
        }
        self.lines.push(line);
    }
}

impl Renderer for OutlineRenderer {
    fn field(&mut self, field: &str, depth: usize, flags: FieldFlags) {
        if flags.contains(FieldFlags::HIDDEN) {
            return;
        }
        let tag = match &self.read_only_tag {
            Some(tag) if flags.contains(FieldFlags::READ_ONLY) => tag.clone(),
            _ => String::new(),
        };
        self.push_line(depth, "", field, &tag);
    }

    fn group_header(&mut self, group: &Group, path: &str, depth: usize) -> bool {
        let requested = if self.pending.remove(path) {
            !group.is_expanded()
        } else {
            group.is_expanded()
        };
        let marker = if requested {
            self.guides.expanded()
        } else {
            self.guides.collapsed()
        };
        self.push_line(depth, marker, group.name(), "");
        requested
    }
}

/// Cut `text` to at most `max` display columns on grapheme boundaries.
fn truncate_to_width(text: &str, max: usize) -> String {
    let mut out = String::with_capacity(text.len().min(max * 4));
    let mut width = 0;
    for grapheme in text.graphemes(true) {
        let w = UnicodeWidthStr::width(grapheme);
        if width + w > max {
            break;
        }
        width += w;
        out.push_str(grapheme);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guides_default_is_unicode() {
        assert_eq!(OutlineGuides::default(), OutlineGuides::Unicode);
        assert!(OutlineGuides::Unicode.indent().contains('│'));
        assert!(OutlineGuides::Ascii.collapsed().contains('+'));
    }

    #[test]
    fn field_rows_indent_per_depth() {
        let mut outline = OutlineRenderer::new().with_guides(OutlineGuides::Ascii);
        outline.field("a", 0, FieldFlags::empty());
        outline.field("b", 2, FieldFlags::empty());
        assert_eq!(outline.lines(), ["a", "|   |   b"]);
    }

    #[test]
    fn hidden_fields_are_skipped() {
        let mut outline = OutlineRenderer::new();
        outline.field("folders", 0, FieldFlags::HIDDEN);
        assert!(outline.lines().is_empty());
    }

    #[test]
    fn read_only_tag() {
        let mut outline = OutlineRenderer::new().with_read_only_tag(" (read-only)");
        outline.field("m_Script", 0, FieldFlags::READ_ONLY);
        outline.field("name", 0, FieldFlags::empty());
        assert_eq!(outline.lines(), ["m_Script (read-only)", "name"]);
    }

    #[test]
    fn header_reports_current_state_without_click() {
        let mut outline = OutlineRenderer::new().with_guides(OutlineGuides::Ascii);
        let group = Group::new("Stats").with_expanded(true);
        assert!(outline.group_header(&group, "Stats", 0));
        assert_eq!(outline.lines(), ["[-] Stats"]);
    }

    #[test]
    fn click_is_consumed_once() {
        let mut outline = OutlineRenderer::new().with_guides(OutlineGuides::Ascii);
        let group = Group::new("Stats");
        outline.click("Stats");
        assert!(outline.group_header(&group, "Stats", 1));
        assert!(!outline.group_header(&group, "Stats", 1));
        assert_eq!(outline.lines(), ["|   [-] Stats", "|   [+] Stats"]);
        assert_eq!(outline.pending_clicks().count(), 0);
    }

    #[test]
    fn truncation_respects_wide_graphemes() {
        assert_eq!(truncate_to_width("abcdef", 3), "abc");
        // Each CJK ideograph is two columns wide.
        assert_eq!(truncate_to_width("日本語", 5), "日本");
        assert_eq!(truncate_to_width("e\u{301}x", 1), "e\u{301}");
    }

    #[test]
    fn max_width_applies_to_lines() {
        let mut outline = OutlineRenderer::new()
            .with_guides(OutlineGuides::Ascii)
            .with_max_width(8);
        outline.field("very_long_field", 1, FieldFlags::empty());
        assert_eq!(outline.lines(), ["|   very"]);
    }

    #[test]
    fn take_lines_resets() {
        let mut outline = OutlineRenderer::new();
        outline.field("a", 0, FieldFlags::empty());
        assert_eq!(outline.take_lines(), vec!["a"]);
        assert!(outline.lines().is_empty());
        assert_eq!(outline.to_text(), "");
    }
}
