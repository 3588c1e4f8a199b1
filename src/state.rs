//! Document state for mdpane
//!
//! A [`Document`] is the raw markdown text at one point in time. The surface
//! replaces it wholesale on every edit, so each render sees one consistent
//! snapshot.

use std::path::Path;

// ─────────────────────────────────────────────────────────────────────────────
// File Type Detection
// ─────────────────────────────────────────────────────────────────────────────

/// Extensions treated as markdown by open/save dialogs.
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "mdown", "mkd", "mkdn"];

/// Check whether `path` has a markdown extension.
pub fn is_markdown_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            MARKDOWN_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

// ─────────────────────────────────────────────────────────────────────────────
// Document
// ─────────────────────────────────────────────────────────────────────────────

/// Immutable snapshot of the document text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    text: String,
}

impl Document {
    /// Create a document from raw text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Raw markdown text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Check if the document has no text at all.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of `\n`-delimited lines. Empty text still has one line.
    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }

    /// 1-based line containing the caret at `byte_offset`.
    ///
    /// Offsets past the end are clamped to the last line.
    pub fn line_at(&self, byte_offset: usize) -> usize {
        let end = byte_offset.min(self.text.len());
        self.text.as_bytes()[..end]
            .iter()
            .filter(|&&b| b == b'\n')
            .count()
            + 1
    }

    /// Consume the document, returning its text.
    pub fn into_text(self) -> String {
        self.text
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_line_count() {
        assert_eq!(Document::new("").line_count(), 1);
        assert_eq!(Document::new("one").line_count(), 1);
        assert_eq!(Document::new("one\ntwo").line_count(), 2);
        assert_eq!(Document::new("one\ntwo\n").line_count(), 3);
    }

    #[test]
    fn test_line_at() {
        let doc = Document::new("ab\ncd\nef");
        assert_eq!(doc.line_at(0), 1);
        assert_eq!(doc.line_at(2), 1);
        assert_eq!(doc.line_at(3), 2);
        assert_eq!(doc.line_at(7), 3);
        assert_eq!(doc.line_at(1000), 3);
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::default();
        assert!(doc.is_empty());
        assert_eq!(doc.text(), "");
        assert_eq!(doc.line_at(5), 1);
    }

    #[test]
    fn test_is_markdown_path() {
        assert!(is_markdown_path(&PathBuf::from("notes.md")));
        assert!(is_markdown_path(&PathBuf::from("README.MARKDOWN")));
        assert!(!is_markdown_path(&PathBuf::from("main.rs")));
        assert!(!is_markdown_path(&PathBuf::from("no_extension")));
    }
}
