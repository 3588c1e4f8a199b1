//! Document source collaborator
//!
//! The surface never touches the filesystem directly. It asks a
//! [`DocumentSource`] to open and persist documents; failures come back as
//! `None`/`false` and are logged by the source.

use log::{info, warn};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Default file name offered when saving a document that has no path yet.
pub const UNTITLED_FILE_NAME: &str = "untitled.md";

// ─────────────────────────────────────────────────────────────────────────────
// Collaborator Traits
// ─────────────────────────────────────────────────────────────────────────────

/// A document produced by an open operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedDocument {
    /// Where the document was read from
    pub path: PathBuf,
    /// UTF-8 markdown content
    pub content: String,
}

/// Opens and persists documents on behalf of the surface.
pub trait DocumentSource {
    /// Let the user choose a document and read it. `None` if cancelled or unreadable.
    fn open(&mut self) -> Option<OpenedDocument>;
    /// Write `content` to the current path. `false` if there is none or the write failed.
    fn save(&mut self, content: &str) -> bool;
    /// Let the user choose a path and write `content` there.
    fn save_as(&mut self, content: &str) -> bool;
    /// Path of the document last opened or saved.
    fn current_path(&self) -> Option<PathBuf>;
    /// Adopt `path` as current, for documents opened outside [`open`](Self::open).
    fn set_current_path(&mut self, path: Option<PathBuf>);
}

/// Chooses paths for open and save operations.
pub trait PathPicker {
    /// Choose a file to open.
    fn pick_open(&mut self, initial_dir: Option<&Path>) -> Option<PathBuf>;
    /// Choose where to save, suggesting `default_name`.
    fn pick_save(&mut self, initial_dir: Option<&Path>, default_name: &str) -> Option<PathBuf>;
}

// ─────────────────────────────────────────────────────────────────────────────
// File-backed Source
// ─────────────────────────────────────────────────────────────────────────────

/// [`DocumentSource`] backed by the local filesystem.
#[derive(Debug)]
pub struct FileDocumentSource<P> {
    picker: P,
    current_path: Option<PathBuf>,
}

impl<P: PathPicker> FileDocumentSource<P> {
    /// Create a source with no current document.
    pub fn new(picker: P) -> Self {
        Self {
            picker,
            current_path: None,
        }
    }

    /// Read the document at `path` and make it current.
    pub fn open_path(&mut self, path: &Path) -> Result<OpenedDocument> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.current_path = Some(path.to_path_buf());
        info!("Opened file: {}", path.display());
        Ok(OpenedDocument {
            path: path.to_path_buf(),
            content,
        })
    }

    /// Write `content` to `path` and make it current.
    pub fn write_to(&mut self, path: &Path, content: &str) -> Result<()> {
        std::fs::write(path, content).map_err(|e| Error::FileWrite {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.current_path = Some(path.to_path_buf());
        info!("Saved file: {}", path.display());
        Ok(())
    }

    /// Directory to start dialogs in.
    fn initial_dir(&self) -> Option<PathBuf> {
        self.current_path
            .as_ref()
            .and_then(|p| p.parent())
            .map(Path::to_path_buf)
    }

    /// File name to suggest in the save dialog.
    fn suggested_name(&self) -> String {
        self.current_path
            .as_ref()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or(UNTITLED_FILE_NAME)
            .to_string()
    }
}

impl<P: PathPicker> DocumentSource for FileDocumentSource<P> {
    fn open(&mut self) -> Option<OpenedDocument> {
        let initial_dir = self.initial_dir();
        let path = self.picker.pick_open(initial_dir.as_deref())?;
        match self.open_path(&path) {
            Ok(doc) => Some(doc),
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }

    fn save(&mut self, content: &str) -> bool {
        let Some(path) = self.current_path.clone() else {
            return false;
        };
        match self.write_to(&path, content) {
            Ok(()) => true,
            Err(e) => {
                warn!("{}", e);
                false
            }
        }
    }

    fn save_as(&mut self, content: &str) -> bool {
        let initial_dir = self.initial_dir();
        let name = self.suggested_name();
        let Some(path) = self.picker.pick_save(initial_dir.as_deref(), &name) else {
            return false;
        };
        match self.write_to(&path, content) {
            Ok(()) => true,
            Err(e) => {
                warn!("{}", e);
                false
            }
        }
    }

    fn current_path(&self) -> Option<PathBuf> {
        self.current_path.clone()
    }

    fn set_current_path(&mut self, path: Option<PathBuf>) {
        self.current_path = path;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Picker returning preset answers and recording the suggested name.
    #[derive(Default)]
    struct ScriptedPicker {
        open: Option<PathBuf>,
        save: Option<PathBuf>,
        suggested: Vec<String>,
    }

    impl PathPicker for ScriptedPicker {
        fn pick_open(&mut self, _initial_dir: Option<&Path>) -> Option<PathBuf> {
            self.open.clone()
        }

        fn pick_save(
            &mut self,
            _initial_dir: Option<&Path>,
            default_name: &str,
        ) -> Option<PathBuf> {
            self.suggested.push(default_name.to_string());
            self.save.clone()
        }
    }

    #[test]
    fn test_open_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, "# Notes").unwrap();

        let mut source = FileDocumentSource::new(ScriptedPicker {
            open: Some(path.clone()),
            ..Default::default()
        });
        let doc = source.open().unwrap();
        assert_eq!(doc.content, "# Notes");
        assert_eq!(doc.path, path);
        assert_eq!(source.current_path(), Some(path));
    }

    #[test]
    fn test_open_cancelled() {
        let mut source = FileDocumentSource::new(ScriptedPicker::default());
        assert!(source.open().is_none());
        assert!(source.current_path().is_none());
    }

    #[test]
    fn test_open_missing_file() {
        let dir = TempDir::new().unwrap();
        let mut source = FileDocumentSource::new(ScriptedPicker {
            open: Some(dir.path().join("missing.md")),
            ..Default::default()
        });
        assert!(source.open().is_none());
        assert!(source.current_path().is_none());
    }

    #[test]
    fn test_open_path_error_kind() {
        let dir = TempDir::new().unwrap();
        let mut source = FileDocumentSource::new(ScriptedPicker::default());
        let err = source.open_path(&dir.path().join("missing.md")).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }

    #[test]
    fn test_save_without_path_fails() {
        let mut source = FileDocumentSource::new(ScriptedPicker::default());
        assert!(!source.save("content"));
    }

    #[test]
    fn test_save_as_then_save() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.md");
        let mut source = FileDocumentSource::new(ScriptedPicker {
            save: Some(path.clone()),
            ..Default::default()
        });

        assert!(source.save_as("first"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first");
        assert_eq!(source.current_path(), Some(path.clone()));

        assert!(source.save("second"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn test_save_as_suggests_current_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("draft.md");
        let mut source = FileDocumentSource::new(ScriptedPicker {
            save: Some(path.clone()),
            ..Default::default()
        });

        assert!(source.save_as("x"));
        assert!(source.save_as("y"));
        assert_eq!(source.picker.suggested, vec![UNTITLED_FILE_NAME, "draft.md"]);
    }

    #[test]
    fn test_set_current_path_enables_save() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("adopted.md");
        std::fs::write(&path, "old").unwrap();

        let mut source = FileDocumentSource::new(ScriptedPicker::default());
        source.set_current_path(Some(path.clone()));
        assert!(source.save("new"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
        assert!(source.picker.suggested.is_empty());

        source.set_current_path(None);
        assert!(!source.save("newer"));
    }

    #[test]
    fn test_save_as_cancelled() {
        let mut source = FileDocumentSource::new(ScriptedPicker::default());
        assert!(!source.save_as("x"));
    }

    #[test]
    fn test_save_to_unwritable_path() {
        let dir = TempDir::new().unwrap();
        let mut source = FileDocumentSource::new(ScriptedPicker {
            save: Some(dir.path().join("no/such/dir/out.md")),
            ..Default::default()
        });
        assert!(!source.save_as("x"));
        assert!(source.current_path().is_none());
    }
}
