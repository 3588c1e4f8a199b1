//! Native file dialog integration using the rfd crate
//!
//! This module provides a [`PathPicker`] that opens native file picker
//! dialogs for opening and saving markdown documents.

use rfd::FileDialog;
use std::path::{Path, PathBuf};

use super::source::PathPicker;
use crate::state::MARKDOWN_EXTENSIONS;

/// Picks paths with the platform's native dialogs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RfdPicker;

impl PathPicker for RfdPicker {
    /// Opens a native file dialog for selecting a markdown file.
    ///
    /// Returns `Some(PathBuf)` if a file was selected, `None` if cancelled.
    fn pick_open(&mut self, initial_dir: Option<&Path>) -> Option<PathBuf> {
        let mut dialog = FileDialog::new()
            .set_title("Open File")
            .add_filter("Markdown Files", MARKDOWN_EXTENSIONS)
            .add_filter("All Files", &["*"]);

        if let Some(dir) = initial_dir {
            dialog = dialog.set_directory(dir);
        }

        dialog.pick_file()
    }

    /// Opens a native save dialog for saving a markdown file.
    ///
    /// Returns `Some(PathBuf)` if a location was selected, `None` if cancelled.
    fn pick_save(&mut self, initial_dir: Option<&Path>, default_name: &str) -> Option<PathBuf> {
        let mut dialog = FileDialog::new()
            .set_title("Save File")
            .add_filter("Markdown Files", &["md"])
            .add_filter("All Files", &["*"])
            .set_file_name(default_name);

        if let Some(dir) = initial_dir {
            dialog = dialog.set_directory(dir);
        }

        dialog.save_file()
    }
}
