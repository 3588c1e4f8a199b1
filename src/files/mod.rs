//! File operations module for mdpane
//!
//! This module provides the document source collaborator used by the surface
//! to open and save markdown files, optionally through native system dialogs.

#[cfg(feature = "native-dialogs")]
pub mod dialogs;
mod source;

#[cfg(feature = "native-dialogs")]
pub use dialogs::RfdPicker;
pub use source::{
    DocumentSource, FileDocumentSource, OpenedDocument, PathPicker, UNTITLED_FILE_NAME,
};
