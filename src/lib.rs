//! mdpane - a dual-pane markdown authoring surface
//!
//! The crate is host-independent: it renders markdown to sanitized HTML,
//! keeps an editor pane and a preview pane scrolled together, and manages the
//! resizable split between them. A host (desktop shell, webview, TUI) supplies
//! the panes, the document source and the resize affordance.

pub mod app;
pub mod config;
pub mod error;
pub mod export;
pub mod files;
pub mod markdown;
pub mod preview;
pub mod state;
pub mod subscription;
pub mod ui;

pub use app::{ScrollPane, Surface, SurfaceCommand};
pub use error::{Error, Result};
