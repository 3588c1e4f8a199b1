//! Document Export Module for mdpane
//!
//! This module exports markdown documents as standalone HTML.
//!
//! # Architecture
//!
//! - `options.rs` - Export configuration and options
//! - `html.rs` - HTML document generation with theme styling

pub mod html;
pub mod options;

pub use html::{export_to_html_file, generate_html_document, generate_html_fragment};
pub use options::ExportOptions;
