//! Markdown rendering module
//!
//! This module turns markdown text into the HTML shown in the preview pane,
//! using the comrak library, a CommonMark + GFM compatible parser.
//!
//! # Features
//! - GitHub Flavored Markdown (tables, strikethrough, autolinks, task lists)
//! - Hard line breaks for single newlines
//! - Sanitized output (GFM tagfilter, unsafe URLs dropped)
//! - Syntax highlighting for code blocks using syntect
//! - Per-line height estimates for line-aware scroll mapping
//!
//! # Example
//! ```ignore
//! use mdpane::markdown::{render_html, Renderer};
//!
//! let html = render_html("# Hello\n\nThis is **bold** text.");
//!
//! let output = Renderer::new().render("```rust\nfn main() {}\n```");
//! assert_eq!(output.code_blocks[0].resolved_language, "rust");
//! ```

pub mod line_map;
pub mod render;
pub mod syntax;

pub use line_map::LineHeightEstimate;
pub use render::{
    render_html, BlockKind, CodeBlock, RenderOptions, RenderedOutput, Renderer, SourceBlock,
    MAX_NESTING_DEPTH, PLACEHOLDER_HTML,
};
pub use syntax::{
    get_highlighter, Highlighted, Highlighter, PlainHighlighter, SyntaxHighlighter, PLAINTEXT,
};
