//! Markdown renderer built on comrak
//!
//! Turns a document's raw text into sanitized HTML for the preview pane.
//! Code blocks are routed through a [`Highlighter`] and the top-level block
//! structure is recorded so callers can map source lines to rendered blocks.
//!
//! Rendering is a pure function of the text and the options fixed at
//! construction. It never fails: anything that goes wrong while parsing or
//! formatting produces [`PLACEHOLDER_HTML`] instead.
//!
//! Some comrak passes recurse once per level of block nesting, and a stack
//! overflow cannot be caught like a panic. Blockquote and list nesting is
//! therefore capped at [`MAX_NESTING_DEPTH`]; markers past the cap are escaped
//! and render as literal text.

use comrak::{
    format_html,
    nodes::{AstNode, NodeHtmlBlock, NodeValue},
    parse_document, Arena, Options,
};
use log::{debug, error, warn};
use std::borrow::Cow;
use std::panic::{self, AssertUnwindSafe};

use super::line_map::LineHeightEstimate;
use super::syntax::{escape_html, get_highlighter, Highlighted, Highlighter, SyntaxHighlighter};
use crate::error::{Error, Result};

/// Markup shown instead of the preview when rendering fails.
pub const PLACEHOLDER_HTML: &str = "<p>Error parsing markdown</p>";

/// Deepest blockquote/list nesting handed to the parser.
pub const MAX_NESTING_DEPTH: usize = 128;

// ─────────────────────────────────────────────────────────────────────────────
// Options
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration options for markdown rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Enable GitHub Flavored Markdown tables
    pub tables: bool,
    /// Enable strikethrough syntax (~~text~~)
    pub strikethrough: bool,
    /// Enable autolink URLs and emails
    pub autolink: bool,
    /// Enable task lists (- [ ] and - [x])
    pub tasklist: bool,
    /// Enable footnotes
    pub footnotes: bool,
    /// Render single newlines inside paragraphs as `<br />`
    pub hard_breaks: bool,
    /// Pass block and inline raw HTML through (GFM tagfilter still applies)
    pub raw_html: bool,
    /// Generate GitHub-style heading IDs
    pub header_ids: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            tables: true,
            strikethrough: true,
            autolink: true,
            tasklist: true,
            footnotes: true,
            hard_breaks: true,
            raw_html: true,
            header_ids: Some(String::new()),
        }
    }
}

impl RenderOptions {
    /// Convert to comrak Options.
    fn to_comrak_options(&self) -> Options {
        let mut options = Options::default();

        // Extension options
        options.extension.strikethrough = self.strikethrough;
        options.extension.table = self.tables;
        options.extension.autolink = self.autolink;
        options.extension.tasklist = self.tasklist;
        options.extension.footnotes = self.footnotes;
        options.extension.tagfilter = true;
        options.extension.header_ids = self.header_ids.clone();

        // Render options. Highlighted code blocks are injected as raw HTML
        // blocks, so comrak must always emit them; user-authored raw HTML is
        // neutralized in `sanitize_and_highlight` when `raw_html` is off.
        options.render.hardbreaks = self.hard_breaks;
        options.render.unsafe_ = true;

        options
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Render Output
// ─────────────────────────────────────────────────────────────────────────────

/// A code block extracted during rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Raw code text
    pub code: String,
    /// Language tag from the fence info string, if any
    pub declared_language: Option<String>,
    /// Language actually used; `"plaintext"` when not recognized
    pub resolved_language: String,
    /// First source line of the block (1-indexed)
    pub start_line: usize,
}

/// Kind of a top-level rendered block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Heading (H1-H6)
    Heading,
    /// Regular paragraph
    Paragraph,
    /// Code block (fenced or indented)
    CodeBlock,
    /// List (ordered or unordered)
    List,
    /// Block quote
    BlockQuote,
    /// Table
    Table,
    /// Horizontal rule
    ThematicBreak,
    /// Raw HTML block
    Html,
    /// Other block type
    Other,
}

impl BlockKind {
    fn from_node_value(value: &NodeValue) -> Self {
        match value {
            NodeValue::Heading(_) => BlockKind::Heading,
            NodeValue::Paragraph => BlockKind::Paragraph,
            NodeValue::CodeBlock(_) => BlockKind::CodeBlock,
            NodeValue::List(_) => BlockKind::List,
            NodeValue::BlockQuote => BlockKind::BlockQuote,
            NodeValue::Table(_) => BlockKind::Table,
            NodeValue::ThematicBreak => BlockKind::ThematicBreak,
            NodeValue::HtmlBlock(_) => BlockKind::Html,
            _ => BlockKind::Other,
        }
    }
}

/// Source line range of one top-level block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceBlock {
    /// Start line in source (1-indexed)
    pub start_line: usize,
    /// End line in source (1-indexed)
    pub end_line: usize,
    /// What the block renders as
    pub kind: BlockKind,
}

impl SourceBlock {
    /// Check if a source line falls within this block.
    pub fn contains_line(&self, line: usize) -> bool {
        line >= self.start_line && line <= self.end_line
    }
}

/// Everything produced by one render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedOutput {
    /// Sanitized HTML, safe to place directly into the preview
    pub html: String,
    /// Code blocks in document order
    pub code_blocks: Vec<CodeBlock>,
    /// Top-level blocks in document order
    pub blocks: Vec<SourceBlock>,
    /// Estimated rendered height per source line
    pub line_heights: LineHeightEstimate,
    /// Whether this is the failure placeholder
    pub failed: bool,
}

impl RenderedOutput {
    /// Fixed output used when rendering fails.
    pub fn placeholder() -> Self {
        Self {
            html: PLACEHOLDER_HTML.to_string(),
            code_blocks: Vec::new(),
            blocks: Vec::new(),
            line_heights: LineHeightEstimate::default(),
            failed: true,
        }
    }

    /// Top-level block containing the 1-indexed source `line`.
    pub fn block_at_line(&self, line: usize) -> Option<&SourceBlock> {
        self.blocks.iter().find(|b| b.contains_line(line))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Renderer
// ─────────────────────────────────────────────────────────────────────────────

/// Markdown to HTML renderer with pluggable code highlighting.
#[derive(Debug, Clone)]
pub struct Renderer<H = &'static SyntaxHighlighter> {
    options: RenderOptions,
    highlighter: H,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    /// Renderer with default options and the shared syntect highlighter.
    pub fn new() -> Self {
        Self::with_options(RenderOptions::default())
    }

    /// Renderer with custom options and the shared syntect highlighter.
    pub fn with_options(options: RenderOptions) -> Self {
        Self::with_highlighter(get_highlighter(), options)
    }
}

impl<H: Highlighter> Renderer<H> {
    /// Renderer using a custom highlighter.
    pub fn with_highlighter(highlighter: H, options: RenderOptions) -> Self {
        Self {
            options,
            highlighter,
        }
    }

    /// Options this renderer was built with.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render `text`, falling back to the placeholder on any failure.
    pub fn render(&self, text: &str) -> RenderedOutput {
        match panic::catch_unwind(AssertUnwindSafe(|| self.try_render(text))) {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                error!("Error parsing markdown: {}", e);
                RenderedOutput::placeholder()
            }
            Err(_) => {
                error!("Error parsing markdown: renderer panicked");
                RenderedOutput::placeholder()
            }
        }
    }

    /// Render `text` and return only the HTML.
    pub fn render_html(&self, text: &str) -> String {
        self.render(text).html
    }

    /// Render without the failure guard.
    fn try_render(&self, text: &str) -> Result<RenderedOutput> {
        let arena = Arena::new();
        let comrak_options = self.options.to_comrak_options();
        let limited = limit_nesting(text);
        let root = parse_document(&arena, &limited, &comrak_options);

        let blocks = collect_blocks(root);
        let code_blocks = self.sanitize_and_highlight(root);

        let mut buffer = Vec::with_capacity(text.len() * 2);
        format_html(root, &comrak_options, &mut buffer)
            .map_err(|e| Error::Render(format!("formatter failed: {}", e)))?;
        let html = String::from_utf8(buffer)
            .map_err(|e| Error::Render(format!("formatter produced invalid UTF-8: {}", e)))?;

        debug!(
            "Rendered {} bytes of markdown into {} bytes of HTML ({} code blocks)",
            text.len(),
            html.len(),
            code_blocks.len()
        );

        Ok(RenderedOutput {
            html,
            code_blocks,
            blocks,
            line_heights: LineHeightEstimate::from_text(text),
            failed: false,
        })
    }

    /// Rewrite the AST in place: highlight code blocks, drop unsafe URLs,
    /// and escape raw HTML when it is disabled.
    fn sanitize_and_highlight<'a>(&self, root: &'a AstNode<'a>) -> Vec<CodeBlock> {
        let mut code_blocks = Vec::new();

        for node in root.descendants() {
            let mut ast = node.data.borrow_mut();
            let start_line = ast.sourcepos.start.line;

            let replacement = match &mut ast.value {
                NodeValue::CodeBlock(block) => {
                    let declared = language_tag(&block.info);
                    let highlighted = self.highlighter.highlight(&block.literal, declared);
                    let literal = wrap_code_block(&highlighted);
                    code_blocks.push(CodeBlock {
                        code: block.literal.clone(),
                        declared_language: declared.map(str::to_string),
                        resolved_language: highlighted.resolved_language,
                        start_line,
                    });
                    Some(NodeValue::HtmlBlock(NodeHtmlBlock {
                        block_type: 0,
                        literal,
                    }))
                }
                NodeValue::HtmlBlock(html) if !self.options.raw_html => {
                    Some(NodeValue::HtmlBlock(NodeHtmlBlock {
                        block_type: html.block_type,
                        literal: format!("<p>{}</p>\n", escape_html(html.literal.trim_end())),
                    }))
                }
                NodeValue::HtmlInline(raw) if !self.options.raw_html => {
                    Some(NodeValue::Text(raw.clone()))
                }
                NodeValue::Link(link) | NodeValue::Image(link) => {
                    if is_dangerous_url(&link.url) {
                        debug!("Dropping unsafe URL on line {}", start_line);
                        link.url.clear();
                    }
                    None
                }
                _ => None,
            };

            if let Some(value) = replacement {
                ast.value = value;
            }
        }

        code_blocks
    }
}

/// Render `text` with the default renderer and return only the HTML.
pub fn render_html(text: &str) -> String {
    Renderer::new().render_html(text)
}

// ─────────────────────────────────────────────────────────────────────────────
// Internal Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Record the source span of every top-level block.
fn collect_blocks<'a>(root: &'a AstNode<'a>) -> Vec<SourceBlock> {
    root.children()
        .map(|child| {
            let ast = child.data.borrow();
            SourceBlock {
                start_line: ast.sourcepos.start.line,
                end_line: ast.sourcepos.end.line,
                kind: BlockKind::from_node_value(&ast.value),
            }
        })
        .collect()
}

/// Escape container markers nested deeper than [`MAX_NESTING_DEPTH`].
///
/// Lines inside top-level fenced code blocks are left alone. Escaping only
/// inserts a backslash, so line numbers are unchanged.
fn limit_nesting(text: &str) -> Cow<'_, str> {
    if !text.lines().any(|line| excess_marker_at(line).is_some()) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 16);
    let mut in_fence = false;
    let mut escaped = 0usize;
    for line in text.split_inclusive('\n') {
        if is_fence_delimiter(line) {
            in_fence = !in_fence;
        }
        match excess_marker_at(line).filter(|_| !in_fence) {
            Some(at) => {
                out.push_str(&line[..at]);
                out.push('\\');
                out.push_str(&line[at..]);
                escaped += 1;
            }
            None => out.push_str(line),
        }
    }

    if escaped > 0 {
        warn!(
            "Nesting deeper than {} levels on {} line(s) rendered as text",
            MAX_NESTING_DEPTH, escaped
        );
    }
    Cow::Owned(out)
}

/// Byte offset to escape in the first container marker past the depth cap.
///
/// Markers are `>` and list bullets (`-`, `*`, `+`, `1.`, `1)`) followed by
/// whitespace. For ordered markers the delimiter is escaped, since a
/// backslash before a digit is literal.
fn excess_marker_at(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut i = 0;
    let mut depth = 0;
    loop {
        while matches!(bytes.get(i), Some(b' ' | b'\t')) {
            i += 1;
        }
        let escape_at = match *bytes.get(i)? {
            b'>' => i,
            b'-' | b'*' | b'+' if matches!(bytes.get(i + 1), Some(b' ' | b'\t')) => i,
            b'0'..=b'9' => {
                let digits = bytes[i..]
                    .iter()
                    .take(9)
                    .take_while(|b| b.is_ascii_digit())
                    .count();
                let delimiter = i + digits;
                if !matches!(bytes.get(delimiter), Some(b'.' | b')'))
                    || !matches!(bytes.get(delimiter + 1), Some(b' ' | b'\t'))
                {
                    return None;
                }
                delimiter
            }
            _ => return None,
        };
        depth += 1;
        if depth > MAX_NESTING_DEPTH {
            return Some(escape_at);
        }
        i = escape_at + 1;
    }
}

/// Whether `line` opens or closes a top-level fenced code block.
fn is_fence_delimiter(line: &str) -> bool {
    let trimmed = line.trim_start_matches(' ');
    line.len() - trimmed.len() <= 3 && (trimmed.starts_with("```") || trimmed.starts_with("~~~"))
}

/// First word of a fence info string (```` ```rust ignore ```` → `rust`).
fn language_tag(info: &str) -> Option<&str> {
    info.split_whitespace().next()
}

/// Wrap highlighted markup so styling can target the resolved language.
fn wrap_code_block(highlighted: &Highlighted) -> String {
    let lang = escape_html(&highlighted.resolved_language);
    format!(
        "<pre class=\"code-block\" data-lang=\"{lang}\"><code class=\"language-{lang}\">{}</code></pre>\n",
        highlighted.markup
    )
}

/// URL schemes that can execute script when clicked or loaded.
///
/// Mirrors the GFM reference renderer: `javascript:`, `vbscript:` and
/// `file:` are rejected, `data:` only for image payloads.
fn is_dangerous_url(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("vbscript:")
        || lower.starts_with("file:")
    {
        return true;
    }
    if let Some(rest) = lower.strip_prefix("data:") {
        return !["image/png", "image/gif", "image/jpeg", "image/webp"]
            .iter()
            .any(|allowed| rest.starts_with(allowed));
    }
    false
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
