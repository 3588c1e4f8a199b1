//! HTML Export Generation
//!
//! This module generates complete HTML documents from markdown content,
//! with inlined theme CSS for standalone viewing.

use log::info;
use std::path::Path;
use syntect::highlighting::{Color, Theme};

use super::options::ExportOptions;
use crate::config::PresentationSettings;
use crate::error::{Error, Result};
use crate::markdown::syntax::{escape_html, get_highlighter};
use crate::markdown::Renderer;

// ─────────────────────────────────────────────────────────────────────────────
// HTML Generation
// ─────────────────────────────────────────────────────────────────────────────

/// Generate a complete HTML document from markdown content.
///
/// Rendering never fails; a document that cannot be rendered gets the
/// placeholder body.
pub fn generate_html_document(markdown: &str, options: &ExportOptions) -> String {
    let html_body = generate_html_fragment(markdown);
    let theme_css = generate_theme_css(&options.syntax_theme, &options.presentation);

    let syntax_css = if options.include_syntax_css {
        get_highlighter().stylesheet(&options.syntax_theme)
    } else {
        String::new()
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="generator" content="mdpane">
    <title>{title}</title>
    <style>
{base_css}

{theme_css}

{syntax_css}
    </style>
</head>
<body>
    <article class="markdown-body">
{body}
    </article>
</body>
</html>"#,
        title = escape_html(options.title_or_default()),
        base_css = BASE_CSS,
        theme_css = theme_css,
        syntax_css = syntax_css,
        body = html_body,
    )
}

/// Generate an HTML fragment (no doctype, head, etc.).
pub fn generate_html_fragment(markdown: &str) -> String {
    Renderer::new().render_html(markdown)
}

/// Export a markdown file to an HTML file.
///
/// The document title defaults to the source file stem when `options` has none.
pub fn export_to_html_file(
    source_path: &Path,
    output_path: &Path,
    options: &ExportOptions,
) -> Result<()> {
    let markdown = std::fs::read_to_string(source_path).map_err(|e| Error::FileRead {
        path: source_path.to_path_buf(),
        source: e,
    })?;

    let mut options = options.clone();
    if options.title.is_none() {
        options.title = source_path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string);
    }

    let html = generate_html_document(&markdown, &options);

    std::fs::write(output_path, html).map_err(|e| Error::FileWrite {
        path: output_path.to_path_buf(),
        source: e,
    })?;

    info!(
        "Exported {} to {}",
        source_path.display(),
        output_path.display()
    );
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// CSS Generation
// ─────────────────────────────────────────────────────────────────────────────

/// Base CSS for markdown rendering (layout, typography).
const BASE_CSS: &str = r#"
*, *::before, *::after {
    box-sizing: border-box;
}

body {
    margin: 0;
    padding: 0;
    line-height: 1.6;
}

.markdown-body {
    max-width: 900px;
    margin: 0 auto;
    padding: 32px 24px;
}

.markdown-body h1,
.markdown-body h2,
.markdown-body h3,
.markdown-body h4,
.markdown-body h5,
.markdown-body h6 {
    margin-top: 24px;
    margin-bottom: 16px;
    font-weight: 600;
    line-height: 1.25;
}

.markdown-body h1 { font-size: 2em; border-bottom: 1px solid; padding-bottom: 0.3em; }
.markdown-body h2 { font-size: 1.5em; border-bottom: 1px solid; padding-bottom: 0.3em; }
.markdown-body h3 { font-size: 1.25em; }

.markdown-body p,
.markdown-body ul,
.markdown-body ol,
.markdown-body table,
.markdown-body pre {
    margin-top: 0;
    margin-bottom: 16px;
}

.markdown-body ul,
.markdown-body ol {
    padding-left: 2em;
}

.markdown-body blockquote {
    margin: 0 0 16px 0;
    padding: 0 1em;
    border-left: 4px solid;
    opacity: 0.85;
}

.markdown-body code {
    font-size: 0.9em;
    padding: 0.2em 0.4em;
    border-radius: 4px;
}

.markdown-body pre.code-block {
    padding: 16px;
    overflow: auto;
    border-radius: 6px;
    line-height: 1.45;
}

.markdown-body pre.code-block code {
    padding: 0;
    background: transparent;
}

.markdown-body table {
    border-collapse: collapse;
    width: 100%;
}

.markdown-body th,
.markdown-body td {
    padding: 8px 12px;
    border: 1px solid;
}

.markdown-body hr {
    height: 2px;
    margin: 24px 0;
    border: none;
}

.markdown-body img {
    max-width: 100%;
    height: auto;
}
"#;

/// Page colors derived from a syntect theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Palette {
    background: Color,
    foreground: Color,
}

impl Palette {
    const LIGHT: Palette = Palette {
        background: Color { r: 0xff, g: 0xff, b: 0xff, a: 0xff },
        foreground: Color { r: 0x24, g: 0x29, b: 0x2e, a: 0xff },
    };

    fn from_theme(theme: &Theme) -> Self {
        Self {
            background: theme.settings.background.unwrap_or(Self::LIGHT.background),
            foreground: theme.settings.foreground.unwrap_or(Self::LIGHT.foreground),
        }
    }

    /// Perceived brightness of the background below the midpoint.
    fn is_dark(&self) -> bool {
        let Color { r, g, b, .. } = self.background;
        let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
        luma < 128.0
    }
}

/// Generate page CSS from the syntax theme colors and presentation fonts.
fn generate_theme_css(theme_name: &str, presentation: &PresentationSettings) -> String {
    let palette = get_highlighter()
        .get_theme(theme_name)
        .map(Palette::from_theme)
        .unwrap_or(Palette::LIGHT);

    format!(
        r#"
:root {{
    color-scheme: {scheme};
}}

body {{
    background-color: {bg};
    color: {fg};
}}

.markdown-body {{
    {body_font}
}}

.markdown-body code,
.markdown-body pre {{
    {code_font}
}}

.markdown-body pre.code-block,
.markdown-body code {{
    background-color: {code_bg};
}}

.markdown-body a {{
    color: inherit;
    text-decoration: underline;
}}
"#,
        scheme = if palette.is_dark() { "dark" } else { "light" },
        bg = color_to_css(palette.background),
        fg = color_to_css(palette.foreground),
        body_font = presentation.preview_style(),
        code_font = presentation.editor_style(),
        code_bg = if palette.is_dark() {
            "rgba(255, 255, 255, 0.06)"
        } else {
            "rgba(27, 31, 35, 0.05)"
        },
    )
}

/// Convert a syntect color to a CSS color string.
fn color_to_css(color: Color) -> String {
    format!("rgb({}, {}, {})", color.r, color.g, color.b)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::syntax::{DEFAULT_DARK_THEME, DEFAULT_LIGHT_THEME};
    use tempfile::TempDir;

    #[test]
    fn test_generate_html_document() {
        let options = ExportOptions::default().with_title("Test <Doc>");
        let html = generate_html_document("# Test\n\nParagraph text.", &options);

        // Check document structure
        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("<title>Test &lt;Doc&gt;</title>"));
        assert!(html.contains("<article class=\"markdown-body\">"));
        assert!(html.contains("</article>"));

        // Check content
        assert!(html.contains("<h1"));
        assert!(html.contains("Paragraph text."));
    }

    #[test]
    fn test_document_includes_fonts_and_syntax_css() {
        let html = generate_html_document("```rust\nfn main() {}\n```", &ExportOptions::default());
        assert!(html.contains("font-family: \"Georgia\"; font-size: 16px;"));
        assert!(html.contains("font-family: \"Consolas\"; font-size: 14px;"));
        assert!(html.contains(".hl-"));
        assert!(html.contains("data-lang=\"rust\""));
    }

    #[test]
    fn test_document_without_syntax_css() {
        let options = ExportOptions {
            include_syntax_css: false,
            ..ExportOptions::default()
        };
        let html = generate_html_document("text", &options);
        assert!(!html.contains(".hl-"));
    }

    #[test]
    fn test_generate_html_fragment() {
        let html = generate_html_fragment("**Bold** and *italic*");

        // Should be a fragment, not a full document
        assert!(!html.contains("<!DOCTYPE"));
        assert!(html.contains("<strong>"));
        assert!(html.contains("<em>"));
    }

    #[test]
    fn test_color_to_css() {
        let color = Color { r: 255, g: 128, b: 64, a: 255 };
        assert_eq!(color_to_css(color), "rgb(255, 128, 64)");
    }

    #[test]
    fn test_theme_css_light_and_dark() {
        let presentation = PresentationSettings::default();

        let light = generate_theme_css(DEFAULT_LIGHT_THEME, &presentation);
        assert!(light.contains("color-scheme: light"));
        assert!(light.contains("background-color: rgb("));

        let dark = generate_theme_css(DEFAULT_DARK_THEME, &presentation);
        assert!(dark.contains("color-scheme: dark"));
    }

    #[test]
    fn test_export_to_html_file() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("chapter-one.md");
        let output = dir.path().join("chapter-one.html");
        std::fs::write(&source, "# One").unwrap();

        export_to_html_file(&source, &output, &ExportOptions::default()).unwrap();

        let html = std::fs::read_to_string(&output).unwrap();
        assert!(html.contains("<title>chapter-one</title>"));
        assert!(html.contains("One</h1>"));
    }

    #[test]
    fn test_export_missing_source() {
        let dir = TempDir::new().unwrap();
        let err = export_to_html_file(
            &dir.path().join("missing.md"),
            &dir.path().join("out.html"),
            &ExportOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }
}
