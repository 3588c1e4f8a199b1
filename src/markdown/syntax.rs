//! Syntax Highlighting Module
//!
//! This module integrates syntect for code block syntax highlighting in the
//! rendered preview.
//!
//! # Features
//! - Loads and caches syntect SyntaxSet and ThemeSet
//! - Resolves fence language tags through an alias table
//! - Emits class-based HTML spans so output does not depend on the theme
//! - Generates the matching stylesheet for any bundled syntect theme
//! - Falls back to escaped plain text for unknown languages
//!
//! # Example
//! ```ignore
//! use mdpane::markdown::syntax::{get_highlighter, Highlighter};
//!
//! let highlighted = get_highlighter().highlight("fn main() {}", Some("rust"));
//! assert_eq!(highlighted.resolved_language, "rust");
//! ```

use log::{debug, warn};
use std::sync::OnceLock;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{css_for_theme_with_class_style, ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Resolved language for code that is not highlighted.
pub const PLAINTEXT: &str = "plaintext";

/// Default dark theme name from syntect's built-in themes
pub const DEFAULT_DARK_THEME: &str = "base16-ocean.dark";

/// Default light theme name from syntect's built-in themes
pub const DEFAULT_LIGHT_THEME: &str = "InspiredGitHub";

/// Fallback theme if the specified theme is not found
pub const FALLBACK_THEME: &str = "InspiredGitHub";

/// Prefix applied to every generated scope class (`hl-keyword`, `hl-string`, ...).
const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

// ─────────────────────────────────────────────────────────────────────────────
// Highlighter Adapter
// ─────────────────────────────────────────────────────────────────────────────

/// Result of highlighting a single code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlighted {
    /// HTML markup for the code body (no surrounding `pre`/`code`)
    pub markup: String,
    /// Language the block was highlighted as, or [`PLAINTEXT`]
    pub resolved_language: String,
}

impl Highlighted {
    /// Escaped, unstyled markup for code in an unknown language.
    pub fn plaintext(code: &str) -> Self {
        Self {
            markup: escape_html(code),
            resolved_language: PLAINTEXT.to_string(),
        }
    }

    /// Whether the block fell back to plain text.
    pub fn is_plaintext(&self) -> bool {
        self.resolved_language == PLAINTEXT
    }
}

/// Capability used by the renderer to turn a code block into markup.
///
/// Implementations must never panic or fail: anything they cannot highlight
/// resolves to [`PLAINTEXT`].
pub trait Highlighter: Send + Sync {
    /// Highlight `code` declared with `language_tag`.
    fn highlight(&self, code: &str, language_tag: Option<&str>) -> Highlighted;
}

impl<H: Highlighter + ?Sized> Highlighter for &H {
    fn highlight(&self, code: &str, language_tag: Option<&str>) -> Highlighted {
        (**self).highlight(code, language_tag)
    }
}

/// Highlighter that never styles anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainHighlighter;

impl Highlighter for PlainHighlighter {
    fn highlight(&self, code: &str, _language_tag: Option<&str>) -> Highlighted {
        Highlighted::plaintext(code)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Syntax Highlighter
// ─────────────────────────────────────────────────────────────────────────────

/// Syntax highlighter that caches syntect sets for performance.
///
/// This struct holds the loaded SyntaxSet and ThemeSet, which are expensive
/// to load and should be reused across highlighting operations.
pub struct SyntaxHighlighter {
    /// Loaded syntax definitions
    syntax_set: SyntaxSet,
    /// Loaded color themes
    theme_set: ThemeSet,
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SyntaxHighlighter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntaxHighlighter")
            .field("syntaxes", &self.syntax_set.syntaxes().len())
            .field("themes", &self.theme_set.themes.len())
            .finish()
    }
}

impl SyntaxHighlighter {
    /// Create a new syntax highlighter with default syntax and theme sets.
    ///
    /// This loads the default syntaxes and themes bundled with syntect.
    /// The operation is relatively expensive, so the highlighter should be
    /// cached and reused.
    pub fn new() -> Self {
        debug!("Loading syntect syntax and theme sets");
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let theme_set = ThemeSet::load_defaults();
        debug!(
            "Loaded {} syntaxes and {} themes",
            syntax_set.syntaxes().len(),
            theme_set.themes.len()
        );
        Self {
            syntax_set,
            theme_set,
        }
    }

    /// Get available theme names.
    pub fn available_themes(&self) -> Vec<&str> {
        self.theme_set.themes.keys().map(|s| s.as_str()).collect()
    }

    /// Names of every language the highlighter recognizes, sorted.
    pub fn languages(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .syntax_set
            .syntaxes()
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Get a theme by name, falling back to the default if not found.
    pub fn get_theme(&self, name: &str) -> Option<&Theme> {
        self.theme_set
            .themes
            .get(name)
            .or_else(|| self.theme_set.themes.get(FALLBACK_THEME))
    }

    /// Whether `language_tag` maps to a known syntax.
    pub fn is_recognized(&self, language_tag: &str) -> bool {
        self.find_syntax_for_language(language_tag).is_some()
    }

    /// CSS rules for the classes emitted by [`Highlighter::highlight`].
    ///
    /// Unknown theme names use [`FALLBACK_THEME`]. Returns an empty string if
    /// syntect cannot produce CSS for the theme.
    pub fn stylesheet(&self, theme_name: &str) -> String {
        let Some(theme) = self.get_theme(theme_name) else {
            warn!("No syntax theme available for '{}'", theme_name);
            return String::new();
        };

        match css_for_theme_with_class_style(theme, CLASS_STYLE) {
            Ok(css) => css,
            Err(e) => {
                warn!("Failed to generate CSS for theme '{}': {}", theme_name, e);
                String::new()
            }
        }
    }

    /// Find syntax definition for a language identifier.
    ///
    /// Tries multiple strategies:
    /// 1. By extension (e.g., "rs" -> Rust), after alias normalization
    /// 2. By name (e.g., "Rust" -> Rust)
    /// 3. By case-insensitive name
    fn find_syntax_for_language(&self, language: &str) -> Option<&SyntaxReference> {
        let language = language.trim();
        if language.is_empty() {
            return None;
        }

        // Normalize the language identifier
        let lang_lower = language.to_lowercase();

        // Map common language aliases to extensions
        let extension = match lang_lower.as_str() {
            "rust" | "rs" => "rs",
            "python" | "py" => "py",
            "javascript" | "js" => "js",
            "typescript" | "ts" => "ts",
            "c" => "c",
            "cpp" | "c++" | "cxx" => "cpp",
            "csharp" | "c#" | "cs" => "cs",
            "java" => "java",
            "go" | "golang" => "go",
            "ruby" | "rb" => "rb",
            "php" => "php",
            "scala" => "scala",
            "html" | "htm" => "html",
            "css" => "css",
            "json" => "json",
            "yaml" | "yml" => "yaml",
            "xml" => "xml",
            "markdown" | "md" => "md",
            "sql" => "sql",
            "shell" | "sh" | "bash" | "zsh" => "sh",
            "makefile" | "make" => "Makefile",
            "lua" => "lua",
            "perl" | "pl" => "pl",
            "r" => "r",
            "haskell" | "hs" => "hs",
            "erlang" | "erl" => "erl",
            "clojure" | "clj" => "clj",
            "diff" | "patch" => "diff",
            other => other,
        };

        // Try by extension first
        if let Some(syntax) = self.syntax_set.find_syntax_by_extension(extension) {
            return Some(syntax);
        }

        // Try by name
        if let Some(syntax) = self.syntax_set.find_syntax_by_name(language) {
            return Some(syntax);
        }

        // Try case-insensitive name search
        self.syntax_set
            .syntaxes()
            .iter()
            .find(|syntax| syntax.name.to_lowercase() == lang_lower)
    }

    /// Run syntect over every line of `code`.
    fn highlight_with(
        &self,
        code: &str,
        syntax: &SyntaxReference,
    ) -> Result<String, syntect::Error> {
        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntax_set, CLASS_STYLE);
        for line in LinesWithEndings::from(code) {
            generator.parse_html_for_line_which_includes_newline(line)?;
        }
        Ok(generator.finalize())
    }
}

impl Highlighter for SyntaxHighlighter {
    fn highlight(&self, code: &str, language_tag: Option<&str>) -> Highlighted {
        let Some(tag) = language_tag.map(str::trim).filter(|t| !t.is_empty()) else {
            return Highlighted::plaintext(code);
        };

        let Some(syntax) = self.find_syntax_for_language(tag) else {
            debug!("No syntax found for language: {}", tag);
            return Highlighted::plaintext(code);
        };

        match self.highlight_with(code, syntax) {
            Ok(markup) => Highlighted {
                markup,
                resolved_language: tag.to_lowercase(),
            },
            Err(e) => {
                warn!("Failed to highlight {} block: {}", tag, e);
                Highlighted::plaintext(code)
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helper Functions
// ─────────────────────────────────────────────────────────────────────────────

/// HTML-escape a string.
pub fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

// ─────────────────────────────────────────────────────────────────────────────
// Global Highlighter Instance
// ─────────────────────────────────────────────────────────────────────────────

/// Global syntax highlighter instance.
///
/// This is lazily initialized on first access and reused for all highlighting
/// operations. Using a global instance avoids the cost of loading syntax and
/// theme sets multiple times.
static HIGHLIGHTER: OnceLock<SyntaxHighlighter> = OnceLock::new();

/// Get or create the global syntax highlighter.
pub fn get_highlighter() -> &'static SyntaxHighlighter {
    HIGHLIGHTER.get_or_init(SyntaxHighlighter::new)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
