//! Export Options and Configuration
//!
//! This module defines the options used when turning a document into a
//! standalone HTML file.

use crate::config::{PresentationSettings, Settings};
use crate::markdown::syntax::DEFAULT_DARK_THEME;

/// Title used when none is given.
pub const DEFAULT_TITLE: &str = "Exported Document";

/// Configuration options for document export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// Document title (`<title>`); `None` uses [`DEFAULT_TITLE`]
    pub title: Option<String>,

    /// Fonts applied to the document body and code
    pub presentation: PresentationSettings,

    /// Syntect theme providing the page colors and code highlighting
    pub syntax_theme: String,

    /// Whether to include syntax highlighting CSS
    pub include_syntax_css: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            title: None,
            presentation: PresentationSettings::default(),
            syntax_theme: String::from(DEFAULT_DARK_THEME),
            include_syntax_css: true,
        }
    }
}

impl ExportOptions {
    /// Options matching the user's settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            presentation: settings.presentation.clone(),
            syntax_theme: settings.syntax_theme.clone(),
            ..Self::default()
        }
    }

    /// Builder method to set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Builder method to set the syntax theme.
    pub fn with_syntax_theme(mut self, theme: impl Into<String>) -> Self {
        self.syntax_theme = theme.into();
        self
    }

    /// Title to emit.
    pub fn title_or_default(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }
}
