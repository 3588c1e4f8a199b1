//! User settings and preferences for mdpane
//!
//! This module defines the `Settings` struct that holds all user-configurable
//! options, with serde support for JSON persistence.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::markdown::syntax::DEFAULT_DARK_THEME;
use crate::ui::SplitRatio;

/// Font families offered in the settings UI, available on most systems.
pub const COMMON_FONTS: &[&str] = &[
    "Arial",
    "Calibri",
    "Cambria",
    "Comic Sans MS",
    "Consolas",
    "Courier New",
    "Georgia",
    "Helvetica",
    "Impact",
    "Lucida Console",
    "Palatino Linotype",
    "Segoe UI",
    "Tahoma",
    "Times New Roman",
    "Trebuchet MS",
    "Verdana",
    "San Francisco",
    "Menlo",
    "Monaco",
    "Avenir",
    "Helvetica Neue",
];

// ─────────────────────────────────────────────────────────────────────────────
// View Mode Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Surface view modes.
///
/// Two modes are available:
/// - `Preview`: Read-only, full-width rendered preview
/// - `Edit`: Split editor with the live preview beside it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Rendered preview only
    #[default]
    Preview,
    /// Source editor and preview side by side
    Edit,
}

impl ViewMode {
    /// Toggle between Preview and Edit modes.
    pub fn toggle(&self) -> Self {
        match self {
            ViewMode::Preview => ViewMode::Edit,
            ViewMode::Edit => ViewMode::Preview,
        }
    }

    /// Get a display label for the mode.
    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Preview => "Preview",
            ViewMode::Edit => "Edit",
        }
    }

    /// Whether the source editor is visible.
    pub fn shows_source(&self) -> bool {
        matches!(self, ViewMode::Edit)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Presentation Settings
// ─────────────────────────────────────────────────────────────────────────────

/// Fonts used by the two panes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationSettings {
    /// Font family for the rendered preview
    pub preview_font_family: String,
    /// Font size for the rendered preview (in pixels)
    pub preview_font_size: f32,
    /// Font family for the source editor
    pub editor_font_family: String,
    /// Font size for the source editor (in pixels)
    pub editor_font_size: f32,
}

impl Default for PresentationSettings {
    fn default() -> Self {
        Self {
            preview_font_family: String::from("Georgia"),
            preview_font_size: 16.0,
            editor_font_family: String::from("Consolas"),
            editor_font_size: 14.0,
        }
    }
}

impl PresentationSettings {
    /// Minimum allowed font size.
    pub const MIN_FONT_SIZE: f32 = 8.0;
    /// Maximum allowed font size.
    pub const MAX_FONT_SIZE: f32 = 72.0;

    /// Clamp font sizes and restore empty font families to defaults.
    pub fn sanitize(&mut self) {
        let defaults = Self::default();

        self.preview_font_size =
            sanitize_font_size(self.preview_font_size, defaults.preview_font_size);
        self.editor_font_size =
            sanitize_font_size(self.editor_font_size, defaults.editor_font_size);

        if self.preview_font_family.trim().is_empty() {
            self.preview_font_family = defaults.preview_font_family;
        }
        if self.editor_font_family.trim().is_empty() {
            self.editor_font_family = defaults.editor_font_family;
        }
    }

    /// Inline CSS for the preview pane.
    pub fn preview_style(&self) -> String {
        font_style(&self.preview_font_family, self.preview_font_size)
    }

    /// Inline CSS for the source editor.
    pub fn editor_style(&self) -> String {
        font_style(&self.editor_font_family, self.editor_font_size)
    }
}

fn sanitize_font_size(size: f32, default: f32) -> f32 {
    if size.is_nan() {
        default
    } else {
        size.clamp(PresentationSettings::MIN_FONT_SIZE, PresentationSettings::MAX_FONT_SIZE)
    }
}

/// CSS declarations for a font family and pixel size.
fn font_style(family: &str, size: f32) -> String {
    // Quotes and semicolons would escape the declaration.
    let family: String = family
        .chars()
        .filter(|c| !matches!(c, '"' | '\'' | ';' | '<' | '>' | '{' | '}'))
        .collect();
    format!("font-family: \"{}\"; font-size: {}px;", family.trim(), size)
}

// ─────────────────────────────────────────────────────────────────────────────
// Main Settings Struct
// ─────────────────────────────────────────────────────────────────────────────

/// User settings and preferences.
///
/// This struct is serialized to JSON and persisted to the user's config directory.
/// All fields have sensible defaults via the `Default` trait and `#[serde(default)]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // ─────────────────────────────────────────────────────────────────────────
    // Appearance
    // ─────────────────────────────────────────────────────────────────────────
    /// Pane fonts
    pub presentation: PresentationSettings,

    /// Initial view mode
    pub view_mode: ViewMode,

    /// Left pane percentage of the editor/preview split (20 to 80)
    pub split_ratio: f32,

    // ─────────────────────────────────────────────────────────────────────────
    // Sync Scrolling
    // ─────────────────────────────────────────────────────────────────────────
    /// Whether synchronized scrolling between the panes is enabled
    pub sync_scroll_enabled: bool,

    // ─────────────────────────────────────────────────────────────────────────
    // Syntax Highlighting
    // ─────────────────────────────────────────────────────────────────────────
    /// Syntax highlighting theme name
    pub syntax_theme: String,

    // ─────────────────────────────────────────────────────────────────────────
    // Session & History
    // ─────────────────────────────────────────────────────────────────────────
    /// Recently opened files (most recent first)
    pub recent_files: Vec<PathBuf>,

    /// Maximum number of recent files to remember
    pub max_recent_files: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Appearance
            presentation: PresentationSettings::default(),
            view_mode: ViewMode::default(),
            split_ratio: SplitRatio::DEFAULT,

            // Sync Scrolling
            sync_scroll_enabled: true, // Enabled by default

            // Syntax Highlighting
            syntax_theme: String::from(DEFAULT_DARK_THEME),

            // Session & History
            recent_files: Vec::new(),
            max_recent_files: 10,
        }
    }
}

impl Settings {
    /// Add a file to the recent files list.
    ///
    /// If the file already exists in the list, it's moved to the front.
    /// The list is trimmed to `max_recent_files`.
    pub fn add_recent_file(&mut self, path: PathBuf) {
        // Remove if already exists
        self.recent_files.retain(|p| p != &path);
        // Add to front
        self.recent_files.insert(0, path);
        // Trim to max
        self.recent_files.truncate(self.max_recent_files);
    }

    /// Split ratio as a clamped value.
    pub fn split(&self) -> SplitRatio {
        SplitRatio::new(self.split_ratio)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sanitization
    // ─────────────────────────────────────────────────────────────────────────

    /// Sanitize settings by clamping values to valid ranges.
    ///
    /// This is useful after loading settings from a file that might have
    /// been manually edited with invalid values.
    pub fn sanitize(&mut self) {
        self.presentation.sanitize();

        // Clamp split ratio
        self.split_ratio = self.split().value();

        // Ensure max_recent_files is reasonable
        if self.max_recent_files == 0 {
            self.max_recent_files = 10;
        } else if self.max_recent_files > 100 {
            self.max_recent_files = 100;
        }

        // Trim recent files to max
        self.recent_files.truncate(self.max_recent_files);

        if self.syntax_theme.trim().is_empty() {
            self.syntax_theme = String::from(DEFAULT_DARK_THEME);
        }
    }

    /// Load settings and sanitize them to ensure validity.
    ///
    /// This is a convenience method that deserializes and then sanitizes.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();

        assert_eq!(settings.view_mode, ViewMode::Preview);
        assert_eq!(settings.split_ratio, 50.0);
        assert!(settings.sync_scroll_enabled);
        assert!(settings.recent_files.is_empty());
        assert_eq!(settings.max_recent_files, 10);
        assert_eq!(settings.syntax_theme, "base16-ocean.dark");
    }

    #[test]
    fn test_default_presentation() {
        let p = PresentationSettings::default();
        assert_eq!(p.preview_font_family, "Georgia");
        assert_eq!(p.preview_font_size, 16.0);
        assert_eq!(p.editor_font_family, "Consolas");
        assert_eq!(p.editor_font_size, 14.0);
    }

    #[test]
    fn test_add_recent_file() {
        let mut settings = Settings::default();
        settings.max_recent_files = 3;

        settings.add_recent_file(PathBuf::from("/file1.md"));
        settings.add_recent_file(PathBuf::from("/file2.md"));
        settings.add_recent_file(PathBuf::from("/file3.md"));

        assert_eq!(settings.recent_files.len(), 3);
        assert_eq!(settings.recent_files[0], PathBuf::from("/file3.md"));
        assert_eq!(settings.recent_files[2], PathBuf::from("/file1.md"));

        // Add existing file - should move to front
        settings.add_recent_file(PathBuf::from("/file1.md"));
        assert_eq!(settings.recent_files[0], PathBuf::from("/file1.md"));
        assert_eq!(settings.recent_files.len(), 3);

        // Add new file - should trim oldest
        settings.add_recent_file(PathBuf::from("/file4.md"));
        assert_eq!(settings.recent_files.len(), 3);
        assert_eq!(settings.recent_files[0], PathBuf::from("/file4.md"));
        assert!(!settings.recent_files.contains(&PathBuf::from("/file2.md")));
    }

    #[test]
    fn test_view_mode_serialization() {
        assert_eq!(serde_json::to_string(&ViewMode::Preview).unwrap(), "\"preview\"");
        assert_eq!(serde_json::to_string(&ViewMode::Edit).unwrap(), "\"edit\"");
        assert_eq!(
            serde_json::from_str::<ViewMode>("\"edit\"").unwrap(),
            ViewMode::Edit
        );
    }

    #[test]
    fn test_view_mode_toggle() {
        assert_eq!(ViewMode::Preview.toggle(), ViewMode::Edit);
        assert_eq!(ViewMode::Edit.toggle(), ViewMode::Preview);
        assert!(ViewMode::Edit.shows_source());
        assert!(!ViewMode::Preview.shows_source());
        assert_eq!(ViewMode::Edit.label(), "Edit");
    }

    #[test]
    fn test_settings_serialization_roundtrip() {
        let original = Settings::default();
        let json = serde_json::to_string_pretty(&original).unwrap();
        let deserialized: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(original, deserialized);
    }

    #[test]
    fn test_settings_deserialize_with_defaults() {
        // Minimal JSON - should fill in defaults
        let json = r#"{"presentation": {"preview_font_family": "Verdana"}}"#;
        let settings: Settings = serde_json::from_str(json).unwrap();

        assert_eq!(settings.presentation.preview_font_family, "Verdana");
        // All other fields should have defaults
        assert_eq!(settings.presentation.preview_font_size, 16.0);
        assert_eq!(settings.presentation.editor_font_family, "Consolas");
        assert_eq!(settings.view_mode, ViewMode::Preview);
    }

    #[test]
    fn test_settings_deserialize_empty_json() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_style_strings() {
        let p = PresentationSettings::default();
        assert_eq!(p.preview_style(), "font-family: \"Georgia\"; font-size: 16px;");
        assert_eq!(p.editor_style(), "font-family: \"Consolas\"; font-size: 14px;");

        let hostile = PresentationSettings {
            preview_font_family: "x\"; color: red; }".to_string(),
            ..PresentationSettings::default()
        };
        assert!(!hostile.preview_style().contains("}"));
        assert_eq!(hostile.preview_style().matches(';').count(), 2);
    }

    #[test]
    fn test_common_fonts_include_defaults() {
        let p = PresentationSettings::default();
        assert!(COMMON_FONTS.contains(&p.preview_font_family.as_str()));
        assert!(COMMON_FONTS.contains(&p.editor_font_family.as_str()));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sanitization tests
    // ─────────────────────────────────────────────────────────────────────────
    #[test]
    fn test_sanitize_font_size() {
        let mut p = PresentationSettings::default();
        p.preview_font_size = 4.0;
        p.editor_font_size = 100.0;
        p.sanitize();
        assert_eq!(p.preview_font_size, PresentationSettings::MIN_FONT_SIZE);
        assert_eq!(p.editor_font_size, PresentationSettings::MAX_FONT_SIZE);

        p.preview_font_size = f32::NAN;
        p.sanitize();
        assert_eq!(p.preview_font_size, 16.0);
    }

    #[test]
    fn test_sanitize_font_family() {
        let mut p = PresentationSettings::default();
        p.editor_font_family = "   ".to_string();
        p.sanitize();
        assert_eq!(p.editor_font_family, "Consolas");
    }

    #[test]
    fn test_sanitize_split_ratio() {
        let mut settings = Settings::default();
        settings.split_ratio = 5.0;
        settings.sanitize();
        assert_eq!(settings.split_ratio, 20.0);

        settings.split_ratio = 150.0;
        settings.sanitize();
        assert_eq!(settings.split_ratio, 80.0);
    }

    #[test]
    fn test_sanitize_recent_files() {
        let mut settings = Settings::default();
        settings.max_recent_files = 2;
        settings.recent_files = vec![
            PathBuf::from("/file1.md"),
            PathBuf::from("/file2.md"),
            PathBuf::from("/file3.md"),
        ];
        settings.sanitize();
        assert_eq!(settings.recent_files.len(), 2);
    }

    #[test]
    fn test_from_json_sanitized() {
        let json = r#"{"presentation": {"preview_font_size": 4.0}, "split_ratio": 99.0, "syntax_theme": ""}"#;
        let settings = Settings::from_json_sanitized(json).unwrap();
        assert_eq!(settings.presentation.preview_font_size, PresentationSettings::MIN_FONT_SIZE);
        assert_eq!(settings.split_ratio, 80.0);
        assert_eq!(settings.syntax_theme, "base16-ocean.dark");
    }
}
