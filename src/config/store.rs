//! Observable settings store
//!
//! Wraps [`Settings`] with change notification for the presentation fonts and
//! optional write-through persistence.

use log::debug;
use std::path::{Path, PathBuf};

use crate::config::persistence::{get_config_file_path, load_config_from, save_config_to};
use crate::config::{PresentationSettings, Settings};
use crate::error::{Result, ResultExt};
use crate::subscription::{SubscriptionId, Subscribers};

/// Settings with presentation subscribers.
#[derive(Debug)]
pub struct SettingsStore {
    settings: Settings,
    /// File written after every update; `None` keeps settings in memory only
    path: Option<PathBuf>,
    subscribers: Subscribers<PresentationSettings>,
}

impl SettingsStore {
    /// Store that never touches the filesystem.
    pub fn in_memory(settings: Settings) -> Self {
        Self {
            settings,
            path: None,
            subscribers: Subscribers::new(),
        }
    }

    /// Store backed by `path`, loading whatever is there now.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let settings = load_config_from(&path)?;
        Ok(Self {
            settings,
            path: Some(path),
            subscribers: Subscribers::new(),
        })
    }

    /// Store backed by the platform config file, falling back to defaults.
    pub fn load_default() -> Self {
        match get_config_file_path() {
            Ok(path) => {
                let settings = load_config_from(&path)
                    .unwrap_or_warn_default(Settings::default(), "Failed to load configuration");
                Self {
                    settings,
                    path: Some(path),
                    subscribers: Subscribers::new(),
                }
            }
            Err(_) => Self::in_memory(Settings::default()),
        }
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Current presentation settings.
    pub fn get(&self) -> &PresentationSettings {
        &self.settings.presentation
    }

    /// All settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Change the presentation settings, notify subscribers and persist.
    pub fn update(&mut self, f: impl FnOnce(&mut PresentationSettings)) -> Result<()> {
        f(&mut self.settings.presentation);
        self.settings.presentation.sanitize();
        debug!("Presentation settings changed: {:?}", self.settings.presentation);
        self.subscribers.notify(&self.settings.presentation);
        self.persist()
    }

    /// Change any other settings and persist. Presentation subscribers are
    /// notified only if the presentation changed.
    pub fn update_settings(&mut self, f: impl FnOnce(&mut Settings)) -> Result<()> {
        let before = self.settings.presentation.clone();
        f(&mut self.settings);
        self.settings.sanitize();
        if self.settings.presentation != before {
            self.subscribers.notify(&self.settings.presentation);
        }
        self.persist()
    }

    /// Register for presentation changes.
    pub fn subscribe(
        &mut self,
        callback: impl FnMut(&PresentationSettings) + 'static,
    ) -> SubscriptionId {
        self.subscribers.subscribe(callback)
    }

    /// Stop receiving presentation changes.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    fn persist(&self) -> Result<()> {
        match &self.path {
            Some(path) => save_config_to(&self.settings, path),
            None => Ok(()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewMode;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::TempDir;

    #[test]
    fn test_update_notifies_subscribers() {
        let mut store = SettingsStore::in_memory(Settings::default());
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = seen.clone();
        let id = store.subscribe(move |p| sink.borrow_mut().push(p.preview_font_size));

        store.update(|p| p.preview_font_size = 20.0).unwrap();
        assert_eq!(store.get().preview_font_size, 20.0);

        assert!(store.unsubscribe(id));
        store.update(|p| p.preview_font_size = 22.0).unwrap();

        assert_eq!(*seen.borrow(), vec![20.0]);
    }

    #[test]
    fn test_update_sanitizes() {
        let mut store = SettingsStore::in_memory(Settings::default());
        store.update(|p| p.editor_font_size = 1000.0).unwrap();
        assert_eq!(store.get().editor_font_size, PresentationSettings::MAX_FONT_SIZE);
    }

    #[test]
    fn test_update_settings_skips_unchanged_presentation() {
        let mut store = SettingsStore::in_memory(Settings::default());
        let count = Rc::new(RefCell::new(0));
        let c = count.clone();
        store.subscribe(move |_| *c.borrow_mut() += 1);

        store.update_settings(|s| s.view_mode = ViewMode::Edit).unwrap();
        assert_eq!(*count.borrow(), 0);
        assert_eq!(store.settings().view_mode, ViewMode::Edit);

        store
            .update_settings(|s| s.presentation.editor_font_family = "Menlo".to_string())
            .unwrap();
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_open_persists_updates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let mut store = SettingsStore::open(&path).unwrap();
        assert_eq!(store.path(), Some(path.as_path()));
        store.update(|p| p.preview_font_family = "Verdana".to_string()).unwrap();
        store.update_settings(|s| s.split_ratio = 30.0).unwrap();

        let reopened = SettingsStore::open(&path).unwrap();
        assert_eq!(reopened.get().preview_font_family, "Verdana");
        assert_eq!(reopened.settings().split_ratio, 30.0);
    }

    #[test]
    fn test_open_invalid_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(SettingsStore::open(&path).is_err());
    }
}
