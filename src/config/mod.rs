//! Configuration module for mdpane
//!
//! This module handles user preferences and application settings,
//! including serialization/deserialization to/from JSON,
//! persistent storage to platform-specific directories, and change
//! notification for the presentation settings.

mod persistence;
mod settings;
mod store;

pub use persistence::*;
pub use settings::*;
pub use store::SettingsStore;
