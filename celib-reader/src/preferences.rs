//! Reader preferences that outlive a session
//!
//! Stored as JSON in the user's config directory. A missing or unreadable
//! file falls back to the defaults; a failed save is logged and otherwise
//! ignored.

use crate::cli::ReaderTheme;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "celib-reader";
const PREFERENCES_FILENAME: &str = "preferences.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub theme: ReaderTheme,
}

pub fn preferences_path() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join(APP_NAME).join(PREFERENCES_FILENAME))
}

impl Preferences {
    /// Load from the default location, falling back to defaults.
    pub fn load() -> Self {
        let Some(path) = preferences_path() else {
            tracing::warn!("Could not determine config directory, using default preferences");
            return Self::default();
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::read(path) {
            Ok(preferences) => {
                tracing::debug!("Loaded preferences from {:?}", path);
                preferences
            }
            Err(e) => {
                tracing::error!("{:#}", e);
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read preferences {:?}", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse preferences {:?}", path))
    }

    pub fn save(&self) {
        let Some(path) = preferences_path() else {
            tracing::warn!("Could not determine config directory, cannot save preferences");
            return;
        };
        match self.save_to(&path) {
            Ok(()) => tracing::debug!("Saved preferences to {:?}", path),
            Err(e) => tracing::error!("{:#}", e),
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to save preferences to {:?}", path))
    }
}
