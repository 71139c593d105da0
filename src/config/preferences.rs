//! Ephemeral UI preferences cached between sessions.
//!
//! Only the last slicing scheme and the outlier toggle are remembered. They
//! seed the view when no URL fragment is present; the fragment always wins.

use crate::error::ConfigError;
use crate::models::SliceScheme;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub last_scheme: Option<SliceScheme>,
    pub exclude_outliers: bool,
}

/// JSON-backed preference cache.
#[derive(Debug, Clone)]
pub struct PreferencesStore {
    path: PathBuf,
}

impl PreferencesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        PreferencesStore { path: path.into() }
    }

    /// Store under the user config dir: `~/.config/perf-dashboard/preferences.json`.
    pub fn user_default() -> Result<Self, ConfigError> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            ConfigError::ValidationFailed("Cannot determine config directory".to_string())
        })?;
        Ok(Self::new(config_dir.join("perf-dashboard").join("preferences.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read cached preferences; missing or corrupt files yield defaults.
    pub fn load(&self) -> Preferences {
        match fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str::<Preferences>(&content) {
                Ok(prefs) => prefs,
                Err(e) => {
                    log::warn!(
                        "[Preferences] Failed to parse {}, falling back to defaults: {}",
                        self.path.display(),
                        e
                    );
                    Preferences::default()
                }
            },
            Err(_) => Preferences::default(),
        }
    }

    pub fn save(&self, prefs: &Preferences) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(prefs)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}
