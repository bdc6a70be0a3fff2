// SPDX-License-Identifier: MIT OR Apache-2.0
//! Retime tool settings.
//!
//! Settings live in a RON file and cover:
//! - Preset buttons (label, delta, mode)
//! - The "move to next frame" default
//! - Undo history depth
//! - Log filter

use crate::history::MAX_HISTORY;
use ordoplay_retime::RetimePreset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Settings file looked up in the working directory when none is given
pub const SETTINGS_FILE_NAME: &str = "retime.ron";

/// Log filter used when neither the settings nor `RUST_LOG` set one
pub const DEFAULT_LOG_FILTER: &str = "ordoplay_retime=info,ordoplay_retime_cli=info";

/// Settings errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// IO error
    #[error("IO error on settings file {path}: {source}")]
    Io {
        /// Settings file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// RON parse error
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// RON serialization error
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] ron::Error),

    /// File written by a newer version
    #[error("Settings version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Newest supported version
        supported: u32,
    },
}

/// Retime tool settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetimeSettings {
    /// Settings format version
    pub version: u32,
    /// Presets offered by `--preset` and batch scripts
    pub presets: Vec<RetimePreset>,
    /// Move the playhead to the next key after a retime by default
    pub move_to_next: bool,
    /// Undo history depth
    pub history_depth: usize,
    /// Tracing filter directives
    pub log_filter: String,
}

impl Default for RetimeSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            presets: RetimePreset::defaults(),
            move_to_next: false,
            history_depth: MAX_HISTORY,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl RetimeSettings {
    /// Parse settings from RON text
    pub fn from_ron(text: &str) -> Result<Self, SettingsError> {
        let settings: RetimeSettings = ron::from_str(text)?;

        // Version check
        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(SettingsError::UnsupportedVersion {
                found: settings.version,
                supported: SETTINGS_FORMAT_VERSION,
            });
        }

        Ok(settings)
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String, SettingsError> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&content)
    }

    /// Load `path`, or `retime.ron` from the working directory if present,
    /// or fall back to defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let local = Path::new(SETTINGS_FILE_NAME);
                if local.exists() {
                    Self::load(local)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let content = self.to_ron()?;
        std::fs::write(path, content).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Look a preset up by label
    pub fn preset(&self, label: &str) -> Option<&RetimePreset> {
        RetimePreset::find(&self.presets, label)
    }
}
