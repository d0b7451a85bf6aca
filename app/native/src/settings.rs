//! Persisted user settings.
//!
//! A small JSON document in the platform data directory
//! (`dirs::data_dir()/winctx/settings.json`) holding the pinned window
//! identities, the last hotkey binding and the logging flags. It is loaded at
//! start and written back whenever it changes. Unknown fields are ignored and
//! missing fields take their defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{APP_NAME, SETTINGS_FILE_NAME};
use crate::desktop::WindowIdentity;

/// Settings persisted across restarts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Pinned windows, in pin order.
    pub pinned: Vec<WindowIdentity>,

    /// Last-used global hotkey binding, e.g. `ctrl+alt+w`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hotkey: Option<String>,

    /// Debug logging enabled.
    pub debug: bool,

    /// Verbose (trace-level) logging enabled.
    pub verbose: bool,
}

/// Errors that can occur when reading or writing settings.
#[derive(Debug)]
pub enum SettingsError {
    /// The settings file could not be read or written.
    Io(std::io::Error),
    /// The settings file is not valid JSON.
    Parse(serde_json::Error),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "Failed to access settings file: {err}"),
            Self::Parse(err) => write!(f, "Failed to parse settings file: {err}"),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(err: std::io::Error) -> Self { Self::Io(err) }
}

impl From<serde_json::Error> for SettingsError {
    fn from(err: serde_json::Error) -> Self { Self::Parse(err) }
}

/// Returns the application data directory.
///
/// Falls back to `~/.winctx` (or `./.winctx`) when the platform has no data
/// directory.
#[must_use]
pub fn data_dir() -> PathBuf {
    dirs::data_dir().map_or_else(
        || dirs::home_dir().unwrap_or_default().join(format!(".{APP_NAME}")),
        |dir| dir.join(APP_NAME),
    )
}

/// Default location of the settings file.
#[must_use]
pub fn settings_path() -> PathBuf { data_dir().join(SETTINGS_FILE_NAME) }

impl Settings {
    /// Reads settings from `path`. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Writes settings to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Settings bound to a file, saved whenever they change.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
}

impl SettingsStore {
    /// Opens the store at `path`.
    ///
    /// A corrupt file is logged and replaced by defaults on the next save.
    #[must_use]
    pub fn open(path: PathBuf) -> Self {
        let settings = Settings::load_from(&path).unwrap_or_else(|err| {
            tracing::warn!(path = %path.display(), error = %err, "ignoring unreadable settings");
            Settings::default()
        });
        Self { path, settings }
    }

    /// Opens the store at the default location.
    #[must_use]
    pub fn open_default() -> Self { Self::open(settings_path()) }

    #[must_use]
    pub fn path(&self) -> &Path { &self.path }

    #[must_use]
    pub const fn settings(&self) -> &Settings { &self.settings }

    /// Applies `change` and saves if anything differs.
    ///
    /// Returns whether the file was written.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn update(&mut self, change: impl FnOnce(&mut Settings)) -> Result<bool, SettingsError> {
        let mut next = self.settings.clone();
        change(&mut next);
        if next == self.settings {
            return Ok(false);
        }

        next.save_to(&self.path)?;
        self.settings = next;
        tracing::debug!(path = %self.path.display(), "settings saved");
        Ok(true)
    }
}
