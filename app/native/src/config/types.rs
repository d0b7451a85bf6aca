//! Configuration types for winctx.
//!
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.
//! Every field is optional; missing fields take their default values.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ============================================================================
// Root
// ============================================================================

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct WinCtxConfig {
    /// Layout engine tunables.
    pub layout: LayoutConfig,

    /// Audio session tunables.
    pub audio: AudioConfig,

    /// Window directory tunables.
    pub windows: WindowsConfig,
}

// ============================================================================
// Layout
// ============================================================================

/// Layout engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Smallest width or height, in pixels, a layout may give a window.
    /// Layouts that would go below it are rejected.
    /// Default: 100
    pub minimum_size: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self { Self { minimum_size: 100 } }
}

impl LayoutConfig {
    /// Minimum size as a signed pixel count.
    #[must_use]
    pub fn minimum_size_px(&self) -> i32 { i32::try_from(self.minimum_size).unwrap_or(i32::MAX) }
}

// ============================================================================
// Audio
// ============================================================================

/// Audio session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct AudioConfig {
    /// Interval in milliseconds between background session resyncs.
    /// Set to 0 to disable background resync.
    /// Default: 500
    pub resync_interval_ms: u64,

    /// Step used by volume up/down adjustments (0.0-1.0).
    /// Default: 0.05
    pub volume_step: f32,
}

impl Default for AudioConfig {
    fn default() -> Self { Self { resync_interval_ms: 500, volume_step: 0.05 } }
}

impl AudioConfig {
    #[must_use]
    pub const fn resync_interval(&self) -> Duration { Duration::from_millis(self.resync_interval_ms) }

    /// Volume step clamped to `[0.0, 1.0]`; non-finite values fall back to the default.
    #[must_use]
    pub fn volume_step(&self) -> f32 {
        if self.volume_step.is_finite() {
            self.volume_step.clamp(0.0, 1.0)
        } else {
            Self::default().volume_step
        }
    }
}

// ============================================================================
// Windows
// ============================================================================

/// Strategy for matching window titles and executables in ignore rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum MatchStrategy {
    /// Exact match (case-insensitive). This is the default strategy.
    #[default]
    Exact,
    /// Value contains the specified string (case-insensitive).
    Contains,
    /// Value starts with the specified string (case-insensitive).
    StartsWith,
    /// Value matches the specified regex pattern (case-sensitive).
    Regex,
}

/// Rule excluding windows from the directory.
///
/// A window is ignored when every specified field matches. Rules with neither
/// field set are ignored themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct IgnoreRule {
    /// Pattern matched against the window title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Pattern matched against the executable file name (e.g. `explorer.exe`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executable: Option<String>,

    /// The strategy for matching both patterns.
    /// - `exact`: Exact match (case-insensitive). Default if not specified.
    /// - `contains`: Value contains the string (case-insensitive).
    /// - `startsWith`: Value starts with the string (case-insensitive).
    /// - `regex`: Value matches the regex pattern.
    pub strategy: MatchStrategy,
}

/// Window directory configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct WindowsConfig {
    /// Windows matching any of these rules never appear in the directory.
    pub ignore: Vec<IgnoreRule>,
}

// ============================================================================
// Loading
// ============================================================================

/// Errors that can occur when loading the configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// No configuration file was found in any of the expected locations.
    NotFound,
    /// The configuration file exists but could not be read.
    IoError(std::io::Error),
    /// The configuration file contains invalid JSON.
    ParseError(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(
                f,
                "No configuration file found. Expected at ~/.config/winctx/config.jsonc \
                or ~/.winctx.jsonc"
            ),
            Self::IoError(err) => write!(f, "Failed to read configuration file: {err}"),
            Self::ParseError(err) => write!(f, "Failed to parse configuration file: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::IoError(err) => Some(err),
            Self::ParseError(err) => Some(err),
            Self::NotFound => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self { Self::IoError(err) }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self { Self::ParseError(err) }
}

/// Configuration file names to search for (in priority order).
const CONFIG_FILE_NAMES: &[&str] = &["config.jsonc", "config.json"];

/// Configuration file names in the home directory.
const HOME_CONFIG_FILE_NAMES: &[&str] = &[".winctx.jsonc", ".winctx.json"];

/// Returns the possible configuration file paths in priority order.
///
/// The function checks the following locations (both `.jsonc` and `.json` variants):
/// 1. `$XDG_CONFIG_HOME/winctx/config.jsonc` (when set)
/// 2. `~/.config/winctx/config.jsonc`
/// 3. The platform config directory (`%APPDATA%\winctx`, `~/Library/Application Support/winctx`)
/// 4. `~/.winctx.jsonc` or `~/.winctx.json`
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let dir = PathBuf::from(xdg_config).join("winctx");
        for filename in CONFIG_FILE_NAMES {
            paths.push(dir.join(filename));
        }
    }

    let mut push_unique = |path: PathBuf| {
        if !paths.contains(&path) {
            paths.push(path);
        }
    };

    if let Some(home) = dirs::home_dir() {
        let dir = home.join(".config").join("winctx");
        for filename in CONFIG_FILE_NAMES {
            push_unique(dir.join(filename));
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let dir = config_dir.join("winctx");
        for filename in CONFIG_FILE_NAMES {
            push_unique(dir.join(filename));
        }
    }

    if let Some(home) = dirs::home_dir() {
        for filename in HOME_CONFIG_FILE_NAMES {
            push_unique(home.join(filename));
        }
    }

    paths
}

/// Loads the configuration from the first available config file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if no configuration file exists in any of the expected locations.
/// Returns `ConfigError::IoError` if a configuration file exists but could not be read.
/// Returns `ConfigError::ParseError` if the configuration file contains invalid JSON.
pub fn load_config() -> Result<(WinCtxConfig, PathBuf), ConfigError> {
    for path in config_paths() {
        if path.exists() {
            let config = parse_file(&path)?;
            return Ok((config, path));
        }
    }

    Err(ConfigError::NotFound)
}

/// Loads the configuration from a specific file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if the file does not exist, `IoError` if it
/// cannot be read and `ParseError` if it is not valid JSONC.
pub fn load_config_from_path(path: &PathBuf) -> Result<(WinCtxConfig, PathBuf), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound);
    }
    let config = parse_file(path)?;
    Ok((config, path.clone()))
}

fn parse_file(path: &Path) -> Result<WinCtxConfig, ConfigError> {
    let file = fs::File::open(path)?;
    // Strip comments from JSONC before parsing
    let reader = json_comments::StripComments::new(file);
    Ok(serde_json::from_reader(reader)?)
}
