//! Application-wide constants.

/// Application name, used for directories, thread names and log targets.
pub const APP_NAME: &str = "winctx";

/// Application version from Cargo.toml.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// File name of the persisted settings inside the data directory.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Name of the debug log export directory inside the data directory.
pub const DEBUG_LOG_DIR_NAME: &str = "debug";

/// Debug log size that triggers trimming.
pub const DEBUG_LOG_MAX_ENTRIES: usize = 1000;

/// Newest entries kept when the debug log is trimmed.
pub const DEBUG_LOG_RETAINED_ENTRIES: usize = 500;
