//! Configuration template generation.
//!
//! Generates a commented configuration template with all available options.

use std::fs;
use std::path::Path;

/// Generates a configuration template with all options commented out.
#[must_use]
pub fn generate_config_template() -> String {
    r#"// winctx Configuration File
// ==========================
// This file uses JSONC format (JSON with comments).
// All options below are commented out and show their default values.
// Uncomment and modify the options you want to configure.

{
  // ============================================================================
  // Layout
  // ============================================================================
  // "layout": {
  //   // Smallest width or height (px) a layout may give a window.
  //   // Layouts that would go below it are rejected.
  //   "minimumSize": 100
  // },

  // ============================================================================
  // Audio Sessions
  // ============================================================================
  // "audio": {
  //   // Interval in milliseconds between background session resyncs (0 disables)
  //   "resyncIntervalMs": 500,
  //
  //   // Step used by volume up/down adjustments (0.0-1.0)
  //   "volumeStep": 0.05
  // },

  // ============================================================================
  // Window Directory
  // ============================================================================
  // "windows": {
  //   // Windows matching any rule never appear in the directory.
  //   // Strategies: "exact" (default), "contains", "startsWith", "regex"
  //   "ignore": [
  //     { "title": "Program Manager" },
  //     { "executable": "TextInputHost.exe" },
  //     { "title": "^Picture-in-picture$", "strategy": "regex" }
  //   ]
  // }
}
"#
    .to_string()
}

/// Writes the template to `path`, creating parent directories.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn create_config_file(path: &Path) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, generate_config_template())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{WinCtxConfig, load_config_from_path};

    #[test]
    fn test_template_contains_all_sections() {
        let template = generate_config_template();
        assert!(template.contains("\"layout\""));
        assert!(template.contains("\"audio\""));
        assert!(template.contains("\"windows\""));
    }

    #[test]
    fn test_template_parses_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.jsonc");
        create_config_file(&path).unwrap();

        let (config, _) = load_config_from_path(&path).unwrap();
        assert_eq!(config, WinCtxConfig::default());
    }
}
