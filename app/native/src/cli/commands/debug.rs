//! Diagnostics commands.

use std::path::PathBuf;

use clap::Subcommand;
use sysinfo::System;

use super::context::{DesktopSession, SessionOptions};
use crate::constants::DEBUG_LOG_DIR_NAME;
use crate::error::WinCtxError;
use crate::platform::path::resolve_cli_path;
use crate::{config, logging, settings};

/// Debug commands.
#[derive(Subcommand, Debug)]
pub enum DebugCommands {
    /// Write the debug log and a system summary to a file.
    ///
    /// The summary includes the loaded snapshot when `--desktop` is given.
    Export {
        /// Directory to write into instead of the data directory.
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
    },
}

/// Execute debug subcommands.
///
/// # Errors
///
/// Returns an error if the export cannot be written.
pub fn execute(cmd: &DebugCommands, options: &SessionOptions) -> Result<(), WinCtxError> {
    match cmd {
        DebugCommands::Export { dir } => {
            let dir = dir.as_deref().map_or_else(
                || settings::data_dir().join(DEBUG_LOG_DIR_NAME),
                resolve_cli_path,
            );
            let info = system_info(options);
            let path = logging::debug_log().export(&dir, &info)?;
            println!("Debug log written to {}", path.display());
            Ok(())
        }
    }
}

fn host_info() -> Vec<(&'static str, String)> {
    let unknown = || "unknown".to_string();
    vec![
        ("OS", System::long_os_version().unwrap_or_else(unknown)),
        ("OS Version", System::os_version().unwrap_or_else(unknown)),
        ("Kernel", System::kernel_version().unwrap_or_else(unknown)),
        ("Platform", std::env::consts::OS.to_string()),
        ("Architecture", std::env::consts::ARCH.to_string()),
    ]
}

fn system_info(options: &SessionOptions) -> Vec<(&'static str, String)> {
    let mut info = host_info();
    info.extend([
        (
            "Config",
            config::get_config_path().map_or_else(|| "defaults".to_string(), |p| p.display().to_string()),
        ),
        ("Settings", settings::settings_path().display().to_string()),
    ]);

    if options.desktop.is_none() {
        return info;
    }
    match DesktopSession::open(options) {
        Ok(mut session) => {
            info.push(("Snapshot", session.path().display().to_string()));
            info.push(("Monitors", session.coordinator.monitors().len().to_string()));
            info.push(("Windows", session.coordinator.directory().len().to_string()));
            info.push(("Audio processes", session.coordinator.audio().pids().count().to_string()));
            let pinned = session.coordinator.window_summaries().iter().filter(|s| s.pinned).count();
            info.push(("Pinned windows", pinned.to_string()));
        }
        Err(err) => info.push(("Snapshot", format!("unavailable ({err})"))),
    }
    info
}
