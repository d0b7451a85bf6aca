//! Persisted settings commands.

use std::path::Path;

use clap::Subcommand;

use crate::cli::output;
use crate::error::WinCtxError;
use crate::platform::path::resolve_cli_path;
use crate::settings::SettingsStore;

/// Settings commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum SettingsCommands {
    /// Print the persisted settings as JSON.
    Show,

    /// Change persisted settings. Only the given options change.
    Set {
        /// Global hotkey binding to remember, e.g. `ctrl+alt+w`. Pass an empty
        /// string to forget it.
        #[arg(long, value_name = "BINDING")]
        hotkey: Option<String>,

        /// Enable debug logging on every run.
        #[arg(long = "debug-logging", value_name = "BOOL")]
        debug_logging: Option<bool>,

        /// Enable trace logging on every run.
        #[arg(long = "trace-logging", value_name = "BOOL")]
        trace_logging: Option<bool>,
    },

    /// Forget every pinned window.
    ClearPins,

    /// Show where settings are stored.
    Path,
}

/// Opens the settings file at `path`, or the default location.
pub fn open_store(path: Option<&Path>) -> SettingsStore {
    path.map_or_else(SettingsStore::open_default, |path| SettingsStore::open(resolve_cli_path(path)))
}

/// Execute settings subcommands.
///
/// # Errors
///
/// Returns an error if the settings file cannot be written.
pub fn execute(cmd: &SettingsCommands, path: Option<&Path>) -> Result<(), WinCtxError> {
    let mut store = open_store(path);

    match cmd {
        SettingsCommands::Show => output::print_json(store.settings()),
        SettingsCommands::Set { hotkey, debug_logging, trace_logging } => {
            let changed = store.update(|settings| {
                if let Some(binding) = hotkey {
                    let binding = binding.trim();
                    settings.hotkey = (!binding.is_empty()).then(|| binding.to_string());
                }
                if let Some(debug) = debug_logging {
                    settings.debug = *debug;
                }
                if let Some(verbose) = trace_logging {
                    settings.verbose = *verbose;
                }
            })?;
            println!("{}", if changed { "Settings saved." } else { "Settings unchanged." });
            Ok(())
        }
        SettingsCommands::ClearPins => {
            let count = store.settings().pinned.len();
            store.update(|settings| settings.pinned.clear())?;
            println!("Forgot {count} pinned window(s).");
            Ok(())
        }
        SettingsCommands::Path => {
            println!("{}", store.path().display());
            Ok(())
        }
    }
}
