//! CLI command definitions using Clap.
//!
//! Commands are organized into domain-specific submodules:
//!
//! - `windows` - Window listing, layouts, pins, focus and minimize
//! - `audio` - Audio session listing, mute and volume
//! - `config_cmd` - Configuration file management
//! - `settings_cmd` - Persisted settings
//! - `debug` - Diagnostics export
//! - `context` - Desktop session shared by the commands above
//! - `types` - Shared argument types

use std::io;
use std::path::PathBuf;

use clap::{ArgGroup, Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell, generate};

use crate::config::schema;
use crate::constants::{APP_NAME, APP_VERSION};
use crate::desktop::WindowHandle;
use crate::error::WinCtxError;
use crate::platform::path::resolve_cli_path;
use crate::{config, logging};

pub mod audio;
pub mod config_cmd;
pub mod context;
pub mod debug;
pub mod settings_cmd;
pub mod types;
pub mod windows;

pub use audio::VolumeChange;
pub use config_cmd::ConfigCommands;
pub use context::SessionOptions;
pub use debug::DebugCommands;
pub use settings_cmd::SettingsCommands;
pub use types::CliLayoutMode;

/// winctx - arrange windows and control per-application audio.
#[derive(Parser, Debug)]
#[command(name = "winctx")]
#[command(author, version = APP_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a custom configuration file (JSONC).
    ///
    /// Overrides the default configuration file search paths.
    #[arg(long, short, global = true, value_name = "PATH")]
    pub config: Option<String>,

    /// Desktop snapshot to operate on.
    #[arg(long, short, global = true, value_name = "PATH", env = "WINCTX_DESKTOP")]
    pub desktop: Option<PathBuf>,

    /// Settings file to use instead of the one in the data directory.
    #[arg(long, global = true, value_name = "PATH", env = "WINCTX_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Run the command without writing the snapshot or settings back.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Enable debug logging.
    #[arg(long, global = true)]
    pub debug: bool,

    /// Enable trace logging.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum Commands {
    /// List eligible windows, pinned ones first.
    Windows {
        /// Output as JSON.
        #[arg(long, short)]
        json: bool,
    },

    /// List monitors with their work areas.
    Monitors {
        /// Output as JSON.
        #[arg(long, short)]
        json: bool,
    },

    /// List processes with live audio sessions.
    Sessions {
        /// Output as JSON.
        #[arg(long, short)]
        json: bool,

        /// Keep watching for this many seconds, re-reading the snapshot on
        /// the configured resync interval.
        #[arg(long, value_name = "SECONDS")]
        watch: Option<u64>,
    },

    /// Arrange windows on a monitor and verify the result.
    #[command(after_long_help = r#"Examples:
  winctx layout split-horizontal --window 0x10 --window 0x20
  winctx layout snap-left --window 0x10 --monitor 2
  winctx layout minimize --window 0x30"#)]
    Layout {
        /// Layout to apply.
        #[arg(value_enum)]
        mode: CliLayoutMode,

        /// Target monitor id. Defaults to the monitor under the first window.
        #[arg(long, short, value_name = "ID")]
        monitor: Option<u32>,

        /// Windows to arrange, in order (hex `0x..` or decimal). Defaults to
        /// every window.
        #[arg(long = "window", short, value_name = "HANDLE")]
        windows: Vec<WindowHandle>,

        /// Output as JSON.
        #[arg(long, short)]
        json: bool,
    },

    /// Mute the audio of processes, windows or the system output.
    ///
    /// With no pids and no windows the default output device is muted.
    Mute {
        /// Process ids to mute.
        pids: Vec<u32>,

        /// Mute the processes behind these windows instead.
        #[arg(long = "window", short, value_name = "HANDLE", conflicts_with = "pids")]
        windows: Vec<WindowHandle>,

        /// Unmute instead.
        #[arg(long)]
        off: bool,

        /// Output as JSON.
        #[arg(long, short)]
        json: bool,
    },

    /// Set or adjust the volume of processes or the system output.
    Volume(VolumeArgs),

    /// Pin or unpin a window. Pins are remembered across runs.
    Pin {
        /// Window handle (hex `0x..` or decimal).
        handle: WindowHandle,
    },

    /// Restore and focus a window.
    Focus {
        /// Window handle (hex `0x..` or decimal).
        handle: WindowHandle,
    },

    /// Minimize a window, or maximize it if already minimized.
    Minimize {
        /// Window handle (hex `0x..` or decimal).
        handle: WindowHandle,
    },

    /// Configuration file management commands.
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Persisted settings commands.
    #[command(subcommand)]
    Settings(SettingsCommands),

    /// Output the configuration JSON Schema.
    ///
    /// Redirect to a file for editors that support JSON Schema validation.
    Schema,

    /// Generate shell completions.
    ///
    /// Usage:
    ///   eval "$(winctx completions --shell zsh)"
    ///   winctx completions --shell fish > ~/.config/fish/completions/winctx.fish
    Completions {
        /// The shell to generate completions for.
        #[arg(long, short, value_enum)]
        shell: Shell,
    },

    /// Diagnostics commands.
    #[command(subcommand)]
    Debug(DebugCommands),
}

/// Arguments of `winctx volume`.
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("change").required(true).args(["set", "adjust", "up", "down"])))]
pub struct VolumeArgs {
    /// Process ids. Without any, the system output volume changes.
    pub pids: Vec<u32>,

    /// Absolute level between 0.0 and 1.0.
    #[arg(long, value_name = "LEVEL", value_parser = types::parse_volume)]
    pub set: Option<f32>,

    /// Relative change, e.g. 0.1 or -0.25.
    #[arg(long, value_name = "DELTA", allow_negative_numbers = true)]
    pub adjust: Option<f32>,

    /// Raise by the configured volume step.
    #[arg(long)]
    pub up: bool,

    /// Lower by the configured volume step.
    #[arg(long)]
    pub down: bool,

    /// Output as JSON.
    #[arg(long, short)]
    pub json: bool,
}

impl VolumeArgs {
    /// The requested change, resolving `--up`/`--down` with `step`.
    #[must_use]
    pub fn change(&self, step: f32) -> VolumeChange {
        match (self.set, self.adjust) {
            (Some(level), _) => VolumeChange::Set(level),
            (None, Some(delta)) => VolumeChange::Adjust(delta),
            (None, None) if self.down => VolumeChange::Adjust(-step),
            (None, None) => VolumeChange::Adjust(step),
        }
    }
}

impl Cli {
    /// Returns the custom config path if specified via --config flag.
    #[must_use]
    pub fn config_path(&self) -> Option<PathBuf> {
        self.config.as_deref().map(|path| resolve_cli_path(std::path::Path::new(path)))
    }

    fn session_options(&self) -> SessionOptions {
        SessionOptions {
            desktop: self.desktop.clone(),
            settings: self.settings.clone(),
            dry_run: self.dry_run,
        }
    }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command execution fails.
    pub fn execute(&self) -> Result<(), WinCtxError> {
        if let Some(path) = self.config_path() {
            if !path.exists() {
                return Err(WinCtxError::ConfigError(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
            config::set_custom_config_path(path);
        }

        let stored = settings_cmd::open_store(self.settings.as_deref()).settings().clone();
        logging::init(self.debug || stored.debug, self.verbose || stored.verbose);

        let options = self.session_options();
        match &self.command {
            Commands::Windows { json } => windows::list_windows(&options, *json),
            Commands::Monitors { json } => windows::list_monitors(&options, *json),
            Commands::Sessions { json, watch } => audio::list_sessions(&options, *json, *watch),
            Commands::Layout { mode, monitor, windows: handles, json } => {
                windows::apply_layout(&options, *mode, *monitor, handles, *json)
            }
            Commands::Mute { pids, windows: handles, off, json } => {
                audio::mute(&options, pids, handles, *off, *json)
            }
            Commands::Volume(args) => {
                let change = args.change(config::get_config().audio.volume_step());
                audio::volume(&options, &args.pids, change, args.json)
            }
            Commands::Pin { handle } => windows::toggle_pin(&options, *handle),
            Commands::Focus { handle } => windows::focus(&options, *handle),
            Commands::Minimize { handle } => windows::toggle_minimize(&options, *handle),
            Commands::Config(cmd) => config_cmd::execute(cmd),
            Commands::Settings(cmd) => settings_cmd::execute(cmd, self.settings.as_deref()),
            Commands::Schema => {
                println!("{}", schema::print_schema());
                Ok(())
            }
            Commands::Completions { shell } => {
                Self::print_completions(*shell);
                Ok(())
            }
            Commands::Debug(cmd) => debug::execute(cmd, &options),
        }
    }

    /// Print shell completions to stdout.
    fn print_completions<G: Generator>(generator: G) {
        let mut cmd = Self::command();
        generate(generator, &mut cmd, APP_NAME, &mut io::stdout());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desktop::LayoutMode;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("winctx").chain(args.iter().copied())).unwrap()
    }

    // ========================================================================
    // Global flags
    // ========================================================================

    #[test]
    fn test_cli_verifies() { Cli::command().debug_assert(); }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["windows", "--desktop", "desk.json", "--dry-run", "--debug"]);

        assert_eq!(cli.desktop, Some(PathBuf::from("desk.json")));
        assert!(cli.dry_run);
        assert!(cli.debug);
        assert!(!cli.verbose);
    }

    // ========================================================================
    // Window commands
    // ========================================================================

    #[test]
    fn test_parses_layout_with_windows_and_monitor() {
        let cli = parse(&["layout", "split-vertical", "--window", "0x10", "-w", "32", "-m", "2"]);

        match cli.command {
            Commands::Layout { mode, monitor, windows, json } => {
                assert_eq!(LayoutMode::from(mode), LayoutMode::SplitVertical);
                assert_eq!(monitor, Some(2));
                assert_eq!(windows, vec![WindowHandle(16), WindowHandle(32)]);
                assert!(!json);
            }
            _ => panic!("Expected Layout command"),
        }
    }

    #[test]
    fn test_rejects_unknown_layout_mode() {
        assert!(Cli::try_parse_from(["winctx", "layout", "cascade"]).is_err());
    }

    #[test]
    fn test_parses_pin_handle() {
        match parse(&["pin", "0x2a"]).command {
            Commands::Pin { handle } => assert_eq!(handle, WindowHandle(42)),
            _ => panic!("Expected Pin command"),
        }
    }

    // ========================================================================
    // Audio commands
    // ========================================================================

    #[test]
    fn test_parses_mute_pids_and_off() {
        match parse(&["mute", "100", "200", "--off"]).command {
            Commands::Mute { pids, windows, off, .. } => {
                assert_eq!(pids, vec![100, 200]);
                assert!(windows.is_empty());
                assert!(off);
            }
            _ => panic!("Expected Mute command"),
        }
    }

    #[test]
    fn test_mute_pids_conflict_with_windows() {
        assert!(Cli::try_parse_from(["winctx", "mute", "100", "--window", "0x10"]).is_err());
    }

    #[test]
    fn test_volume_requires_a_change() {
        assert!(Cli::try_parse_from(["winctx", "volume", "100"]).is_err());
        assert!(Cli::try_parse_from(["winctx", "volume", "100", "--set", "0.5", "--up"]).is_err());
    }

    #[test]
    fn test_volume_changes() {
        let change = |args: &[&str]| match parse(args).command {
            Commands::Volume(args) => args.change(0.05),
            _ => panic!("Expected Volume command"),
        };

        assert_eq!(change(&["volume", "100", "--set", "0.4"]), VolumeChange::Set(0.4));
        assert_eq!(change(&["volume", "100", "--adjust", "-0.25"]), VolumeChange::Adjust(-0.25));
        assert_eq!(change(&["volume", "--up"]), VolumeChange::Adjust(0.05));
        assert_eq!(change(&["volume", "--down"]), VolumeChange::Adjust(-0.05));
    }

    #[test]
    fn test_volume_set_out_of_range() {
        assert!(Cli::try_parse_from(["winctx", "volume", "--set", "1.5"]).is_err());
    }

    // ========================================================================
    // Other commands
    // ========================================================================

    #[test]
    fn test_parses_config_init_force() {
        match parse(&["config", "init", "--force"]).command {
            Commands::Config(ConfigCommands::Init { force, path, stdout }) => {
                assert!(force);
                assert!(path.is_none());
                assert!(!stdout);
            }
            _ => panic!("Expected Config Init command"),
        }
    }

    #[test]
    fn test_parses_settings_set() {
        let cli = parse(&["settings", "set", "--hotkey", "ctrl+alt+w", "--debug-logging", "true"]);
        assert!(!cli.debug);
        match cli.command {
            Commands::Settings(SettingsCommands::Set { hotkey, debug_logging, trace_logging }) => {
                assert_eq!(hotkey.as_deref(), Some("ctrl+alt+w"));
                assert_eq!(debug_logging, Some(true));
                assert_eq!(trace_logging, None);
            }
            _ => panic!("Expected Settings Set command"),
        }
    }

    #[test]
    fn test_settings_set_leaves_logging_flags_alone() {
        let cli = parse(&["--debug", "settings", "set", "--hotkey", "ctrl+x"]);
        assert!(cli.debug);
        match cli.command {
            Commands::Settings(SettingsCommands::Set { debug_logging, trace_logging, .. }) => {
                assert_eq!(debug_logging, None);
                assert_eq!(trace_logging, None);
            }
            _ => panic!("Expected Settings Set command"),
        }
    }

    #[test]
    fn test_parses_completions() {
        match parse(&["completions", "--shell", "zsh"]).command {
            Commands::Completions { shell } => assert_eq!(shell, Shell::Zsh),
            _ => panic!("Expected Completions command"),
        }
    }

    #[test]
    fn test_parses_debug_export_dir() {
        match parse(&["debug", "export", "--dir", "/tmp/winctx"]).command {
            Commands::Debug(DebugCommands::Export { dir }) => {
                assert_eq!(dir, Some(PathBuf::from("/tmp/winctx")));
            }
            _ => panic!("Expected Debug Export command"),
        }
    }
}
