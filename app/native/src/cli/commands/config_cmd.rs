//! Config CLI commands.

use std::path::PathBuf;

use clap::Subcommand;
use colored::Colorize;

use crate::cli::output;
use crate::config::template::{create_config_file, generate_config_template};
use crate::config::{self, config_paths};
use crate::error::WinCtxError;
use crate::platform::path::resolve_cli_path;

/// Config management commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum ConfigCommands {
    /// Write a configuration file with every option documented.
    ///
    /// All options are commented out and show their defaults.
    #[command(after_long_help = r#"Examples:
  winctx config init              # Create config at default location
  winctx config init --force      # Overwrite existing config
  winctx config init --path ~/winctx.jsonc
  winctx config init --stdout     # Print template to stdout"#)]
    Init {
        /// Overwrite an existing configuration file.
        #[arg(long, short)]
        force: bool,

        /// Where to write the file instead of ~/.config/winctx/config.jsonc.
        #[arg(long, short, value_name = "PATH")]
        path: Option<PathBuf>,

        /// Print the template to stdout instead of writing a file.
        #[arg(long)]
        stdout: bool,
    },

    /// Print the effective configuration as JSON.
    ///
    /// Defaults are filled in for everything the file leaves out.
    Show,

    /// List the configuration search paths and mark the active one.
    Path,
}

/// Execute config subcommands.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cmd: &ConfigCommands) -> Result<(), WinCtxError> {
    match cmd {
        ConfigCommands::Init { stdout: true, .. } => {
            println!("{}", generate_config_template());
            Ok(())
        }
        ConfigCommands::Init { force, path, .. } => init_config(*force, path.as_deref()),
        ConfigCommands::Show => show_config(),
        ConfigCommands::Path => {
            show_config_path();
            Ok(())
        }
    }
}

fn init_config(force: bool, custom_path: Option<&std::path::Path>) -> Result<(), WinCtxError> {
    let config_path = custom_path.map_or_else(
        || config_paths().into_iter().next().unwrap_or_else(|| PathBuf::from("config.jsonc")),
        resolve_cli_path,
    );

    if config_path.exists() && !force {
        return Err(WinCtxError::ConfigError(format!(
            "Configuration file already exists at: {}\nUse --force to overwrite.",
            config_path.display()
        )));
    }

    create_config_file(&config_path).map_err(|e| {
        WinCtxError::ConfigError(format!(
            "Failed to create config file {}: {e}",
            config_path.display()
        ))
    })?;

    println!("Configuration file created at: {}", config_path.display());
    println!("\nAll options are commented out by default.");
    println!("Edit the file and uncomment the options you want to configure.");
    Ok(())
}

fn show_config() -> Result<(), WinCtxError> {
    let config = config::get_config();
    match config::get_config_path() {
        Some(path) => eprintln!("{} {}", "Loaded from".dimmed(), path.display()),
        None => eprintln!("{}", "No configuration file found, showing defaults".dimmed()),
    }
    output::print_json(config)
}

fn show_config_path() {
    println!("Configuration file search paths (in priority order):\n");

    let mut found_config = false;
    for (i, path) in config_paths().iter().enumerate() {
        let exists = path.exists();
        let marker = if exists && !found_config {
            found_config = true;
            " (active)"
        } else if exists {
            " (exists)"
        } else {
            ""
        };
        println!("  {}. {}{}", i + 1, path.display(), marker);
    }

    if !found_config {
        println!("\nNo configuration file found.");
        println!("Run 'winctx config init' to create one.");
    }
}
