//! Command-line front end.
//!
//! Every command loads a desktop snapshot (`--desktop`), runs one coordinator
//! operation against it and, unless `--dry-run` is given, writes the result
//! back.

mod commands;
mod output;

use clap::Parser;
pub use commands::Cli;

use crate::error::WinCtxError;

/// Runs the CLI.
///
/// Parses command-line arguments and executes the appropriate command.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn run() -> Result<(), WinCtxError> {
    let cli = Cli::parse();
    cli.execute()
}
