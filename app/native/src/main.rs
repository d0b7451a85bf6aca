#![allow(clippy::multiple_crate_versions)]

//! winctx - window layout and per-application audio coordinator.
//!
//! Every invocation runs one CLI command against a desktop snapshot and exits.

fn main() {
    if let Err(err) = winctx_lib::cli::run() {
        eprintln!("winctx: {err}");
        std::process::exit(1);
    }
}
