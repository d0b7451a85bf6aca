//! winctx - window layout and per-application audio session coordinator.
//!
//! The [`desktop`] module holds the platform-agnostic core: monitor and window
//! snapshots, selection and pins, the layout engine, the audio session bridge
//! and the [`desktop::Coordinator`] that ties them together. The OS is reached
//! through traits; [`platform::snapshot`] implements them over a JSON
//! description of a desktop, which is what the [`cli`] drives.

pub mod cli;
pub mod config;
pub mod constants;
pub mod desktop;
pub mod error;
pub mod logging;
pub mod platform;
pub mod settings;
