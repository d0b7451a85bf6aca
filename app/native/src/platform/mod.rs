//! Platform glue: thread helpers, path expansion and the snapshot desktop.
//!
//! - [`snapshot`] - JSON-backed [`WindowSystem`](crate::desktop::WindowSystem)
//!   and [`AudioSystem`](crate::desktop::AudioSystem)
//! - [`path`] - Tilde expansion for command-line paths
//! - [`thread`] - Named background threads

pub mod path;
pub mod snapshot;
pub mod thread;

pub use snapshot::{DesktopSnapshot, SnapshotDesktop, SnapshotError};
pub use thread::spawn_named_thread;
