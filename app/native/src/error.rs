//! Error types for winctx.
//!
//! This module provides the application-level error returned by the CLI. Core
//! coordinator failures keep their own taxonomy in [`crate::desktop::error`]
//! and are wrapped here when they reach the command layer.

use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::desktop::DesktopError;
use crate::platform::SnapshotError;
use crate::settings::SettingsError;

/// Errors that can occur during application execution.
///
/// Serializes as `{ "kind": ..., "message": ... }` so that `--json` output can
/// report failures in a structured way.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "kind", content = "message")]
pub enum WinCtxError {
    /// Invalid command arguments.
    #[error("{0}")]
    InvalidArguments(String),
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// Persisted settings could not be read or written.
    #[error("Settings error: {0}")]
    SettingsError(String),
    /// The desktop snapshot could not be read or written.
    #[error("{0}")]
    SnapshotError(String),
    /// IO error.
    #[error("IO error: {0}")]
    IoError(String),
    /// A coordinator operation failed.
    #[error("Desktop error: {0}")]
    DesktopError(String),
    /// Generic command error.
    #[error("{0}")]
    CommandError(String),
}

impl From<std::io::Error> for WinCtxError {
    fn from(err: std::io::Error) -> Self { Self::IoError(err.to_string()) }
}

impl From<serde_json::Error> for WinCtxError {
    fn from(err: serde_json::Error) -> Self { Self::CommandError(err.to_string()) }
}

impl From<ConfigError> for WinCtxError {
    fn from(err: ConfigError) -> Self { Self::ConfigError(err.to_string()) }
}

impl From<SettingsError> for WinCtxError {
    fn from(err: SettingsError) -> Self { Self::SettingsError(err.to_string()) }
}

impl From<SnapshotError> for WinCtxError {
    fn from(err: SnapshotError) -> Self { Self::SnapshotError(err.to_string()) }
}

impl From<DesktopError> for WinCtxError {
    fn from(err: DesktopError) -> Self { Self::DesktopError(err.to_string()) }
}

impl From<String> for WinCtxError {
    fn from(msg: String) -> Self { Self::CommandError(msg) }
}

impl From<&str> for WinCtxError {
    fn from(msg: &str) -> Self { Self::CommandError(msg.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desktop::{MonitorId, PolicyReason};

    #[test]
    fn test_invalid_arguments_display() {
        let err = WinCtxError::InvalidArguments("Use either --set or --adjust".to_string());
        assert_eq!(err.to_string(), "Use either --set or --adjust");
    }

    #[test]
    fn test_config_error_from_conversion() {
        let err: WinCtxError = ConfigError::NotFound.into();
        let msg = err.to_string();
        assert!(msg.starts_with("Configuration error"));
        assert!(msg.contains("No configuration file found"));
    }

    #[test]
    fn test_desktop_error_from_conversion() {
        let err: WinCtxError = DesktopError::MonitorNotFound(MonitorId(3)).into();
        assert_eq!(err.to_string(), "Desktop error: Monitor 3 not found");

        let err: WinCtxError = DesktopError::policy(PolicyReason::EmptySelection).into();
        assert!(err.to_string().contains("no windows selected"));
    }

    #[test]
    fn test_snapshot_error_from_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: WinCtxError = SnapshotError::Io(io_err).into();
        assert_eq!(err.to_string(), "Failed to access desktop snapshot: no such file");
    }

    #[test]
    fn test_io_error_from_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied");
        let err: WinCtxError = io_err.into();
        assert!(err.to_string().contains("IO error"));
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn test_from_str_and_string() {
        let err: WinCtxError = "boom".into();
        assert!(matches!(err, WinCtxError::CommandError(ref m) if m == "boom"));

        let err: WinCtxError = String::from("bang").into();
        assert_eq!(err.to_string(), "bang");
    }

    #[test]
    fn test_error_serializes_with_kind_and_message() {
        let err = WinCtxError::SettingsError("disk full".to_string());
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["kind"], "SettingsError");
        assert_eq!(json["message"], "disk full");
    }
}
