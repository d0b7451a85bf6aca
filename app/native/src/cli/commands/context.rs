//! Desktop session shared by the commands that drive the coordinator.
//!
//! A session loads the snapshot, builds a coordinator over it, refreshes
//! windows and audio, and restores pins from the settings file. Commands that
//! change the desktop call [`DesktopSession::finish`] to write it back.

use std::path::{Path, PathBuf};

use super::settings_cmd::open_store;
use crate::config;
use crate::desktop::{Coordinator, MonitorId, WindowHandle};
use crate::error::WinCtxError;
use crate::platform::SnapshotDesktop;
use crate::platform::path::resolve_cli_path;
use crate::settings::SettingsStore;

/// Coordinator over a snapshot desktop.
pub type SnapshotCoordinator = Coordinator<SnapshotDesktop, SnapshotDesktop>;

/// Where a session reads and writes its state.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub desktop: Option<PathBuf>,
    pub settings: Option<PathBuf>,
    pub dry_run: bool,
}

/// A loaded desktop plus the coordinator driving it.
pub struct DesktopSession {
    path: PathBuf,
    desktop: SnapshotDesktop,
    settings: SettingsStore,
    dry_run: bool,
    pub coordinator: SnapshotCoordinator,
}

impl DesktopSession {
    /// Loads the snapshot and refreshes all core state.
    ///
    /// An audio resync failure is logged and leaves the session without audio
    /// bindings, so window commands still work.
    ///
    /// # Errors
    ///
    /// Returns an error if no snapshot path was given, the snapshot cannot be
    /// loaded or window enumeration fails.
    pub fn open(options: &SessionOptions) -> Result<Self, WinCtxError> {
        let path = options.desktop.as_deref().map(resolve_cli_path).ok_or_else(|| {
            WinCtxError::InvalidArguments(
                "No desktop snapshot given. Pass --desktop PATH or set WINCTX_DESKTOP.".to_string(),
            )
        })?;

        let desktop = SnapshotDesktop::load(&path)?;
        let mut coordinator =
            Coordinator::with_config(desktop.clone(), desktop.clone(), config::get_config());
        coordinator.refresh_windows()?;
        if let Err(err) = coordinator.resync_audio() {
            tracing::warn!(error = %err, "audio sessions unavailable");
        }

        let settings = open_store(options.settings.as_deref());
        coordinator.apply_settings(settings.settings());

        Ok(Self { path, desktop, settings, dry_run: options.dry_run, coordinator })
    }

    pub fn path(&self) -> &Path { &self.path }

    /// Re-reads the snapshot file into the running desktop.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be read.
    pub fn reload(&self) -> Result<(), WinCtxError> {
        self.desktop.reload(&self.path)?;
        Ok(())
    }

    /// Persists the current pins. Returns whether the file changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file cannot be written.
    pub fn save_pins(&mut self) -> Result<bool, WinCtxError> {
        if self.dry_run {
            return Ok(false);
        }
        let pinned = self.coordinator.settings_snapshot(self.settings.settings()).pinned;
        Ok(self.settings.update(|settings| settings.pinned = pinned)?)
    }

    /// Writes the desktop back to the snapshot file unless this is a dry run.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    pub fn finish(self) -> Result<(), WinCtxError> {
        if self.dry_run {
            tracing::debug!("dry run, snapshot not written");
            return Ok(());
        }
        self.desktop.save(&self.path)?;
        Ok(())
    }

    /// Handles to operate on: the given ones, or every window.
    pub fn handles_or_all(&self, handles: &[WindowHandle]) -> Vec<WindowHandle> {
        if handles.is_empty() {
            self.coordinator.display_order().iter().map(|entry| entry.handle).collect()
        } else {
            handles.to_vec()
        }
    }

    /// Display label for a monitor id.
    pub fn monitor_label(&self, id: MonitorId) -> String {
        self.coordinator.monitors().get(id).map_or_else(|| id.to_string(), |m| m.display_name())
    }
}
