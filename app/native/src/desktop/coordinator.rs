//! Window layout and audio session coordinator.
//!
//! The coordinator owns every piece of core state: the monitor and window
//! snapshots, selection and pins, the audio session bridge and the placements
//! awaiting verification. All operations take `&mut self` and run on the
//! control thread; the only other thread is the optional resync ticker, which
//! communicates through a channel drained by [`Coordinator::poll_ticks`].
//!
//! Placement is a two-phase protocol. [`Coordinator::apply_layout`] validates
//! and issues the OS calls, recording what it asked for. A later
//! [`Coordinator::verify_placements`] refreshes the directory and reports what
//! the OS actually did.

use std::collections::HashMap;
use std::sync::mpsc::Receiver;

use serde::Serialize;

use super::audio::ticker::{self, ResyncTick};
use super::audio::{ActiveSession, AudioSessionBridge};
use super::error::{DesktopError, DesktopResult};
use super::geometry::Rect;
use super::layout::{self, LayoutMode, LayoutPlan, LayoutWindow, Placement};
use super::monitor::{Monitor, MonitorId, MonitorRegistry};
use super::platform::{AudioSystem, WindowSystem};
use super::selection::SelectionState;
use super::window::{EligibilityFilter, WindowDirectory, WindowEntry, WindowHandle, WindowState};
use crate::config::WinCtxConfig;
use crate::settings::Settings;

// ============================================================================
// Outcomes
// ============================================================================

/// Result of an audio command for one process.
#[derive(Debug, Clone)]
pub struct AudioOutcome<T> {
    pub pid: u32,
    pub result: DesktopResult<T>,
}

impl<T> AudioOutcome<T> {
    #[must_use]
    pub const fn is_ok(&self) -> bool { self.result.is_ok() }
}

/// What the OS did with an issued placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum PlacementOutcome {
    /// The window ended up where it was asked to be.
    Applied,
    /// The window exists but its bounds differ (e.g. the OS clamped them).
    Diverged { expected: Rect, actual: Rect },
    /// The window exists but its show state differs.
    StateDiverged { expected: WindowState, actual: WindowState },
    /// The window is no longer in the directory.
    Gone,
}

/// Verification result for one placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementReport {
    pub handle: WindowHandle,
    #[serde(flatten)]
    pub outcome: PlacementOutcome,
}

/// Display row for a window.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowSummary {
    #[serde(flatten)]
    pub entry: WindowEntry,
    pub pinned: bool,
    pub selected: bool,
    /// Process whose audio sessions represent this window.
    pub audio_pid: u32,
    pub session_count: usize,
    pub monitor_name: String,
}

// ============================================================================
// Coordinator
// ============================================================================

/// Owns core state and mediates every OS call.
pub struct Coordinator<W: WindowSystem, A: AudioSystem> {
    window_system: W,
    audio_system: A,
    monitors: MonitorRegistry,
    directory: WindowDirectory,
    selection: SelectionState,
    audio: AudioSessionBridge,
    filter: EligibilityFilter,
    minimum_size: i32,
    pending: Vec<Placement>,
    last_volume: HashMap<u32, f32>,
}

impl<W: WindowSystem, A: AudioSystem> Coordinator<W, A> {
    /// Creates a coordinator with the default configuration.
    ///
    /// Nothing is enumerated until the first refresh.
    pub fn new(window_system: W, audio_system: A) -> Self {
        Self::with_config(window_system, audio_system, &WinCtxConfig::default())
    }

    pub fn with_config(window_system: W, audio_system: A, config: &WinCtxConfig) -> Self {
        Self {
            window_system,
            audio_system,
            monitors: MonitorRegistry::new(),
            directory: WindowDirectory::new(),
            selection: SelectionState::new(),
            audio: AudioSessionBridge::new(),
            filter: EligibilityFilter::new(&config.windows.ignore),
            minimum_size: config.layout.minimum_size_px(),
            pending: Vec::new(),
            last_volume: HashMap::new(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub const fn monitors(&self) -> &MonitorRegistry { &self.monitors }

    pub const fn directory(&self) -> &WindowDirectory { &self.directory }

    pub const fn audio(&self) -> &AudioSessionBridge { &self.audio }

    pub const fn window_system(&self) -> &W { &self.window_system }

    pub const fn window_system_mut(&mut self) -> &mut W { &mut self.window_system }

    pub const fn audio_system(&self) -> &A { &self.audio_system }

    pub const fn audio_system_mut(&mut self) -> &mut A { &mut self.audio_system }

    /// Placements issued since the last verification.
    pub fn pending_placements(&self) -> &[Placement] { &self.pending }

    // ========================================================================
    // Refresh
    // ========================================================================

    pub fn refresh_monitors(&mut self) { self.monitors.refresh(&mut self.window_system); }

    /// Refreshes monitors, then windows, then prunes selection and pins.
    ///
    /// # Errors
    ///
    /// Returns `OsCallFailed` if window enumeration fails; the previous
    /// directory and selection are kept.
    pub fn refresh_windows(&mut self) -> DesktopResult<usize> {
        self.refresh_monitors();
        let count = self.directory.refresh(&mut self.window_system, &self.monitors, &self.filter)?;
        self.selection.retain_live(&self.directory);
        Ok(count)
    }

    /// Rebuilds the pid to session mapping.
    ///
    /// # Errors
    ///
    /// Returns `OsCallFailed` if session enumeration fails.
    pub fn resync_audio(&mut self) -> DesktopResult<usize> {
        let count = self.audio.resync(&mut self.audio_system)?;
        let audio = &self.audio;
        self.last_volume.retain(|pid, _| audio.has_session(*pid));
        Ok(count)
    }

    /// Drains pending ticks and performs at most one resync.
    ///
    /// Returns whether a resync ran.
    ///
    /// # Errors
    ///
    /// Returns `OsCallFailed` if the resync fails.
    pub fn poll_ticks(&mut self, ticks: &Receiver<ResyncTick>) -> DesktopResult<bool> {
        let pending = ticker::drain(ticks);
        if pending == 0 {
            return Ok(false);
        }
        tracing::trace!(coalesced = pending, "resync tick");
        self.resync_audio()?;
        Ok(true)
    }

    // ========================================================================
    // Layout
    // ========================================================================

    /// Computes and issues a layout for the given windows.
    ///
    /// With no `monitor`, the target is the monitor under the center of the
    /// first window. Maximized, minimized and fullscreen windows are restored
    /// before they are moved, and windows leaving fullscreen lose topmost. OS
    /// failures do not stop the remaining windows.
    ///
    /// # Errors
    ///
    /// Returns `WindowNotFound`/`MonitorNotFound` for stale references and
    /// `PolicyViolation` for invalid requests, both before any OS call.
    /// Returns the first `OsCallFailed` if any issued call failed.
    pub fn apply_layout(
        &mut self,
        handles: &[WindowHandle],
        monitor: Option<MonitorId>,
        mode: LayoutMode,
    ) -> DesktopResult<LayoutPlan> {
        let windows = handles
            .iter()
            .map(|&handle| {
                let entry = self.directory.get(handle)?;
                Ok(LayoutWindow { handle, bounds: entry.bounds })
            })
            .collect::<DesktopResult<Vec<_>>>()?;

        let target = self.target_monitor(monitor, windows.first())?.clone();
        let plan = layout::compute(&windows, &target, mode, self.minimum_size)?;

        tracing::info!(
            mode = %mode,
            monitor = %target.short_name(),
            windows = plan.len(),
            "applying layout"
        );

        let mut first_failure = None;
        for placement in plan.iter() {
            match self.issue(placement) {
                Ok(()) => {
                    // A newer placement supersedes any unverified one.
                    self.pending.retain(|pending| pending.handle != placement.handle);
                    self.pending.push(*placement);
                }
                Err(err) => {
                    tracing::warn!(handle = %placement.handle, error = %err, "placement failed");
                    first_failure.get_or_insert(err);
                }
            }
        }

        match first_failure {
            Some(err) => Err(err),
            None => Ok(plan),
        }
    }

    /// Applies a layout to the current selection, in selection order.
    ///
    /// # Errors
    ///
    /// Same as [`apply_layout`](Self::apply_layout); an empty selection is a
    /// policy violation.
    pub fn apply_layout_to_selection(
        &mut self,
        monitor: Option<MonitorId>,
        mode: LayoutMode,
    ) -> DesktopResult<LayoutPlan> {
        let handles = self.selection.selected().to_vec();
        self.apply_layout(&handles, monitor, mode)
    }

    fn target_monitor(
        &self,
        monitor: Option<MonitorId>,
        first: Option<&LayoutWindow>,
    ) -> DesktopResult<&Monitor> {
        match monitor {
            Some(id) => self.monitors.get(id).ok_or(DesktopError::MonitorNotFound(id)),
            None => Ok(first.map_or_else(
                || self.monitors.primary(),
                |window| self.monitors.containing(window.bounds.center()),
            )),
        }
    }

    fn issue(&mut self, placement: &Placement) -> DesktopResult<()> {
        let handle = placement.handle;
        let current = self.expected_state(handle)?;

        // Leaving fullscreen also drops the topmost presentation.
        if current == WindowState::Fullscreen && !placement.topmost {
            self.set_topmost(handle, false)?;
        }
        if let Some(rect) = placement.rect {
            if current != WindowState::Normal {
                self.directory.set_state(&mut self.window_system, handle, WindowState::Normal)?;
            }
            self.directory.move_and_resize(&mut self.window_system, handle, rect)?;
        }
        if placement.topmost {
            self.set_topmost(handle, true)?;
        }
        if let Some(state) = placement.state {
            self.directory.set_state(&mut self.window_system, handle, state)?;
        }

        tracing::debug!(%handle, rect = ?placement.rect, state = ?placement.state, "placement issued");
        Ok(())
    }

    /// State the window should be in: what an unverified placement asked for,
    /// else what the last refresh saw.
    fn expected_state(&self, handle: WindowHandle) -> DesktopResult<WindowState> {
        let entry = self.directory.get(handle)?;
        Ok(self
            .pending
            .iter()
            .find(|pending| pending.handle == handle)
            .map_or(entry.state, |pending| pending.state.unwrap_or(WindowState::Normal)))
    }

    fn set_topmost(&mut self, handle: WindowHandle, topmost: bool) -> DesktopResult<()> {
        self.window_system
            .set_topmost(handle, topmost)
            .map_err(|err| DesktopError::os_call("set_topmost", &err))
    }

    /// Refreshes the directory and compares it with the pending placements.
    ///
    /// Pending placements are cleared.
    ///
    /// # Errors
    ///
    /// Returns `OsCallFailed` if the refresh fails; pending placements are
    /// kept so verification can be retried.
    pub fn verify_placements(&mut self) -> DesktopResult<Vec<PlacementReport>> {
        self.refresh_windows()?;

        let reports: Vec<PlacementReport> = std::mem::take(&mut self.pending)
            .into_iter()
            .map(|placement| PlacementReport {
                handle: placement.handle,
                outcome: self.placement_outcome(&placement),
            })
            .collect();

        for report in &reports {
            if report.outcome != PlacementOutcome::Applied {
                tracing::debug!(handle = %report.handle, outcome = ?report.outcome, "placement not applied");
            }
        }
        Ok(reports)
    }

    fn placement_outcome(&self, placement: &Placement) -> PlacementOutcome {
        let Some(entry) = self.directory.find(placement.handle) else {
            return PlacementOutcome::Gone;
        };

        if let Some(expected) = placement.rect {
            if entry.bounds != expected {
                return PlacementOutcome::Diverged { expected, actual: entry.bounds };
            }
        }
        if let Some(expected) = placement.state {
            if entry.state != expected {
                return PlacementOutcome::StateDiverged { expected, actual: entry.state };
            }
        }
        PlacementOutcome::Applied
    }

    // ========================================================================
    // Windows
    // ========================================================================

    /// Minimizes a window, or maximizes it if it is already minimized.
    ///
    /// Returns the requested state.
    ///
    /// # Errors
    ///
    /// Returns `WindowNotFound` for stale handles and `OsCallFailed` if the
    /// request was rejected.
    pub fn toggle_minimize(&mut self, handle: WindowHandle) -> DesktopResult<WindowState> {
        let target = if self.directory.get(handle)?.is_minimized() {
            WindowState::Maximized
        } else {
            WindowState::Minimized
        };
        self.directory.set_state(&mut self.window_system, handle, target)?;
        tracing::info!(%handle, state = %target, "toggled minimize");
        Ok(target)
    }

    /// Restores (if minimized) and focuses a window.
    ///
    /// # Errors
    ///
    /// Returns `WindowNotFound` for stale handles and `OsCallFailed` if the
    /// request was rejected.
    pub fn focus_window(&mut self, handle: WindowHandle) -> DesktopResult<()> {
        self.directory.focus(&mut self.window_system, handle)
    }

    /// Display rows in display order (pinned first).
    pub fn window_summaries(&mut self) -> Vec<WindowSummary> {
        let entries: Vec<WindowEntry> =
            self.selection.display_order(&self.directory).into_iter().cloned().collect();

        entries
            .into_iter()
            .map(|entry| {
                let audio_pid = self.audio_pid(entry.pid);
                let monitor_name = self
                    .monitors
                    .get(entry.monitor)
                    .map_or_else(String::new, Monitor::short_name);
                WindowSummary {
                    pinned: self.selection.is_pinned(entry.handle),
                    selected: self.selection.is_selected(entry.handle),
                    session_count: self.audio.session_count(audio_pid),
                    audio_pid,
                    monitor_name,
                    entry,
                }
            })
            .collect()
    }

    // ========================================================================
    // Selection and Pins
    // ========================================================================

    pub fn selection(&self) -> &[WindowHandle] { self.selection.selected() }

    pub fn set_selection(&mut self, handles: &[WindowHandle]) {
        self.selection.set(&self.directory, handles);
    }

    /// # Errors
    ///
    /// Returns `WindowNotFound` for stale handles.
    pub fn toggle_selection(&mut self, handle: WindowHandle) -> DesktopResult<bool> {
        self.selection.toggle(&self.directory, handle)
    }

    pub fn select_all(&mut self) { self.selection.select_all(&self.directory); }

    pub fn select_none(&mut self) { self.selection.select_none(); }

    /// # Errors
    ///
    /// Returns `MonitorNotFound` for unknown monitors.
    pub fn select_on_monitor(&mut self, monitor: MonitorId) -> DesktopResult<()> {
        if self.monitors.get(monitor).is_none() {
            return Err(DesktopError::MonitorNotFound(monitor));
        }
        self.selection.select_on_monitor(&self.directory, monitor);
        Ok(())
    }

    /// Pins or unpins a window and returns whether it is now pinned.
    ///
    /// # Errors
    ///
    /// Returns `WindowNotFound` for stale handles.
    pub fn toggle_pin(&mut self, handle: WindowHandle) -> DesktopResult<bool> {
        let pinned = self.selection.toggle_pin(&self.directory, handle)?;
        tracing::info!(%handle, pinned, "toggled pin");
        Ok(pinned)
    }

    #[must_use]
    pub fn is_pinned(&self, handle: WindowHandle) -> bool { self.selection.is_pinned(handle) }

    pub fn display_order(&self) -> Vec<&WindowEntry> { self.selection.display_order(&self.directory) }

    /// Restores pinned identities from persisted settings.
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.selection.restore(&settings.pinned);
        self.selection.retain_live(&self.directory);
    }

    /// Copy of `base` with the current pinned identities.
    #[must_use]
    pub fn settings_snapshot(&self, base: &Settings) -> Settings {
        Settings { pinned: self.selection.identities(), ..base.clone() }
    }

    // ========================================================================
    // Audio
    // ========================================================================

    /// The process whose sessions represent a window's owner.
    ///
    /// Multi-process applications often play audio from a child process, so
    /// when the owner has no session the first descendant with one is used.
    pub fn audio_pid(&mut self, pid: u32) -> u32 {
        if self.audio.has_session(pid) {
            return pid;
        }
        self.window_system
            .child_processes(pid)
            .into_iter()
            .find(|child| self.audio.has_session(*child))
            .unwrap_or(pid)
    }

    pub fn active_sessions(&self) -> impl Iterator<Item = ActiveSession> + '_ {
        self.audio.list_active()
    }

    /// Mutes or unmutes every session of each process.
    pub fn set_mute(&mut self, pids: &[u32], mute: bool) -> Vec<AudioOutcome<()>> {
        let outcomes: Vec<AudioOutcome<()>> = pids
            .iter()
            .map(|&pid| AudioOutcome { pid, result: self.audio.set_mute(pid, mute) })
            .collect();
        tracing::info!(
            mute,
            requested = pids.len(),
            applied = outcomes.iter().filter(|o| o.is_ok()).count(),
            "mute command"
        );
        outcomes
    }

    /// Sets every session of each process to the same volume.
    pub fn set_volume(&mut self, pids: &[u32], volume: f32) -> Vec<AudioOutcome<f32>> {
        pids.iter().map(|&pid| self.set_volume_one(pid, volume)).collect()
    }

    /// Moves each process's volume by `delta`.
    ///
    /// The delta applies to the last volume set through the coordinator, or
    /// to the live volume on first use.
    pub fn adjust_volume(&mut self, pids: &[u32], delta: f32) -> Vec<AudioOutcome<f32>> {
        pids.iter()
            .map(|&pid| {
                let base = match self.last_volume.get(&pid) {
                    Some(&volume) => Ok(volume),
                    None => self.audio.get_volume(pid),
                };
                match base {
                    Ok(base) => self.set_volume_one(pid, base + delta),
                    Err(err) => AudioOutcome { pid, result: Err(err) },
                }
            })
            .collect()
    }

    fn set_volume_one(&mut self, pid: u32, volume: f32) -> AudioOutcome<f32> {
        let result = self.audio.set_volume(pid, volume);
        if let Ok(applied) = result {
            self.last_volume.insert(pid, applied);
            tracing::info!(pid, volume = applied, "volume set");
        }
        AudioOutcome { pid, result }
    }

    /// Mutes the audio of the selected windows, or the system endpoint when
    /// nothing is selected.
    ///
    /// # Errors
    ///
    /// Returns `OsCallFailed` if the system endpoint rejects the change.
    pub fn mute_selection(&mut self, mute: bool) -> DesktopResult<Vec<AudioOutcome<()>>> {
        let owners: Vec<u32> = self
            .selection
            .selected()
            .iter()
            .filter_map(|&handle| self.directory.find(handle).map(|entry| entry.pid))
            .collect();

        if owners.is_empty() {
            AudioSessionBridge::set_system_mute(&mut self.audio_system, mute)?;
            tracing::info!(mute, "system endpoint mute");
            return Ok(Vec::new());
        }

        let mut pids = Vec::with_capacity(owners.len());
        for owner in owners {
            let pid = self.audio_pid(owner);
            if !pids.contains(&pid) {
                pids.push(pid);
            }
        }
        Ok(self.set_mute(&pids, mute))
    }

    /// # Errors
    ///
    /// Returns `OsCallFailed` if the endpoint is unavailable.
    pub fn system_mute(&mut self) -> DesktopResult<bool> {
        AudioSessionBridge::system_mute(&mut self.audio_system)
    }

    /// # Errors
    ///
    /// Returns `OsCallFailed` if the endpoint rejects the change.
    pub fn set_system_mute(&mut self, mute: bool) -> DesktopResult<()> {
        AudioSessionBridge::set_system_mute(&mut self.audio_system, mute)
    }

    /// # Errors
    ///
    /// Returns `OsCallFailed` if the endpoint is unavailable.
    pub fn system_volume(&mut self) -> DesktopResult<f32> {
        AudioSessionBridge::system_volume(&mut self.audio_system)
    }

    /// # Errors
    ///
    /// Returns `PolicyViolation` for non-finite values and `OsCallFailed` if
    /// the endpoint rejects the change.
    pub fn set_system_volume(&mut self, volume: f32) -> DesktopResult<f32> {
        AudioSessionBridge::set_system_volume(&mut self.audio_system, volume)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;
    use crate::desktop::PolicyReason;
    use crate::desktop::platform::{MonitorRecord, WindowRecord};
    use crate::desktop::window::WindowIdentity;
    use crate::platform::snapshot::{DesktopCommand, DesktopSnapshot, SessionState, SnapshotDesktop};

    const WORK_AREA: Rect = Rect::new(0, 0, 1920, 1040);

    fn window(handle: u64, title: &str, pid: u32, bounds: Rect) -> WindowRecord {
        WindowRecord {
            handle: WindowHandle(handle),
            title: title.to_string(),
            pid,
            executable: format!("C:\\Apps\\{}.exe", title.to_lowercase()),
            bounds,
            visible: true,
            cloaked: false,
            state: WindowState::Normal,
            tool_window: false,
        }
    }

    fn desktop() -> SnapshotDesktop {
        SnapshotDesktop::new(DesktopSnapshot {
            monitors: vec![MonitorRecord {
                id: MonitorId(1),
                bounds: Rect::new(0, 0, 1920, 1080),
                work_area: WORK_AREA,
                primary: true,
            }],
            windows: vec![
                window(1, "Editor", 100, Rect::new(10, 10, 810, 610)),
                window(2, "Browser", 200, Rect::new(100, 100, 900, 700)),
                window(3, "Terminal", 300, Rect::new(200, 200, 1000, 800)),
            ],
            sessions: vec![
                SessionState::new(200, "Browser", false, 0.5),
                SessionState::new(301, "Terminal bell", false, 1.0),
            ],
            children: [(300, vec![301])].into_iter().collect(),
            own_pid: Some(1),
            ..DesktopSnapshot::default()
        })
    }

    fn coordinator(desktop: &SnapshotDesktop) -> Coordinator<SnapshotDesktop, SnapshotDesktop> {
        let mut coordinator = Coordinator::new(desktop.clone(), desktop.clone());
        coordinator.refresh_windows().unwrap();
        coordinator.resync_audio().unwrap();
        coordinator
    }

    // ========================================================================
    // Layout
    // ========================================================================

    #[test]
    fn test_apply_layout_moves_windows_and_records_pending() {
        let desktop = desktop();
        let mut coordinator = coordinator(&desktop);

        let plan = coordinator
            .apply_layout(&[WindowHandle(1), WindowHandle(2)], None, LayoutMode::SplitHorizontal)
            .unwrap();

        assert_eq!(plan.monitor, MonitorId(1));
        assert_eq!(coordinator.pending_placements().len(), 2);
        assert_eq!(desktop.window(WindowHandle(1)).unwrap().bounds, Rect::new(0, 0, 960, 1040));
        assert_eq!(desktop.window(WindowHandle(2)).unwrap().bounds, Rect::new(960, 0, 1920, 1040));
    }

    #[test]
    fn test_apply_layout_rejects_before_any_os_call() {
        let desktop = desktop();
        let mut coordinator = coordinator(&desktop);

        let err = coordinator
            .apply_layout(&[WindowHandle(1)], None, LayoutMode::SplitHorizontal)
            .unwrap_err();

        assert_eq!(err.policy_reason(), Some(&PolicyReason::SplitNeedsTwo { count: 1 }));
        assert!(desktop.commands().is_empty());
        assert!(coordinator.pending_placements().is_empty());
    }

    #[test]
    fn test_apply_layout_unknown_handle_and_monitor() {
        let desktop = desktop();
        let mut coordinator = coordinator(&desktop);

        let err = coordinator.apply_layout(&[WindowHandle(9)], None, LayoutMode::Center).unwrap_err();
        assert!(matches!(err, DesktopError::WindowNotFound(WindowHandle(9))));

        let err = coordinator
            .apply_layout(&[WindowHandle(1)], Some(MonitorId(5)), LayoutMode::Center)
            .unwrap_err();
        assert!(matches!(err, DesktopError::MonitorNotFound(MonitorId(5))));
        assert!(desktop.commands().is_empty());
    }

    #[test]
    fn test_apply_layout_restores_maximized_before_move() {
        let desktop = desktop();
        let mut coordinator = coordinator(&desktop);
        coordinator.window_system_mut().set_state(WindowHandle(1), WindowState::Maximized).unwrap();
        coordinator.refresh_windows().unwrap();

        coordinator.apply_layout(&[WindowHandle(1)], None, LayoutMode::SnapLeft).unwrap();

        let commands = desktop.commands();
        assert_eq!(
            &commands[1..],
            &[
                DesktopCommand::SetState { handle: WindowHandle(1), state: WindowState::Normal },
                DesktopCommand::MoveAndResize {
                    handle: WindowHandle(1),
                    rect: Rect::new(0, 0, 960, 1040)
                },
            ]
        );
    }

    #[test]
    fn test_apply_layout_continues_after_os_failure() {
        let desktop = desktop();
        let mut coordinator = coordinator(&desktop);
        desktop.set_failing("move_and_resize", true);

        let err = coordinator
            .apply_layout(&[WindowHandle(1), WindowHandle(2)], None, LayoutMode::SplitVertical)
            .unwrap_err();

        assert!(err.is_os_failure());
        assert!(coordinator.pending_placements().is_empty());
    }

    #[test]
    fn test_fullscreen_sets_topmost() {
        let desktop = desktop();
        let mut coordinator = coordinator(&desktop);

        coordinator.apply_layout(&[WindowHandle(3)], None, LayoutMode::Fullscreen).unwrap();

        assert!(desktop.is_topmost(WindowHandle(3)));
        assert_eq!(desktop.window(WindowHandle(3)).unwrap().state, WindowState::Fullscreen);
    }

    #[test]
    fn test_layout_after_fullscreen_restores_and_drops_topmost() {
        let desktop = desktop();
        let mut coordinator = coordinator(&desktop);
        coordinator.apply_layout(&[WindowHandle(1)], None, LayoutMode::Fullscreen).unwrap();
        coordinator.refresh_windows().unwrap();

        coordinator.apply_layout(&[WindowHandle(1)], None, LayoutMode::SnapLeft).unwrap();

        let editor = desktop.window(WindowHandle(1)).unwrap();
        assert_eq!(editor.state, WindowState::Normal);
        assert_eq!(editor.bounds, Rect::new(0, 0, 960, 1040));
        assert!(!desktop.is_topmost(WindowHandle(1)));

        let reports = coordinator.verify_placements().unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].outcome, PlacementOutcome::Applied);
    }

    #[test]
    fn test_restore_after_fullscreen_drops_topmost() {
        let desktop = desktop();
        let mut coordinator = coordinator(&desktop);
        coordinator.apply_layout(&[WindowHandle(1)], None, LayoutMode::Fullscreen).unwrap();
        coordinator.refresh_windows().unwrap();

        coordinator.apply_layout(&[WindowHandle(1)], None, LayoutMode::Restore).unwrap();

        assert_eq!(desktop.window(WindowHandle(1)).unwrap().state, WindowState::Normal);
        assert!(!desktop.is_topmost(WindowHandle(1)));
    }

    #[test]
    fn test_newer_placement_replaces_unverified_one() {
        let desktop = desktop();
        let mut coordinator = coordinator(&desktop);

        // No refresh in between: the pending fullscreen request is what counts.
        coordinator.apply_layout(&[WindowHandle(1)], None, LayoutMode::Fullscreen).unwrap();
        coordinator.apply_layout(&[WindowHandle(1)], None, LayoutMode::SnapRight).unwrap();
        assert_eq!(coordinator.pending_placements().len(), 1);

        let reports = coordinator.verify_placements().unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].outcome, PlacementOutcome::Applied);
        assert_eq!(desktop.window(WindowHandle(1)).unwrap().state, WindowState::Normal);
        assert!(!desktop.is_topmost(WindowHandle(1)));
    }

    #[test]
    fn test_apply_layout_to_empty_selection() {
        let desktop = desktop();
        let mut coordinator = coordinator(&desktop);

        let err = coordinator.apply_layout_to_selection(None, LayoutMode::Maximize).unwrap_err();
        assert_eq!(err.policy_reason(), Some(&PolicyReason::EmptySelection));
    }

    // ========================================================================
    // Verification
    // ========================================================================

    #[test]
    fn test_verify_reports_applied_and_gone() {
        let desktop = desktop();
        let mut coordinator = coordinator(&desktop);
        coordinator
            .apply_layout(&[WindowHandle(1), WindowHandle(2)], None, LayoutMode::SplitVertical)
            .unwrap();
        desktop.remove_window(WindowHandle(2));

        let reports = coordinator.verify_placements().unwrap();

        assert_eq!(reports[0].outcome, PlacementOutcome::Applied);
        assert_eq!(reports[1].outcome, PlacementOutcome::Gone);
        assert!(coordinator.pending_placements().is_empty());
    }

    #[test]
    fn test_verify_keeps_pending_when_refresh_fails() {
        let desktop = desktop();
        let mut coordinator = coordinator(&desktop);
        coordinator.apply_layout(&[WindowHandle(1)], None, LayoutMode::Center).unwrap();
        desktop.set_failing("windows", true);

        assert!(coordinator.verify_placements().is_err());
        assert_eq!(coordinator.pending_placements().len(), 1);
    }

    #[test]
    fn test_verify_reports_state_divergence() {
        let desktop = desktop();
        let mut coordinator = coordinator(&desktop);
        coordinator.apply_layout(&[WindowHandle(1)], None, LayoutMode::Minimize).unwrap();
        coordinator.window_system_mut().set_state(WindowHandle(1), WindowState::Normal).unwrap();

        let reports = coordinator.verify_placements().unwrap();
        assert_eq!(
            reports[0].outcome,
            PlacementOutcome::StateDiverged {
                expected: WindowState::Minimized,
                actual: WindowState::Normal
            }
        );
    }

    // ========================================================================
    // Windows and Pins
    // ========================================================================

    #[test]
    fn test_toggle_minimize() {
        let desktop = desktop();
        let mut coordinator = coordinator(&desktop);

        assert_eq!(coordinator.toggle_minimize(WindowHandle(1)).unwrap(), WindowState::Minimized);
        coordinator.refresh_windows().unwrap();
        assert_eq!(coordinator.toggle_minimize(WindowHandle(1)).unwrap(), WindowState::Maximized);
    }

    #[test]
    fn test_focus_window() {
        let desktop = desktop();
        let mut coordinator = coordinator(&desktop);

        coordinator.focus_window(WindowHandle(2)).unwrap();
        assert_eq!(desktop.foreground(), Some(WindowHandle(2)));
    }

    #[test]
    fn test_refresh_prunes_selection() {
        let desktop = desktop();
        let mut coordinator = coordinator(&desktop);
        coordinator.set_selection(&[WindowHandle(1), WindowHandle(2)]);

        desktop.remove_window(WindowHandle(1));
        coordinator.refresh_windows().unwrap();

        assert_eq!(coordinator.selection(), &[WindowHandle(2)]);
    }

    #[test]
    fn test_pins_round_trip_through_settings() {
        let desktop = desktop();
        let mut coordinator = coordinator(&desktop);
        assert!(coordinator.toggle_pin(WindowHandle(3)).unwrap());

        let saved = coordinator.settings_snapshot(&Settings::default());
        assert_eq!(saved.pinned, vec![WindowIdentity::new("C:\\Apps\\terminal.exe", "Terminal")]);

        let mut restored = Coordinator::new(desktop.clone(), desktop.clone());
        restored.refresh_windows().unwrap();
        restored.apply_settings(&saved);

        assert!(restored.is_pinned(WindowHandle(3)));
        assert_eq!(restored.display_order()[0].handle, WindowHandle(3));
    }

    #[test]
    fn test_select_on_unknown_monitor() {
        let desktop = desktop();
        let mut coordinator = coordinator(&desktop);

        assert!(coordinator.select_on_monitor(MonitorId(4)).unwrap_err().is_not_found());
        coordinator.select_on_monitor(MonitorId(1)).unwrap();
        assert_eq!(coordinator.selection().len(), 3);
    }

    #[test]
    fn test_window_summaries_resolve_audio_pid() {
        let desktop = desktop();
        let mut coordinator = coordinator(&desktop);

        let summaries = coordinator.window_summaries();
        let terminal = summaries.iter().find(|s| s.entry.handle == WindowHandle(3)).unwrap();

        assert_eq!(terminal.audio_pid, 301);
        assert_eq!(terminal.session_count, 1);
        assert_eq!(terminal.monitor_name, "Display 1 ★");
    }

    // ========================================================================
    // Audio
    // ========================================================================

    #[test]
    fn test_adjust_volume_uses_last_value() {
        let desktop = desktop();
        let mut coordinator = coordinator(&desktop);

        coordinator.adjust_volume(&[200], 0.1);
        let outcomes = coordinator.adjust_volume(&[200], 0.1);

        let volume = *outcomes[0].result.as_ref().unwrap();
        assert!((volume - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_set_mute_reports_per_pid() {
        let desktop = desktop();
        let mut coordinator = coordinator(&desktop);

        let outcomes = coordinator.set_mute(&[200, 999], true);

        assert!(outcomes[0].is_ok());
        assert!(matches!(outcomes[1].result, Err(DesktopError::NoActiveSession(999))));
        assert!(desktop.sessions_of(200)[0].muted);
    }

    #[test]
    fn test_mute_selection_uses_child_sessions() {
        let desktop = desktop();
        let mut coordinator = coordinator(&desktop);
        coordinator.set_selection(&[WindowHandle(3)]);

        let outcomes = coordinator.mute_selection(true).unwrap();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].pid, 301);
        assert!(desktop.sessions_of(301)[0].muted);
    }

    #[test]
    fn test_mute_selection_falls_back_to_system() {
        let desktop = desktop();
        let mut coordinator = coordinator(&desktop);

        assert!(coordinator.mute_selection(true).unwrap().is_empty());
        assert!(coordinator.system_mute().unwrap());
    }

    #[test]
    fn test_poll_ticks_coalesces() {
        let desktop = desktop();
        let mut coordinator = coordinator(&desktop);
        let (tx, rx) = mpsc::channel();

        assert!(!coordinator.poll_ticks(&rx).unwrap());

        desktop.add_session(SessionState::new(100, "Editor", false, 1.0));
        tx.send(ResyncTick).unwrap();
        tx.send(ResyncTick).unwrap();

        assert!(coordinator.poll_ticks(&rx).unwrap());
        assert!(coordinator.audio().has_session(100));
        assert!(!coordinator.poll_ticks(&rx).unwrap());
    }

    #[test]
    fn test_resync_forgets_volume_of_exited_process() {
        let desktop = desktop();
        let mut coordinator = coordinator(&desktop);
        coordinator.set_volume(&[200], 0.9);

        desktop.remove_sessions(200);
        coordinator.resync_audio().unwrap();
        desktop.add_session(SessionState::new(200, "Browser", false, 0.2));
        coordinator.resync_audio().unwrap();

        let outcomes = coordinator.adjust_volume(&[200], 0.1);
        let volume = *outcomes[0].result.as_ref().unwrap();
        assert!((volume - 0.3).abs() < 1e-6);
    }
}
