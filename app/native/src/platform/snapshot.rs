//! Desktop described by a JSON snapshot.
//!
//! [`SnapshotDesktop`] implements both OS collaborators in memory: window
//! commands mutate the recorded windows, session controls mutate the recorded
//! sessions, and every window command is appended to a command log. The CLI
//! loads a snapshot, runs one command and writes the result back; tests build
//! snapshots inline.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::desktop::{
    AudioSystem, MonitorRecord, PlatformError, PlatformResult, Rect, SessionControl,
    SessionRecord, WindowHandle, WindowRecord, WindowState, WindowSystem,
};

// ============================================================================
// Document
// ============================================================================

/// One audio session in a snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub pid: u32,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub muted: bool,
    #[serde(default = "full_volume")]
    pub volume: f32,
    /// Every read and write on this session fails.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unavailable: bool,
}

impl SessionState {
    #[must_use]
    pub fn new(pid: u32, display_name: impl Into<String>, muted: bool, volume: f32) -> Self {
        Self { pid, display_name: display_name.into(), muted, volume, unavailable: false }
    }
}

const fn full_volume() -> f32 { 1.0 }

/// Serialized form of a desktop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DesktopSnapshot {
    pub monitors: Vec<MonitorRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virtual_screen: Option<Rect>,
    /// Windows in z-order, topmost first.
    pub windows: Vec<WindowRecord>,
    pub sessions: Vec<SessionState>,
    /// Child processes by parent pid.
    pub children: BTreeMap<u32, Vec<u32>>,
    pub system_mute: bool,
    pub system_volume: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub own_pid: Option<u32>,
    /// Keep windows inside the work area: moves are clamped and fullscreen
    /// covers only the work area.
    pub clamp_to_work_area: bool,
    /// Operations that fail with a platform error.
    pub failing: BTreeSet<String>,
    pub topmost: BTreeSet<WindowHandle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground: Option<WindowHandle>,
}

impl Default for DesktopSnapshot {
    fn default() -> Self {
        Self {
            monitors: Vec::new(),
            virtual_screen: None,
            windows: Vec::new(),
            sessions: Vec::new(),
            children: BTreeMap::new(),
            system_mute: false,
            system_volume: full_volume(),
            own_pid: None,
            clamp_to_work_area: false,
            failing: BTreeSet::new(),
            topmost: BTreeSet::new(),
            foreground: None,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors reading or writing a snapshot file.
#[derive(Debug)]
pub enum SnapshotError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "Failed to access desktop snapshot: {err}"),
            Self::Parse(err) => write!(f, "Invalid desktop snapshot: {err}"),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for SnapshotError {
    fn from(err: std::io::Error) -> Self { Self::Io(err) }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(err: serde_json::Error) -> Self { Self::Parse(err) }
}

// ============================================================================
// Desktop
// ============================================================================

/// A window command accepted by the snapshot desktop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DesktopCommand {
    MoveAndResize { handle: WindowHandle, rect: Rect },
    SetState { handle: WindowHandle, state: WindowState },
    SetTopmost { handle: WindowHandle, topmost: bool },
    Focus(WindowHandle),
}

type SharedSession = Arc<Mutex<SessionState>>;

/// In-memory [`WindowSystem`] and [`AudioSystem`].
///
/// Clones share state, so one desktop can serve as both collaborators of a
/// coordinator while the caller keeps a handle for inspection and saving.
#[derive(Debug, Clone, Default)]
pub struct SnapshotDesktop {
    inner: Arc<Mutex<DesktopState>>,
}

#[derive(Debug, Default)]
struct DesktopState {
    document: DesktopSnapshot,
    // Shared with the controls handed out by `sessions()`.
    sessions: Vec<SharedSession>,
    commands: Vec<DesktopCommand>,
}

impl SnapshotDesktop {
    #[must_use]
    pub fn new(document: DesktopSnapshot) -> Self {
        Self { inner: Arc::new(Mutex::new(DesktopState::new(document))) }
    }

    /// Reads a snapshot file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid snapshot.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> { Ok(Self::new(read_document(path)?)) }

    /// Replaces the state of this desktop and all of its clones with the file
    /// contents. The command log is cleared.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid snapshot;
    /// the current state is kept.
    pub fn reload(&self, path: &Path) -> Result<(), SnapshotError> {
        let document = read_document(path)?;
        *self.inner.lock() = DesktopState::new(document);
        Ok(())
    }

    /// Writes the current state back to a snapshot file.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be serialized or written.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let content = serde_json::to_string_pretty(&self.snapshot())?;
        std::fs::write(path, content)?;
        tracing::debug!(path = %path.display(), "saved desktop snapshot");
        Ok(())
    }

    /// Current state as a document.
    #[must_use]
    pub fn snapshot(&self) -> DesktopSnapshot {
        let state = self.inner.lock();
        let mut document = state.document.clone();
        document.sessions = state.sessions.iter().map(|session| session.lock().clone()).collect();
        document
    }

    /// Window commands accepted so far, in order.
    #[must_use]
    pub fn commands(&self) -> Vec<DesktopCommand> { self.inner.lock().commands.clone() }

    #[must_use]
    pub fn window(&self, handle: WindowHandle) -> Option<WindowRecord> {
        self.inner.lock().document.windows.iter().find(|window| window.handle == handle).cloned()
    }

    #[must_use]
    pub fn is_topmost(&self, handle: WindowHandle) -> bool {
        self.inner.lock().document.topmost.contains(&handle)
    }

    #[must_use]
    pub fn foreground(&self) -> Option<WindowHandle> { self.inner.lock().document.foreground }

    /// Session states for a pid, in enumeration order.
    #[must_use]
    pub fn sessions_of(&self, pid: u32) -> Vec<SessionState> {
        self.inner
            .lock()
            .sessions
            .iter()
            .map(|session| session.lock().clone())
            .filter(|session| session.pid == pid)
            .collect()
    }

    pub fn add_window(&self, window: WindowRecord) { self.inner.lock().document.windows.push(window); }

    pub fn remove_window(&self, handle: WindowHandle) {
        self.inner.lock().document.windows.retain(|window| window.handle != handle);
    }

    pub fn add_session(&self, session: SessionState) {
        self.inner.lock().sessions.push(Arc::new(Mutex::new(session)));
    }

    /// Drops every session of a pid, as when the process exits.
    pub fn remove_sessions(&self, pid: u32) {
        self.inner.lock().sessions.retain(|session| session.lock().pid != pid);
    }

    /// Makes an operation fail (or succeed again).
    pub fn set_failing(&self, operation: &str, failing: bool) {
        let mut state = self.inner.lock();
        if failing {
            state.document.failing.insert(operation.to_string());
        } else {
            state.document.failing.remove(operation);
        }
    }

    /// Runs `f` on the state unless `operation` is marked as failing.
    fn with<T>(
        &self,
        operation: &str,
        f: impl FnOnce(&mut DesktopState) -> PlatformResult<T>,
    ) -> PlatformResult<T> {
        let mut state = self.inner.lock();
        if state.document.failing.contains(operation) {
            return Err(PlatformError::new(format!("{operation} unavailable")));
        }
        f(&mut state)
    }
}

fn read_document(path: &Path) -> Result<DesktopSnapshot, SnapshotError> {
    let content = std::fs::read_to_string(path)?;
    let document: DesktopSnapshot = serde_json::from_str(&content)?;
    tracing::debug!(
        path = %path.display(),
        windows = document.windows.len(),
        sessions = document.sessions.len(),
        "loaded desktop snapshot"
    );
    Ok(document)
}

impl DesktopState {
    fn new(mut document: DesktopSnapshot) -> Self {
        let sessions =
            document.sessions.drain(..).map(|session| Arc::new(Mutex::new(session))).collect();
        Self { document, sessions, commands: Vec::new() }
    }

    fn window_mut(&mut self, handle: WindowHandle) -> PlatformResult<&mut WindowRecord> {
        self.document
            .windows
            .iter_mut()
            .find(|window| window.handle == handle)
            .ok_or_else(|| PlatformError::new(format!("invalid window handle {handle}")))
    }

    /// Monitor under the center of `rect`, or the first monitor.
    fn monitor_at(&self, rect: &Rect) -> Option<&MonitorRecord> {
        let center = rect.center();
        self.document
            .monitors
            .iter()
            .find(|monitor| monitor.bounds.contains_point(center))
            .or_else(|| self.document.monitors.first())
    }
}

impl WindowSystem for SnapshotDesktop {
    fn windows(&mut self) -> PlatformResult<Vec<WindowRecord>> {
        self.with("windows", |state| Ok(state.document.windows.clone()))
    }

    fn monitors(&mut self) -> PlatformResult<Vec<MonitorRecord>> {
        self.with("monitors", |state| Ok(state.document.monitors.clone()))
    }

    fn virtual_screen(&mut self) -> PlatformResult<Rect> {
        self.with("virtual_screen", |state| {
            state.document.virtual_screen.ok_or_else(|| PlatformError::new("no virtual screen recorded"))
        })
    }

    fn move_and_resize(&mut self, handle: WindowHandle, rect: Rect) -> PlatformResult<()> {
        self.with("move_and_resize", |state| {
            let applied = match state.monitor_at(&rect) {
                Some(monitor) if state.document.clamp_to_work_area => {
                    rect.clamp_within(&monitor.work_area)
                }
                _ => rect,
            };
            state.window_mut(handle)?.bounds = applied;
            state.commands.push(DesktopCommand::MoveAndResize { handle, rect });
            Ok(())
        })
    }

    fn set_state(&mut self, handle: WindowHandle, target: WindowState) -> PlatformResult<()> {
        self.with("set_state", |state| {
            let bounds = state.window_mut(handle)?.bounds;
            let clamp = state.document.clamp_to_work_area;
            let resized = state.monitor_at(&bounds).map(|monitor| match target {
                WindowState::Maximized => monitor.work_area,
                WindowState::Fullscreen if clamp => monitor.work_area,
                WindowState::Fullscreen => monitor.bounds,
                WindowState::Normal | WindowState::Minimized => bounds,
            });

            let window = state.window_mut(handle)?;
            window.state = target;
            if let Some(bounds) = resized {
                window.bounds = bounds;
            }
            state.commands.push(DesktopCommand::SetState { handle, state: target });
            Ok(())
        })
    }

    fn set_topmost(&mut self, handle: WindowHandle, topmost: bool) -> PlatformResult<()> {
        self.with("set_topmost", |state| {
            state.window_mut(handle)?;
            if topmost {
                state.document.topmost.insert(handle);
            } else {
                state.document.topmost.remove(&handle);
            }
            state.commands.push(DesktopCommand::SetTopmost { handle, topmost });
            Ok(())
        })
    }

    fn focus(&mut self, handle: WindowHandle) -> PlatformResult<()> {
        self.with("focus", |state| {
            state.window_mut(handle)?;
            state.document.foreground = Some(handle);
            state.commands.push(DesktopCommand::Focus(handle));
            Ok(())
        })
    }

    fn child_processes(&mut self, pid: u32) -> Vec<u32> {
        self.inner.lock().document.children.get(&pid).cloned().unwrap_or_default()
    }

    fn own_process_id(&self) -> u32 {
        self.inner.lock().document.own_pid.unwrap_or_else(std::process::id)
    }
}

impl AudioSystem for SnapshotDesktop {
    fn sessions(&mut self) -> PlatformResult<Vec<SessionRecord>> {
        self.with("sessions", |state| {
            Ok(state
                .sessions
                .iter()
                .map(|shared| {
                    let session = shared.lock();
                    SessionRecord {
                        pid: session.pid,
                        display_name: session.display_name.clone(),
                        control: Box::new(SnapshotSession { state: Arc::clone(shared) }),
                    }
                })
                .collect())
        })
    }

    fn system_mute(&mut self) -> PlatformResult<bool> {
        self.with("system_mute", |state| Ok(state.document.system_mute))
    }

    fn set_system_mute(&mut self, mute: bool) -> PlatformResult<()> {
        self.with("set_system_mute", |state| {
            state.document.system_mute = mute;
            Ok(())
        })
    }

    fn system_volume(&mut self) -> PlatformResult<f32> {
        self.with("system_volume", |state| Ok(state.document.system_volume))
    }

    fn set_system_volume(&mut self, volume: f32) -> PlatformResult<()> {
        self.with("set_system_volume", |state| {
            state.document.system_volume = volume;
            Ok(())
        })
    }
}

/// Session control backed by shared snapshot state.
struct SnapshotSession {
    state: SharedSession,
}

impl SnapshotSession {
    fn with<T>(&self, f: impl FnOnce(&mut SessionState) -> T) -> PlatformResult<T> {
        let mut session = self.state.lock();
        if session.unavailable {
            return Err(PlatformError::new(format!("session of pid {} unavailable", session.pid)));
        }
        Ok(f(&mut session))
    }
}

impl SessionControl for SnapshotSession {
    fn mute(&self) -> PlatformResult<bool> { self.with(|session| session.muted) }

    fn set_mute(&mut self, mute: bool) -> PlatformResult<()> {
        self.with(|session| session.muted = mute)
    }

    fn volume(&self) -> PlatformResult<f32> { self.with(|session| session.volume) }

    fn set_volume(&mut self, volume: f32) -> PlatformResult<()> {
        self.with(|session| session.volume = volume)
    }
}

// ============================================================================
// Tests
// ============================================================================
