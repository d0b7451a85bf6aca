//! Boundary between the coordinator and the operating system.
//!
//! The coordinator never talks to the window system or the audio mixer
//! directly. It goes through these traits, which return strongly typed
//! records that are validated once at refresh time.
//!
//! Placement calls (`move_and_resize`, `set_state`, ...) are fire-and-forget:
//! an `Ok` only means the request was accepted. The next directory refresh is
//! the only way to observe what the OS actually did.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use super::monitor::MonitorId;
use super::window::{WindowHandle, WindowState};

/// Error reported by an OS collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformError {
    message: String,
}

impl PlatformError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self { Self { message: message.into() } }

    #[must_use]
    pub fn message(&self) -> &str { &self.message }
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.message) }
}

impl std::error::Error for PlatformError {}

/// Result type alias for OS collaborator calls.
pub type PlatformResult<T> = Result<T, PlatformError>;

// ============================================================================
// Window System
// ============================================================================

/// A top-level window as reported by the window system, before filtering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowRecord {
    pub handle: WindowHandle,
    #[serde(default)]
    pub title: String,
    pub pid: u32,
    /// Full path of the owning process executable.
    #[serde(default)]
    pub executable: String,
    pub bounds: Rect,
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Cloaked windows are hidden by the compositor (e.g. on another virtual desktop).
    #[serde(default)]
    pub cloaked: bool,
    #[serde(default)]
    pub state: WindowState,
    #[serde(default)]
    pub tool_window: bool,
}

const fn default_true() -> bool { true }

/// A display device as reported by the window system.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorRecord {
    pub id: MonitorId,
    /// Full monitor rectangle, including reserved areas such as the taskbar.
    pub bounds: Rect,
    /// Usable rectangle excluding reserved areas.
    pub work_area: Rect,
    #[serde(default)]
    pub primary: bool,
}

/// Window system collaborator.
pub trait WindowSystem {
    /// Enumerates all top-level windows in z-order.
    ///
    /// # Errors
    ///
    /// Returns an error if enumeration failed as a whole.
    fn windows(&mut self) -> PlatformResult<Vec<WindowRecord>>;

    /// Enumerates connected monitors.
    ///
    /// # Errors
    ///
    /// Returns an error if enumeration failed as a whole.
    fn monitors(&mut self) -> PlatformResult<Vec<MonitorRecord>>;

    /// Bounding rectangle of the whole virtual desktop.
    ///
    /// # Errors
    ///
    /// Returns an error if the desktop metrics are unavailable.
    fn virtual_screen(&mut self) -> PlatformResult<Rect>;

    /// Requests a new position and size for a window.
    ///
    /// # Errors
    ///
    /// Returns an error if the request was rejected outright.
    fn move_and_resize(&mut self, handle: WindowHandle, rect: Rect) -> PlatformResult<()>;

    /// Requests a new show state for a window.
    ///
    /// # Errors
    ///
    /// Returns an error if the request was rejected outright.
    fn set_state(&mut self, handle: WindowHandle, state: WindowState) -> PlatformResult<()>;

    /// Requests that a window stays above all others (or stops doing so).
    ///
    /// # Errors
    ///
    /// Returns an error if the request was rejected outright.
    fn set_topmost(&mut self, handle: WindowHandle, topmost: bool) -> PlatformResult<()>;

    /// Brings a window to the foreground.
    ///
    /// # Errors
    ///
    /// Returns an error if the request was rejected outright.
    fn focus(&mut self, handle: WindowHandle) -> PlatformResult<()>;

    /// Descendant processes of `pid`, nearest first.
    ///
    /// Multi-process applications often play audio from a child renderer
    /// process instead of the process that owns the window.
    fn child_processes(&mut self, _pid: u32) -> Vec<u32> { Vec::new() }

    /// Process id of the coordinator itself; its windows are never eligible.
    fn own_process_id(&self) -> u32 { std::process::id() }
}

// ============================================================================
// Audio System
// ============================================================================

/// Control over one live audio session.
pub trait SessionControl {
    /// Current mute flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the session could not be read.
    fn mute(&self) -> PlatformResult<bool>;

    /// Sets the mute flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the session rejected the change.
    fn set_mute(&mut self, mute: bool) -> PlatformResult<()>;

    /// Current volume in `[0.0, 1.0]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session could not be read.
    fn volume(&self) -> PlatformResult<f32>;

    /// Sets the volume; callers pass values already clamped to `[0.0, 1.0]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session rejected the change.
    fn set_volume(&mut self, volume: f32) -> PlatformResult<()>;
}

/// One audio session as reported by the mixer.
pub struct SessionRecord {
    pub pid: u32,
    pub display_name: String,
    pub control: Box<dyn SessionControl>,
}

impl fmt::Debug for SessionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRecord")
            .field("pid", &self.pid)
            .field("display_name", &self.display_name)
            .finish_non_exhaustive()
    }
}

/// Audio mixer collaborator.
pub trait AudioSystem {
    /// Enumerates live sessions across all active render devices.
    ///
    /// # Errors
    ///
    /// Returns an error if enumeration failed as a whole.
    fn sessions(&mut self) -> PlatformResult<Vec<SessionRecord>>;

    /// Mute flag of the default render endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is unavailable.
    fn system_mute(&mut self) -> PlatformResult<bool>;

    /// Sets the mute flag of the default render endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint rejected the change.
    fn set_system_mute(&mut self, mute: bool) -> PlatformResult<()>;

    /// Master volume of the default render endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is unavailable.
    fn system_volume(&mut self) -> PlatformResult<f32>;

    /// Sets the master volume of the default render endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint rejected the change.
    fn set_system_volume(&mut self, volume: f32) -> PlatformResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_record_defaults() {
        let json = r#"{
            "handle": 4096,
            "pid": 12,
            "bounds": { "left": 0, "top": 0, "right": 800, "bottom": 600 }
        }"#;
        let record: WindowRecord = serde_json::from_str(json).unwrap();

        assert!(record.visible);
        assert!(!record.cloaked);
        assert!(!record.tool_window);
        assert!(record.title.is_empty());
        assert_eq!(record.state, WindowState::Normal);
    }

    #[test]
    fn test_platform_error_display() {
        let err = PlatformError::new("window destroyed");
        assert_eq!(err.to_string(), "window destroyed");
        assert_eq!(err.message(), "window destroyed");
    }
}
