//! Error types for the desktop coordinator.
//!
//! Every coordinator operation returns an explicit outcome instead of panicking.
//! The variants map onto four categories:
//!
//! - **Lookup errors**: a stale window handle or monitor id was referenced
//! - **Policy violations**: the request was rejected before any OS call
//! - **Missing audio sessions**: an audio action targeted a process without sessions
//! - **OS call failures**: the window system or audio mixer rejected a call
//!
//! No variant is retried inside the core. Callers re-query state and decide.

use std::fmt;

use super::layout::LayoutMode;
use super::monitor::MonitorId;
use super::platform::PlatformError;
use super::window::WindowHandle;

/// Result type alias for coordinator operations.
pub type DesktopResult<T> = Result<T, DesktopError>;

/// Why a request was rejected before reaching the OS layer.
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyReason {
    /// The request targeted no windows at all.
    EmptySelection,

    /// A split layout needs at least two windows.
    SplitNeedsTwo { count: usize },

    /// A mode that positions exactly one window received a different count.
    SingleWindowMode { mode: LayoutMode, count: usize },

    /// A computed rectangle fell below the minimum usable size.
    BelowMinimumSize { width: i32, height: i32, minimum: i32 },

    /// A volume value was not a finite number.
    InvalidVolume,
}

impl fmt::Display for PolicyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySelection => write!(f, "no windows selected"),
            Self::SplitNeedsTwo { count } => {
                write!(f, "split layouts need at least 2 windows, got {count}")
            }
            Self::SingleWindowMode { mode, count } => {
                write!(f, "{} applies to exactly 1 window, got {count}", mode.as_str())
            }
            Self::BelowMinimumSize { width, height, minimum } => {
                write!(f, "computed size {width}x{height} is below the minimum of {minimum}px")
            }
            Self::InvalidVolume => write!(f, "volume must be a finite number"),
        }
    }
}

/// Errors that can occur while coordinating windows and audio sessions.
#[derive(Debug, Clone)]
pub enum DesktopError {
    /// The window is no longer in the directory snapshot.
    ///
    /// Handles go stale when a window closes or stops being eligible. They are
    /// pruned from selection and pin state on the next refresh.
    WindowNotFound(WindowHandle),

    /// The monitor is no longer in the registry snapshot.
    MonitorNotFound(MonitorId),

    /// The request cannot satisfy the layout or audio invariants.
    PolicyViolation(PolicyReason),

    /// The process has no live audio session bound to it.
    NoActiveSession(u32),

    /// The window system or audio mixer rejected a call.
    OsCallFailed {
        /// The operation that was attempted.
        operation: String,
        /// What the OS layer reported.
        message: String,
    },
}

impl DesktopError {
    /// Creates a policy violation error.
    #[must_use]
    pub const fn policy(reason: PolicyReason) -> Self { Self::PolicyViolation(reason) }

    /// Creates an OS call failure for the given operation.
    #[must_use]
    pub fn os_call(operation: impl Into<String>, error: &PlatformError) -> Self {
        Self::OsCallFailed {
            operation: operation.into(),
            message: error.to_string(),
        }
    }

    /// Returns `true` if a stale handle or id was referenced.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::WindowNotFound(_) | Self::MonitorNotFound(_))
    }

    /// Returns `true` if the request was rejected before any OS call.
    #[must_use]
    pub const fn is_policy_violation(&self) -> bool { matches!(self, Self::PolicyViolation(_)) }

    /// Returns `true` if the OS layer rejected a call.
    #[must_use]
    pub const fn is_os_failure(&self) -> bool { matches!(self, Self::OsCallFailed { .. }) }

    /// Returns the policy reason, if this is a policy violation.
    #[must_use]
    pub const fn policy_reason(&self) -> Option<&PolicyReason> {
        if let Self::PolicyViolation(reason) = self {
            Some(reason)
        } else {
            None
        }
    }
}

impl fmt::Display for DesktopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WindowNotFound(handle) => write!(f, "Window {handle} not found"),
            Self::MonitorNotFound(id) => write!(f, "Monitor {id} not found"),
            Self::PolicyViolation(reason) => write!(f, "Policy violation: {reason}"),
            Self::NoActiveSession(pid) => write!(f, "No active audio session for PID {pid}"),
            Self::OsCallFailed { operation, message } => {
                write!(f, "OS call failed ({operation}): {message}")
            }
        }
    }
}

impl std::error::Error for DesktopError {}

// ============================================================================
// Tests
// ============================================================================
