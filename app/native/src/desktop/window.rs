//! Window directory.
//!
//! Maintains a snapshot of the eligible top-level windows. Each refresh
//! re-enumerates the OS windows, filters them through an [`EligibilityFilter`]
//! and swaps the result in atomically. Placement requests are forwarded to the
//! window system without waiting for them to take effect.

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::error::{DesktopError, DesktopResult};
use super::geometry::Rect;
use super::monitor::{MonitorId, MonitorRegistry};
use super::platform::{WindowRecord, WindowSystem};
use crate::config::{IgnoreRule, MatchStrategy};

// ============================================================================
// Handles and State
// ============================================================================

/// Opaque window handle, stable for the lifetime of the window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowHandle(pub u64);

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{:#x}", self.0) }
}

impl FromStr for WindowHandle {
    type Err = std::num::ParseIntError;

    /// Accepts hexadecimal (`0x2a`) or decimal (`42`) notation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16).map(Self),
            None => s.parse().map(Self),
        }
    }
}

/// Show state of a window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowState {
    #[default]
    Normal,
    Minimized,
    Maximized,
    Fullscreen,
}

impl WindowState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Minimized => "minimized",
            Self::Maximized => "maximized",
            Self::Fullscreen => "fullscreen",
        }
    }
}

impl fmt::Display for WindowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

// ============================================================================
// Entries
// ============================================================================

/// Stable identity of a window across restarts: `(executable, title)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowIdentity {
    pub executable: String,
    pub title: String,
}

impl WindowIdentity {
    #[must_use]
    pub fn new(executable: impl Into<String>, title: impl Into<String>) -> Self {
        Self { executable: executable.into(), title: title.into() }
    }
}

/// An eligible top-level window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowEntry {
    pub handle: WindowHandle,
    pub title: String,
    pub pid: u32,
    pub executable: String,
    pub bounds: Rect,
    pub state: WindowState,
    /// Monitor the window currently sits on, derived from its bounds.
    pub monitor: MonitorId,
}

impl WindowEntry {
    #[must_use]
    pub fn identity(&self) -> WindowIdentity {
        WindowIdentity::new(self.executable.clone(), self.title.clone())
    }

    #[must_use]
    pub fn is_minimized(&self) -> bool { self.state == WindowState::Minimized }

    /// Executable file name without extension, e.g. `firefox`.
    #[must_use]
    pub fn app_name(&self) -> &str {
        let name = file_name(&self.executable);
        match name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => name,
        }
    }
}

/// Last path component, accepting both `/` and `\\` separators.
fn file_name(path: &str) -> &str { path.rsplit(['/', '\\']).next().unwrap_or(path) }

// ============================================================================
// Eligibility
// ============================================================================

/// A configured ignore rule with its pattern prepared for matching.
#[derive(Debug, Clone)]
enum Pattern {
    Exact(String),
    Contains(String),
    StartsWith(String),
    Regex(Regex),
}

impl Pattern {
    fn compile(pattern: &str, strategy: MatchStrategy) -> Option<Self> {
        let lower = pattern.to_lowercase();
        match strategy {
            MatchStrategy::Exact => Some(Self::Exact(lower)),
            MatchStrategy::Contains => Some(Self::Contains(lower)),
            MatchStrategy::StartsWith => Some(Self::StartsWith(lower)),
            MatchStrategy::Regex => match Regex::new(pattern) {
                Ok(re) => Some(Self::Regex(re)),
                Err(err) => {
                    tracing::warn!(pattern, error = %err, "ignoring invalid window ignore pattern");
                    None
                }
            },
        }
    }

    fn is_match(&self, value: &str) -> bool {
        match self {
            Self::Exact(p) => value.to_lowercase() == *p,
            Self::Contains(p) => value.to_lowercase().contains(p.as_str()),
            Self::StartsWith(p) => value.to_lowercase().starts_with(p.as_str()),
            Self::Regex(re) => re.is_match(value),
        }
    }
}

#[derive(Debug, Clone)]
struct CompiledRule {
    title: Option<Pattern>,
    executable: Option<Pattern>,
}

impl CompiledRule {
    fn compile(rule: &IgnoreRule) -> Option<Self> {
        let title = match rule.title.as_deref() {
            Some(pattern) => Some(Pattern::compile(pattern, rule.strategy)?),
            None => None,
        };
        let executable = match rule.executable.as_deref() {
            Some(pattern) => Some(Pattern::compile(pattern, rule.strategy)?),
            None => None,
        };

        if title.is_none() && executable.is_none() {
            return None;
        }
        Some(Self { title, executable })
    }

    /// All specified fields must match. The executable is matched against its
    /// file name.
    fn is_match(&self, record: &WindowRecord) -> bool {
        let executable_name = file_name(&record.executable);

        self.title.as_ref().is_none_or(|p| p.is_match(&record.title))
            && self.executable.as_ref().is_none_or(|p| p.is_match(executable_name))
    }
}

/// Decides which enumerated windows enter the directory.
#[derive(Debug, Clone, Default)]
pub struct EligibilityFilter {
    rules: Vec<CompiledRule>,
}

impl EligibilityFilter {
    /// Builds a filter from configured ignore rules.
    ///
    /// Rules with no pattern or an invalid regex are dropped.
    #[must_use]
    pub fn new(rules: &[IgnoreRule]) -> Self {
        Self { rules: rules.iter().filter_map(CompiledRule::compile).collect() }
    }

    #[must_use]
    pub fn rule_count(&self) -> usize { self.rules.len() }

    #[must_use]
    pub fn is_eligible(&self, record: &WindowRecord) -> bool {
        if record.title.trim().is_empty()
            || record.tool_window
            || !record.visible
            || record.cloaked
            || !record.bounds.is_valid()
        {
            return false;
        }
        !self.rules.iter().any(|rule| rule.is_match(record))
    }
}

// ============================================================================
// Directory
// ============================================================================

/// Snapshot of eligible windows in enumeration order.
#[derive(Debug, Clone, Default)]
pub struct WindowDirectory {
    entries: Vec<WindowEntry>,
}

impl WindowDirectory {
    #[must_use]
    pub const fn new() -> Self { Self { entries: Vec::new() } }

    /// Re-enumerates windows and replaces the snapshot.
    ///
    /// The coordinator's own process is always excluded, in addition to
    /// whatever `filter` rejects.
    ///
    /// # Errors
    ///
    /// Returns `OsCallFailed` if enumeration fails; the previous snapshot is
    /// kept in that case.
    pub fn refresh(
        &mut self,
        system: &mut dyn WindowSystem,
        monitors: &MonitorRegistry,
        filter: &EligibilityFilter,
    ) -> DesktopResult<usize> {
        let records = system
            .windows()
            .map_err(|err| DesktopError::os_call("enumerate windows", &err))?;
        let own_pid = system.own_process_id();
        let total = records.len();

        self.entries = records
            .into_iter()
            .filter(|record| record.pid != own_pid && filter.is_eligible(record))
            .map(|record| WindowEntry {
                monitor: monitors.for_rect(&record.bounds).id,
                handle: record.handle,
                title: record.title,
                pid: record.pid,
                executable: record.executable,
                bounds: record.bounds,
                state: record.state,
            })
            .collect();

        tracing::debug!(total, eligible = self.entries.len(), "window directory refreshed");
        Ok(self.entries.len())
    }

    /// # Errors
    ///
    /// Returns `WindowNotFound` if the handle is not in the snapshot.
    pub fn get(&self, handle: WindowHandle) -> DesktopResult<&WindowEntry> {
        self.find(handle).ok_or(DesktopError::WindowNotFound(handle))
    }

    #[must_use]
    pub fn find(&self, handle: WindowHandle) -> Option<&WindowEntry> {
        self.entries.iter().find(|entry| entry.handle == handle)
    }

    #[must_use]
    pub fn contains(&self, handle: WindowHandle) -> bool { self.find(handle).is_some() }

    #[must_use]
    pub fn entries(&self) -> &[WindowEntry] { &self.entries }

    #[must_use]
    pub fn len(&self) -> usize { self.entries.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn on_monitor(&self, id: MonitorId) -> impl Iterator<Item = &WindowEntry> {
        self.entries.iter().filter(move |entry| entry.monitor == id)
    }

    /// Forwards a move/resize request. Fire-and-forget.
    ///
    /// # Errors
    ///
    /// Returns `WindowNotFound` for stale handles and `OsCallFailed` if the
    /// request was rejected.
    pub fn move_and_resize(
        &self,
        system: &mut dyn WindowSystem,
        handle: WindowHandle,
        rect: Rect,
    ) -> DesktopResult<()> {
        self.get(handle)?;
        system
            .move_and_resize(handle, rect)
            .map_err(|err| DesktopError::os_call("move_and_resize", &err))
    }

    /// Forwards a show-state request. Fire-and-forget.
    ///
    /// # Errors
    ///
    /// Returns `WindowNotFound` for stale handles and `OsCallFailed` if the
    /// request was rejected.
    pub fn set_state(
        &self,
        system: &mut dyn WindowSystem,
        handle: WindowHandle,
        state: WindowState,
    ) -> DesktopResult<()> {
        self.get(handle)?;
        system.set_state(handle, state).map_err(|err| DesktopError::os_call("set_state", &err))
    }

    /// Restores a minimized window and brings it to the foreground.
    ///
    /// # Errors
    ///
    /// Returns `WindowNotFound` for stale handles and `OsCallFailed` if the
    /// request was rejected.
    pub fn focus(&self, system: &mut dyn WindowSystem, handle: WindowHandle) -> DesktopResult<()> {
        let entry = self.get(handle)?;
        if entry.is_minimized() {
            system
                .set_state(handle, WindowState::Normal)
                .map_err(|err| DesktopError::os_call("set_state", &err))?;
        }
        system.focus(handle).map_err(|err| DesktopError::os_call("focus", &err))
    }
}

// ============================================================================
// Tests
// ============================================================================
