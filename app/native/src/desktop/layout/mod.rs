//! Layout engine.
//!
//! Pure placement computation: given an ordered list of windows, a target
//! monitor and a mode, produce a [`LayoutPlan`] or reject the request with a
//! policy violation. Nothing here touches the OS.
//!
//! # Supported Modes
//!
//! - **State-only**: `maximize`, `minimize`, `restore` apply to every window
//! - **Fullscreen**: one window covering the full monitor bounds, topmost
//! - **Snap**: one window on the left or right half of the work area
//! - **Split**: two or more windows side by side or stacked
//! - **Center**: every window keeps its size and is centered in the work area
//!
//! # Performance
//!
//! Plans use `SmallVec` so that requests for up to 16 windows (the common
//! case) are computed without heap allocation.

mod snap;
mod split;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::error::{DesktopError, DesktopResult, PolicyReason};
use super::geometry::Rect;
use super::monitor::{Monitor, MonitorId};
use super::window::{WindowHandle, WindowState};

// ============================================================================
// Layout Mode
// ============================================================================

/// How a set of windows is arranged on the target monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutMode {
    Maximize,
    Minimize,
    Restore,
    Fullscreen,
    SnapLeft,
    SnapRight,
    /// Windows side by side (columns).
    SplitHorizontal,
    /// Windows stacked (rows).
    SplitVertical,
    Center,
}

impl LayoutMode {
    /// All modes, in menu order.
    pub const ALL: [Self; 9] = [
        Self::Maximize,
        Self::Minimize,
        Self::Restore,
        Self::Fullscreen,
        Self::SnapLeft,
        Self::SnapRight,
        Self::SplitHorizontal,
        Self::SplitVertical,
        Self::Center,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Maximize => "maximize",
            Self::Minimize => "minimize",
            Self::Restore => "restore",
            Self::Fullscreen => "fullscreen",
            Self::SnapLeft => "snap-left",
            Self::SnapRight => "snap-right",
            Self::SplitHorizontal => "split-horizontal",
            Self::SplitVertical => "split-vertical",
            Self::Center => "center",
        }
    }

    /// Modes that position exactly one window.
    #[must_use]
    pub const fn is_single_window(self) -> bool {
        matches!(self, Self::Fullscreen | Self::SnapLeft | Self::SnapRight)
    }

    #[must_use]
    pub const fn is_split(self) -> bool {
        matches!(self, Self::SplitHorizontal | Self::SplitVertical)
    }

    /// Modes that only change the show state and never produce a rectangle.
    #[must_use]
    pub const fn is_state_only(self) -> bool {
        matches!(self, Self::Maximize | Self::Minimize | Self::Restore)
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for LayoutMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown layout mode '{s}'"))
    }
}

// ============================================================================
// Layout Plan
// ============================================================================

/// Inline capacity for layout plans.
pub const LAYOUT_INLINE_CAP: usize = 16;

/// Default minimum width and height of a placed window, in pixels.
pub const DEFAULT_MINIMUM_SIZE: i32 = 100;

/// Target for one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub handle: WindowHandle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rect: Option<Rect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<WindowState>,
    /// Borderless topmost presentation (fullscreen).
    pub topmost: bool,
}

impl Placement {
    #[must_use]
    pub const fn with_rect(handle: WindowHandle, rect: Rect) -> Self {
        Self { handle, rect: Some(rect), state: None, topmost: false }
    }

    #[must_use]
    pub const fn with_state(handle: WindowHandle, state: WindowState) -> Self {
        Self { handle, rect: None, state: Some(state), topmost: false }
    }
}

/// Placements stored inline for up to [`LAYOUT_INLINE_CAP`] windows.
pub type Placements = SmallVec<[Placement; LAYOUT_INLINE_CAP]>;

/// Ordered placements for one layout request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutPlan {
    pub mode: LayoutMode,
    pub monitor: MonitorId,
    pub placements: Placements,
}

impl LayoutPlan {
    #[must_use]
    pub fn len(&self) -> usize { self.placements.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.placements.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &Placement> { self.placements.iter() }

    /// Rectangles of the plan in order, skipping state-only placements.
    pub fn rects(&self) -> impl Iterator<Item = Rect> + '_ {
        self.placements.iter().filter_map(|placement| placement.rect)
    }
}

// ============================================================================
// Computation
// ============================================================================

/// A window taking part in a layout request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutWindow {
    pub handle: WindowHandle,
    pub bounds: Rect,
}

/// Computes the placements for a layout request.
///
/// Every rectangle is clamped to the monitor work area (full bounds for
/// fullscreen) before the minimum size is checked.
///
/// # Errors
///
/// Returns `PolicyViolation` when the window count does not fit the mode or a
/// computed rectangle is smaller than `minimum_size`.
pub fn compute(
    windows: &[LayoutWindow],
    monitor: &Monitor,
    mode: LayoutMode,
    minimum_size: i32,
) -> DesktopResult<LayoutPlan> {
    validate_count(mode, windows.len())?;

    let placements: Placements = match mode {
        LayoutMode::Maximize => state_only(windows, WindowState::Maximized),
        LayoutMode::Minimize => state_only(windows, WindowState::Minimized),
        LayoutMode::Restore => state_only(windows, WindowState::Normal),
        LayoutMode::Fullscreen => snap::fullscreen(windows[0].handle, &monitor.bounds),
        LayoutMode::SnapLeft => snap::snap_left(windows[0].handle, &monitor.work_area),
        LayoutMode::SnapRight => snap::snap_right(windows[0].handle, &monitor.work_area),
        LayoutMode::SplitHorizontal => split::split_horizontal(windows, &monitor.work_area),
        LayoutMode::SplitVertical => split::split_vertical(windows, &monitor.work_area),
        LayoutMode::Center => center(windows, &monitor.work_area),
    };

    let area = if mode == LayoutMode::Fullscreen { monitor.bounds } else { monitor.work_area };
    let placements = clamp_and_check(placements, &area, minimum_size)?;

    Ok(LayoutPlan { mode, monitor: monitor.id, placements })
}

fn validate_count(mode: LayoutMode, count: usize) -> DesktopResult<()> {
    if count == 0 {
        return Err(DesktopError::policy(PolicyReason::EmptySelection));
    }
    if mode.is_single_window() && count != 1 {
        return Err(DesktopError::policy(PolicyReason::SingleWindowMode { mode, count }));
    }
    if mode.is_split() && count < 2 {
        return Err(DesktopError::policy(PolicyReason::SplitNeedsTwo { count }));
    }
    Ok(())
}

fn state_only(windows: &[LayoutWindow], state: WindowState) -> Placements {
    windows.iter().map(|window| Placement::with_state(window.handle, state)).collect()
}

/// Keeps each window's size (shrunk to fit) and centers it in `area`.
fn center(windows: &[LayoutWindow], area: &Rect) -> Placements {
    windows
        .iter()
        .map(|window| {
            let width = window.bounds.width().min(area.width());
            let height = window.bounds.height().min(area.height());
            Placement::with_rect(window.handle, area.centered(width, height))
        })
        .collect()
}

fn clamp_and_check(
    mut placements: Placements,
    area: &Rect,
    minimum_size: i32,
) -> DesktopResult<Placements> {
    for placement in &mut placements {
        let Some(rect) = placement.rect else { continue };
        let clamped = rect.clamp_within(area);
        if clamped.width() < minimum_size || clamped.height() < minimum_size {
            return Err(DesktopError::policy(PolicyReason::BelowMinimumSize {
                width: clamped.width(),
                height: clamped.height(),
                minimum: minimum_size,
            }));
        }
        placement.rect = Some(clamped);
    }
    Ok(placements)
}

// ============================================================================
// Tests
// ============================================================================
