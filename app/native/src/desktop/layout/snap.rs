//! Single-window placements: halves of the work area and fullscreen.

use super::{Placement, Placements};
use crate::desktop::geometry::Rect;
use crate::desktop::window::{WindowHandle, WindowState};

/// Split column shared by both halves, so they meet without a gap.
const fn midpoint(area: &Rect) -> i32 { area.left + area.width() / 2 }

#[must_use]
pub fn snap_left(handle: WindowHandle, area: &Rect) -> Placements {
    let rect = Rect::new(area.left, area.top, midpoint(area), area.bottom);
    Placements::from_elem(Placement::with_rect(handle, rect), 1)
}

#[must_use]
pub fn snap_right(handle: WindowHandle, area: &Rect) -> Placements {
    let rect = Rect::new(midpoint(area), area.top, area.right, area.bottom);
    Placements::from_elem(Placement::with_rect(handle, rect), 1)
}

/// Covers the full monitor bounds, taskbar included.
#[must_use]
pub fn fullscreen(handle: WindowHandle, bounds: &Rect) -> Placements {
    let placement = Placement {
        handle,
        rect: Some(*bounds),
        state: Some(WindowState::Fullscreen),
        topmost: true,
    };
    Placements::from_elem(placement, 1)
}
