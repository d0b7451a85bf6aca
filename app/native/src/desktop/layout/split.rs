//! Split layouts: windows arranged in columns or rows.
//!
//! Slice boundaries sit at `origin + i * extent / n` (integer division), and
//! the last slice always ends at the far edge, so neighbouring slices share an
//! edge and their union is exactly the work area.

use super::{LayoutWindow, Placement, Placements};
use crate::desktop::geometry::Rect;

/// Windows side by side, left to right in input order.
#[must_use]
pub fn split_horizontal(windows: &[LayoutWindow], area: &Rect) -> Placements {
    let count = windows.len();
    windows
        .iter()
        .enumerate()
        .map(|(i, window)| {
            let left = boundary(area.left, area.width(), i, count);
            let right = boundary(area.left, area.width(), i + 1, count);
            Placement::with_rect(window.handle, Rect::new(left, area.top, right, area.bottom))
        })
        .collect()
}

/// Windows stacked, top to bottom in input order.
#[must_use]
pub fn split_vertical(windows: &[LayoutWindow], area: &Rect) -> Placements {
    let count = windows.len();
    windows
        .iter()
        .enumerate()
        .map(|(i, window)| {
            let top = boundary(area.top, area.height(), i, count);
            let bottom = boundary(area.top, area.height(), i + 1, count);
            Placement::with_rect(window.handle, Rect::new(area.left, top, area.right, bottom))
        })
        .collect()
}

/// Offset of the `i`-th of `count` boundaries along an axis.
#[allow(clippy::cast_possible_wrap)] // Window counts are tiny
fn boundary(origin: i32, extent: i32, i: usize, count: usize) -> i32 {
    if i >= count {
        return origin + extent;
    }
    // Widened so that large extents times many windows cannot overflow.
    let offset = i64::from(extent) * i as i64 / count as i64;
    origin + i32::try_from(offset).unwrap_or(extent)
}
