//! Geometry primitives in virtual-screen coordinates.
//!
//! Rectangles are stored as edges (`left`, `top`, `right`, `bottom`) with
//! `right`/`bottom` exclusive, matching how the window system reports window
//! and monitor bounds. All arithmetic is integer so that split layouts can tile
//! a work area exactly, without rounding gaps between neighbouring windows.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ============================================================================
// Point
// ============================================================================

/// A point in virtual-screen coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self { Self { x, y } }
}

// ============================================================================
// Rect
// ============================================================================

/// An axis-aligned rectangle described by its edges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    /// Create a new rectangle from its edges.
    #[must_use]
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    /// Create a rectangle from an origin and a size.
    #[must_use]
    pub const fn from_origin_size(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    #[must_use]
    pub const fn width(&self) -> i32 { self.right - self.left }

    #[must_use]
    pub const fn height(&self) -> i32 { self.bottom - self.top }

    /// Returns `true` if the rectangle has a positive width and height.
    #[must_use]
    pub const fn is_valid(&self) -> bool { self.width() > 0 && self.height() > 0 }

    /// Area in square pixels. Degenerate rectangles have zero area.
    #[must_use]
    pub fn area(&self) -> i64 {
        if self.is_valid() {
            i64::from(self.width()) * i64::from(self.height())
        } else {
            0
        }
    }

    /// Center point (rounded towards the top-left).
    #[must_use]
    pub const fn center(&self) -> Point {
        Point::new(self.left + self.width() / 2, self.top + self.height() / 2)
    }

    /// Check if this rectangle contains a point (right/bottom edges exclusive).
    #[must_use]
    pub const fn contains_point(&self, point: Point) -> bool {
        point.x >= self.left && point.x < self.right && point.y >= self.top && point.y < self.bottom
    }

    /// Check if `other` lies entirely inside this rectangle.
    #[must_use]
    pub const fn contains_rect(&self, other: &Self) -> bool {
        other.left >= self.left
            && other.top >= self.top
            && other.right <= self.right
            && other.bottom <= self.bottom
    }

    /// Intersection of two rectangles, or `None` if they don't overlap.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let rect = Self::new(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        );
        rect.is_valid().then_some(rect)
    }

    /// Area shared by two rectangles.
    #[must_use]
    pub fn overlap_area(&self, other: &Self) -> i64 {
        self.intersection(other).map_or(0, |rect| rect.area())
    }

    /// Clamps this rectangle so it lies within `bounds`.
    ///
    /// The size is shrunk first, then the rectangle is shifted inside. The result
    /// may be degenerate if `bounds` itself is degenerate.
    #[must_use]
    pub fn clamp_within(&self, bounds: &Self) -> Self {
        let width = self.width().clamp(0, bounds.width().max(0));
        let height = self.height().clamp(0, bounds.height().max(0));
        let left = self.left.clamp(bounds.left, (bounds.right - width).max(bounds.left));
        let top = self.top.clamp(bounds.top, (bounds.bottom - height).max(bounds.top));
        Self::from_origin_size(left, top, width, height)
    }

    /// Returns a rectangle of the given size centered inside this one.
    #[must_use]
    pub const fn centered(&self, width: i32, height: i32) -> Self {
        Self::from_origin_size(
            self.left + (self.width() - width) / 2,
            self.top + (self.height() - height) / 2,
            width,
            height,
        )
    }

    /// Human-readable resolution string (e.g. `1920x1080`).
    #[must_use]
    pub fn resolution(&self) -> String { format!("{}x{}", self.width(), self.height()) }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})-({},{})", self.left, self.top, self.right, self.bottom)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_dimensions() {
        let rect = Rect::new(10, 20, 110, 70);
        assert_eq!(rect.width(), 100);
        assert_eq!(rect.height(), 50);
        assert_eq!(rect.area(), 5000);
        assert_eq!(rect.center(), Point::new(60, 45));
    }

    #[test]
    fn test_center_of_odd_and_negative_rects() {
        assert_eq!(Rect::new(0, 0, 5, 3).center(), Point::new(2, 1));
        assert_eq!(Rect::new(-1920, -100, 0, 980).center(), Point::new(-960, 440));
    }

    #[test]
    fn test_degenerate_rect_has_no_area() {
        assert_eq!(Rect::new(10, 10, 10, 50).area(), 0);
        assert_eq!(Rect::new(10, 10, 5, 50).area(), 0);
        assert!(!Rect::new(0, 0, 0, 0).is_valid());
    }

    #[test]
    fn test_contains_point_excludes_far_edges() {
        let rect = Rect::new(0, 0, 100, 100);
        assert!(rect.contains_point(Point::new(0, 0)));
        assert!(rect.contains_point(Point::new(99, 99)));
        assert!(!rect.contains_point(Point::new(100, 50)));
        assert!(!rect.contains_point(Point::new(50, 100)));
    }

    #[test]
    fn test_adjacent_rects_do_not_overlap() {
        let left = Rect::new(0, 0, 600, 800);
        let right = Rect::new(600, 0, 1200, 800);
        assert_eq!(left.overlap_area(&right), 0);
        assert!(left.intersection(&right).is_none());
    }

    #[test]
    fn test_intersection() {
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(50, 50, 150, 150);
        assert_eq!(a.intersection(&b), Some(Rect::new(50, 50, 100, 100)));
        assert_eq!(a.overlap_area(&b), 2500);
    }

    #[test]
    fn test_clamp_within_shrinks_and_shifts() {
        let bounds = Rect::new(0, 0, 1000, 800);

        let oversized = Rect::new(-50, -50, 1200, 900);
        assert_eq!(oversized.clamp_within(&bounds), bounds);

        let offscreen = Rect::new(900, 700, 1100, 900);
        assert_eq!(offscreen.clamp_within(&bounds), Rect::new(800, 600, 1000, 800));

        let inside = Rect::new(100, 100, 200, 200);
        assert_eq!(inside.clamp_within(&bounds), inside);
    }

    #[test]
    fn test_centered() {
        let area = Rect::new(0, 0, 1000, 800);
        assert_eq!(area.centered(400, 200), Rect::new(300, 300, 700, 500));
    }

    #[test]
    fn test_contains_rect() {
        let outer = Rect::new(0, 0, 100, 100);
        assert!(outer.contains_rect(&Rect::new(0, 0, 100, 100)));
        assert!(outer.contains_rect(&Rect::new(10, 10, 20, 20)));
        assert!(!outer.contains_rect(&Rect::new(90, 90, 110, 100)));
    }

    #[test]
    fn test_display_and_resolution() {
        let rect = Rect::new(0, 0, 1920, 1080);
        assert_eq!(rect.to_string(), "(0,0)-(1920,1080)");
        assert_eq!(rect.resolution(), "1920x1080");
    }
}
