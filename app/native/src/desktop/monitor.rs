//! Monitor registry.
//!
//! Holds an immutable snapshot of the connected displays. The snapshot is
//! replaced wholesale on refresh and is never empty: when enumeration fails or
//! returns nothing, a synthetic monitor covering the virtual desktop stands in
//! so that layout requests always have a target.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::geometry::{Point, Rect};
use super::platform::{MonitorRecord, WindowSystem};

/// Resolution used when even the virtual desktop metrics are unavailable.
const FALLBACK_SCREEN: Rect = Rect::new(0, 0, 1920, 1080);

/// Identifier of a display, as assigned by the window system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonitorId(pub u32);

impl fmt::Display for MonitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// A connected display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Monitor {
    pub id: MonitorId,
    pub bounds: Rect,
    pub work_area: Rect,
    pub primary: bool,
    /// 1-based position in left-to-right order.
    pub index: usize,
}

impl Monitor {
    fn from_record(record: &MonitorRecord, index: usize) -> Self {
        Self {
            id: record.id,
            bounds: record.bounds,
            work_area: record.work_area,
            primary: record.primary,
            index,
        }
    }

    /// Synthetic monitor spanning the given rectangle.
    fn synthetic(bounds: Rect) -> Self {
        Self {
            id: MonitorId(0),
            bounds,
            work_area: bounds,
            primary: true,
            index: 1,
        }
    }

    /// Short label, e.g. `Display 2 ★`.
    #[must_use]
    pub fn short_name(&self) -> String {
        if self.primary {
            format!("Display {} ★", self.index)
        } else {
            format!("Display {}", self.index)
        }
    }

    /// Label including the resolution, e.g. `Display 2 ★ (1920x1080)`.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.short_name(), self.bounds.resolution())
    }
}

/// Snapshot of all connected monitors.
#[derive(Debug, Clone)]
pub struct MonitorRegistry {
    monitors: Vec<Monitor>,
}

impl Default for MonitorRegistry {
    fn default() -> Self { Self::new() }
}

impl MonitorRegistry {
    /// Creates a registry holding only the fallback monitor.
    #[must_use]
    pub fn new() -> Self { Self { monitors: vec![Monitor::synthetic(FALLBACK_SCREEN)] } }

    /// Builds a registry directly from monitor records.
    ///
    /// Records with a degenerate bounds rectangle are skipped.
    #[must_use]
    pub fn from_records(records: &[MonitorRecord]) -> Self {
        let mut usable: Vec<&MonitorRecord> =
            records.iter().filter(|record| record.bounds.is_valid()).collect();
        usable.sort_by_key(|record| (record.bounds.left, record.bounds.top));

        let monitors: Vec<Monitor> = usable
            .iter()
            .enumerate()
            .map(|(i, record)| Monitor::from_record(record, i + 1))
            .collect();

        if monitors.is_empty() {
            Self::new()
        } else {
            Self { monitors }
        }
    }

    /// Replaces the snapshot with a fresh enumeration.
    ///
    /// Never fails. Enumeration errors degrade to a synthetic monitor covering
    /// the virtual desktop.
    pub fn refresh(&mut self, system: &mut dyn WindowSystem) {
        let records = match system.monitors() {
            Ok(records) => records,
            Err(err) => {
                tracing::warn!(error = %err, "monitor enumeration failed");
                Vec::new()
            }
        };

        let registry = Self::from_records(&records);
        if records.iter().any(|record| record.bounds.is_valid()) {
            *self = registry;
        } else {
            let bounds =
                system.virtual_screen().ok().filter(Rect::is_valid).unwrap_or(FALLBACK_SCREEN);
            tracing::debug!(%bounds, "no monitors reported, using synthetic monitor");
            self.monitors = vec![Monitor::synthetic(bounds)];
        }

        tracing::debug!(count = self.monitors.len(), "monitor registry refreshed");
    }

    #[must_use]
    pub fn list(&self) -> &[Monitor] { &self.monitors }

    #[must_use]
    pub fn len(&self) -> usize { self.monitors.len() }

    /// Always `false`: the registry holds at least the fallback monitor.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.monitors.is_empty() }

    #[must_use]
    pub fn get(&self, id: MonitorId) -> Option<&Monitor> {
        self.monitors.iter().find(|monitor| monitor.id == id)
    }

    /// Looks up a monitor by its 1-based display index.
    #[must_use]
    pub fn by_index(&self, index: usize) -> Option<&Monitor> {
        self.monitors.iter().find(|monitor| monitor.index == index)
    }

    /// The primary monitor, or the left-most one when none is flagged.
    #[must_use]
    pub fn primary(&self) -> &Monitor {
        // Non-empty by construction.
        self.monitors.iter().find(|monitor| monitor.primary).unwrap_or(&self.monitors[0])
    }

    /// The monitor under a point.
    ///
    /// Work areas are checked first, then full bounds (the point may lie on a
    /// taskbar), then the primary monitor is returned.
    #[must_use]
    pub fn containing(&self, point: Point) -> &Monitor {
        self.monitors
            .iter()
            .find(|monitor| monitor.work_area.contains_point(point))
            .or_else(|| self.monitors.iter().find(|monitor| monitor.bounds.contains_point(point)))
            .unwrap_or_else(|| self.primary())
    }

    /// The monitor sharing the largest area with `rect`, falling back to the
    /// monitor under its center.
    #[must_use]
    pub fn for_rect(&self, rect: &Rect) -> &Monitor {
        self.monitors
            .iter()
            .map(|monitor| (monitor, monitor.bounds.overlap_area(rect)))
            .filter(|(_, area)| *area > 0)
            .max_by_key(|(_, area)| *area)
            .map_or_else(|| self.containing(rect.center()), |(monitor, _)| monitor)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desktop::platform::{PlatformError, PlatformResult, WindowRecord};
    use crate::desktop::window::{WindowHandle, WindowState};

    fn record(id: u32, bounds: Rect, work_area: Rect, primary: bool) -> MonitorRecord {
        MonitorRecord { id: MonitorId(id), bounds, work_area, primary }
    }

    fn dual() -> Vec<MonitorRecord> {
        vec![
            record(20, Rect::new(1920, 0, 3840, 1080), Rect::new(1920, 0, 3840, 1040), false),
            record(10, Rect::new(0, 0, 1920, 1080), Rect::new(0, 0, 1920, 1040), true),
        ]
    }

    struct FailingMonitors {
        virtual_screen: PlatformResult<Rect>,
    }

    impl WindowSystem for FailingMonitors {
        fn windows(&mut self) -> PlatformResult<Vec<WindowRecord>> { Ok(Vec::new()) }

        fn monitors(&mut self) -> PlatformResult<Vec<MonitorRecord>> {
            Err(PlatformError::new("no display"))
        }

        fn virtual_screen(&mut self) -> PlatformResult<Rect> { self.virtual_screen.clone() }

        fn move_and_resize(&mut self, _: WindowHandle, _: Rect) -> PlatformResult<()> { Ok(()) }

        fn set_state(&mut self, _: WindowHandle, _: WindowState) -> PlatformResult<()> { Ok(()) }

        fn set_topmost(&mut self, _: WindowHandle, _: bool) -> PlatformResult<()> { Ok(()) }

        fn focus(&mut self, _: WindowHandle) -> PlatformResult<()> { Ok(()) }
    }

    // ========================================================================
    // Snapshot
    // ========================================================================

    #[test]
    fn test_monitors_numbered_left_to_right() {
        let registry = MonitorRegistry::from_records(&dual());
        let list = registry.list();

        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, MonitorId(10));
        assert_eq!(list[0].index, 1);
        assert_eq!(list[1].id, MonitorId(20));
        assert_eq!(list[1].index, 2);
    }

    #[test]
    fn test_display_names() {
        let registry = MonitorRegistry::from_records(&dual());
        let primary = registry.primary();

        assert_eq!(primary.short_name(), "Display 1 ★");
        assert_eq!(primary.display_name(), "Display 1 ★ (1920x1080)");
        assert_eq!(registry.list()[1].short_name(), "Display 2");
    }

    #[test]
    fn test_get_and_by_index() {
        let registry = MonitorRegistry::from_records(&dual());
        assert_eq!(registry.get(MonitorId(20)).map(|m| m.index), Some(2));
        assert!(registry.get(MonitorId(99)).is_none());
        assert_eq!(registry.by_index(1).map(|m| m.id), Some(MonitorId(10)));
    }

    // ========================================================================
    // Point Lookup
    // ========================================================================

    #[test]
    fn test_containing_prefers_work_area_then_bounds() {
        let registry = MonitorRegistry::from_records(&dual());

        assert_eq!(registry.containing(Point::new(2000, 500)).id, MonitorId(20));
        // Taskbar strip of the second monitor is outside its work area.
        assert_eq!(registry.containing(Point::new(2000, 1060)).id, MonitorId(20));
        // Off every monitor.
        assert_eq!(registry.containing(Point::new(-500, -500)).id, MonitorId(10));
    }

    #[test]
    fn test_for_rect_uses_largest_overlap() {
        let registry = MonitorRegistry::from_records(&dual());
        let straddling = Rect::new(1800, 100, 2600, 600);
        assert_eq!(registry.for_rect(&straddling).id, MonitorId(20));
    }

    // ========================================================================
    // Fallback
    // ========================================================================

    #[test]
    fn test_empty_enumeration_uses_virtual_screen() {
        let mut system = FailingMonitors { virtual_screen: Ok(Rect::new(0, 0, 2560, 1440)) };
        let mut registry = MonitorRegistry::from_records(&dual());
        registry.refresh(&mut system);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.primary().work_area, Rect::new(0, 0, 2560, 1440));
        assert!(registry.primary().primary);
    }

    #[test]
    fn test_missing_virtual_screen_uses_default_resolution() {
        let mut system = FailingMonitors { virtual_screen: Err(PlatformError::new("unavailable")) };
        let mut registry = MonitorRegistry::new();
        registry.refresh(&mut system);

        assert_eq!(registry.primary().bounds, Rect::new(0, 0, 1920, 1080));
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_primary_defaults_to_first_when_unflagged() {
        let records = vec![
            record(2, Rect::new(1000, 0, 2000, 800), Rect::new(1000, 0, 2000, 800), false),
            record(1, Rect::new(0, 0, 1000, 800), Rect::new(0, 0, 1000, 800), false),
        ];
        let registry = MonitorRegistry::from_records(&records);
        assert_eq!(registry.primary().id, MonitorId(1));
    }
}
