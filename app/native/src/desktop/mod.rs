//! Window layout and audio session core.
//!
//! Everything here is platform-agnostic. The OS is reached only through the
//! [`WindowSystem`] and [`AudioSystem`] collaborators, so the same core runs
//! against a live desktop or a recorded snapshot.

pub mod audio;
pub mod coordinator;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod monitor;
pub mod platform;
pub mod selection;
pub mod window;

pub use audio::ticker::{ResyncTick, ResyncTicker};
pub use audio::{ActiveSession, AudioSessionBridge, checked_volume};
pub use coordinator::{
    AudioOutcome, Coordinator, PlacementOutcome, PlacementReport, WindowSummary,
};
pub use error::{DesktopError, DesktopResult, PolicyReason};
pub use geometry::{Point, Rect};
pub use layout::{LayoutMode, LayoutPlan, LayoutWindow, Placement};
pub use monitor::{Monitor, MonitorId, MonitorRegistry};
pub use platform::{
    AudioSystem, MonitorRecord, PlatformError, PlatformResult, SessionControl, SessionRecord,
    WindowRecord, WindowSystem,
};
pub use selection::SelectionState;
pub use window::{EligibilityFilter, WindowDirectory, WindowEntry, WindowHandle, WindowIdentity, WindowState};
