//! Selection and pin state.
//!
//! The selection is an ordered list of window handles; its order is the input
//! order for split layouts. Pins are keyed by [`WindowIdentity`] so they survive
//! restarts, and each pin is bound to at most one live handle at a time.

use super::error::DesktopResult;
use super::monitor::MonitorId;
use super::window::{WindowDirectory, WindowEntry, WindowHandle, WindowIdentity};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Pin {
    identity: WindowIdentity,
    handle: Option<WindowHandle>,
}

/// Which windows are selected and which are pinned.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    selected: Vec<WindowHandle>,
    pins: Vec<Pin>,
}

impl SelectionState {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    // ========================================================================
    // Selection
    // ========================================================================

    #[must_use]
    pub fn selected(&self) -> &[WindowHandle] { &self.selected }

    #[must_use]
    pub fn is_selected(&self, handle: WindowHandle) -> bool { self.selected.contains(&handle) }

    /// Flips the selection of a window and returns whether it is now selected.
    ///
    /// # Errors
    ///
    /// Returns `WindowNotFound` if the handle is not in the directory.
    pub fn toggle(&mut self, directory: &WindowDirectory, handle: WindowHandle) -> DesktopResult<bool> {
        directory.get(handle)?;
        if let Some(pos) = self.selected.iter().position(|h| *h == handle) {
            self.selected.remove(pos);
            Ok(false)
        } else {
            self.selected.push(handle);
            Ok(true)
        }
    }

    /// Selects every window in directory order.
    pub fn select_all(&mut self, directory: &WindowDirectory) {
        self.selected = directory.entries().iter().map(|entry| entry.handle).collect();
    }

    pub fn select_none(&mut self) { self.selected.clear(); }

    /// Replaces the selection with the non-minimized windows on a monitor.
    pub fn select_on_monitor(&mut self, directory: &WindowDirectory, monitor: MonitorId) {
        self.selected = directory
            .on_monitor(monitor)
            .filter(|entry| !entry.is_minimized())
            .map(|entry| entry.handle)
            .collect();
    }

    /// Replaces the selection, dropping unknown and duplicate handles.
    pub fn set(&mut self, directory: &WindowDirectory, handles: &[WindowHandle]) {
        self.selected.clear();
        for &handle in handles {
            if directory.contains(handle) && !self.selected.contains(&handle) {
                self.selected.push(handle);
            }
        }
    }

    // ========================================================================
    // Pins
    // ========================================================================

    #[must_use]
    pub fn is_pinned(&self, handle: WindowHandle) -> bool {
        self.pins.iter().any(|pin| pin.handle == Some(handle))
    }

    /// Pinned handles in pin insertion order.
    pub fn pinned(&self) -> impl Iterator<Item = WindowHandle> + '_ {
        self.pins.iter().filter_map(|pin| pin.handle)
    }

    /// Pins a window. Pinning an already-pinned window is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `WindowNotFound` if the handle is not in the directory.
    pub fn pin(&mut self, directory: &WindowDirectory, handle: WindowHandle) -> DesktopResult<()> {
        let entry = directory.get(handle)?;
        if self.is_pinned(handle) {
            return Ok(());
        }

        let identity = entry.identity();
        // Bind an existing unbound pin for the same identity before adding one.
        if let Some(pin) =
            self.pins.iter_mut().find(|pin| pin.handle.is_none() && pin.identity == identity)
        {
            pin.handle = Some(handle);
        } else {
            self.pins.push(Pin { identity, handle: Some(handle) });
        }
        Ok(())
    }

    /// Unpins a window. Unpinning a window that is not pinned is a no-op.
    pub fn unpin(&mut self, handle: WindowHandle) {
        self.pins.retain(|pin| pin.handle != Some(handle));
    }

    /// Flips the pin of a window and returns whether it is now pinned.
    ///
    /// # Errors
    ///
    /// Returns `WindowNotFound` if the handle is not in the directory.
    pub fn toggle_pin(
        &mut self,
        directory: &WindowDirectory,
        handle: WindowHandle,
    ) -> DesktopResult<bool> {
        if self.is_pinned(handle) {
            self.unpin(handle);
            Ok(false)
        } else {
            self.pin(directory, handle)?;
            Ok(true)
        }
    }

    /// Identities of all pins, bound or not, in pin order.
    #[must_use]
    pub fn identities(&self) -> Vec<WindowIdentity> {
        self.pins.iter().map(|pin| pin.identity.clone()).collect()
    }

    /// Replaces all pins with unbound pins for the given identities.
    ///
    /// Pins get bound to live windows on the next [`retain_live`](Self::retain_live).
    pub fn restore(&mut self, identities: &[WindowIdentity]) {
        self.pins.clear();
        for identity in identities {
            if !self.pins.iter().any(|pin| pin.identity == *identity) {
                self.pins.push(Pin { identity: identity.clone(), handle: None });
            }
        }
    }

    // ========================================================================
    // Refresh
    // ========================================================================

    /// Reconciles selection and pins with a freshly refreshed directory.
    ///
    /// Stale handles are dropped from the selection. Pins keep their identity:
    /// a live pinned window has its identity updated (titles change), a closed
    /// one is unbound, and unbound pins are bound to the first unpinned window
    /// with a matching identity.
    pub fn retain_live(&mut self, directory: &WindowDirectory) {
        let before = self.selected.len();
        self.selected.retain(|handle| directory.contains(*handle));
        if self.selected.len() != before {
            tracing::debug!(dropped = before - self.selected.len(), "pruned stale selection");
        }

        for pin in &mut self.pins {
            if let Some(handle) = pin.handle {
                match directory.find(handle) {
                    Some(entry) => pin.identity = entry.identity(),
                    None => pin.handle = None,
                }
            }
        }

        for i in 0..self.pins.len() {
            if self.pins[i].handle.is_some() {
                continue;
            }
            let candidate = directory
                .entries()
                .iter()
                .find(|entry| entry.identity() == self.pins[i].identity && !self.is_pinned(entry.handle))
                .map(|entry| entry.handle);
            self.pins[i].handle = candidate;
        }
    }

    /// Entries ordered for display: pinned first, in pin order, then the rest
    /// in directory order.
    #[must_use]
    pub fn display_order<'a>(&self, directory: &'a WindowDirectory) -> Vec<&'a WindowEntry> {
        let mut ordered: Vec<&WindowEntry> =
            self.pinned().filter_map(|handle| directory.find(handle)).collect();
        ordered.extend(directory.entries().iter().filter(|entry| !self.is_pinned(entry.handle)));
        ordered
    }
}

// ============================================================================
// Tests
// ============================================================================
