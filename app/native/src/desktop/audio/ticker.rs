//! Background resync ticker.
//!
//! Session sets change while the coordinator is idle (a browser tab starts
//! playing, a game exits). The ticker wakes up on a fixed interval and sends a
//! [`ResyncTick`] to the control thread, which owns the bridge and performs the
//! resync itself. The ticker never touches coordinator state.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::platform::thread::spawn_named_thread;

/// Request to re-enumerate audio sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResyncTick;

/// Handle to the ticker thread. Dropping it stops the thread.
#[derive(Debug)]
pub struct ResyncTicker {
    interval: Duration,
    // Dropping the sender disconnects the ticker's stop channel.
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ResyncTicker {
    /// Starts a ticker with the given interval.
    ///
    /// Returns `None` for a zero interval (ticking disabled) or if the thread
    /// could not be spawned.
    #[must_use]
    pub fn start(interval: Duration) -> Option<(Self, Receiver<ResyncTick>)> {
        if interval.is_zero() {
            return None;
        }

        let (tick_tx, tick_rx) = mpsc::channel();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let handle = spawn_named_thread("audio-resync", move || {
            loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        if tick_tx.send(ResyncTick).is_err() {
                            break;
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            tracing::trace!("resync ticker stopped");
        })?;

        tracing::debug!(interval_ms = interval.as_millis(), "resync ticker started");
        Some((Self { interval, stop: Some(stop_tx), handle: Some(handle) }, tick_rx))
    }

    #[must_use]
    pub const fn interval(&self) -> Duration { self.interval }

    /// Stops the thread and waits for it to exit.
    pub fn stop(mut self) { self.shutdown(); }

    fn shutdown(&mut self) {
        drop(self.stop.take());
        if self.handle.take().is_some_and(|handle| handle.join().is_err()) {
            tracing::warn!("resync ticker panicked");
        }
    }
}

impl Drop for ResyncTicker {
    fn drop(&mut self) { self.shutdown(); }
}

/// Drains every pending tick and returns how many there were.
pub fn drain(ticks: &Receiver<ResyncTick>) -> usize { ticks.try_iter().count() }
