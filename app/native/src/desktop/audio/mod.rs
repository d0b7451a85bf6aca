//! Audio session bridge.
//!
//! Binds process ids to their live audio sessions. A process may own several
//! sessions (one per stream or device); they are always driven together, and
//! aggregate reads go back to the mixer instead of trusting cached values.
//!
//! The binding is rebuilt from scratch on every [`resync`](AudioSessionBridge::resync),
//! so sessions that vanished are dropped and new ones appear with whatever
//! mute and volume the OS gave them.

pub mod ticker;

use std::collections::BTreeMap;

use serde::Serialize;

use super::error::{DesktopError, DesktopResult, PolicyReason};
use super::platform::{AudioSystem, PlatformError, SessionControl};

/// Pid the mixer reports for system sounds.
const SYSTEM_SOUNDS_PID: u32 = 0;

struct BoundSession {
    display_name: String,
    control: Box<dyn SessionControl>,
}

/// Aggregate view of one process's sessions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSession {
    pub pid: u32,
    pub display_name: String,
    /// `true` only if every readable session is muted.
    pub muted: bool,
    /// Loudest readable session.
    pub volume: f32,
}

/// Mapping from process id to its non-empty set of audio sessions.
#[derive(Default)]
pub struct AudioSessionBridge {
    bindings: BTreeMap<u32, Vec<BoundSession>>,
}

impl std::fmt::Debug for AudioSessionBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.bindings.iter().map(|(pid, s)| (pid, s.len()))).finish()
    }
}

impl AudioSessionBridge {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    // ========================================================================
    // Binding
    // ========================================================================

    /// Re-enumerates sessions and rebuilds the pid mapping.
    ///
    /// Returns the number of processes with at least one session.
    ///
    /// # Errors
    ///
    /// Returns `OsCallFailed` if enumeration fails; the previous mapping is
    /// kept in that case.
    pub fn resync(&mut self, audio: &mut dyn AudioSystem) -> DesktopResult<usize> {
        let sessions =
            audio.sessions().map_err(|err| DesktopError::os_call("enumerate sessions", &err))?;

        let mut bindings: BTreeMap<u32, Vec<BoundSession>> = BTreeMap::new();
        for record in sessions {
            if record.pid == SYSTEM_SOUNDS_PID {
                continue;
            }
            bindings.entry(record.pid).or_default().push(BoundSession {
                display_name: record.display_name,
                control: record.control,
            });
        }

        let added = bindings.keys().filter(|pid| !self.bindings.contains_key(pid)).count();
        let removed = self.bindings.keys().filter(|pid| !bindings.contains_key(pid)).count();
        self.bindings = bindings;

        tracing::debug!(processes = self.bindings.len(), added, removed, "audio sessions resynced");
        Ok(self.bindings.len())
    }

    #[must_use]
    pub fn has_session(&self, pid: u32) -> bool { self.bindings.contains_key(&pid) }

    #[must_use]
    pub fn session_count(&self, pid: u32) -> usize { self.bindings.get(&pid).map_or(0, Vec::len) }

    /// Bound process ids in ascending order.
    pub fn pids(&self) -> impl Iterator<Item = u32> + '_ { self.bindings.keys().copied() }

    fn sessions(&self, pid: u32) -> DesktopResult<&[BoundSession]> {
        self.bindings.get(&pid).map(Vec::as_slice).ok_or(DesktopError::NoActiveSession(pid))
    }

    fn sessions_mut(&mut self, pid: u32) -> DesktopResult<&mut [BoundSession]> {
        self.bindings
            .get_mut(&pid)
            .map(Vec::as_mut_slice)
            .ok_or(DesktopError::NoActiveSession(pid))
    }

    // ========================================================================
    // Per-process Control
    // ========================================================================

    /// `true` only if every session of the process is muted.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveSession` for unbound pids and `OsCallFailed` if no
    /// session could be read.
    pub fn get_mute(&self, pid: u32) -> DesktopResult<bool> {
        let reads = self.sessions(pid)?.iter().map(|s| s.control.mute());
        aggregate(reads, true, |all, muted| all && muted).map_err(|err| read_failed(pid, &err))
    }

    /// Mutes or unmutes every session of the process.
    ///
    /// Every session is attempted even if one fails.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveSession` for unbound pids and `OsCallFailed` with the
    /// first failure otherwise.
    pub fn set_mute(&mut self, pid: u32, mute: bool) -> DesktopResult<()> {
        let sessions = self.sessions_mut(pid)?;
        let failure = first_failure(sessions.iter_mut().map(|s| s.control.set_mute(mute)));

        if let Some(err) = failure {
            tracing::warn!(pid, mute, error = %err, "failed to set session mute");
            return Err(DesktopError::os_call("set_mute", &err));
        }
        tracing::debug!(pid, mute, sessions = sessions.len(), "mute applied");
        Ok(())
    }

    /// Loudest session of the process.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveSession` for unbound pids and `OsCallFailed` if no
    /// session could be read.
    pub fn get_volume(&self, pid: u32) -> DesktopResult<f32> {
        let reads = self.sessions(pid)?.iter().map(|s| s.control.volume());
        aggregate(reads, 0.0, f32::max).map_err(|err| read_failed(pid, &err))
    }

    /// Sets every session of the process to the same volume.
    ///
    /// The value is clamped to `[0.0, 1.0]`.
    ///
    /// # Errors
    ///
    /// Returns `PolicyViolation` for non-finite values, `NoActiveSession` for
    /// unbound pids and `OsCallFailed` with the first failure otherwise.
    pub fn set_volume(&mut self, pid: u32, volume: f32) -> DesktopResult<f32> {
        let volume = checked_volume(volume)?;
        let sessions = self.sessions_mut(pid)?;
        let failure = first_failure(sessions.iter_mut().map(|s| s.control.set_volume(volume)));

        if let Some(err) = failure {
            tracing::warn!(pid, volume, error = %err, "failed to set session volume");
            return Err(DesktopError::os_call("set_volume", &err));
        }
        tracing::debug!(pid, volume, sessions = sessions.len(), "volume applied");
        Ok(volume)
    }

    /// Aggregate state of every bound process, read live.
    ///
    /// Sessions whose reads fail are skipped, and processes without any
    /// readable session are omitted.
    pub fn list_active(&self) -> impl Iterator<Item = ActiveSession> + '_ {
        self.bindings.iter().filter_map(|(&pid, sessions)| {
            let mut readable = sessions.iter().filter_map(|session| {
                let muted = session.control.mute().ok()?;
                let volume = session.control.volume().ok()?;
                Some((session, muted, volume))
            });

            let (first, muted, volume) = readable.next()?;
            let display_name = first.display_name.clone();
            let (muted, volume) =
                readable.fold((muted, volume), |(all, loudest), (_, m, v)| (all && m, loudest.max(v)));

            Some(ActiveSession { pid, display_name, muted, volume })
        })
    }

    // ========================================================================
    // System Endpoint
    // ========================================================================

    /// # Errors
    ///
    /// Returns `OsCallFailed` if the default endpoint is unavailable.
    pub fn system_mute(audio: &mut dyn AudioSystem) -> DesktopResult<bool> {
        audio.system_mute().map_err(|err| DesktopError::os_call("system_mute", &err))
    }

    /// # Errors
    ///
    /// Returns `OsCallFailed` if the default endpoint rejected the change.
    pub fn set_system_mute(audio: &mut dyn AudioSystem, mute: bool) -> DesktopResult<()> {
        audio.set_system_mute(mute).map_err(|err| DesktopError::os_call("set_system_mute", &err))
    }

    /// # Errors
    ///
    /// Returns `OsCallFailed` if the default endpoint is unavailable.
    pub fn system_volume(audio: &mut dyn AudioSystem) -> DesktopResult<f32> {
        audio.system_volume().map_err(|err| DesktopError::os_call("system_volume", &err))
    }

    /// # Errors
    ///
    /// Returns `PolicyViolation` for non-finite values and `OsCallFailed` if
    /// the default endpoint rejected the change.
    pub fn set_system_volume(audio: &mut dyn AudioSystem, volume: f32) -> DesktopResult<f32> {
        let volume = checked_volume(volume)?;
        audio
            .set_system_volume(volume)
            .map_err(|err| DesktopError::os_call("set_system_volume", &err))?;
        Ok(volume)
    }
}

/// Rejects non-finite values and clamps the rest to `[0.0, 1.0]`.
///
/// # Errors
///
/// Returns `PolicyViolation` for NaN and infinities.
pub fn checked_volume(volume: f32) -> DesktopResult<f32> {
    if volume.is_finite() {
        Ok(volume.clamp(0.0, 1.0))
    } else {
        Err(DesktopError::policy(PolicyReason::InvalidVolume))
    }
}

/// Folds the successful reads; fails only if none succeeded.
fn aggregate<T: Copy>(
    reads: impl Iterator<Item = Result<T, PlatformError>>,
    init: T,
    fold: impl Fn(T, T) -> T,
) -> Result<T, PlatformError> {
    let mut acc = None;
    let mut last_err = None;
    for read in reads {
        match read {
            Ok(value) => acc = Some(fold(acc.unwrap_or(init), value)),
            Err(err) => last_err = Some(err),
        }
    }
    acc.ok_or_else(|| last_err.unwrap_or_else(|| PlatformError::new("no sessions")))
}

/// Drives every call and keeps the first error.
fn first_failure(calls: impl Iterator<Item = Result<(), PlatformError>>) -> Option<PlatformError> {
    calls.fold(None, |first, call| first.or(call.err()))
}

fn read_failed(pid: u32, err: &PlatformError) -> DesktopError {
    tracing::warn!(pid, error = %err, "failed to read audio session");
    DesktopError::os_call("read session", err)
}

// ============================================================================
// Tests
// ============================================================================
