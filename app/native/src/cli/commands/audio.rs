//! Audio commands: session listing, mute and volume.
//!
//! Commands given process ids act on those processes' sessions. Without pids
//! they act on the selected windows (`--window`), and with neither they act on
//! the default output endpoint.

use std::time::{Duration, Instant};

use colored::Colorize;
use serde::Serialize;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify};
use tabled::{Table, Tabled};

use super::context::{DesktopSession, SessionOptions};
use crate::cli::output;
use crate::config;
use crate::desktop::{ActiveSession, AudioOutcome, ResyncTicker, WindowHandle};
use crate::error::WinCtxError;

// ============================================================================
// Sessions
// ============================================================================

/// Lists processes with live audio sessions.
///
/// With `watch`, keeps re-reading the snapshot on the configured resync
/// interval for that many seconds and prints the list again whenever the
/// bound processes change.
///
/// # Errors
///
/// Returns an error if the desktop cannot be loaded or watching is disabled.
pub fn list_sessions(
    options: &SessionOptions,
    json: bool,
    watch: Option<u64>,
) -> Result<(), WinCtxError> {
    let mut session = DesktopSession::open(options)?;
    print_sessions(&session, json)?;

    let Some(seconds) = watch else {
        return Ok(());
    };
    let interval = config::get_config().audio.resync_interval();
    let Some((ticker, ticks)) = ResyncTicker::start(interval) else {
        return Err(WinCtxError::InvalidArguments(
            "Watching needs a non-zero audio.resyncIntervalMs".to_string(),
        ));
    };

    let deadline = Instant::now() + Duration::from_secs(seconds);
    let mut last_pids: Vec<u32> = session.coordinator.audio().pids().collect();
    while Instant::now() < deadline {
        std::thread::sleep(ticker.interval());
        session.reload()?;
        if !session.coordinator.poll_ticks(&ticks)? {
            continue;
        }
        let pids: Vec<u32> = session.coordinator.audio().pids().collect();
        if pids != last_pids {
            print_sessions(&session, json)?;
            last_pids = pids;
        }
    }

    ticker.stop();
    Ok(())
}

fn print_sessions(session: &DesktopSession, json: bool) -> Result<(), WinCtxError> {
    #[derive(Tabled)]
    struct SessionRow {
        #[tabled(rename = "PID")]
        pid: u32,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Sessions")]
        sessions: usize,
        #[tabled(rename = "Volume")]
        volume: String,
        #[tabled(rename = "Muted")]
        muted: String,
    }

    let audio = session.coordinator.audio();
    let active: Vec<ActiveSession> = audio.list_active().collect();

    if json {
        return output::print_json(&active);
    }
    if active.is_empty() {
        output::print_empty("No active audio sessions.");
        return Ok(());
    }

    let rows: Vec<SessionRow> = active
        .iter()
        .map(|item| SessionRow {
            pid: item.pid,
            name: output::truncate(&item.display_name, 30),
            sessions: audio.session_count(item.pid),
            volume: output::format_volume(item.volume),
            muted: output::format_bool(item.muted),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Modify::new(Columns::first()).with(Alignment::right()))
        .with(Modify::new(Columns::new(2..4)).with(Alignment::right()))
        .with(Modify::new(Columns::new(4..5)).with(Alignment::center()));
    output::print_table("Audio Sessions", &mut table);
    Ok(())
}

// ============================================================================
// Mute
// ============================================================================

/// Mutes (or unmutes) processes, selected windows or the system endpoint.
///
/// # Errors
///
/// Returns an error if any target could not be changed.
pub fn mute(
    options: &SessionOptions,
    pids: &[u32],
    windows: &[WindowHandle],
    unmute: bool,
    json: bool,
) -> Result<(), WinCtxError> {
    let mute = !unmute;
    let mut session = DesktopSession::open(options)?;

    let outcomes = if pids.is_empty() {
        for &handle in windows {
            session.coordinator.directory().get(handle)?;
        }
        session.coordinator.set_selection(windows);
        session.coordinator.mute_selection(mute)?
    } else {
        session.coordinator.set_mute(pids, mute)
    };

    let label = if mute { "muted" } else { "unmuted" };
    if outcomes.is_empty() && pids.is_empty() {
        if json {
            output::print_json(&serde_json::json!({ "system": true, "muted": mute }))?;
        } else {
            println!("System output {label}");
        }
    } else {
        report(&outcomes, json, |_| label.to_string())?;
    }

    session.finish()?;
    first_error(&outcomes)
}

// ============================================================================
// Volume
// ============================================================================

/// How a volume command changes the level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VolumeChange {
    Set(f32),
    Adjust(f32),
}

/// Sets or adjusts the volume of processes, or of the system endpoint when no
/// pids are given.
///
/// # Errors
///
/// Returns an error if any target could not be changed.
pub fn volume(
    options: &SessionOptions,
    pids: &[u32],
    change: VolumeChange,
    json: bool,
) -> Result<(), WinCtxError> {
    let mut session = DesktopSession::open(options)?;

    if pids.is_empty() {
        let target = match change {
            VolumeChange::Set(volume) => volume,
            VolumeChange::Adjust(delta) => session.coordinator.system_volume()? + delta,
        };
        let applied = session.coordinator.set_system_volume(target)?;
        if json {
            output::print_json(&serde_json::json!({ "system": true, "volume": applied }))?;
        } else {
            println!("System volume set to {}", output::format_volume(applied));
        }
        return session.finish();
    }

    let outcomes = match change {
        VolumeChange::Set(volume) => session.coordinator.set_volume(pids, volume),
        VolumeChange::Adjust(delta) => session.coordinator.adjust_volume(pids, delta),
    };
    report(&outcomes, json, |volume| output::format_volume(*volume))?;

    session.finish()?;
    first_error(&outcomes)
}

// ============================================================================
// Reporting
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OutcomeRow<'a, T: Serialize> {
    pid: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn report<T: Serialize>(
    outcomes: &[AudioOutcome<T>],
    json: bool,
    describe: impl Fn(&T) -> String,
) -> Result<(), WinCtxError> {
    if json {
        let rows: Vec<OutcomeRow<'_, T>> = outcomes
            .iter()
            .map(|outcome| match &outcome.result {
                Ok(value) => OutcomeRow { pid: outcome.pid, value: Some(value), error: None },
                Err(err) => OutcomeRow { pid: outcome.pid, value: None, error: Some(err.to_string()) },
            })
            .collect();
        return output::print_json(&rows);
    }

    for outcome in outcomes {
        match &outcome.result {
            Ok(value) => println!("PID {}: {}", outcome.pid, describe(value).green()),
            Err(err) => println!("PID {}: {}", outcome.pid, err.to_string().red()),
        }
    }
    Ok(())
}

fn first_error<T>(outcomes: &[AudioOutcome<T>]) -> Result<(), WinCtxError> {
    let failed = outcomes.iter().filter(|outcome| !outcome.is_ok()).count();
    if failed == 0 {
        Ok(())
    } else {
        Err(WinCtxError::CommandError(format!("{failed} of {} targets failed", outcomes.len())))
    }
}
