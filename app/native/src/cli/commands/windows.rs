//! Window commands: listing, layouts, pins, focus and minimize.

use colored::Colorize;
use serde::Serialize;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify};
use tabled::{Table, Tabled};

use super::context::{DesktopSession, SessionOptions};
use super::types::CliLayoutMode;
use crate::cli::output;
use crate::desktop::{
    LayoutPlan, MonitorId, PlacementOutcome, PlacementReport, WindowHandle, WindowSummary,
};
use crate::error::WinCtxError;

const TITLE_WIDTH: usize = 40;

// ============================================================================
// Listing
// ============================================================================

/// Lists eligible windows, pinned ones first.
///
/// # Errors
///
/// Returns an error if the desktop cannot be loaded.
pub fn list_windows(options: &SessionOptions, json: bool) -> Result<(), WinCtxError> {
    #[derive(Tabled)]
    struct WindowRow {
        #[tabled(rename = "Handle")]
        handle: String,
        #[tabled(rename = "Title")]
        title: String,
        #[tabled(rename = "App")]
        app: String,
        #[tabled(rename = "PID")]
        pid: u32,
        #[tabled(rename = "Monitor")]
        monitor: String,
        #[tabled(rename = "State")]
        state: String,
        #[tabled(rename = "Bounds")]
        bounds: String,
        #[tabled(rename = "Sessions")]
        sessions: usize,
        #[tabled(rename = "Pinned")]
        pinned: String,
    }

    let mut session = DesktopSession::open(options)?;
    let summaries = session.coordinator.window_summaries();

    if json {
        return output::print_json(&summaries);
    }
    if summaries.is_empty() {
        output::print_empty("No eligible windows.");
        return Ok(());
    }

    let rows: Vec<WindowRow> = summaries
        .iter()
        .map(|summary: &WindowSummary| WindowRow {
            handle: summary.entry.handle.to_string(),
            title: output::truncate(&summary.entry.title, TITLE_WIDTH),
            app: summary.entry.app_name().to_string(),
            pid: summary.entry.pid,
            monitor: summary.monitor_name.clone(),
            state: summary.entry.state.to_string(),
            bounds: summary.entry.bounds.to_string(),
            sessions: summary.session_count,
            pinned: output::format_bool(summary.pinned),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Modify::new(Columns::new(3..4)).with(Alignment::right()))
        .with(Modify::new(Columns::new(7..8)).with(Alignment::right()))
        .with(Modify::new(Columns::new(8..9)).with(Alignment::center()));
    output::print_table("Windows", &mut table);
    Ok(())
}

/// Lists monitors in display order.
///
/// # Errors
///
/// Returns an error if the desktop cannot be loaded.
pub fn list_monitors(options: &SessionOptions, json: bool) -> Result<(), WinCtxError> {
    #[derive(Tabled)]
    struct MonitorRow {
        #[tabled(rename = "ID")]
        id: u32,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Bounds")]
        bounds: String,
        #[tabled(rename = "Work Area")]
        work_area: String,
        #[tabled(rename = "Windows")]
        windows: usize,
        #[tabled(rename = "Primary")]
        primary: String,
    }

    let session = DesktopSession::open(options)?;
    let monitors = session.coordinator.monitors().list();

    if json {
        return output::print_json(&monitors);
    }

    let directory = session.coordinator.directory();
    let rows: Vec<MonitorRow> = monitors
        .iter()
        .map(|monitor| MonitorRow {
            id: monitor.id.0,
            name: monitor.display_name(),
            bounds: monitor.bounds.to_string(),
            work_area: monitor.work_area.to_string(),
            windows: directory.on_monitor(monitor.id).count(),
            primary: output::format_bool(monitor.primary),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Modify::new(Columns::first()).with(Alignment::right()))
        .with(Modify::new(Columns::new(4..5)).with(Alignment::right()))
        .with(Modify::new(Columns::new(5..6)).with(Alignment::center()));
    output::print_table("Monitors", &mut table);
    Ok(())
}

// ============================================================================
// Layout
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LayoutResult<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    plan: Option<&'a LayoutPlan>,
    verification: &'a [PlacementReport],
}

/// Applies a layout, verifies it and writes the desktop back.
///
/// Partial OS failures still verify and persist whatever was applied before
/// the error is returned.
///
/// # Errors
///
/// Returns an error for stale handles, unknown monitors, policy violations and
/// OS failures.
pub fn apply_layout(
    options: &SessionOptions,
    mode: CliLayoutMode,
    monitor: Option<u32>,
    windows: &[WindowHandle],
    json: bool,
) -> Result<(), WinCtxError> {
    let mut session = DesktopSession::open(options)?;
    let handles = session.handles_or_all(windows);

    let (plan, failure) =
        match session.coordinator.apply_layout(&handles, monitor.map(MonitorId), mode.into()) {
            Ok(plan) => (Some(plan), None),
            Err(err) if err.is_os_failure() => (None, Some(err)),
            Err(err) => return Err(err.into()),
        };
    let verification = session.coordinator.verify_placements()?;

    if json {
        output::print_json(&LayoutResult { plan: plan.as_ref(), verification: &verification })?;
    } else {
        if let Some(plan) = &plan {
            println!(
                "{} {} on {}",
                "Layout".bold(),
                plan.mode.to_string().cyan(),
                session.monitor_label(plan.monitor)
            );
        }
        print_verification(&session, &verification);
    }

    session.finish()?;
    failure.map_or(Ok(()), |err| Err(err.into()))
}

fn print_verification(session: &DesktopSession, reports: &[PlacementReport]) {
    #[derive(Tabled)]
    struct ReportRow {
        #[tabled(rename = "Handle")]
        handle: String,
        #[tabled(rename = "Title")]
        title: String,
        #[tabled(rename = "Bounds")]
        bounds: String,
        #[tabled(rename = "Result")]
        result: String,
    }

    if reports.is_empty() {
        output::print_empty("No placements were applied.");
        return;
    }

    let directory = session.coordinator.directory();
    let rows: Vec<ReportRow> = reports
        .iter()
        .map(|report| {
            let entry = directory.find(report.handle);
            ReportRow {
                handle: report.handle.to_string(),
                title: entry.map_or_else(String::new, |e| output::truncate(&e.title, TITLE_WIDTH)),
                bounds: entry.map_or_else(String::new, |e| e.bounds.to_string()),
                result: describe_outcome(&report.outcome),
            }
        })
        .collect();

    output::print_table("Placements", &mut Table::new(rows));
}

fn describe_outcome(outcome: &PlacementOutcome) -> String {
    match outcome {
        PlacementOutcome::Applied => "applied".green().to_string(),
        PlacementOutcome::Diverged { expected, .. } => {
            format!("{} (requested {expected})", "diverged".yellow())
        }
        PlacementOutcome::StateDiverged { expected, actual } => {
            format!("{} ({actual}, requested {expected})", "state differs".yellow())
        }
        PlacementOutcome::Gone => "window closed".red().to_string(),
    }
}

// ============================================================================
// Single Window
// ============================================================================

/// Pins or unpins a window and persists the pin list.
///
/// # Errors
///
/// Returns an error for stale handles or if the settings cannot be saved.
pub fn toggle_pin(options: &SessionOptions, handle: WindowHandle) -> Result<(), WinCtxError> {
    let mut session = DesktopSession::open(options)?;
    let pinned = session.coordinator.toggle_pin(handle)?;
    session.save_pins()?;

    let verb = if pinned { "Pinned".green() } else { "Unpinned".yellow() };
    println!("{verb} {handle}");
    Ok(())
}

/// Restores (if needed) and focuses a window.
///
/// # Errors
///
/// Returns an error for stale handles or rejected requests.
pub fn focus(options: &SessionOptions, handle: WindowHandle) -> Result<(), WinCtxError> {
    let mut session = DesktopSession::open(options)?;
    session.coordinator.focus_window(handle)?;
    println!("Focused {handle}");
    session.finish()
}

/// Minimizes a window, or maximizes it when already minimized.
///
/// # Errors
///
/// Returns an error for stale handles or rejected requests.
pub fn toggle_minimize(options: &SessionOptions, handle: WindowHandle) -> Result<(), WinCtxError> {
    let mut session = DesktopSession::open(options)?;
    let state = session.coordinator.toggle_minimize(handle)?;
    println!("{handle} is now {state}");
    session.finish()
}
