//! Logging setup and the in-memory debug log.
//!
//! Events go to stderr through a `tracing-subscriber` fmt layer and, in
//! parallel, into a bounded [`DebugLog`] that `winctx debug export` writes to
//! disk for bug reports.

use std::fmt::{self, Write as _};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt as tracing_fmt};

use crate::constants::{
    APP_NAME, APP_VERSION, DEBUG_LOG_MAX_ENTRIES, DEBUG_LOG_RETAINED_ENTRIES,
};

static DEBUG_LOG: DebugLog = DebugLog::new();

/// Process-wide debug log fed by [`init`].
#[must_use]
pub fn debug_log() -> &'static DebugLog { &DEBUG_LOG }

/// Filter directive used when `RUST_LOG` is not set.
#[must_use]
pub fn default_directive(debug_enabled: bool, trace_enabled: bool) -> String {
    let level = if trace_enabled {
        "trace"
    } else if debug_enabled {
        "debug"
    } else {
        "info"
    };
    format!("{APP_NAME}={level},{APP_NAME}_lib={level}")
}

/// Installs the global subscriber.
///
/// `RUST_LOG` overrides the level chosen by the flags. Calling this twice is
/// harmless; the second call is ignored.
pub fn init(debug_enabled: bool, trace_enabled: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug_enabled, trace_enabled)));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_fmt::layer().with_writer(io::stderr).with_target(false))
        .with(DebugLogLayer::new(debug_log()))
        .try_init()
        .is_ok();

    if installed {
        log_initialized(debug_enabled, trace_enabled);
    }
}

fn log_initialized(debug_enabled: bool, trace_enabled: bool) {
    tracing::debug!(debug = debug_enabled, verbose = trace_enabled, "logging initialized");
}

// ============================================================================
// Debug Log
// ============================================================================

/// Bounded in-memory log of formatted entries.
#[derive(Debug)]
pub struct DebugLog {
    entries: Mutex<Vec<String>>,
}

impl Default for DebugLog {
    fn default() -> Self { Self::new() }
}

impl DebugLog {
    #[must_use]
    pub const fn new() -> Self { Self { entries: parking_lot::const_mutex(Vec::new()) } }

    /// Appends an entry, trimming the oldest ones once the log is full.
    pub fn push(&self, entry: String) {
        let mut entries = self.entries.lock();
        entries.push(entry);
        if entries.len() > DEBUG_LOG_MAX_ENTRIES {
            let excess = entries.len() - DEBUG_LOG_RETAINED_ENTRIES;
            entries.drain(..excess);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize { self.entries.lock().len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.lock().is_empty() }

    #[must_use]
    pub fn entries(&self) -> Vec<String> { self.entries.lock().clone() }

    pub fn clear(&self) { self.entries.lock().clear(); }

    /// Writes `debug_<unix>.log` into `dir` and returns its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn export(&self, dir: &Path, system_info: &[(&str, String)]) -> io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let exported_at = unix_seconds();
        let path = dir.join(format!("debug_{exported_at}.log"));

        let mut out = String::new();
        let rule = "=".repeat(60);
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{APP_NAME} debug log");
        let _ = writeln!(out, "Version: {APP_VERSION}");
        let _ = writeln!(out, "Exported: {exported_at}");
        let _ = writeln!(out, "\n{rule}\nSYSTEM INFORMATION\n{rule}");
        for (key, value) in system_info {
            let _ = writeln!(out, "{key}: {value}");
        }
        let entries = self.entries();
        let _ = writeln!(out, "\n{rule}\nDEBUG LOG ({} entries)\n{rule}", entries.len());
        for entry in &entries {
            let _ = writeln!(out, "{entry}");
        }

        std::fs::write(&path, out)?;
        tracing::info!(path = %path.display(), entries = entries.len(), "debug log exported");
        Ok(path)
    }
}

fn unix_seconds() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |elapsed| elapsed.as_secs())
}

fn timestamp() -> String {
    let elapsed = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    format!("{}.{:03}", elapsed.as_secs(), elapsed.subsec_millis())
}

// ============================================================================
// Layer
// ============================================================================

/// Layer that formats events as `[timestamp] [LEVEL] message key=value`.
#[derive(Debug, Clone, Copy)]
pub struct DebugLogLayer {
    log: &'static DebugLog,
}

impl DebugLogLayer {
    #[must_use]
    pub const fn new(log: &'static DebugLog) -> Self { Self { log } }
}

impl<S: Subscriber> Layer<S> for DebugLogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = EntryVisitor::default();
        event.record(&mut visitor);
        self.log.push(format!(
            "[{}] [{}] {}",
            timestamp(),
            event.metadata().level(),
            visitor.finish()
        ));
    }
}

#[derive(Default)]
struct EntryVisitor {
    message: String,
    fields: String,
}

impl EntryVisitor {
    fn finish(mut self) -> String {
        self.message.push_str(&self.fields);
        self.message
    }
}

impl Visit for EntryVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={value}", field.name());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={value:?}", field.name());
        }
    }
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::Registry;

    use super::*;

    // ========================================================================
    // Filter
    // ========================================================================

    #[test]
    fn test_default_directive_levels() {
        assert_eq!(default_directive(false, false), "winctx=info,winctx_lib=info");
        assert_eq!(default_directive(true, false), "winctx=debug,winctx_lib=debug");
        assert_eq!(default_directive(true, true), "winctx=trace,winctx_lib=trace");
    }

    // ========================================================================
    // Debug Log
    // ========================================================================

    #[test]
    fn test_push_trims_to_newest_entries() {
        let log = DebugLog::new();
        for i in 0..=DEBUG_LOG_MAX_ENTRIES {
            log.push(format!("entry {i}"));
        }

        let entries = log.entries();
        assert_eq!(entries.len(), DEBUG_LOG_RETAINED_ENTRIES);
        assert_eq!(entries.last().unwrap(), &format!("entry {DEBUG_LOG_MAX_ENTRIES}"));
    }

    #[test]
    fn test_export_writes_sections() {
        let dir = tempfile::tempdir().unwrap();
        let log = DebugLog::new();
        log.push("[1.000] [INFO] applying layout mode=snap-left".to_string());

        let path = log.export(dir.path(), &[("Windows", "3".to_string())]).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();

        assert!(path.file_name().unwrap().to_string_lossy().starts_with("debug_"));
        assert!(content.contains("SYSTEM INFORMATION"));
        assert!(content.contains("Windows: 3"));
        assert!(content.contains("DEBUG LOG (1 entries)"));
        assert!(content.contains("applying layout mode=snap-left"));
    }

    #[test]
    fn test_layer_formats_events() {
        static LOG: DebugLog = DebugLog::new();
        let subscriber = Registry::default().with(DebugLogLayer::new(&LOG));

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(pid = 100, reason = "gone", "session lost");
        });

        let entries = LOG.entries();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].contains("[WARN] session lost pid=100 reason=gone"));
    }

    #[test]
    fn test_initialized_event_records_flag_values() {
        static LOG: DebugLog = DebugLog::new();
        let subscriber = Registry::default().with(DebugLogLayer::new(&LOG));

        tracing::subscriber::with_default(subscriber, || log_initialized(true, false));

        let entries = LOG.entries();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].contains("[DEBUG] logging initialized debug=true verbose=false"));
    }
}
