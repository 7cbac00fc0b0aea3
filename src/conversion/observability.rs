use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::ConversionError;
use crate::resource::Locality;
use crate::types::{FormatTag, RepresentationTag};

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConversionSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (conversion failed).
    Error,
    /// Critical error (acquisition failures: network or filesystem).
    Critical,
}

impl ConversionSeverity {
    /// Severity the orchestrator assigns to a failed conversion.
    pub fn for_error(error: &ConversionError) -> Self {
        match error {
            ConversionError::Acquisition { .. } => ConversionSeverity::Critical,
            ConversionError::UnsupportedOutputType { .. }
            | ConversionError::UnsupportedFormat { .. }
            | ConversionError::UnsupportedRepresentation { .. }
            | ConversionError::NoViableConversion { .. }
            | ConversionError::InvalidMatrix { .. } => ConversionSeverity::Error,
        }
    }
}

/// Context about a conversion attempt.
#[derive(Debug, Clone)]
pub struct ConversionContext {
    /// The location passed by the caller.
    pub location: String,
    /// Locality classified from the location.
    pub locality: Locality,
    /// Representation requested by the caller, if any.
    pub requested: Option<RepresentationTag>,
}

/// Stats reported on successful conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionStats {
    /// Format the resource was decoded as.
    pub format: FormatTag,
    /// Representation produced.
    pub representation: RepresentationTag,
    /// Candidates tried, including the successful one.
    pub attempts: usize,
    /// Top-level entries in the result (keys, records or rows).
    pub records: usize,
}

/// Observer interface for conversion outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait ConversionObserver: Send + Sync {
    /// Called when conversion succeeds.
    fn on_success(&self, _ctx: &ConversionContext, _stats: ConversionStats) {}

    /// Called when conversion fails.
    fn on_failure(&self, _ctx: &ConversionContext, _severity: ConversionSeverity, _error: &ConversionError) {}

    /// Called when a conversion failure meets an alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &ConversionContext, severity: ConversionSeverity, error: &ConversionError) {
        self.on_failure(ctx, severity, error)
    }
}

/// One observer callback, rendered as a single `key=value` log line.
///
/// ```text
/// ok location=./people.csv format=csv representation=sequence attempts=1 records=2
/// fail severity=Error location=./notes.txt locality=Local err=unsupported format: ...
/// ALERT severity=Critical location=./gone.csv locality=Local err=failed to acquire ...
/// ```
#[derive(Debug, Clone, Copy)]
pub enum ConversionEvent<'a> {
    Success {
        ctx: &'a ConversionContext,
        stats: ConversionStats,
    },
    Failure {
        ctx: &'a ConversionContext,
        severity: ConversionSeverity,
        error: &'a ConversionError,
    },
    Alert {
        ctx: &'a ConversionContext,
        severity: ConversionSeverity,
        error: &'a ConversionError,
    },
}

impl fmt::Display for ConversionEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ConversionEvent::Success { ctx, stats } => write!(
                f,
                "ok location={} format={} representation={} attempts={} records={}",
                ctx.location, stats.format, stats.representation, stats.attempts, stats.records
            ),
            ConversionEvent::Failure { ctx, severity, error } => write!(
                f,
                "fail severity={severity:?} location={} locality={:?} err={error}",
                ctx.location, ctx.locality
            ),
            ConversionEvent::Alert { ctx, severity, error } => write!(
                f,
                "ALERT severity={severity:?} location={} locality={:?} err={error}",
                ctx.location, ctx.locality
            ),
        }
    }
}

/// Forwards every callback to each wrapped observer, in order.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ConversionObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn ConversionObserver>>) -> Self {
        Self { observers }
    }

    /// Append an observer; returns `self` for chaining.
    pub fn with(mut self, observer: Arc<dyn ConversionObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl ConversionObserver for CompositeObserver {
    fn on_success(&self, ctx: &ConversionContext, stats: ConversionStats) {
        self.observers.iter().for_each(|o| o.on_success(ctx, stats));
    }

    fn on_failure(&self, ctx: &ConversionContext, severity: ConversionSeverity, error: &ConversionError) {
        self.observers
            .iter()
            .for_each(|o| o.on_failure(ctx, severity, error));
    }

    fn on_alert(&self, ctx: &ConversionContext, severity: ConversionSeverity, error: &ConversionError) {
        self.observers
            .iter()
            .for_each(|o| o.on_alert(ctx, severity, error));
    }
}

/// Prints each event to stderr as `[objectify] <line>`.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl StdErrObserver {
    /// The line written for `event`.
    pub fn line(event: ConversionEvent<'_>) -> String {
        format!("[objectify] {event}")
    }
}

impl ConversionObserver for StdErrObserver {
    fn on_success(&self, ctx: &ConversionContext, stats: ConversionStats) {
        eprintln!("{}", Self::line(ConversionEvent::Success { ctx, stats }));
    }

    fn on_failure(&self, ctx: &ConversionContext, severity: ConversionSeverity, error: &ConversionError) {
        eprintln!("{}", Self::line(ConversionEvent::Failure { ctx, severity, error }));
    }

    fn on_alert(&self, ctx: &ConversionContext, severity: ConversionSeverity, error: &ConversionError) {
        eprintln!("{}", Self::line(ConversionEvent::Alert { ctx, severity, error }));
    }
}

/// Appends `<unix seconds> <line>` per event to a log file.
///
/// Best effort: a log file that cannot be opened or written is skipped silently.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, event: ConversionEvent<'_>) {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        // Serialize appends so concurrent conversions never interleave within a line.
        let _guard = self.lock.lock();
        let file = OpenOptions::new().create(true).append(true).open(&self.path);
        if let Ok(mut file) = file {
            let _ = writeln!(file, "{ts} {event}");
        }
    }
}

impl ConversionObserver for FileObserver {
    fn on_success(&self, ctx: &ConversionContext, stats: ConversionStats) {
        self.append(ConversionEvent::Success { ctx, stats });
    }

    fn on_failure(&self, ctx: &ConversionContext, severity: ConversionSeverity, error: &ConversionError) {
        self.append(ConversionEvent::Failure { ctx, severity, error });
    }

    fn on_alert(&self, ctx: &ConversionContext, severity: ConversionSeverity, error: &ConversionError) {
        self.append(ConversionEvent::Alert { ctx, severity, error });
    }
}
