//! Explicit error reporting.
//!
//! Operations return [`SafeResult`] values and never touch shared state.
//! Callers that want a single aggregated log pass an [`ErrorSink`] by
//! reference and route results through [`ReportExt::report_to`].
//!
//! ```rust
//! use safeops_core::{arith, MemorySink, ReportExt, ErrorKind};
//!
//! let sink = MemorySink::new();
//! let result = arith::add(i32::MAX, 1).report_to(&sink);
//! assert!(result.is_err());
//! assert_eq!(sink.reports()[0].kind, ErrorKind::Overflow);
//! ```

use crate::error::{ErrorKind, SafeResult};
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe, Location};

/// How serious a report is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The operation failed.
    Error,
    /// The operation succeeded but something worth noting happened.
    Notice,
}

/// A single reported event.
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    /// The taxonomy kind.
    pub kind: ErrorKind,
    /// Whether the operation failed.
    pub severity: Severity,
    /// Human-readable description.
    pub message: &'a str,
    /// Where the reporting call was made.
    pub location: &'static Location<'static>,
}

/// A destination for reports.
///
/// Sinks are invoked synchronously. A panic inside [`ErrorSink::record`] is
/// contained and never reaches the operation's caller.
pub trait ErrorSink {
    /// Records one report.
    fn record(&self, report: &Report<'_>);
}

impl<S: ErrorSink + ?Sized> ErrorSink for &S {
    fn record(&self, report: &Report<'_>) {
        (**self).record(report);
    }
}

fn deliver(sink: &dyn ErrorSink, report: &Report<'_>) {
    match report.severity {
        Severity::Error => tracing::warn!(
            kind = %report.kind,
            file = report.location.file(),
            line = report.location.line(),
            "{}",
            report.message
        ),
        Severity::Notice => tracing::debug!(
            kind = %report.kind,
            file = report.location.file(),
            line = report.location.line(),
            "{}",
            report.message
        ),
    }

    if panic::catch_unwind(AssertUnwindSafe(|| sink.record(report))).is_err() {
        tracing::error!("error sink panicked; report dropped");
    }
}

/// Routes failures of a [`SafeResult`] to a sink.
pub trait ReportExt<T> {
    /// Forwards an error to `sink`, tagged with the caller's location, and
    /// returns the result unchanged.
    fn report_to(self, sink: &dyn ErrorSink) -> SafeResult<T>;
}

impl<T> ReportExt<T> for SafeResult<T> {
    #[track_caller]
    fn report_to(self, sink: &dyn ErrorSink) -> SafeResult<T> {
        if let Err(err) = &self {
            let message = err.to_string();
            deliver(
                sink,
                &Report {
                    kind: err.kind(),
                    severity: Severity::Error,
                    message: &message,
                    location: Location::caller(),
                },
            );
        }
        self
    }
}

/// Sends an informational report that does not correspond to a failure.
#[track_caller]
pub fn notice(sink: &dyn ErrorSink, kind: ErrorKind, message: &str) {
    deliver(
        sink,
        &Report {
            kind,
            severity: Severity::Notice,
            message,
            location: Location::caller(),
        },
    );
}

/// A sink that only emits `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ErrorSink for TracingSink {
    fn record(&self, _report: &Report<'_>) {}
}

/// An owned copy of a [`Report`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedReport {
    /// The taxonomy kind.
    pub kind: ErrorKind,
    /// Whether the operation failed.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
    /// Source file of the reporting call.
    pub file: &'static str,
    /// Source line of the reporting call.
    pub line: u32,
}

/// A sink that keeps every report in memory.
///
/// Useful for aggregating failures across many calls and for tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    reports: Mutex<Vec<RecordedReport>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything recorded so far.
    #[must_use]
    pub fn reports(&self) -> Vec<RecordedReport> {
        self.reports.lock().clone()
    }

    /// Returns the kind of the most recent error report, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<ErrorKind> {
        self.reports
            .lock()
            .iter()
            .rev()
            .find(|r| r.severity == Severity::Error)
            .map(|r| r.kind)
    }

    /// Discards all recorded reports.
    pub fn clear(&self) {
        self.reports.lock().clear();
    }
}

impl ErrorSink for MemorySink {
    fn record(&self, report: &Report<'_>) {
        self.reports.lock().push(RecordedReport {
            kind: report.kind,
            severity: report.severity,
            message: report.message.to_owned(),
            file: report.location.file(),
            line: report.location.line(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SafeError;

    #[test]
    fn success_is_not_reported() {
        let sink = MemorySink::new();
        let value: SafeResult<u8> = Ok(3);
        assert_eq!(value.report_to(&sink).unwrap(), 3);
        assert!(sink.reports().is_empty());
    }

    #[test]
    fn failure_carries_caller_location() {
        let sink = MemorySink::new();
        let line = line!() + 1;
        let result: SafeResult<()> = Err(SafeError::null("copy")).report_to(&sink);
        assert!(result.is_err());

        let reports = sink.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].kind, ErrorKind::NullPointer);
        assert_eq!(reports[0].severity, Severity::Error);
        assert_eq!(reports[0].file, file!());
        assert_eq!(reports[0].line, line);
        assert_eq!(reports[0].message, "null pointer in copy");
    }

    #[test]
    fn notice_does_not_count_as_error() {
        let sink = MemorySink::new();
        notice(&sink, ErrorKind::Overlap, "regions overlap");
        assert_eq!(sink.reports().len(), 1);
        assert_eq!(sink.last_error(), None);
    }

    #[test]
    fn last_error_is_most_recent_failure() {
        let sink = MemorySink::new();
        let _ = Err::<(), _>(SafeError::null("a")).report_to(&sink);
        let _ = Err::<(), _>(SafeError::invalid("b", "bad")).report_to(&sink);
        notice(&sink, ErrorKind::Overlap, "later notice");
        assert_eq!(sink.last_error(), Some(ErrorKind::InvalidParam));

        sink.clear();
        assert_eq!(sink.last_error(), None);
    }

    struct PanickingSink;

    impl ErrorSink for PanickingSink {
        fn record(&self, _report: &Report<'_>) {
            panic!("sink failure");
        }
    }

    #[test]
    fn panicking_sink_is_contained() {
        let result: SafeResult<()> = Err(SafeError::null("read")).report_to(&PanickingSink);
        assert_eq!(result.unwrap_err().kind(), ErrorKind::NullPointer);
    }
}
