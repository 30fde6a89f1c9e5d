//! Stress tests for SafeOps.
//!
//! These runs hammer the bounded operations from several threads at once,
//! with every failure routed into one shared sink.

use safeops_core::{alloc, string, ErrorSink, MemorySink, ReportExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            duration,
            ops_per_second,
        }
    }

    /// Prints a summary of the test.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {name} ===");
        println!("Total operations: {}", self.total_ops);
        println!("Successful: {}", self.successful_ops);
        println!("Failed: {}", self.failed_ops);
        println!("Duration: {:?}", self.duration);
        println!("Throughput: {:.2} ops/sec", self.ops_per_second);
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Operations per thread.
    pub operations: usize,
    /// Number of concurrent threads.
    pub threads: usize,
    /// Capacity of each string buffer or allocation, in bytes.
    pub buffer_size: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 10_000,
            threads: 4,
            buffer_size: 64,
        }
    }
}

impl StressConfig {
    /// A small configuration suitable for unit tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            operations: 500,
            threads: 4,
            buffer_size: 32,
        }
    }
}

fn run_threads<F>(config: &StressConfig, op: F) -> StressTestResult
where
    F: Fn(usize, usize) -> bool + Sync,
{
    let successful = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);
    let start = Instant::now();

    thread::scope(|scope| {
        for thread_id in 0..config.threads {
            let (op, successful, failed) = (&op, &successful, &failed);
            scope.spawn(move || {
                for i in 0..config.operations {
                    if op(thread_id, i) {
                        successful.fetch_add(1, Ordering::Relaxed);
                    } else {
                        failed.fetch_add(1, Ordering::Relaxed);
                    }
                }
            });
        }
    });

    StressTestResult::new(
        successful.into_inner(),
        failed.into_inner(),
        start.elapsed(),
    )
}

/// Copies strings of growing length into fixed buffers from every thread.
///
/// Every third source is too long for the buffer; those failures are
/// reported to `sink`.
pub fn concurrent_string_copies(config: &StressConfig, sink: &(dyn ErrorSink + Sync)) -> StressTestResult {
    let cap = config.buffer_size.max(2);
    run_threads(config, |thread_id, i| {
        let len = if i % 3 == 0 { cap } else { (thread_id + i) % (cap - 1) };
        let source = vec![b'a' + (thread_id % 26) as u8; len];
        let mut dest = vec![0u8; cap];
        string::copy(&mut dest, &source).report_to(sink).is_ok()
    })
}

/// Allocates, fills and securely releases buffers from every thread.
///
/// Every fifth release claims one byte more than was allocated and must be
/// refused; the buffer is then released with the right size.
pub fn concurrent_allocation_churn(config: &StressConfig, sink: &(dyn ErrorSink + Sync)) -> StressTestResult {
    let size = config.buffer_size.max(1);
    run_threads(config, |_, i| {
        let Ok(buf) = alloc::allocate_zeroed(size).report_to(sink) else {
            return false;
        };
        let mut slot = Some(buf);
        if let Some(buf) = slot.as_mut() {
            buf.fill(0xA5);
        }
        let claimed = if i % 5 == 0 { size + 1 } else { size };
        let ok = alloc::release_secure(&mut slot, claimed).report_to(sink).is_ok();
        if !ok {
            let recovered = alloc::release_secure(&mut slot, size).report_to(sink).is_ok();
            debug_assert!(recovered, "release with the allocated size was refused");
        }
        ok && slot.is_none()
    })
}

/// Runs both workloads against one fresh [`MemorySink`].
pub fn run_all(config: &StressConfig) -> (Vec<StressTestResult>, MemorySink) {
    let sink = MemorySink::new();
    let results = vec![
        concurrent_string_copies(config, &sink),
        concurrent_allocation_churn(config, &sink),
    ];
    (results, sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use safeops_core::ErrorKind;

    #[test]
    fn string_copy_failures_are_all_reported() {
        let config = StressConfig::quick();
        let sink = MemorySink::new();
        let result = concurrent_string_copies(&config, &sink);

        assert_eq!(result.total_ops, config.operations * config.threads);
        let expected_failures = config.operations.div_ceil(3) * config.threads;
        assert_eq!(result.failed_ops, expected_failures);

        let reports = sink.reports();
        assert_eq!(reports.len(), expected_failures);
        assert!(reports.iter().all(|r| r.kind == ErrorKind::Overflow));
    }

    #[test]
    fn allocation_churn_refuses_oversized_release() {
        let config = StressConfig::quick();
        let sink = MemorySink::new();
        let result = concurrent_allocation_churn(&config, &sink);

        let expected_failures = config.operations.div_ceil(5) * config.threads;
        assert_eq!(result.failed_ops, expected_failures);
        assert_eq!(result.successful_ops, result.total_ops - expected_failures);

        // One report per refused release; the follow-up release never fails.
        let reports = sink.reports();
        assert_eq!(reports.len(), expected_failures);
        assert!(reports.iter().all(|r| r.kind == ErrorKind::OutOfBounds));
    }

    #[test]
    fn run_all_collects_into_one_sink() {
        let config = StressConfig {
            operations: 30,
            threads: 2,
            buffer_size: 16,
        };
        let (results, sink) = run_all(&config);
        assert_eq!(results.len(), 2);
        let failures: usize = results.iter().map(|r| r.failed_ops).sum();
        assert_eq!(sink.reports().len(), failures);
        results[0].print_summary("string copies");
    }
}
