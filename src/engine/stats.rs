//! Shared traversal statistics
//!
//! All counters are atomics so that expansion tasks, file workers, and the
//! progress reporter can update and read them without locking.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Statistics collected during a traversal
#[derive(Debug, Default)]
pub struct TraverseStats {
    /// Directories fully expanded (every listing page consumed)
    pub dirs_expanded: AtomicU64,

    /// Files discovered and routed to the file queue
    pub files_found: AtomicU64,

    /// Files whose processing action completed successfully
    pub files_processed: AtomicU64,

    /// Bytes across discovered files
    pub bytes_found: AtomicU64,

    /// Directory listing failures
    pub listing_errors: AtomicU64,

    /// File processing failures
    pub process_errors: AtomicU64,

    /// Nodes skipped (depth limit, exclusion, or cancellation drain)
    pub skipped: AtomicU64,
}

impl TraverseStats {
    pub fn record_dir(&self) {
        self.dirs_expanded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_file_found(&self, bytes: u64) {
        self.files_found.fetch_add(1, Ordering::Relaxed);
        self.bytes_found.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn record_file_processed(&self) {
        self.files_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_listing_error(&self) {
        self.listing_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_process_error(&self) {
        self.process_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skip(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time snapshot for display
    pub fn snapshot(&self, elapsed: Duration) -> TraverseProgress {
        TraverseProgress {
            dirs: self.dirs_expanded.load(Ordering::Relaxed),
            files: self.files_found.load(Ordering::Relaxed),
            processed: self.files_processed.load(Ordering::Relaxed),
            bytes: self.bytes_found.load(Ordering::Relaxed),
            errors: self.listing_errors.load(Ordering::Relaxed)
                + self.process_errors.load(Ordering::Relaxed),
            elapsed,
        }
    }
}

/// Progress information for display
#[derive(Debug, Clone)]
pub struct TraverseProgress {
    /// Directories expanded
    pub dirs: u64,

    /// Files discovered
    pub files: u64,

    /// Files processed
    pub processed: u64,

    /// Bytes discovered
    pub bytes: u64,

    /// Errors encountered (listing + processing)
    pub errors: u64,

    /// Elapsed time
    pub elapsed: Duration,
}

impl TraverseProgress {
    /// Calculate files-processed-per-second rate
    pub fn files_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.processed as f64 / secs
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_recording() {
        let stats = TraverseStats::default();

        stats.record_dir();
        stats.record_file_found(1024);
        stats.record_file_found(1024);
        stats.record_file_processed();
        stats.record_listing_error();
        stats.record_process_error();
        stats.record_skip();

        let progress = stats.snapshot(Duration::from_secs(2));
        assert_eq!(progress.dirs, 1);
        assert_eq!(progress.files, 2);
        assert_eq!(progress.processed, 1);
        assert_eq!(progress.bytes, 2048);
        assert_eq!(progress.errors, 2);
    }

    #[test]
    fn test_progress_rate() {
        let progress = TraverseProgress {
            dirs: 10,
            files: 100,
            processed: 50,
            bytes: 0,
            errors: 0,
            elapsed: Duration::from_secs(10),
        };
        assert!((progress.files_per_second() - 5.0).abs() < 0.01);
    }
}
