//! Concurrent traversal engine
//!
//! Three components composed as a pipeline with two concurrent stages:
//!
//! ```text
//!                  ┌──────────────────────────┐
//!                  │    TraversalScheduler    │
//!                  │  - owns directory queue  │
//!                  │  - outstanding counter   │
//!                  └──────┬─────────▲─────────┘
//!                         │ dispatch│ subfolders
//!                  ┌──────▼─────────┴─────────┐
//!                  │    DirectoryExpander     │
//!                  │  - paginated listing     │
//!                  │  - routes children       │
//!                  └──────────┬───────────────┘
//!                             │ files
//!                  ┌──────────▼───────────────┐
//!                  │      FileWorkerPool      │
//!                  │  - one task per file     │
//!                  │  - bounded, isolated     │
//!                  └──────────────────────────┘
//! ```
//!
//! The file queue closes only after the scheduler has proven quiescence
//! (directory queue empty, outstanding-expansion counter zero, every
//! expansion task joined); the pool then drains and joins its own tasks
//! before the traversal reports.

pub mod expander;
pub mod pool;
pub mod scheduler;
pub mod stats;

pub use expander::DirectoryExpander;
pub use pool::{FileWorkerPool, PoolOutcome};
pub use scheduler::TraversalScheduler;
pub use stats::{TraverseProgress, TraverseStats};

use crate::config::WalkConfig;
use crate::drive::{Node, ObjectStore};
use crate::error::{FileFailure, ListingFailure, ProcessResult, TraverseError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Processing action collaborator, invoked once per discovered file
///
/// The engine treats the action as opaque: it may have side effects and it
/// may fail. Failures are isolated per file and never retried.
#[async_trait]
pub trait FileProcessor: Send + Sync {
    async fn process(&self, node: &Node) -> ProcessResult<()>;
}

/// Default processing action: record the visit and do nothing
pub struct NoopProcessor;

#[async_trait]
impl FileProcessor for NoopProcessor {
    async fn process(&self, node: &Node) -> ProcessResult<()> {
        debug!(path = %node.path, size = node.size, "File visited");
        Ok(())
    }
}

/// Result of a completed traversal
#[derive(Debug)]
pub struct TraverseReport {
    /// Directories fully expanded
    pub dirs_expanded: u64,

    /// Files discovered
    pub files_found: u64,

    /// Files processed successfully
    pub files_processed: u64,

    /// Bytes across discovered files
    pub bytes_found: u64,

    /// Nodes skipped (depth limit, exclusion, cancellation)
    pub skipped: u64,

    /// Directories skipped after listing failures (keep-going policy)
    pub listing_failures: Vec<ListingFailure>,

    /// Files whose processing action failed
    pub process_failures: Vec<FileFailure>,

    /// Time taken
    pub duration: Duration,

    /// Whether the traversal ran to quiescence (vs was interrupted)
    pub completed: bool,
}

impl TraverseReport {
    /// True when every discovered node was handled without failure
    pub fn is_clean(&self) -> bool {
        self.completed && self.listing_failures.is_empty() && self.process_failures.is_empty()
    }
}

/// The traversal engine entry point
///
/// Parameterized by the two collaborators: the listing store and the
/// per-file processing action.
pub struct Traversal {
    config: Arc<WalkConfig>,
    store: Arc<dyn ObjectStore>,
    processor: Arc<dyn FileProcessor>,
    shutdown: Arc<AtomicBool>,
    stats: Arc<TraverseStats>,
}

impl Traversal {
    pub fn new(
        config: Arc<WalkConfig>,
        store: Arc<dyn ObjectStore>,
        processor: Arc<dyn FileProcessor>,
    ) -> Self {
        Self {
            config,
            store,
            processor,
            shutdown: Arc::new(AtomicBool::new(false)),
            stats: Arc::new(TraverseStats::default()),
        }
    }

    /// Get a clone of the shutdown flag (for signal handlers)
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Get the shared statistics (for progress reporting)
    pub fn stats(&self) -> Arc<TraverseStats> {
        Arc::clone(&self.stats)
    }

    /// Walk the tree under `root`, blocking until every discovered file
    /// has been processed or the traversal is aborted
    ///
    /// A fatal listing error (under the default policy) is returned as
    /// `Err` - but only after all in-flight expansions and already
    /// dispatched file tasks have been awaited, so no work leaks.
    pub async fn run(&self, root: Node) -> Result<TraverseReport, TraverseError> {
        let start = Instant::now();

        info!(
            root = %root.id,
            workers = self.config.worker_count,
            expanders = self.config.expand_concurrency,
            "Starting traversal"
        );

        let (file_tx, file_rx) = mpsc::channel::<Node>(self.config.file_queue_size);

        let pool = FileWorkerPool::new(
            self.config.worker_count,
            Arc::clone(&self.processor),
            Arc::clone(&self.stats),
            Arc::clone(&self.shutdown),
        );
        let pool_handle = tokio::spawn(pool.run(file_rx));

        let scheduler = TraversalScheduler::new(
            Arc::clone(&self.config),
            Arc::clone(&self.store),
            Arc::clone(&self.stats),
            Arc::clone(&self.shutdown),
        );

        // The scheduler consumes the engine's file sender; when it returns
        // the file queue is closed and the pool drains to completion.
        let sched_outcome = scheduler.run(root, file_tx).await?;

        let pool_outcome = pool_handle.await.expect("File pool task panicked");

        let duration = start.elapsed();
        let completed = !self.shutdown.load(Ordering::Relaxed);

        if let Some(fatal) = sched_outcome.fatal {
            info!(
                files_processed = self.stats.files_processed.load(Ordering::Relaxed),
                "Traversal aborted by listing failure"
            );
            return Err(TraverseError::Drive(fatal));
        }

        let report = TraverseReport {
            dirs_expanded: self.stats.dirs_expanded.load(Ordering::Relaxed),
            files_found: self.stats.files_found.load(Ordering::Relaxed),
            files_processed: self.stats.files_processed.load(Ordering::Relaxed),
            bytes_found: self.stats.bytes_found.load(Ordering::Relaxed),
            skipped: self.stats.skipped.load(Ordering::Relaxed),
            listing_failures: sched_outcome.listing_failures,
            process_failures: pool_outcome.failures,
            duration,
            completed,
        };

        info!(
            dirs = report.dirs_expanded,
            files = report.files_found,
            processed = report.files_processed,
            duration_secs = duration.as_secs(),
            "Traversal finished"
        );

        Ok(report)
    }
}
