//! File worker pool
//!
//! Consumes the file queue and runs the processing action once per
//! discovered file, one spawned task per file, bounded by a pool-size
//! semaphore. A failure in one task never affects siblings; failures are
//! collected and reported in aggregate.
//!
//! Completion requires two conditions, checked independently: the file
//! queue is closed and drained, and every dispatched task has finished.
//! The second is enforced by re-acquiring every semaphore permit after the
//! consumption loop exits.

use crate::drive::Node;
use crate::engine::stats::TraverseStats;
use crate::engine::FileProcessor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::error::FileFailure;

/// How long the consumption loop waits before re-checking the shutdown flag
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Outcome of the processing phase
pub struct PoolOutcome {
    /// Per-file processing failures
    pub failures: Vec<FileFailure>,
}

/// Bounded pool running the processing action per discovered file
pub struct FileWorkerPool {
    worker_count: usize,
    processor: Arc<dyn FileProcessor>,
    stats: Arc<TraverseStats>,
    shutdown: Arc<AtomicBool>,
}

impl FileWorkerPool {
    pub fn new(
        worker_count: usize,
        processor: Arc<dyn FileProcessor>,
        stats: Arc<TraverseStats>,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        Self {
            worker_count,
            processor,
            stats,
            shutdown,
        }
    }

    /// Consume the file queue until it is closed and drained, then wait
    /// for every dispatched task to finish
    ///
    /// Under shutdown the queue is still drained (entries are counted as
    /// skipped, not processed) so that expanders blocked on a full queue
    /// can always make progress toward the join barrier.
    pub async fn run(self, mut file_rx: mpsc::Receiver<Node>) -> PoolOutcome {
        let semaphore = Arc::new(Semaphore::new(self.worker_count));
        let failures: Arc<Mutex<Vec<FileFailure>>> = Arc::new(Mutex::new(Vec::new()));

        info!(workers = self.worker_count, "File worker pool started");

        loop {
            let node = match tokio::time::timeout(POLL_INTERVAL, file_rx.recv()).await {
                Ok(Some(node)) => node,
                Ok(None) => break, // queue closed and drained
                Err(_) => continue,
            };

            if self.shutdown.load(Ordering::Relaxed) {
                self.stats.record_skip();
                continue;
            }

            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .expect("Worker semaphore closed");

            let processor = Arc::clone(&self.processor);
            let stats = Arc::clone(&self.stats);
            let failures = Arc::clone(&failures);

            tokio::spawn(async move {
                match processor.process(&node).await {
                    Ok(()) => stats.record_file_processed(),
                    Err(e) => {
                        stats.record_process_error();
                        warn!(path = %node.path, error = %e, "Processing failed");
                        failures
                            .lock()
                            .expect("failure list poisoned")
                            .push(FileFailure {
                                path: node.path.clone(),
                                error: e,
                            });
                    }
                }
                drop(permit);
            });
        }

        // Queue closure stops dispatch but does not wait for in-flight
        // tasks; the join barrier does.
        let _ = semaphore.acquire_many(self.worker_count as u32).await;

        let failures = std::mem::take(
            &mut *failures.lock().expect("failure list poisoned"),
        );

        debug!(failures = failures.len(), "File worker pool drained");

        PoolOutcome { failures }
    }
}
