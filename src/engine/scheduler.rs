//! Traversal scheduling and termination detection
//!
//! The scheduler owns the directory queue. It dispatches expansion tasks,
//! bounded by a semaphore (each task acquires its permit after being
//! spawned, so the dispatch loop keeps draining the queue while all
//! expanders are busy), and decides when the directory frontier is
//! exhausted using an outstanding-work counter: the counter is incremented
//! when a folder is enqueued and decremented when its expansion task
//! finishes. The frontier is drained exactly when the queue is empty and
//! the counter reads zero - at that instant no expansion can produce more
//! folders.
//!
//! The file queue is closed by dropping its senders: every expansion task
//! holds a clone, the scheduler holds the last one, and the scheduler only
//! drops it after the join barrier confirms all expansion tasks finished.
//! Closing twice, or closing while an expansion is outstanding, is
//! impossible by construction.

use crate::config::{ListingPolicy, WalkConfig};
use crate::drive::{Node, ObjectStore};
use crate::engine::expander::DirectoryExpander;
use crate::engine::stats::TraverseStats;
use crate::error::{DriveError, ListingFailure, TraverseError};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

/// How long the dispatch loop waits on the queue before re-checking the
/// outstanding-work counter
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Outcome of the expansion phase
pub struct SchedulerOutcome {
    /// Listing failures skipped under `ListingPolicy::Skip`
    pub listing_failures: Vec<ListingFailure>,

    /// First fatal listing error under `ListingPolicy::Fatal`
    pub fatal: Option<DriveError>,
}

/// Drives directory expansion until the frontier is exhausted
pub struct TraversalScheduler {
    config: Arc<WalkConfig>,
    store: Arc<dyn ObjectStore>,
    stats: Arc<TraverseStats>,
    shutdown: Arc<AtomicBool>,
}

impl TraversalScheduler {
    pub fn new(
        config: Arc<WalkConfig>,
        store: Arc<dyn ObjectStore>,
        stats: Arc<TraverseStats>,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        Self {
            config,
            store,
            stats,
            shutdown,
        }
    }

    /// Run the expansion phase
    ///
    /// Takes ownership of the scheduler's file-queue sender; when this
    /// returns, every expansion task has finished and the sender is
    /// dropped, which closes the file queue for the worker pool.
    pub async fn run(
        &self,
        root: Node,
        file_tx: mpsc::Sender<Node>,
    ) -> Result<SchedulerOutcome, TraverseError> {
        let (dir_tx, mut dir_rx) = mpsc::channel::<Node>(self.config.dir_queue_size);

        let in_flight = Arc::new(AtomicU64::new(0));
        let semaphore = Arc::new(Semaphore::new(self.config.expand_concurrency));
        let listing_failures = Arc::new(Mutex::new(Vec::new()));
        let fatal: Arc<Mutex<Option<DriveError>>> = Arc::new(Mutex::new(None));

        // Seed the frontier
        in_flight.fetch_add(1, Ordering::SeqCst);
        dir_tx
            .send(root)
            .await
            .map_err(|_| TraverseError::QueueClosed)?;

        info!(
            expanders = self.config.expand_concurrency,
            "Expansion dispatch started"
        );

        loop {
            if self.shutdown.load(Ordering::Relaxed) {
                debug!("Shutdown requested, stopping expansion dispatch");
                break;
            }

            let node = match tokio::time::timeout(POLL_INTERVAL, dir_rx.recv()).await {
                Ok(Some(node)) => node,
                Ok(None) => break, // all senders gone
                Err(_) => {
                    // Queue momentarily empty; quiescent only if no
                    // expansion could still enqueue more folders
                    if in_flight.load(Ordering::SeqCst) == 0 {
                        break;
                    }
                    continue;
                }
            };

            // Depth and exclusion limits are settled before dispatch
            let too_deep = self
                .config
                .max_depth
                .map(|max| node.depth as usize > max)
                .unwrap_or(false);
            if too_deep || self.config.is_excluded(&node.path) {
                self.stats.record_skip();
                in_flight.fetch_sub(1, Ordering::SeqCst);
                debug!(path = %node.path, depth = node.depth, "Directory skipped");
                continue;
            }

            let expander = DirectoryExpander::new(Arc::clone(&self.store), Arc::clone(&self.stats));
            let semaphore = Arc::clone(&semaphore);
            let dir_tx = dir_tx.clone();
            let file_tx = file_tx.clone();
            let in_flight_clone = Arc::clone(&in_flight);
            let stats = Arc::clone(&self.stats);
            let shutdown = Arc::clone(&self.shutdown);
            let failures = Arc::clone(&listing_failures);
            let fatal_slot = Arc::clone(&fatal);
            let policy = self.config.listing_policy;

            tokio::spawn(async move {
                // The permit is taken inside the task: the dispatch loop
                // must keep receiving from the directory queue, or
                // expanders blocked publishing subfolders into a full
                // queue would hold every permit and stall the frontier.
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("Expansion semaphore closed");

                let result = expander
                    .expand(&node, &dir_tx, &file_tx, &in_flight_clone)
                    .await;

                if let Err(e) = result {
                    stats.record_listing_error();
                    match policy {
                        ListingPolicy::Fatal => {
                            error!(path = %node.path, error = %e, "Listing failed, aborting traversal");
                            let mut slot = fatal_slot.lock().expect("fatal slot poisoned");
                            if slot.is_none() {
                                *slot = Some(e);
                            }
                            shutdown.store(true, Ordering::SeqCst);
                        }
                        ListingPolicy::Skip => {
                            warn!(path = %node.path, error = %e, "Listing failed, skipping directory");
                            failures
                                .lock()
                                .expect("failure list poisoned")
                                .push(ListingFailure {
                                    path: node.path.clone(),
                                    error: e,
                                });
                        }
                    }
                }

                in_flight_clone.fetch_sub(1, Ordering::SeqCst);
            });
        }

        // Unblock expanders stuck publishing into a full directory queue
        // during shutdown; their sends fail and they unwind cleanly.
        drop(dir_rx);

        // Join barrier: no expansion task may be outstanding when the file
        // queue closes. The semaphore is FIFO, so tasks already waiting
        // for permits are served before this acquire_many.
        let _ = semaphore
            .acquire_many(self.config.expand_concurrency as u32)
            .await;

        debug!("Expansion phase quiescent");

        let listing_failures = std::mem::take(
            &mut *listing_failures.lock().expect("failure list poisoned"),
        );
        let fatal = fatal.lock().expect("fatal slot poisoned").take();

        Ok(SchedulerOutcome {
            listing_failures,
            fatal,
        })
    }
}
