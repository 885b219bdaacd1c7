//! Directory expansion
//!
//! The expander consumes one folder node at a time, walks the paginated
//! listing until no continuation token remains, and routes every child to
//! the directory queue (folders) or the file queue (files). All children
//! of a folder are published before `expand` returns; nothing streams past
//! the call boundary.
//!
//! Bounded sends are the backpressure mechanism: a full file queue blocks
//! the expander here until the worker pool frees capacity.

use crate::drive::{Node, ObjectStore};
use crate::engine::stats::TraverseStats;
use crate::error::DriveResult;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::Sender;
use tracing::debug;

/// Expands folder nodes into their immediate children
pub struct DirectoryExpander {
    store: Arc<dyn ObjectStore>,
    stats: Arc<TraverseStats>,
}

impl DirectoryExpander {
    pub fn new(store: Arc<dyn ObjectStore>, stats: Arc<TraverseStats>) -> Self {
        Self { store, stats }
    }

    /// Expand one folder, publishing every child before returning
    ///
    /// The outstanding-work counter is incremented for each child folder
    /// *before* its node is sent, so the scheduler can never observe an
    /// empty queue and a zero counter while a discovered folder is still
    /// unaccounted for.
    pub async fn expand(
        &self,
        dir: &Node,
        dir_tx: &Sender<Node>,
        file_tx: &Sender<Node>,
        in_flight: &AtomicU64,
    ) -> DriveResult<()> {
        let mut page_token: Option<String> = None;
        let mut subdirs = 0u64;
        let mut files = 0u64;

        loop {
            let page = self
                .store
                .list_children(&dir.id, page_token.as_deref())
                .await?;

            for entry in &page.entries {
                let node = dir.child(entry);

                if node.kind.is_folder() {
                    in_flight.fetch_add(1, Ordering::SeqCst);
                    if dir_tx.send(node).await.is_err() {
                        // Scheduler is shutting down; undo the claim
                        in_flight.fetch_sub(1, Ordering::SeqCst);
                        return Ok(());
                    }
                    subdirs += 1;
                } else {
                    self.stats.record_file_found(node.size);
                    if file_tx.send(node).await.is_err() {
                        return Ok(());
                    }
                    files += 1;
                }
            }

            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        self.stats.record_dir();
        debug!(path = %dir.path, subdirs, files, "Directory expanded");

        Ok(())
    }
}
