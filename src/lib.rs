//! drive-walker - Concurrent Google Drive Tree Walker
//!
//! Walks a Drive folder tree through the paginated files.list API,
//! expanding subfolders concurrently and dispatching every discovered file
//! to a bounded worker pool.
//!
//! # Features
//!
//! - **Concurrent Expansion**: Multiple folder listings in flight at once,
//!   bounded by a semaphore, with counter-based termination detection.
//!
//! - **Bounded Fan-out**: One task per discovered file, capped by the pool
//!   size; a full file queue applies backpressure to the expanders.
//!
//! - **Isolated Failures**: A file whose processing fails never blocks its
//!   siblings; failures are collected and reported in aggregate.
//!
//! - **Pluggable Collaborators**: The listing API and the per-file action
//!   are traits; the shipped implementations are the Drive v3 REST client
//!   and a no-op action.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Drive API (files.list)                     │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │ paginated listings
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     TraversalScheduler                           │
//! │   directory queue ──► expansion tasks (semaphore bounded)       │
//! │   outstanding-work counter decides quiescence                   │
//! └───────────┬─────────────────────────────────┬───────────────────┘
//!             │ subfolders (fed back)           │ files
//!             ▼                                 ▼
//!       directory queue                   file queue (bounded)
//!                                               │
//!                                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      FileWorkerPool                              │
//! │   one task per file, pool-size bounded, join barrier at end     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use drive_walker::config::{CliArgs, WalkConfig};
//! use drive_walker::drive::{auth, DriveClient, Node};
//! use drive_walker::engine::{NoopProcessor, Traversal};
//! use std::sync::Arc;
//!
//! # async fn example() -> drive_walker::error::Result<()> {
//! let config = Arc::new(WalkConfig::from_args(clap::Parser::parse())?);
//! let token = auth::load_token(&config.token_path)?;
//! let client = Arc::new(DriveClient::new(token.access_token, config.page_size));
//!
//! let traversal = Traversal::new(Arc::clone(&config), client, Arc::new(NoopProcessor));
//! let report = traversal.run(Node::root(&config.root_id)).await?;
//! println!("processed {} files", report.files_processed);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod drive;
pub mod engine;
pub mod error;
pub mod progress;
