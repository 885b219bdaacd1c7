//! Drive access module
//!
//! This module provides access to the remote object store: the listing
//! trait the traversal engine consumes, the concrete Drive v3 client, and
//! stored-token loading.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    ObjectStore                       │
//! │  - list_children(parent, page_token) -> ListPage    │
//! │  - called until no continuation token remains       │
//! └─────────────────────────┬───────────────────────────┘
//!                           │
//!                           ▼
//! ┌─────────────────────────────────────────────────────┐
//! │                    DriveClient                       │
//! │  - files.list with q = '<id>' in parents            │
//! │  - bearer token from a stored token file            │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod auth;
mod client;
pub mod types;

pub use client::DriveClient;
pub use types::{ChildEntry, ListPage, Node, NodeKind, FOLDER_MIME_TYPE};

use crate::error::DriveResult;
use async_trait::async_trait;

/// Remote listing collaborator consumed by the directory expander
///
/// Implementations must return one page per call and a continuation token
/// whenever further pages remain; the engine calls again with that token
/// until it receives `None`.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List one page of the immediate children of `parent_id`
    async fn list_children(
        &self,
        parent_id: &str,
        page_token: Option<&str>,
    ) -> DriveResult<ListPage>;
}
