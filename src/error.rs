//! Error types for drive-walker
//!
//! This module defines the error hierarchy covering:
//! - Drive API and HTTP transport errors
//! - Configuration and CLI errors
//! - Per-file processing errors
//!
//! Design philosophy:
//! - Use thiserror for structured error types in library code
//! - Errors should be actionable - include context about what to do
//! - Preserve error chains for debugging

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the drive-walker application
#[derive(Error, Debug)]
pub enum TraverseError {
    /// Drive API errors
    #[error("Drive error: {0}")]
    Drive(#[from] DriveError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors (token file, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory queue closed before the root could be seeded
    #[error("Directory queue closed unexpectedly")]
    QueueClosed,
}

/// Drive API and transport errors
#[derive(Error, Debug)]
pub enum DriveError {
    /// HTTP transport failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API rejected the listing call
    #[error("Drive API error {status} listing '{parent}': {message}")]
    Api {
        parent: String,
        status: u16,
        message: String,
    },

    /// Response body did not match the expected listing shape
    #[error("Malformed listing response for '{parent}': {reason}")]
    InvalidResponse { parent: String, reason: String },

    /// Quota exhausted or rate limited
    #[error("Rate limited while listing '{parent}'")]
    RateLimited { parent: String },

    /// Parent folder does not exist or is not visible to this token
    #[error("Folder not found: '{parent}'")]
    NotFound { parent: String },

    /// Token file missing or unreadable
    #[error("Failed to read token file '{path}': {reason}")]
    TokenFile { path: PathBuf, reason: String },
}

impl DriveError {
    /// Check if this error is recoverable (the traversal can skip the
    /// directory and continue under the skip policy)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DriveError::NotFound { .. } | DriveError::RateLimited { .. }
        )
    }
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid worker count
    #[error("Invalid worker count {count}: must be between 1 and {max}")]
    InvalidWorkerCount { count: usize, max: usize },

    /// Invalid expander concurrency
    #[error("Invalid expander count {count}: must be between 1 and {max}")]
    InvalidExpanderCount { count: usize, max: usize },

    /// Invalid queue capacity
    #[error("Invalid queue capacity {size}: must be at least {min}")]
    InvalidQueueSize { size: usize, min: usize },

    /// Invalid listing page size
    #[error("Invalid page size {size}: must be between 1 and {max}")]
    InvalidPageSize { size: u32, max: u32 },

    /// Invalid exclude pattern
    #[error("Invalid exclude pattern '{pattern}': {reason}")]
    InvalidExcludePattern { pattern: String, reason: String },
}

/// Error from a file processing action
///
/// The concrete action is an external collaborator; this type only has to
/// carry enough context to report the failure per file.
#[derive(Error, Debug)]
pub enum ProcessError {
    /// I/O failure inside the action
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Action-specific failure
    #[error("{0}")]
    Other(String),
}

/// A directory whose listing failed and was skipped
#[derive(Debug)]
pub struct ListingFailure {
    /// Logical path of the directory from the traversal root
    pub path: String,

    /// The listing error
    pub error: DriveError,
}

/// A file whose processing action failed
#[derive(Debug)]
pub struct FileFailure {
    /// Logical path of the file from the traversal root
    pub path: String,

    /// The processing error
    pub error: ProcessError,
}

/// Result type alias for TraverseError
pub type Result<T> = std::result::Result<T, TraverseError>;

/// Result type alias for DriveError
pub type DriveResult<T> = std::result::Result<T, DriveError>;

/// Result type alias for ProcessError
pub type ProcessResult<T> = std::result::Result<T, ProcessError>;
