//! Stored-token loading
//!
//! Token acquisition and refresh are out of scope: the walker expects a
//! token.json written by an external OAuth flow and only reads the access
//! token out of it.

use crate::error::{DriveError, DriveResult};
use serde::Deserialize;
use std::path::Path;

/// Stored OAuth token, matching the token.json layout produced by the
/// standard Google OAuth flow
#[derive(Debug, Clone, Deserialize)]
pub struct StoredToken {
    /// Bearer token sent on every API call
    pub access_token: String,

    #[serde(default)]
    pub token_type: Option<String>,

    #[serde(default)]
    pub refresh_token: Option<String>,

    /// RFC 3339 expiry timestamp; not enforced here
    #[serde(default)]
    pub expiry: Option<String>,
}

/// Load a stored token from disk
pub fn load_token(path: &Path) -> DriveResult<StoredToken> {
    let data = std::fs::read_to_string(path).map_err(|e| DriveError::TokenFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    serde_json::from_str(&data).map_err(|e| DriveError::TokenFile {
        path: path.to_path_buf(),
        reason: format!("invalid token JSON: {}", e),
    })
}
