//! Drive v3 REST client
//!
//! Implements the `ObjectStore` listing contract over the files.list
//! endpoint. Each call fetches one page; the continuation token is passed
//! back verbatim as `pageToken`.

use crate::drive::types::{ChildEntry, ListPage, NodeKind};
use crate::drive::ObjectStore;
use crate::error::{DriveError, DriveResult};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, trace};

const FILES_ENDPOINT: &str = "https://www.googleapis.com/drive/v3/files";

/// Fields requested per child entry; size is absent for folders and
/// Workspace documents
const LIST_FIELDS: &str = "nextPageToken, files(id, name, mimeType, size)";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    next_page_token: Option<String>,
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    name: String,
    mime_type: String,
    #[serde(default)]
    size: Option<String>,
}

/// Authorized Drive API client
///
/// Cheap to clone-by-Arc and safe to share across tasks; reqwest pools
/// connections internally.
pub struct DriveClient {
    http: reqwest::Client,
    access_token: String,
    page_size: u32,
}

impl DriveClient {
    /// Create a client from a ready-to-use access token
    pub fn new(access_token: String, page_size: u32) -> Self {
        Self {
            http: reqwest::Client::new(),
            access_token,
            page_size,
        }
    }
}

#[async_trait]
impl ObjectStore for DriveClient {
    async fn list_children(
        &self,
        parent_id: &str,
        page_token: Option<&str>,
    ) -> DriveResult<ListPage> {
        let query = format!("'{}' in parents", parent_id);

        let mut params: Vec<(&str, String)> = vec![
            ("q", query),
            ("pageSize", self.page_size.to_string()),
            ("fields", LIST_FIELDS.to_string()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }

        trace!(parent = parent_id, page_token = ?page_token, "files.list");

        let response = self
            .http
            .get(FILES_ENDPOINT)
            .bearer_auth(&self.access_token)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::NOT_FOUND => DriveError::NotFound {
                    parent: parent_id.to_string(),
                },
                StatusCode::TOO_MANY_REQUESTS => DriveError::RateLimited {
                    parent: parent_id.to_string(),
                },
                _ => DriveError::Api {
                    parent: parent_id.to_string(),
                    status: status.as_u16(),
                    message,
                },
            });
        }

        let list: FileList = response.json().await?;

        let entries = list
            .files
            .into_iter()
            .map(|f| {
                let kind = NodeKind::from_mime_type(&f.mime_type);
                let size = f.size.as_deref().and_then(|s| s.parse().ok()).unwrap_or(0);
                ChildEntry {
                    id: f.id,
                    name: f.name,
                    kind,
                    size,
                }
            })
            .collect::<Vec<_>>();

        debug!(
            parent = parent_id,
            entries = entries.len(),
            has_more = list.next_page_token.is_some(),
            "Listing page received"
        );

        Ok(ListPage {
            entries,
            next_page_token: list.next_page_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_list_deserialization() {
        let body = r#"{
            "nextPageToken": "tok123",
            "files": [
                {"id": "a", "name": "Projects", "mimeType": "application/vnd.google-apps.folder"},
                {"id": "b", "name": "photo.jpg", "mimeType": "image/jpeg", "size": "2048"}
            ]
        }"#;

        let list: FileList = serde_json::from_str(body).unwrap();
        assert_eq!(list.next_page_token.as_deref(), Some("tok123"));
        assert_eq!(list.files.len(), 2);
        assert_eq!(list.files[0].size, None);
        assert_eq!(list.files[1].size.as_deref(), Some("2048"));
    }

    #[test]
    fn test_file_list_final_page() {
        let body = r#"{"files": []}"#;
        let list: FileList = serde_json::from_str(body).unwrap();
        assert!(list.next_page_token.is_none());
        assert!(list.files.is_empty());
    }
}
