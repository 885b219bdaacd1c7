//! Remote tree entry types
//!
//! These types represent entries returned from Drive listing calls and the
//! nodes the traversal engine moves through its queues. A node is created
//! when a listing page yields it, enqueued once, and discarded after being
//! expanded (folders) or processed (files) - the engine keeps no tree.

/// MIME type Drive uses to mark folders
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Kind of remote tree entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Regular file (anything that is not a folder)
    File,
    /// Folder
    Folder,
}

impl NodeKind {
    /// Classify an entry from its Drive MIME type
    pub fn from_mime_type(mime_type: &str) -> Self {
        if mime_type == FOLDER_MIME_TYPE {
            NodeKind::Folder
        } else {
            NodeKind::File
        }
    }

    /// Check if this is a folder
    pub fn is_folder(&self) -> bool {
        *self == NodeKind::Folder
    }
}

/// One child record from a listing page
#[derive(Debug, Clone)]
pub struct ChildEntry {
    /// Opaque remote-assigned identifier
    pub id: String,

    /// Display name within the parent
    pub name: String,

    /// File or folder
    pub kind: NodeKind,

    /// Size in bytes (0 for folders and Workspace documents)
    pub size: u64,
}

/// One page of a paginated listing
#[derive(Debug, Clone)]
pub struct ListPage {
    /// Entries on this page
    pub entries: Vec<ChildEntry>,

    /// Continuation token; `None` on the final page
    pub next_page_token: Option<String>,
}

/// One node in the remote tree as seen by the traversal engine
///
/// `id` is the only field used for further API calls. `path` is derived by
/// concatenating ancestor names and is used for reporting only; it may go
/// stale if the remote tree mutates mid-walk (the walk is a point-in-time
/// snapshot, not transactional).
#[derive(Debug, Clone)]
pub struct Node {
    /// Opaque remote identifier, unique within the store
    pub id: String,

    /// Logical path from the traversal root
    pub path: String,

    /// File or folder
    pub kind: NodeKind,

    /// Size in bytes (files only)
    pub size: u64,

    /// Depth from the root (0 = root)
    pub depth: u32,
}

impl Node {
    /// Create the root node for a traversal
    pub fn root(id: &str) -> Self {
        Self {
            id: id.to_string(),
            path: String::new(),
            kind: NodeKind::Folder,
            size: 0,
            depth: 0,
        }
    }

    /// Create a child node from a listing entry
    pub fn child(&self, entry: &ChildEntry) -> Self {
        Self {
            id: entry.id.clone(),
            path: format!("{}/{}", self.path, entry.name),
            kind: entry.kind,
            size: entry.size,
            depth: self.depth + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_mime_type() {
        assert_eq!(
            NodeKind::from_mime_type("application/vnd.google-apps.folder"),
            NodeKind::Folder
        );
        assert_eq!(NodeKind::from_mime_type("image/png"), NodeKind::File);
        assert_eq!(
            NodeKind::from_mime_type("application/vnd.google-apps.document"),
            NodeKind::File
        );
    }

    #[test]
    fn test_child_path_building() {
        let root = Node::root("rootid");
        assert_eq!(root.path, "");
        assert_eq!(root.depth, 0);
        assert!(root.kind.is_folder());

        let dir = root.child(&ChildEntry {
            id: "d1".into(),
            name: "Projects".into(),
            kind: NodeKind::Folder,
            size: 0,
        });
        assert_eq!(dir.path, "/Projects");
        assert_eq!(dir.depth, 1);

        let file = dir.child(&ChildEntry {
            id: "f1".into(),
            name: "notes.txt".into(),
            kind: NodeKind::File,
            size: 1024,
        });
        assert_eq!(file.path, "/Projects/notes.txt");
        assert_eq!(file.depth, 2);
        assert_eq!(file.size, 1024);
    }
}
