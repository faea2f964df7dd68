//! Identifiers for VFS nodes and handle namespaces

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::new_uuid;

/// Reserved folder key that always denotes the attached top-level host directory.
pub const ROOT_KEY: &str = "root";

/// Unique identifier for a VFS node
///
/// Ids are unique within their namespace (files or folders). The same id is
/// used as the key of the node's handle record, so a node keeps its identity
/// even when the host object behind it is recreated by a move.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Creates a new random node ID
    pub fn new() -> Self {
        Self(new_uuid().to_string())
    }

    /// Creates a node ID from an existing string
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The reserved key of the attached top-level directory
    pub fn root() -> Self {
        Self(ROOT_KEY.to_string())
    }

    /// Returns true if this is the reserved root key
    pub fn is_root(&self) -> bool {
        self.0 == ROOT_KEY
    }

    /// Returns the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Keyed namespace a handle record is stored in
///
/// The two namespaces are independent: the same key may exist in both
/// without referring to the same node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HandleNamespace {
    /// `file-handles`
    #[serde(rename = "file-handles")]
    Files,
    /// `folder-handles`
    #[serde(rename = "folder-handles")]
    Folders,
}

impl HandleNamespace {
    /// All namespaces, in store order
    pub const ALL: [HandleNamespace; 2] = [HandleNamespace::Files, HandleNamespace::Folders];

    /// Name of the namespace inside the durable store
    pub fn store_name(&self) -> &'static str {
        match self {
            HandleNamespace::Files => "file-handles",
            HandleNamespace::Folders => "folder-handles",
        }
    }
}

impl fmt::Display for HandleNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.store_name())
    }
}

/// Kind of a host entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    /// A regular file
    File,
    /// A directory
    Directory,
}

impl EntryKind {
    /// Namespace that handles of this kind are stored in
    pub fn namespace(&self) -> HandleNamespace {
        match self {
            EntryKind::File => HandleNamespace::Files,
            EntryKind::Directory => HandleNamespace::Folders,
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::File => write!(f, "file"),
            EntryKind::Directory => write!(f, "directory"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_unique() {
        let a = NodeId::new();
        let b = NodeId::new();
        assert_ne!(a, b);
        assert!(!a.is_root());
    }

    #[test]
    fn test_root_key() {
        let root = NodeId::root();
        assert!(root.is_root());
        assert_eq!(root.as_str(), "root");
        assert_eq!(NodeId::from("root"), root);
    }

    #[test]
    fn test_node_id_serializes_transparently() {
        let id = NodeId::from("abc");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"abc\"");
        let back: NodeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_namespace_store_names() {
        assert_eq!(HandleNamespace::Files.store_name(), "file-handles");
        assert_eq!(HandleNamespace::Folders.store_name(), "folder-handles");
        let json = serde_json::to_string(&HandleNamespace::Folders).unwrap();
        assert_eq!(json, "\"folder-handles\"");
    }

    #[test]
    fn test_entry_kind_namespace() {
        assert_eq!(EntryKind::File.namespace(), HandleNamespace::Files);
        assert_eq!(EntryKind::Directory.namespace(), HandleNamespace::Folders);
    }
}
