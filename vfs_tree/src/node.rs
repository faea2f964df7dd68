//! Tree node types

use core_types::NodeId;
use serde::{Deserialize, Serialize};

/// A file in the tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    pub id: NodeId,
    pub name: String,
    /// Containing folder, `None` at the top level
    pub parent_id: Option<NodeId>,
    /// Size in bytes as last seen on the host
    pub size: u64,
    /// Editor buffer, `None` until the file was opened or written
    pub content: Option<String>,
}

impl FileNode {
    /// Creates a file node with no loaded content
    pub fn new(id: NodeId, name: impl Into<String>, parent_id: Option<NodeId>) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id,
            size: 0,
            content: None,
        }
    }

    /// Sets the size
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    /// Sets the content and the matching size
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        let content = content.into();
        self.size = content.len() as u64;
        self.content = Some(content);
        self
    }
}

/// A folder in the tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderNode {
    pub id: NodeId,
    pub name: String,
    /// Containing folder, `None` at the top level
    pub parent_id: Option<NodeId>,
}

impl FolderNode {
    /// Creates a folder node
    pub fn new(id: NodeId, name: impl Into<String>, parent_id: Option<NodeId>) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id,
        }
    }
}

/// Partial update of a file node; `None` fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileUpdate {
    pub name: Option<String>,
    pub parent_id: Option<Option<NodeId>>,
    pub size: Option<u64>,
    pub content: Option<Option<String>>,
}

impl FileUpdate {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn parent(mut self, parent_id: Option<NodeId>) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn content(mut self, content: Option<String>) -> Self {
        self.content = Some(content);
        self
    }

    pub(crate) fn apply(self, node: &mut FileNode) {
        if let Some(name) = self.name {
            node.name = name;
        }
        if let Some(parent_id) = self.parent_id {
            node.parent_id = parent_id;
        }
        if let Some(size) = self.size {
            node.size = size;
        }
        if let Some(content) = self.content {
            node.content = content;
        }
    }
}

/// Partial update of a folder node; `None` fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderUpdate {
    pub name: Option<String>,
    pub parent_id: Option<Option<NodeId>>,
}

impl FolderUpdate {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn parent(mut self, parent_id: Option<NodeId>) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub(crate) fn apply(self, node: &mut FolderNode) {
        if let Some(name) = self.name {
            node.name = name;
        }
        if let Some(parent_id) = self.parent_id {
            node.parent_id = parent_id;
        }
    }
}
