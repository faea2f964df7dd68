//! Reference tree kept in ordered maps

use core_types::NodeId;
use std::collections::BTreeMap;

use crate::{FileNode, FileUpdate, FolderNode, FolderUpdate, Vfs};

/// In-memory [`Vfs`]
#[derive(Debug, Clone, Default)]
pub struct MemoryVfs {
    files: BTreeMap<NodeId, FileNode>,
    folders: BTreeMap<NodeId, FolderNode>,
}

impl MemoryVfs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn folder_count(&self) -> usize {
        self.folders.len()
    }

    /// Every file, ordered by id
    pub fn files(&self) -> impl Iterator<Item = &FileNode> {
        self.files.values()
    }

    /// Every folder, ordered by id
    pub fn folders(&self) -> impl Iterator<Item = &FolderNode> {
        self.folders.values()
    }
}

impl Vfs for MemoryVfs {
    fn create_file(&mut self, node: FileNode) {
        self.files.insert(node.id.clone(), node);
    }

    fn create_folder(&mut self, node: FolderNode) {
        self.folders.insert(node.id.clone(), node);
    }

    fn update_file(&mut self, id: &NodeId, update: FileUpdate) -> bool {
        match self.files.get_mut(id) {
            Some(node) => {
                update.apply(node);
                true
            }
            None => false,
        }
    }

    fn update_folder(&mut self, id: &NodeId, update: FolderUpdate) -> bool {
        match self.folders.get_mut(id) {
            Some(node) => {
                update.apply(node);
                true
            }
            None => false,
        }
    }

    fn delete_file(&mut self, id: &NodeId) -> Option<FileNode> {
        self.files.remove(id)
    }

    fn delete_folder(&mut self, id: &NodeId) -> Option<FolderNode> {
        let (files, folders) = self.descendants(id);
        for file in files {
            self.files.remove(&file);
        }
        for folder in folders {
            self.folders.remove(&folder);
        }
        self.folders.remove(id)
    }

    fn find_file_by_id(&self, id: &NodeId) -> Option<FileNode> {
        self.files.get(id).cloned()
    }

    fn find_folder_by_id(&self, id: &NodeId) -> Option<FolderNode> {
        self.folders.get(id).cloned()
    }

    fn find_files_where(&self, parent_id: Option<&NodeId>) -> Vec<FileNode> {
        let mut nodes: Vec<FileNode> = self
            .files
            .values()
            .filter(|f| f.parent_id.as_ref() == parent_id)
            .cloned()
            .collect();
        nodes.sort_by(|a, b| a.name.cmp(&b.name));
        nodes
    }

    fn find_folders_where(&self, parent_id: Option<&NodeId>) -> Vec<FolderNode> {
        let mut nodes: Vec<FolderNode> = self
            .folders
            .values()
            .filter(|f| f.parent_id.as_ref() == parent_id)
            .cloned()
            .collect();
        nodes.sort_by(|a, b| a.name.cmp(&b.name));
        nodes
    }

    fn clear(&mut self) {
        self.files.clear();
        self.folders.clear();
    }

    fn is_empty(&self) -> bool {
        self.files.is_empty() && self.folders.is_empty()
    }
}
