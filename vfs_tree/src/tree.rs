//! The tree contract

use core_types::NodeId;

use crate::{FileNode, FileUpdate, FolderNode, FolderUpdate};

/// In-memory tree of files and folders
///
/// All operations are synchronous and infallible. Lookups return owned
/// copies so callers never hold a borrow of the tree across a host call.
pub trait Vfs {
    /// Inserts a file, replacing any file with the same id
    fn create_file(&mut self, node: FileNode);

    /// Inserts a folder, replacing any folder with the same id
    fn create_folder(&mut self, node: FolderNode);

    /// Applies `update` to a file; returns false if the file is unknown
    fn update_file(&mut self, id: &NodeId, update: FileUpdate) -> bool;

    /// Applies `update` to a folder; returns false if the folder is unknown
    fn update_folder(&mut self, id: &NodeId, update: FolderUpdate) -> bool;

    /// Removes a file
    fn delete_file(&mut self, id: &NodeId) -> Option<FileNode>;

    /// Removes a folder together with everything below it
    fn delete_folder(&mut self, id: &NodeId) -> Option<FolderNode>;

    fn find_file_by_id(&self, id: &NodeId) -> Option<FileNode>;

    fn find_folder_by_id(&self, id: &NodeId) -> Option<FolderNode>;

    /// Files whose parent is `parent_id`, ordered by name
    fn find_files_where(&self, parent_id: Option<&NodeId>) -> Vec<FileNode>;

    /// Folders whose parent is `parent_id`, ordered by name
    fn find_folders_where(&self, parent_id: Option<&NodeId>) -> Vec<FolderNode>;

    /// Removes every node
    fn clear(&mut self);

    fn is_empty(&self) -> bool;

    /// Returns true if `folder_id` is `ancestor_id` or lies below it
    fn is_within(&self, folder_id: &NodeId, ancestor_id: &NodeId) -> bool {
        let mut current = Some(folder_id.clone());
        while let Some(id) = current {
            if &id == ancestor_id {
                return true;
            }
            current = self.find_folder_by_id(&id).and_then(|f| f.parent_id);
        }
        false
    }

    /// Ids of every file and folder below `folder_id`
    fn descendants(&self, folder_id: &NodeId) -> (Vec<NodeId>, Vec<NodeId>) {
        let mut files = Vec::new();
        let mut folders = Vec::new();
        let mut stack = vec![folder_id.clone()];
        while let Some(id) = stack.pop() {
            files.extend(
                self.find_files_where(Some(&id))
                    .into_iter()
                    .map(|f| f.id),
            );
            for folder in self.find_folders_where(Some(&id)) {
                stack.push(folder.id.clone());
                folders.push(folder.id);
            }
        }
        (files, folders)
    }
}
