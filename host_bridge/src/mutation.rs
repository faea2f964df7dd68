//! Mutation engine
//!
//! Create, write, delete and move operations applied to the host and
//! mirrored into the tree. Each one raises `busy` for its whole duration.
//! Deletes swallow and log their failures; the rest return them.

use core_types::{EntryKind, NodeId};
use futures::future::LocalBoxFuture;
use host_fs::{DirectoryHandle, FileHandle, HostEntry, HostHandle};
use services_handle_store::{HandleStore, HandleStoreExt};
use services_settings::SettingsStore;
use std::collections::HashMap;
use tracing::{debug, error, info};
use vfs_tree::{FileNode, FileUpdate, FolderNode, FolderUpdate, Vfs};

use crate::{HostBridge, IoError, IoResult};

impl<D, S, V, F> HostBridge<D, S, V, F>
where
    D: DirectoryHandle,
    S: HandleStore<D>,
    V: Vfs,
    F: SettingsStore,
{
    /// Handle of folder `id`, or of the attached root when `id` is `None`
    async fn folder_handle(&self, id: Option<&NodeId>) -> IoResult<D> {
        match id {
            Some(id) => self
                .store
                .get_folder(id)
                .await?
                .ok_or_else(|| IoError::MissingHandle {
                    kind: EntryKind::Directory,
                    id: id.clone(),
                }),
            None => self.store.get_root().await?.ok_or(IoError::NotAttached),
        }
    }

    async fn file_handle(&self, id: &NodeId) -> IoResult<D::File> {
        self.store
            .get_file(id)
            .await?
            .ok_or_else(|| IoError::MissingHandle {
                kind: EntryKind::File,
                id: id.clone(),
            })
    }

    /// Replaces the full contents of file `file_id`
    ///
    /// The host file is looked up under `file_id` and created as `filename`
    /// inside `folder_id` (the root when `None`) if it has no handle yet.
    pub async fn write_file_to_folder(
        &self,
        folder_id: Option<&NodeId>,
        file_id: &NodeId,
        filename: &str,
        content: &str,
    ) -> IoResult<()> {
        let _busy = self.state.begin_mutation();
        let file = match self.store.get_file(file_id).await? {
            Some(file) => file,
            None => {
                let folder = self.folder_handle(folder_id).await?;
                let file = folder.get_file_handle(filename, true).await?;
                self.store.put_file(file_id, file.clone()).await?;
                file
            }
        };
        file.write_all(content.as_bytes()).await?;

        let mut tree = self.tree_mut();
        let update = FileUpdate::default().content(Some(content.to_string()));
        if !tree.update_file(file_id, update.size(content.len() as u64)) {
            tree.create_file(
                FileNode::new(file_id.clone(), filename, folder_id.cloned()).with_content(content),
            );
        }
        debug!(%file_id, filename, bytes = content.len(), "wrote file");
        Ok(())
    }

    /// Creates (or reuses) directory `name` under `parent_id` as folder `folder_id`
    pub async fn create_folder(
        &self,
        folder_id: &NodeId,
        parent_id: Option<&NodeId>,
        name: &str,
    ) -> IoResult<()> {
        let _busy = self.state.begin_mutation();
        if folder_id.is_root() {
            return Err(IoError::ReservedRoot("recreated"));
        }
        let parent = self.folder_handle(parent_id).await?;
        let dir = parent.get_directory_handle(name, true).await?;
        self.store.put_folder(folder_id, dir).await?;

        let mut tree = self.tree_mut();
        if tree.find_folder_by_id(folder_id).is_none() {
            tree.create_folder(FolderNode::new(folder_id.clone(), name, parent_id.cloned()));
        }
        debug!(%folder_id, name, "created folder");
        Ok(())
    }

    /// Removes file `id` from the host and forgets it
    ///
    /// Returns false if any step failed. A file with no handle is already
    /// gone and returns true.
    pub async fn delete_file(&self, id: &NodeId) -> bool {
        let _busy = self.state.begin_mutation();
        match self.try_delete_file(id).await {
            Ok(()) => true,
            Err(err) => {
                error!(%id, error = %err, "failed to delete file");
                false
            }
        }
    }

    async fn try_delete_file(&self, id: &NodeId) -> IoResult<()> {
        if let Some(file) = self.store.get_file(id).await? {
            file.remove().await?;
        }
        self.forget_file(id).await?;
        Ok(())
    }

    /// Removes folder `id` and everything below it from the host
    ///
    /// Same contract as [`HostBridge::delete_file`].
    pub async fn delete_folder(&self, id: &NodeId) -> bool {
        let _busy = self.state.begin_mutation();
        match self.try_delete_folder(id).await {
            Ok(()) => true,
            Err(err) => {
                error!(%id, error = %err, "failed to delete folder");
                false
            }
        }
    }

    async fn try_delete_folder(&self, id: &NodeId) -> IoResult<()> {
        if id.is_root() {
            return Err(IoError::ReservedRoot("deleted"));
        }
        if let Some(dir) = self.store.get_folder(id).await? {
            self.remove_tree(dir).await?;
        }
        self.forget_folder(id).await?;
        Ok(())
    }

    /// Removes the contents of `dir` depth first, then `dir` itself
    fn remove_tree(&self, dir: D) -> LocalBoxFuture<'_, IoResult<()>> {
        Box::pin(async move {
            let removals = dir
                .entries()
                .await?
                .into_iter()
                .map(|entry| async move {
                    match entry {
                        HostEntry::File(file) => file.remove().await.map_err(IoError::from),
                        HostEntry::Directory(sub) => self.remove_tree(sub).await,
                    }
                })
                .collect();
            self.fan_out(removals).await?;
            dir.remove().await?;
            Ok(())
        })
    }

    /// Moves file `id` to `new_name` inside `new_parent_id` (root if `None`)
    ///
    /// The host file is recreated with the same bytes; the handle is
    /// re-persisted under the same id.
    pub async fn move_file(
        &self,
        id: &NodeId,
        new_name: &str,
        new_parent_id: Option<&NodeId>,
    ) -> IoResult<()> {
        let _busy = self.state.begin_mutation();
        let old = self.file_handle(id).await?;
        let parent = self.folder_handle(new_parent_id).await?;

        let moved = self.relocate_file(old, &parent, new_name).await?;
        self.store.put_file(id, moved).await?;

        self.tree_mut().update_file(
            id,
            FileUpdate::default()
                .name(new_name)
                .parent(new_parent_id.cloned()),
        );
        debug!(%id, new_name, "moved file");
        Ok(())
    }

    /// Recreates `old` as `name` under `parent` and removes the original
    async fn relocate_file(&self, old: D::File, parent: &D, name: &str) -> IoResult<D::File> {
        let bytes = old.read().await?;
        self.relocate_bytes(old, parent, name, &bytes).await
    }

    async fn relocate_bytes(
        &self,
        old: D::File,
        parent: &D,
        name: &str,
        bytes: &[u8],
    ) -> IoResult<D::File> {
        old.remove().await?;
        let new = parent.get_file_handle(name, true).await?;
        new.write_all(bytes).await?;
        Ok(new)
    }

    /// Moves folder `id` under `new_parent_id` (root if `None`), renaming it
    /// to `new_name` when given
    ///
    /// The whole subtree is recreated at the new location before the old
    /// directory is removed. Ids of every tracked node are kept.
    pub async fn move_folder(
        &self,
        id: &NodeId,
        new_name: Option<&str>,
        new_parent_id: Option<&NodeId>,
    ) -> IoResult<()> {
        let _busy = self.state.begin_mutation();
        if id.is_root() {
            return Err(IoError::InvalidMove("the root folder cannot move".to_string()));
        }
        if let Some(parent_id) = new_parent_id {
            if self.tree().is_within(parent_id, id) {
                return Err(IoError::InvalidMove(format!(
                    "folder {} cannot move into itself",
                    id
                )));
            }
        }

        let old = self.folder_handle(Some(id)).await?;
        let parent = self.folder_handle(new_parent_id).await?;
        let name = new_name.unwrap_or(old.name()).to_string();

        let mut update = FolderUpdate::default().parent(new_parent_id.cloned());
        if let Some(new_name) = new_name {
            update = update.name(new_name);
        }

        if let Ok(existing) = parent.get_directory_handle(&name, false).await {
            if existing.is_same_entry(&old).await? {
                self.tree_mut().update_folder(id, update);
                debug!(%id, "folder already at target location");
                return Ok(());
            }
        }

        self.tree_mut().update_folder(id, update);
        self.relocate_folder(old, parent, name.clone(), Some(id.clone()))
            .await?;
        info!(%id, name = %name, "moved folder");
        Ok(())
    }

    /// Recreates `old` as `name` under `parent`, recursing into every host
    /// entry, then removes `old`
    ///
    /// Entries the tree knows are matched by name and keep their ids; file
    /// content comes from the tree when loaded there, from the host otherwise.
    fn relocate_folder(
        &self,
        old: D,
        parent: D,
        name: String,
        id: Option<NodeId>,
    ) -> LocalBoxFuture<'_, IoResult<()>> {
        Box::pin(async move {
            let new_dir = parent.get_directory_handle(&name, true).await?;
            if let Some(id) = &id {
                self.store.put_folder(id, new_dir.clone()).await?;
            }

            let (files, folders) = match &id {
                Some(id) => {
                    let tree = self.tree();
                    let files: HashMap<String, FileNode> = tree
                        .find_files_where(Some(id))
                        .into_iter()
                        .map(|f| (f.name.clone(), f))
                        .collect();
                    let folders: HashMap<String, NodeId> = tree
                        .find_folders_where(Some(id))
                        .into_iter()
                        .map(|f| (f.name, f.id))
                        .collect();
                    (files, folders)
                }
                None => (HashMap::new(), HashMap::new()),
            };

            let moves = old
                .entries()
                .await?
                .into_iter()
                .map(|entry| {
                    let new_dir = new_dir.clone();
                    let tracked_file = files.get(entry.name()).cloned();
                    let tracked_folder = folders.get(entry.name()).cloned();
                    async move {
                        match entry {
                            HostEntry::Directory(sub) => {
                                let sub_name = sub.name().to_string();
                                self.relocate_folder(sub, new_dir, sub_name, tracked_folder)
                                    .await
                            }
                            HostEntry::File(file) => {
                                self.relocate_tracked_file(file, &new_dir, tracked_file)
                                    .await
                            }
                        }
                    }
                })
                .collect();
            self.fan_out(moves).await?;

            old.remove().await?;
            Ok(())
        })
    }

    async fn relocate_tracked_file(
        &self,
        file: D::File,
        new_dir: &D,
        tracked: Option<FileNode>,
    ) -> IoResult<()> {
        let name = file.name().to_string();
        let bytes = match tracked.as_ref().and_then(|node| node.content.clone()) {
            Some(content) => content.into_bytes(),
            None => file.read().await?,
        };
        let moved = self.relocate_bytes(file, new_dir, &name, &bytes).await?;
        if let Some(node) = tracked {
            self.store.put_file(&node.id, moved).await?;
        }
        Ok(())
    }

    /// Full text of file `id`, read through its handle
    pub async fn get_file_content(&self, id: &NodeId) -> IoResult<String> {
        let file = self.file_handle(id).await?;
        let bytes = file.read().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
