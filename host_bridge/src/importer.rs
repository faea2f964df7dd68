//! Tree importer
//!
//! Materializes a host directory into the tree and the handle store.
//! Every import starts from a wiped state.

use core_types::NodeId;
use futures::future::LocalBoxFuture;
use host_fs::{DirectoryHandle, FileHandle, HostEntry, HostHandle};
use services_handle_store::{HandleStore, HandleStoreExt};
use services_settings::SettingsStore;
use tracing::{debug, info};
use vfs_tree::{FileNode, FolderNode, Vfs};

use crate::{HostBridge, ImportError};

impl<D, S, V, F> HostBridge<D, S, V, F>
where
    D: DirectoryHandle,
    S: HandleStore<D>,
    V: Vfs,
    F: SettingsStore,
{
    /// Replaces the tree with the contents of `root`
    ///
    /// Readwrite permission on `root` must already be verified. On success
    /// the session is loaded and the host flag is persisted as set.
    pub async fn import_folder(&self, root: D) -> Result<(), ImportError> {
        self.state.set_loaded(false);
        self.wipe().await?;
        self.store.put_folder(&NodeId::root(), root.clone()).await?;
        self.observer.title_changed(root.name());

        self.import_dir(root.clone(), None).await?;

        self.state.set_loaded(true);
        self.set_host_flag(true)?;
        self.observer.tree_loaded();

        let tree = self.tree();
        info!(
            root = root.name(),
            top_files = tree.find_files_where(None).len(),
            top_folders = tree.find_folders_where(None).len(),
            "imported host folder"
        );
        Ok(())
    }

    /// Imports every entry of `dir` below `parent`, depth first
    fn import_dir(
        &self,
        dir: D,
        parent: Option<NodeId>,
    ) -> LocalBoxFuture<'_, Result<(), ImportError>> {
        Box::pin(async move {
            let entries = dir.entries().await?;
            let imports = entries
                .into_iter()
                .map(|entry| self.import_entry(entry, parent.clone()))
                .collect();
            self.fan_out(imports).await?;
            Ok(())
        })
    }

    async fn import_entry(
        &self,
        entry: HostEntry<D>,
        parent: Option<NodeId>,
    ) -> Result<(), ImportError> {
        match entry {
            HostEntry::File(file) => {
                let size = file.size().await?;
                let node = FileNode::new(NodeId::new(), file.name(), parent).with_size(size);
                debug!(name = file.name(), size, "importing file");
                self.record_file(node, file).await?;
            }
            HostEntry::Directory(dir) => {
                let id = NodeId::new();
                debug!(name = dir.name(), %id, "importing folder");
                let node = FolderNode::new(id.clone(), dir.name(), parent);
                self.record_folder(node, dir.clone()).await?;
                self.import_dir(dir, Some(id)).await?;
            }
        }
        Ok(())
    }
}
