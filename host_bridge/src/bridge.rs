//! The bridge value and its dual-write helpers
//!
//! Every path that changes both the tree and the handle store goes through
//! the `record_*`, `forget_*` and `wipe` helpers here, so the two
//! representations move together.

use core_types::NodeId;
use futures::future::try_join_all;
use host_fs::DirectoryHandle;
use services_handle_store::{HandleStore, HandleStoreExt, StoreError};
use services_settings::{BridgeConfig, SessionFlags, SettingsResult, SettingsStore};
use std::cell::{Ref, RefCell, RefMut};
use std::future::Future;
use std::marker::PhantomData;
use std::rc::Rc;
use tracing::debug;
use vfs_tree::{FileNode, FolderNode, Vfs};

use crate::observer::{NoopObserver, TreeObserver};
use crate::state::{SessionPhase, SessionState};

/// Bridge between a [`Vfs`] tree and a host directory
///
/// `D` is the host directory handle type, `S` the handle store, `V` the tree
/// and `F` the settings store that holds the "host folder in use" flag.
pub struct HostBridge<D, S, V, F>
where
    D: DirectoryHandle,
    S: HandleStore<D>,
    V: Vfs,
    F: SettingsStore,
{
    pub(crate) store: S,
    pub(crate) vfs: Rc<RefCell<V>>,
    pub(crate) flags: SessionFlags<F>,
    pub(crate) config: BridgeConfig,
    pub(crate) state: SessionState,
    pub(crate) observer: Rc<dyn TreeObserver>,
    _handles: PhantomData<D>,
}

impl<D, S, V, F> HostBridge<D, S, V, F>
where
    D: DirectoryHandle,
    S: HandleStore<D>,
    V: Vfs,
    F: SettingsStore,
{
    /// Creates a detached bridge
    pub fn new(store: S, vfs: Rc<RefCell<V>>, settings: F, config: BridgeConfig) -> Self {
        let flags = SessionFlags::new(settings, config.storage_prefix.clone());
        Self {
            store,
            vfs,
            flags,
            config,
            state: SessionState::new(),
            observer: Rc::new(NoopObserver),
            _handles: PhantomData,
        }
    }

    /// Sets the tree widget hooks
    pub fn with_observer(mut self, observer: Rc<dyn TreeObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Shared handle to the tree
    pub fn vfs(&self) -> Rc<RefCell<V>> {
        Rc::clone(&self.vfs)
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn settings(&self) -> &F {
        self.flags.store()
    }

    /// A host folder is attached and imported
    pub fn is_loaded(&self) -> bool {
        self.state.is_loaded()
    }

    /// A structural mutation is in flight
    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase()
    }

    /// Whether the last session ended with a host folder attached
    pub fn host_flag(&self) -> SettingsResult<bool> {
        self.flags.get_flag(&self.config.host_flag_key)
    }

    pub(crate) fn set_host_flag(&self, value: bool) -> SettingsResult<()> {
        self.flags.set_flag(&self.config.host_flag_key, value)
    }

    pub(crate) fn tree(&self) -> Ref<'_, V> {
        self.vfs.borrow()
    }

    pub(crate) fn tree_mut(&self) -> RefMut<'_, V> {
        self.vfs.borrow_mut()
    }

    /// Awaits `futures` concurrently or one by one, per configuration
    ///
    /// The futures are lazy, so in sequential mode none starts before the
    /// previous one finished.
    pub(crate) async fn fan_out<T, E, Fut>(&self, futures: Vec<Fut>) -> Result<Vec<T>, E>
    where
        Fut: Future<Output = Result<T, E>>,
    {
        if self.config.concurrent_siblings {
            return try_join_all(futures).await;
        }
        let mut out = Vec::with_capacity(futures.len());
        for fut in futures {
            out.push(fut.await?);
        }
        Ok(out)
    }

    /// Adds a file node and persists its handle, or neither
    pub(crate) async fn record_file(&self, node: FileNode, handle: D::File) -> Result<(), StoreError> {
        let id = node.id.clone();
        self.tree_mut().create_file(node);
        if let Err(err) = self.store.put_file(&id, handle).await {
            self.tree_mut().delete_file(&id);
            return Err(err);
        }
        Ok(())
    }

    /// Adds a folder node and persists its handle, or neither
    pub(crate) async fn record_folder(&self, node: FolderNode, handle: D) -> Result<(), StoreError> {
        let id = node.id.clone();
        self.tree_mut().create_folder(node);
        if let Err(err) = self.store.put_folder(&id, handle).await {
            self.tree_mut().delete_folder(&id);
            return Err(err);
        }
        Ok(())
    }

    /// Drops a file's handle record, then its node
    pub(crate) async fn forget_file(&self, id: &NodeId) -> Result<(), StoreError> {
        self.store.delete_file(id).await?;
        self.tree_mut().delete_file(id);
        Ok(())
    }

    /// Drops the records of a folder and of everything the tree knows below
    /// it, then the nodes
    pub(crate) async fn forget_folder(&self, id: &NodeId) -> Result<(), StoreError> {
        let (files, folders) = self.tree().descendants(id);
        for file in &files {
            self.store.delete_file(file).await?;
        }
        for folder in &folders {
            self.store.delete_folder(folder).await?;
        }
        self.store.delete_folder(id).await?;
        self.tree_mut().delete_folder(id);
        debug!(%id, files = files.len(), folders = folders.len(), "forgot folder records");
        Ok(())
    }

    /// Empties the tree and the handle store
    pub(crate) async fn wipe(&self) -> Result<(), StoreError> {
        self.tree_mut().clear();
        self.observer.tree_cleared();
        self.store.clear_all().await
    }
}
