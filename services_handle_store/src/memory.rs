//! Process-local handle store
//!
//! Keeps records in memory. Namespaces are created on first write, so a
//! fresh store has none and `clear_all` on it is a no-op. Failures of the
//! durable store can be injected for tests of the fallback paths.

use async_trait::async_trait;
use core_types::{HandleNamespace, NodeId};
use host_fs::DirectoryHandle;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use crate::store::check_namespace;
use crate::{HandleRecord, HandleStore, StoreError, StoreResult};

/// Failure to inject into every store call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFault {
    /// Opening fails with [`StoreError::Unavailable`]
    Unavailable,
    /// Opening fails with [`StoreError::Blocked`]
    Blocked,
}

type Namespaces<D> = BTreeMap<HandleNamespace, BTreeMap<NodeId, HandleRecord<D>>>;

/// In-memory handle store
#[derive(Debug)]
pub struct MemoryHandleStore<D: DirectoryHandle> {
    namespaces: RefCell<Option<Namespaces<D>>>,
    fault: Cell<Option<StoreFault>>,
}

impl<D: DirectoryHandle> MemoryHandleStore<D> {
    /// Creates an empty store with no namespaces
    pub fn new() -> Self {
        Self {
            namespaces: RefCell::new(None),
            fault: Cell::new(None),
        }
    }

    /// Makes every following call fail with `fault`
    pub fn inject_fault(&self, fault: StoreFault) {
        self.fault.set(Some(fault));
    }

    /// Clears an injected fault
    pub fn clear_fault(&self) {
        self.fault.set(None);
    }

    /// Total number of records across namespaces
    pub fn len(&self) -> usize {
        self.namespaces
            .borrow()
            .as_ref()
            .map(|ns| ns.values().map(BTreeMap::len).sum())
            .unwrap_or(0)
    }

    /// Returns true if no record is stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_fault(&self) -> StoreResult<()> {
        match self.fault.get() {
            Some(StoreFault::Unavailable) => Err(StoreError::Unavailable(
                "storage is not available".to_string(),
            )),
            Some(StoreFault::Blocked) => Err(StoreError::Blocked(
                "another connection is upgrading the store".to_string(),
            )),
            None => Ok(()),
        }
    }

    fn with_open<T>(&self, f: impl FnOnce(&mut Namespaces<D>) -> T) -> StoreResult<T> {
        self.check_fault()?;
        let mut namespaces = self.namespaces.borrow_mut();
        let open = namespaces.get_or_insert_with(|| {
            HandleNamespace::ALL
                .iter()
                .map(|ns| (*ns, BTreeMap::new()))
                .collect()
        });
        Ok(f(open))
    }
}

impl<D: DirectoryHandle> Default for MemoryHandleStore<D> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl<D: DirectoryHandle> HandleStore<D> for MemoryHandleStore<D> {
    async fn put(
        &self,
        namespace: HandleNamespace,
        key: &NodeId,
        record: HandleRecord<D>,
    ) -> StoreResult<()> {
        check_namespace(namespace, key, &record)?;
        self.with_open(|ns| {
            ns.entry(namespace).or_default().insert(key.clone(), record);
        })
    }

    async fn get(
        &self,
        namespace: HandleNamespace,
        key: &NodeId,
    ) -> StoreResult<Option<HandleRecord<D>>> {
        self.with_open(|ns| ns.get(&namespace).and_then(|records| records.get(key).cloned()))
    }

    async fn delete(&self, namespace: HandleNamespace, key: &NodeId) -> StoreResult<()> {
        self.with_open(|ns| {
            if let Some(records) = ns.get_mut(&namespace) {
                records.remove(key);
            }
        })
    }

    async fn clear_all(&self) -> StoreResult<()> {
        self.check_fault()?;
        if let Some(ns) = self.namespaces.borrow_mut().as_mut() {
            for records in ns.values_mut() {
                records.clear();
            }
        }
        Ok(())
    }

    async fn keys(&self, namespace: HandleNamespace) -> StoreResult<Vec<NodeId>> {
        self.with_open(|ns| {
            ns.get(&namespace)
                .map(|records| records.keys().cloned().collect())
                .unwrap_or_default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HandleStoreExt;
    use host_fs::{HostHandle, MemoryDirectory, MemoryHost};

    fn host() -> MemoryHost {
        let host = MemoryHost::new("project");
        host.add_file("/a.txt", "alpha");
        host.add_dir("/sub");
        host
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let host = host();
        let root = host.root();
        let file = root.get_file_handle("a.txt", false).await.unwrap();
        let store: MemoryHandleStore<MemoryDirectory> = MemoryHandleStore::new();

        let id = NodeId::new();
        store.put_file(&id, file).await.unwrap();
        let loaded = store.get_file(&id).await.unwrap().unwrap();
        assert_eq!(loaded.name(), "a.txt");

        store.delete_file(&id).await.unwrap();
        assert!(store.get_file(&id).await.unwrap().is_none());
        // Deleting again is fine.
        store.delete_file(&id).await.unwrap();
    }

    #[tokio::test]
    async fn test_namespaces_are_independent() {
        let host = host();
        let root = host.root();
        let sub = root.get_directory_handle("sub", false).await.unwrap();
        let file = root.get_file_handle("a.txt", false).await.unwrap();
        let store: MemoryHandleStore<MemoryDirectory> = MemoryHandleStore::new();

        let id = NodeId::from("shared");
        store.put_file(&id, file).await.unwrap();
        store.put_folder(&id, sub).await.unwrap();

        assert_eq!(store.get_file(&id).await.unwrap().unwrap().name(), "a.txt");
        assert_eq!(store.get_folder(&id).await.unwrap().unwrap().name(), "sub");
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_kind_mismatch_rejected() {
        let host = host();
        let store: MemoryHandleStore<MemoryDirectory> = MemoryHandleStore::new();
        let result = store
            .put(
                HandleNamespace::Files,
                &NodeId::new(),
                HandleRecord::Folder(host.root()),
            )
            .await;
        assert!(matches!(result, Err(StoreError::KindMismatch { .. })));
    }

    #[tokio::test]
    async fn test_clear_all_twice() {
        let host = host();
        let store: MemoryHandleStore<MemoryDirectory> = MemoryHandleStore::new();
        // No namespaces yet.
        store.clear_all().await.unwrap();

        store.put_folder(&NodeId::root(), host.root()).await.unwrap();
        store.clear_all().await.unwrap();
        store.clear_all().await.unwrap();

        assert!(store.keys(HandleNamespace::Files).await.unwrap().is_empty());
        assert!(store.keys(HandleNamespace::Folders).await.unwrap().is_empty());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_injected_faults() {
        let store: MemoryHandleStore<MemoryDirectory> = MemoryHandleStore::new();
        store.inject_fault(StoreFault::Blocked);
        assert!(matches!(
            store.get_root().await,
            Err(StoreError::Blocked(_))
        ));

        store.inject_fault(StoreFault::Unavailable);
        assert!(matches!(
            store.clear_all().await,
            Err(StoreError::Unavailable(_))
        ));

        store.clear_fault();
        assert!(store.get_root().await.unwrap().is_none());
    }
}
