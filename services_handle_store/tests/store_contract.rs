//! Contract tests shared by every handle store backend

use core_types::{HandleNamespace, NodeId};
use host_fs::{DirectoryHandle, HostHandle, LocalDirectory, MemoryDirectory, MemoryHost};
use services_handle_store::{
    HandleStore, HandleStoreExt, JournaledHandleStore, MemoryHandleStore,
};
use tempfile::TempDir;

async fn exercise<D, S>(store: &S, root: D)
where
    D: DirectoryHandle,
    S: HandleStore<D>,
{
    let file = root.get_file_handle("a.txt", true).await.unwrap();
    let sub = root.get_directory_handle("sub", true).await.unwrap();
    let file_id = NodeId::new();
    let sub_id = NodeId::new();

    store.put_folder(&NodeId::root(), root.clone()).await.unwrap();
    store.put_folder(&sub_id, sub).await.unwrap();
    store.put_file(&file_id, file).await.unwrap();

    assert_eq!(store.keys(HandleNamespace::Files).await.unwrap(), vec![file_id.clone()]);
    assert_eq!(store.keys(HandleNamespace::Folders).await.unwrap().len(), 2);

    // Replacing a record keeps a single key.
    let renamed = root.get_file_handle("b.txt", true).await.unwrap();
    store.put_file(&file_id, renamed).await.unwrap();
    assert_eq!(store.get_file(&file_id).await.unwrap().unwrap().name(), "b.txt");
    assert_eq!(store.keys(HandleNamespace::Files).await.unwrap().len(), 1);

    // Missing keys are absent, not errors.
    assert!(store.get_file(&NodeId::new()).await.unwrap().is_none());
    store.delete_folder(&NodeId::new()).await.unwrap();

    store.clear_all().await.unwrap();
    store.clear_all().await.unwrap();
    assert!(store.keys(HandleNamespace::Files).await.unwrap().is_empty());
    assert!(store.keys(HandleNamespace::Folders).await.unwrap().is_empty());
    assert!(store.get_root().await.unwrap().is_none());
}

/// Test: the in-memory backend honors the store contract
#[tokio::test]
async fn test_memory_store_contract() {
    let host = MemoryHost::new("project");
    let store: MemoryHandleStore<MemoryDirectory> = MemoryHandleStore::new();
    exercise(&store, host.root()).await;
}

/// Test: the journaled backend honors the store contract
#[tokio::test]
async fn test_journaled_store_contract() {
    let project = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();
    let root = LocalDirectory::open(project.path()).await.unwrap();
    let store: JournaledHandleStore<LocalDirectory> =
        JournaledHandleStore::new(state.path().join("nested"), "terra", 1);
    exercise(&store, root).await;
}

/// Test: a journal written by an older schema is upgraded in place
#[tokio::test]
async fn test_older_schema_is_upgraded() {
    let project = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();
    let root = LocalDirectory::open(project.path()).await.unwrap();

    {
        let v1: JournaledHandleStore<LocalDirectory> =
            JournaledHandleStore::new(state.path(), "terra", 1);
        v1.put_folder(&NodeId::root(), root.clone()).await.unwrap();
    }

    let v2: JournaledHandleStore<LocalDirectory> =
        JournaledHandleStore::new(state.path(), "terra", 2);
    let loaded = v2.get_root().await.unwrap().unwrap();
    assert!(loaded.is_same_entry(&root).await.unwrap());

    let header = std::fs::read_to_string(v2.journal_path()).unwrap();
    assert!(header.lines().next().unwrap().contains("\"version\":2"));
}
