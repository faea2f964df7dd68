//! Mutation engine tests

mod common;

use common::*;
use core_types::{HandleNamespace, NodeId};
use host_bridge::IoError;
use host_fs::{HostHandle, MemoryHost};
use services_handle_store::HandleStoreExt;
use services_settings::BridgeConfig;
use vfs_tree::Vfs;

/// Test: writing a new file creates it on the host and in the tree
#[tokio::test]
async fn test_write_new_file() {
    let host = sample_host();
    let bridge = attached(&host).await;
    let sub = folder_id(&bridge, "/sub");
    let id = NodeId::new();

    bridge
        .write_file_to_folder(Some(&sub), &id, "new.py", "x = 1")
        .await
        .unwrap();

    assert_eq!(host.read_file("/sub/new.py").unwrap(), b"x = 1");
    assert_eq!(file_id(&bridge, "/sub/new.py"), id);
    let node = bridge.vfs().borrow().find_file_by_id(&id).unwrap();
    assert_eq!(node.size, 5);
    assert!(!bridge.is_busy());
}

/// Test: writing replaces the whole content rather than appending
#[tokio::test]
async fn test_write_overwrites() {
    let host = sample_host();
    let bridge = attached(&host).await;
    let id = file_id(&bridge, "/a.txt");

    bridge
        .write_file_to_folder(None, &id, "a.txt", "z")
        .await
        .unwrap();

    assert_eq!(host.read_file("/a.txt").unwrap(), b"z");
    assert_eq!(bridge.get_file_content(&id).await.unwrap(), "z");
    assert_eq!(key_count(&bridge, HandleNamespace::Files).await, 2);
}

/// Test: writing into a folder with no handle fails and clears busy
#[tokio::test]
async fn test_write_into_unknown_folder() {
    let host = sample_host();
    let bridge = attached(&host).await;

    let result = bridge
        .write_file_to_folder(Some(&NodeId::new()), &NodeId::new(), "x.txt", "")
        .await;
    assert!(matches!(result, Err(IoError::MissingHandle { .. })));
    assert!(!bridge.is_busy());
}

/// Test: writing with nothing attached reports it
#[tokio::test]
async fn test_write_when_detached() {
    init_tracing();
    let bridge = bridge();
    let result = bridge
        .write_file_to_folder(None, &NodeId::new(), "x.txt", "")
        .await;
    assert!(matches!(result, Err(IoError::NotAttached)));
}

/// Test: a file that already has a handle is written without its folder's
/// record
#[tokio::test]
async fn test_write_tracked_file_without_folder_record() {
    let host = sample_host();
    let bridge = attached(&host).await;
    let sub = folder_id(&bridge, "/sub");
    let id = file_id(&bridge, "/sub/b.txt");
    bridge.store().delete_folder(&sub).await.unwrap();

    bridge
        .write_file_to_folder(Some(&sub), &id, "b.txt", "rewritten")
        .await
        .unwrap();

    assert_eq!(host.read_file("/sub/b.txt").unwrap(), b"rewritten");
    assert_eq!(bridge.get_file_content(&id).await.unwrap(), "rewritten");
}

/// Test: creating a folder that already exists on the host reuses it
#[tokio::test]
async fn test_create_folder_reuses_existing() {
    let host = sample_host();
    host.add_dir("/untracked");
    let bridge = attached(&host).await;
    let id = NodeId::new();

    bridge.create_folder(&id, None, "fresh").await.unwrap();
    assert!(host.exists("/fresh"));
    assert_eq!(folder_id(&bridge, "/fresh"), id);

    let sub = folder_id(&bridge, "/sub");
    let nested = NodeId::new();
    bridge
        .create_folder(&nested, Some(&sub), "inner")
        .await
        .unwrap();
    assert!(host.exists("/sub/inner"));

    let again = NodeId::new();
    bridge.create_folder(&again, None, "fresh").await.unwrap();
    let handle = bridge.store().get_folder(&again).await.unwrap().unwrap();
    assert_eq!(handle.path(), "/fresh");
}

/// Test: the root id cannot be recreated as a subfolder
#[tokio::test]
async fn test_create_folder_rejects_root_id() {
    let host = sample_host();
    let bridge = attached(&host).await;
    let sub = folder_id(&bridge, "/sub");

    let result = bridge
        .create_folder(&NodeId::root(), Some(&sub), "inner")
        .await;

    assert!(matches!(result, Err(IoError::ReservedRoot(_))));
    assert!(!host.exists("/sub/inner"));
    let root = bridge.store().get_root().await.unwrap().unwrap();
    assert_eq!(root.path(), "/");
    assert!(!bridge.is_busy());
}

/// Test: deleting the root id fails before anything on the host is removed
#[tokio::test]
async fn test_delete_folder_rejects_root() {
    let host = sample_host();
    let bridge = attached(&host).await;

    assert!(!bridge.delete_folder(&NodeId::root()).await);

    assert_eq!(host.file_paths(), vec!["/a.txt", "/sub/b.txt"]);
    assert!(bridge.store().get_root().await.unwrap().is_some());
    assert_eq!(tree_file_paths(&bridge), host.file_paths());
    assert!(!bridge.is_busy());
}

/// Test: deleting a file removes it from host, store and tree
#[tokio::test]
async fn test_delete_file() {
    let host = sample_host();
    let bridge = attached(&host).await;
    let id = file_id(&bridge, "/sub/b.txt");

    assert!(bridge.delete_file(&id).await);
    assert!(!host.exists("/sub/b.txt"));
    assert!(bridge.store().get_file(&id).await.unwrap().is_none());
    assert!(bridge.vfs().borrow().find_file_by_id(&id).is_none());
    assert!(!bridge.is_busy());
}

/// Test: deleting ids with no handle returns true without raising
#[tokio::test]
async fn test_delete_missing_handles() {
    let host = sample_host();
    let bridge = attached(&host).await;

    assert!(bridge.delete_file(&NodeId::new()).await);
    assert!(bridge.delete_folder(&NodeId::new()).await);
    assert_eq!(host.file_paths().len(), 2);
}

/// Test: a failing host delete is reported as false, not raised
#[tokio::test]
async fn test_delete_failure_is_false() {
    let host = sample_host();
    let bridge = attached(&host).await;
    let file = file_id(&bridge, "/a.txt");
    let sub = folder_id(&bridge, "/sub");

    host.set_read_only(true);
    assert!(!bridge.delete_file(&file).await);
    assert!(!bridge.delete_folder(&sub).await);
    assert!(!bridge.is_busy());

    // Nothing was forgotten.
    assert!(bridge.store().get_file(&file).await.unwrap().is_some());
    assert!(bridge.store().get_folder(&sub).await.unwrap().is_some());
}

/// Test: deleting a folder removes its subtree and every record below it
#[tokio::test]
async fn test_delete_folder_recursive() {
    let host = sample_host();
    host.add_file("/sub/deep/c.txt", "c");
    host.add_dir("/sub/deep/empty");
    let bridge = attached(&host).await;
    let sub = folder_id(&bridge, "/sub");

    assert!(bridge.delete_folder(&sub).await);

    assert_eq!(host.file_paths(), vec!["/a.txt"]);
    assert!(host.dir_paths().is_empty());
    assert_eq!(tree_file_paths(&bridge), vec!["/a.txt"]);
    assert!(tree_folder_paths(&bridge).is_empty());
    assert_eq!(key_count(&bridge, HandleNamespace::Files).await, 1);
    // Only the root record is left.
    assert_eq!(key_count(&bridge, HandleNamespace::Folders).await, 1);
}

/// Test: a moved file keeps its id; its handle carries the new name and
/// parent; the old location is empty
#[tokio::test]
async fn test_move_file_preserves_identity() {
    let host = sample_host();
    let bridge = attached(&host).await;
    let id = file_id(&bridge, "/a.txt");
    let sub = folder_id(&bridge, "/sub");

    bridge.move_file(&id, "renamed.txt", Some(&sub)).await.unwrap();

    let handle = bridge.store().get_file(&id).await.unwrap().unwrap();
    assert_eq!(handle.name(), "renamed.txt");
    let parent = bridge.store().get_folder(&sub).await.unwrap().unwrap();
    assert_eq!(handle.path(), format!("{}/renamed.txt", parent.path()));

    assert!(!host.exists("/a.txt"));
    assert_eq!(host.read_file("/sub/renamed.txt").unwrap(), b"alpha");
    assert_eq!(file_id(&bridge, "/sub/renamed.txt"), id);
    assert!(!bridge.is_busy());
}

/// Test: moving a file to the top level resolves the root
#[tokio::test]
async fn test_move_file_to_root() {
    let host = sample_host();
    let bridge = attached(&host).await;
    let id = file_id(&bridge, "/sub/b.txt");

    bridge.move_file(&id, "b.txt", None).await.unwrap();

    assert_eq!(host.file_paths(), vec!["/a.txt", "/b.txt"]);
    assert_eq!(bridge.get_file_content(&id).await.unwrap(), "beta");
}

/// Test: moving a file without a handle fails
#[tokio::test]
async fn test_move_unknown_file() {
    let host = sample_host();
    let bridge = attached(&host).await;
    let result = bridge.move_file(&NodeId::new(), "x", None).await;
    assert!(matches!(result, Err(IoError::MissingHandle { .. })));
    assert!(!bridge.is_busy());
}

/// Test: moving a folder with N nested files and M nested folders leaves
/// exactly N and M under the new location and nothing at the old one
#[tokio::test]
async fn test_move_folder_completeness() {
    let host = MemoryHost::new("project");
    host.add_file("/src/main.py", "main");
    host.add_file("/src/lib/util.py", "util");
    host.add_file("/src/lib/deep/x.txt", "x");
    host.add_dir("/src/lib/empty");
    host.add_dir("/dest");
    let bridge = attached(&host).await;

    let src = folder_id(&bridge, "/src");
    let dest = folder_id(&bridge, "/dest");
    let util = file_id(&bridge, "/src/lib/util.py");
    let deep = folder_id(&bridge, "/src/lib/deep");

    bridge.move_folder(&src, None, Some(&dest)).await.unwrap();

    assert_eq!(
        host.file_paths(),
        vec![
            "/dest/src/lib/deep/x.txt",
            "/dest/src/lib/util.py",
            "/dest/src/main.py"
        ]
    );
    assert_eq!(
        host.dir_paths(),
        vec![
            "/dest",
            "/dest/src",
            "/dest/src/lib",
            "/dest/src/lib/deep",
            "/dest/src/lib/empty"
        ]
    );
    assert!(!host.exists("/src"));

    assert_eq!(tree_file_paths(&bridge), host.file_paths());
    assert_eq!(tree_folder_paths(&bridge), host.dir_paths());

    let util_handle = bridge.store().get_file(&util).await.unwrap().unwrap();
    assert_eq!(util_handle.path(), "/dest/src/lib/util.py");
    let deep_handle = bridge.store().get_folder(&deep).await.unwrap().unwrap();
    assert_eq!(deep_handle.path(), "/dest/src/lib/deep");
    assert_eq!(host.read_file("/dest/src/lib/deep/x.txt").unwrap(), b"x");
    assert!(!bridge.is_busy());
}

/// Test: renaming a folder in place recreates it under the new name
#[tokio::test]
async fn test_move_folder_rename() {
    let host = sample_host();
    let bridge = attached(&host).await;
    let sub = folder_id(&bridge, "/sub");

    bridge.move_folder(&sub, Some("renamed"), None).await.unwrap();

    assert_eq!(host.file_paths(), vec!["/a.txt", "/renamed/b.txt"]);
    assert_eq!(folder_id(&bridge, "/renamed"), sub);
    let handle = bridge.store().get_folder(&sub).await.unwrap().unwrap();
    assert_eq!(handle.name(), "renamed");
}

/// Test: file content loaded in the tree wins over host bytes on move
#[tokio::test]
async fn test_move_folder_uses_tree_content() {
    let host = sample_host();
    host.add_dir("/dest");
    let bridge = attached(&host).await;
    let sub = folder_id(&bridge, "/sub");
    let dest = folder_id(&bridge, "/dest");
    let b = file_id(&bridge, "/sub/b.txt");

    bridge.vfs().borrow_mut().update_file(
        &b,
        vfs_tree::FileUpdate::default().content(Some("edited".to_string())),
    );
    bridge.move_folder(&sub, None, Some(&dest)).await.unwrap();

    assert_eq!(host.read_file("/dest/sub/b.txt").unwrap(), b"edited");
}

/// Test: moving a folder to where it already is leaves the host alone
#[tokio::test]
async fn test_move_folder_to_same_location() {
    let host = sample_host();
    let bridge = attached(&host).await;
    let sub = folder_id(&bridge, "/sub");
    let b = file_id(&bridge, "/sub/b.txt");
    let before = bridge.store().get_file(&b).await.unwrap().unwrap();

    bridge.move_folder(&sub, None, None).await.unwrap();

    assert_eq!(host.file_paths(), vec!["/a.txt", "/sub/b.txt"]);
    let after = bridge.store().get_file(&b).await.unwrap().unwrap();
    assert!(after.is_same_entry(&before).await.unwrap());
}

/// Test: a folder cannot move into itself or its descendant
#[tokio::test]
async fn test_move_folder_into_itself() {
    let host = sample_host();
    host.add_dir("/sub/inner");
    let bridge = attached(&host).await;
    let sub = folder_id(&bridge, "/sub");
    let inner = folder_id(&bridge, "/sub/inner");

    let into_self = bridge.move_folder(&sub, None, Some(&sub)).await;
    assert!(matches!(into_self, Err(IoError::InvalidMove(_))));

    let into_child = bridge.move_folder(&sub, None, Some(&inner)).await;
    assert!(matches!(into_child, Err(IoError::InvalidMove(_))));

    let root = bridge.move_folder(&NodeId::root(), None, None).await;
    assert!(matches!(root, Err(IoError::InvalidMove(_))));

    assert_eq!(host.file_paths(), vec!["/a.txt", "/sub/b.txt"]);
    assert!(!bridge.is_busy());
}

/// Test: a folder move with sequential siblings gives the same result
#[tokio::test]
async fn test_move_folder_sequential() {
    init_tracing();
    let host = sample_host();
    host.add_file("/sub/c.txt", "c");
    host.add_dir("/dest");
    let bridge = bridge_with(BridgeConfig::default().with_concurrent_siblings(false));
    bridge.import_folder(host.root()).await.unwrap();
    let sub = folder_id(&bridge, "/sub");
    let dest = folder_id(&bridge, "/dest");

    bridge.move_folder(&sub, None, Some(&dest)).await.unwrap();

    assert_eq!(
        host.file_paths(),
        vec!["/a.txt", "/dest/sub/b.txt", "/dest/sub/c.txt"]
    );
}

/// Test: file content is read through the stored handle
#[tokio::test]
async fn test_get_file_content() {
    let host = sample_host();
    let bridge = attached(&host).await;
    let id = file_id(&bridge, "/sub/b.txt");

    assert_eq!(bridge.get_file_content(&id).await.unwrap(), "beta");
    assert!(matches!(
        bridge.get_file_content(&NodeId::new()).await,
        Err(IoError::MissingHandle { .. })
    ));
}
