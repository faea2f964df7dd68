//! Shared fixtures for bridge integration tests

#![allow(dead_code)]

use host_bridge::{HostBridge, TreeObserver};
use host_fs::{MemoryDirectory, MemoryHost};
use core_types::HandleNamespace;
use services_handle_store::{HandleStore, MemoryHandleStore};
use services_settings::{BridgeConfig, MemorySettings, SettingKey, SettingValue, SettingsStore};
use std::cell::RefCell;
use std::rc::Rc;
use vfs_tree::{MemoryVfs, PathResolver, Vfs};

pub type MemBridge =
    HostBridge<MemoryDirectory, MemoryHandleStore<MemoryDirectory>, MemoryVfs, MemorySettings>;

/// Initialize tracing for tests.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("host_bridge=debug,services_handle_store=debug")
        .with_test_writer()
        .try_init();
}

/// Host with `/a.txt` and `/sub/b.txt`
pub fn sample_host() -> MemoryHost {
    let host = MemoryHost::new("project");
    host.add_file("/a.txt", "alpha");
    host.add_file("/sub/b.txt", "beta");
    host
}

pub fn bridge() -> MemBridge {
    bridge_with(BridgeConfig::default())
}

pub fn bridge_with(config: BridgeConfig) -> MemBridge {
    HostBridge::new(
        MemoryHandleStore::new(),
        Rc::new(RefCell::new(MemoryVfs::new())),
        MemorySettings::new(),
        config,
    )
}

/// Bridge with `host` already imported
pub async fn attached(host: &MemoryHost) -> MemBridge {
    init_tracing();
    let bridge = bridge();
    bridge.import_folder(host.root()).await.unwrap();
    bridge
}

/// Marks the last session as having used a host folder
pub fn set_flag(bridge: &MemBridge, value: bool) {
    bridge
        .settings()
        .set(
            &SettingKey::prefixed("terra", "use-lfs"),
            SettingValue::Boolean(value),
        )
        .unwrap();
}

pub async fn key_count(bridge: &MemBridge, namespace: HandleNamespace) -> usize {
    bridge.store().keys(namespace).await.unwrap().len()
}

/// Id of the node at `path`, file or folder
pub fn file_id(bridge: &MemBridge, path: &str) -> core_types::NodeId {
    match PathResolver::resolve(&*bridge.vfs().borrow(), path).unwrap() {
        vfs_tree::ResolvedPath::File(file) => file.id,
        other => panic!("{} is not a file: {:?}", path, other),
    }
}

pub fn folder_id(bridge: &MemBridge, path: &str) -> core_types::NodeId {
    match PathResolver::resolve(&*bridge.vfs().borrow(), path).unwrap() {
        vfs_tree::ResolvedPath::Folder(folder) => folder.id,
        other => panic!("{} is not a folder: {:?}", path, other),
    }
}

/// Every file path the tree knows, sorted
pub fn tree_file_paths(bridge: &MemBridge) -> Vec<String> {
    let vfs = bridge.vfs();
    let vfs = vfs.borrow();
    let mut paths: Vec<String> = vfs
        .files()
        .filter_map(|f| PathResolver::file_path(&*vfs, &f.id))
        .collect();
    paths.sort();
    paths
}

/// Every folder path the tree knows, sorted
pub fn tree_folder_paths(bridge: &MemBridge) -> Vec<String> {
    let vfs = bridge.vfs();
    let vfs = vfs.borrow();
    let mut paths: Vec<String> = vfs
        .folders()
        .filter_map(|f| PathResolver::folder_path(&*vfs, &f.id))
        .collect();
    paths.sort();
    paths
}

pub fn tree_is_empty(bridge: &MemBridge) -> bool {
    bridge.vfs().borrow().is_empty()
}

/// Records observer calls in order
#[derive(Debug, Default)]
pub struct RecordingObserver {
    pub events: RefCell<Vec<String>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }
}

impl TreeObserver for RecordingObserver {
    fn tree_cleared(&self) {
        self.events.borrow_mut().push("cleared".to_string());
    }

    fn title_changed(&self, title: &str) {
        self.events.borrow_mut().push(format!("title:{}", title));
    }

    fn tree_loaded(&self) {
        self.events.borrow_mut().push("loaded".to_string());
    }

    fn before_attach(&self) {
        self.events.borrow_mut().push("before_attach".to_string());
    }
}
