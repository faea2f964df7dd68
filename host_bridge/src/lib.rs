//! # Host Bridge
//!
//! Keeps the editor's in-memory tree and a host directory in step.
//!
//! ## Philosophy
//!
//! - **Handles, not paths**: The host is reached only through capability handles
//! - **One write path**: Every change to both tree and handle store goes through one helper
//! - **Permission first**: Nothing is imported before readwrite access is verified
//! - **Wipe over drift**: Losing access clears local state instead of degrading it
//!
//! ## Components
//!
//! - [`PermissionGate`]: query, then request, access to a handle
//! - Tree importer: [`HostBridge::import_folder`]
//! - Mutation engine: write, create, delete and move on [`HostBridge`]
//! - Session lifecycle: [`HostBridge::init`], [`HostBridge::open_folder_picker`],
//!   [`HostBridge::close_folder`]

pub mod bridge;
pub mod error;
pub mod importer;
pub mod lifecycle;
pub mod mutation;
pub mod observer;
pub mod permission;
pub mod picker;
pub mod state;

pub use bridge::HostBridge;
pub use error::{BridgeError, ImportError, IoError, IoResult, PermissionError, PickerError};
pub use observer::{NoopObserver, TreeObserver};
pub use permission::PermissionGate;
pub use picker::{FolderPicker, PresetPicker};
pub use state::{BusyGuard, SessionPhase, SessionState};
