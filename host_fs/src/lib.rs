//! # Host Filesystem Capabilities
//!
//! This crate models the host filesystem the editor is allowed to touch.
//!
//! ## Philosophy
//!
//! - **Handles, not paths**: Every host object is reached through a capability
//!   handle obtained from its parent directory handle
//! - **Permission is explicit**: A handle carries no authority until a
//!   read or read-write grant has been confirmed
//! - **Single-threaded**: Handles are `!Send`-friendly; every operation is
//!   an async call that may suspend, nothing runs on another thread
//!
//! ## Backends
//!
//! - [`MemoryHost`]: in-memory host tree with a scriptable permission prompt
//! - [`LocalDirectory`]/[`LocalFile`]: handles onto a real directory on disk

pub mod error;
pub mod handle;
pub mod local;
pub mod memory;

pub use error::{HostError, HostResult};
pub use handle::{
    validate_name, DirectoryHandle, FileHandle, HostEntry, HostHandle, PermissionMode,
    PermissionState,
};
pub use local::{LocalDirectory, LocalFile};
pub use memory::{MemoryDirectory, MemoryFile, MemoryHost};
