//! Capability handle traits
//!
//! A host exposes two kinds of handles. A [`DirectoryHandle`] enumerates its
//! children and hands out child handles by name; a [`FileHandle`] reads and
//! replaces the bytes of one file. Both can report and request permission
//! and remove the entry they point at.

use async_trait::async_trait;
use core_types::EntryKind;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{HostError, HostResult};

/// Access mode a grant is requested for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PermissionMode {
    /// Read-only access
    Read,
    /// Read and write access
    ReadWrite,
}

impl fmt::Display for PermissionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionMode::Read => write!(f, "read"),
            PermissionMode::ReadWrite => write!(f, "readwrite"),
        }
    }
}

/// Current state of a grant on a handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PermissionState {
    /// Access is granted
    Granted,
    /// Access was refused
    Denied,
    /// Access has to be asked for
    Prompt,
}

impl PermissionState {
    /// Returns true if the state grants access
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionState::Granted)
    }
}

/// Operations shared by file and directory handles
#[async_trait(?Send)]
pub trait HostHandle: Clone + fmt::Debug + 'static {
    /// Name of the entry (last path component)
    fn name(&self) -> &str;

    /// Kind of the entry
    fn kind(&self) -> EntryKind;

    /// Reports the current grant without prompting
    async fn query_permission(&self, mode: PermissionMode) -> HostResult<PermissionState>;

    /// Asks for a grant; may suspend until the user answers
    async fn request_permission(&self, mode: PermissionMode) -> HostResult<PermissionState>;

    /// Returns true if both handles point at the same host entry
    async fn is_same_entry(&self, other: &Self) -> HostResult<bool>;

    /// Removes the entry from the host
    ///
    /// Directories must be empty.
    async fn remove(&self) -> HostResult<()>;
}

/// Handle onto a single host file
#[async_trait(?Send)]
pub trait FileHandle: HostHandle {
    /// Size of the file in bytes
    async fn size(&self) -> HostResult<u64>;

    /// Reads the whole file
    async fn read(&self) -> HostResult<Vec<u8>>;

    /// Replaces the whole file with `contents`
    async fn write_all(&self, contents: &[u8]) -> HostResult<()>;
}

/// Handle onto a host directory
#[async_trait(?Send)]
pub trait DirectoryHandle: HostHandle {
    /// File handle type handed out by this directory
    type File: FileHandle;

    /// Lists the direct children in host enumeration order
    async fn entries(&self) -> HostResult<Vec<HostEntry<Self>>>;

    /// Returns the child file `name`, creating it empty if `create` is set
    async fn get_file_handle(&self, name: &str, create: bool) -> HostResult<Self::File>;

    /// Returns the child directory `name`, creating it if `create` is set
    async fn get_directory_handle(&self, name: &str, create: bool) -> HostResult<Self>;
}

/// A child of a directory
#[derive(Debug, Clone)]
pub enum HostEntry<D: DirectoryHandle> {
    /// A file
    File(D::File),
    /// A subdirectory
    Directory(D),
}

impl<D: DirectoryHandle> HostEntry<D> {
    /// Name of the child
    pub fn name(&self) -> &str {
        match self {
            HostEntry::File(file) => file.name(),
            HostEntry::Directory(dir) => dir.name(),
        }
    }

    /// Kind of the child
    pub fn kind(&self) -> EntryKind {
        match self {
            HostEntry::File(_) => EntryKind::File,
            HostEntry::Directory(_) => EntryKind::Directory,
        }
    }
}

/// Checks that `name` is a single path component
pub fn validate_name(name: &str) -> HostResult<()> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0')
    {
        return Err(HostError::InvalidName(name.to_string()));
    }
    Ok(())
}
