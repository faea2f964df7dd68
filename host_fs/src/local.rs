//! Local disk host
//!
//! Handles onto a real directory tree. The location is kept private inside
//! the handle; callers only ever navigate by name from a parent handle.
//! Local handles serialize, so a durable handle store can keep them across
//! restarts.
//!
//! The native platform has no permission prompt: `request_permission`
//! reports the same state `query_permission` does, derived from whether the
//! entry still exists and whether it is writable.

use async_trait::async_trait;
use core_types::EntryKind;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

use crate::handle::{
    validate_name, DirectoryHandle, FileHandle, HostEntry, HostHandle, PermissionMode,
    PermissionState,
};
use crate::{HostError, HostResult};

fn map_io(err: io::Error, path: &Path) -> HostError {
    match err.kind() {
        io::ErrorKind::NotFound => HostError::NotFound(path.display().to_string()),
        io::ErrorKind::PermissionDenied => HostError::NotAllowed(path.display().to_string()),
        _ => HostError::Io(err),
    }
}

fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

async fn permission_for(path: &Path, mode: PermissionMode) -> PermissionState {
    match fs::metadata(path).await {
        Ok(metadata) => {
            if mode == PermissionMode::ReadWrite && metadata.permissions().readonly() {
                PermissionState::Denied
            } else {
                PermissionState::Granted
            }
        }
        Err(err) => {
            debug!(path = %path.display(), error = %err, "permission check failed");
            PermissionState::Denied
        }
    }
}

/// Handle onto a directory on the local disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalDirectory {
    path: PathBuf,
    name: String,
}

impl LocalDirectory {
    /// Opens a handle onto an existing directory
    ///
    /// This is the picker's job on the native platform: it is the only place a
    /// path turns into a capability.
    pub async fn open(path: impl Into<PathBuf>) -> HostResult<Self> {
        let path = path.into();
        let metadata = fs::metadata(&path).await.map_err(|e| map_io(e, &path))?;
        if !metadata.is_dir() {
            return Err(HostError::TypeMismatch(path.display().to_string()));
        }
        let name = entry_name(&path);
        Ok(Self { path, name })
    }

    fn child(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

/// Handle onto a file on the local disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalFile {
    path: PathBuf,
    name: String,
}

impl LocalFile {
    fn new(path: PathBuf) -> Self {
        let name = entry_name(&path);
        Self { path, name }
    }
}

#[async_trait(?Send)]
impl HostHandle for LocalDirectory {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> EntryKind {
        EntryKind::Directory
    }

    async fn query_permission(&self, mode: PermissionMode) -> HostResult<PermissionState> {
        Ok(permission_for(&self.path, mode).await)
    }

    async fn request_permission(&self, mode: PermissionMode) -> HostResult<PermissionState> {
        Ok(permission_for(&self.path, mode).await)
    }

    async fn is_same_entry(&self, other: &Self) -> HostResult<bool> {
        Ok(self.path == other.path)
    }

    async fn remove(&self) -> HostResult<()> {
        fs::remove_dir(&self.path)
            .await
            .map_err(|e| map_io(e, &self.path))
    }
}

#[async_trait(?Send)]
impl DirectoryHandle for LocalDirectory {
    type File = LocalFile;

    async fn entries(&self) -> HostResult<Vec<HostEntry<Self>>> {
        let mut dir = fs::read_dir(&self.path)
            .await
            .map_err(|e| map_io(e, &self.path))?;
        let mut entries = Vec::new();

        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            let Ok(name) = entry.file_name().into_string() else {
                warn!(path = %path.display(), "skipping entry with non UTF-8 name");
                continue;
            };
            let file_type = entry.file_type().await?;
            if file_type.is_dir() {
                entries.push(HostEntry::Directory(LocalDirectory { path, name }));
            } else if file_type.is_file() {
                entries.push(HostEntry::File(LocalFile { path, name }));
            } else {
                debug!(path = %path.display(), "skipping special entry");
            }
        }

        Ok(entries)
    }

    async fn get_file_handle(&self, name: &str, create: bool) -> HostResult<LocalFile> {
        validate_name(name)?;
        let path = self.child(name);
        match fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => Ok(LocalFile::new(path)),
            Ok(_) => Err(HostError::TypeMismatch(path.display().to_string())),
            Err(err) if err.kind() == io::ErrorKind::NotFound && create => {
                fs::OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(false)
                    .open(&path)
                    .await
                    .map_err(|e| map_io(e, &path))?;
                Ok(LocalFile::new(path))
            }
            Err(err) => Err(map_io(err, &path)),
        }
    }

    async fn get_directory_handle(&self, name: &str, create: bool) -> HostResult<LocalDirectory> {
        validate_name(name)?;
        let path = self.child(name);
        match fs::metadata(&path).await {
            Ok(metadata) if metadata.is_dir() => Ok(LocalDirectory {
                path,
                name: name.to_string(),
            }),
            Ok(_) => Err(HostError::TypeMismatch(path.display().to_string())),
            Err(err) if err.kind() == io::ErrorKind::NotFound && create => {
                fs::create_dir(&path).await.map_err(|e| map_io(e, &path))?;
                Ok(LocalDirectory {
                    path,
                    name: name.to_string(),
                })
            }
            Err(err) => Err(map_io(err, &path)),
        }
    }
}

#[async_trait(?Send)]
impl HostHandle for LocalFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> EntryKind {
        EntryKind::File
    }

    async fn query_permission(&self, mode: PermissionMode) -> HostResult<PermissionState> {
        Ok(permission_for(&self.path, mode).await)
    }

    async fn request_permission(&self, mode: PermissionMode) -> HostResult<PermissionState> {
        Ok(permission_for(&self.path, mode).await)
    }

    async fn is_same_entry(&self, other: &Self) -> HostResult<bool> {
        Ok(self.path == other.path)
    }

    async fn remove(&self) -> HostResult<()> {
        fs::remove_file(&self.path)
            .await
            .map_err(|e| map_io(e, &self.path))
    }
}

#[async_trait(?Send)]
impl FileHandle for LocalFile {
    async fn size(&self) -> HostResult<u64> {
        let metadata = fs::metadata(&self.path)
            .await
            .map_err(|e| map_io(e, &self.path))?;
        Ok(metadata.len())
    }

    async fn read(&self) -> HostResult<Vec<u8>> {
        fs::read(&self.path).await.map_err(|e| map_io(e, &self.path))
    }

    async fn write_all(&self, contents: &[u8]) -> HostResult<()> {
        // A handle never recreates a file that was removed behind its back.
        let metadata = fs::metadata(&self.path)
            .await
            .map_err(|e| map_io(e, &self.path))?;
        if !metadata.is_file() {
            return Err(HostError::TypeMismatch(self.path.display().to_string()));
        }
        fs::write(&self.path, contents)
            .await
            .map_err(|e| map_io(e, &self.path))
    }
}
