//! Handle store contract

use async_trait::async_trait;
use core_types::{EntryKind, HandleNamespace, NodeId};
use host_fs::DirectoryHandle;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{StoreError, StoreResult};

/// A persisted host capability
///
/// Files live in `file-handles`, directories in `folder-handles`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "D: Serialize, D::File: Serialize",
    deserialize = "D: DeserializeOwned, D::File: DeserializeOwned"
))]
pub enum HandleRecord<D: DirectoryHandle> {
    /// A file handle
    File(D::File),
    /// A directory handle
    Folder(D),
}

impl<D: DirectoryHandle> HandleRecord<D> {
    /// Kind of host entry the record points at
    pub fn kind(&self) -> EntryKind {
        match self {
            HandleRecord::File(_) => EntryKind::File,
            HandleRecord::Folder(_) => EntryKind::Directory,
        }
    }

    /// Namespace the record belongs in
    pub fn namespace(&self) -> HandleNamespace {
        self.kind().namespace()
    }
}

/// Persistent key to handle mapping
///
/// Implementations open themselves lazily on first use. Whether a connection
/// is kept or reopened per call is up to the backend, as long as every call
/// observes the writes of the calls before it.
#[async_trait(?Send)]
pub trait HandleStore<D: DirectoryHandle> {
    /// Stores `record` under `key`, replacing any previous record
    async fn put(
        &self,
        namespace: HandleNamespace,
        key: &NodeId,
        record: HandleRecord<D>,
    ) -> StoreResult<()>;

    /// Looks up the record under `key`
    async fn get(
        &self,
        namespace: HandleNamespace,
        key: &NodeId,
    ) -> StoreResult<Option<HandleRecord<D>>>;

    /// Removes the record under `key`; removing a missing key succeeds
    async fn delete(&self, namespace: HandleNamespace, key: &NodeId) -> StoreResult<()>;

    /// Removes every key in every namespace
    ///
    /// Succeeds as a no-op when no namespace exists yet.
    async fn clear_all(&self) -> StoreResult<()>;

    /// Every key currently stored in `namespace`, sorted
    async fn keys(&self, namespace: HandleNamespace) -> StoreResult<Vec<NodeId>>;
}

/// Typed accessors over [`HandleStore`]
#[async_trait(?Send)]
pub trait HandleStoreExt<D: DirectoryHandle>: HandleStore<D> {
    /// Stores a file handle under `key`
    async fn put_file(&self, key: &NodeId, handle: D::File) -> StoreResult<()> {
        self.put(HandleNamespace::Files, key, HandleRecord::File(handle))
            .await
    }

    /// Stores a folder handle under `key`
    async fn put_folder(&self, key: &NodeId, handle: D) -> StoreResult<()> {
        self.put(HandleNamespace::Folders, key, HandleRecord::Folder(handle))
            .await
    }

    /// Looks up the file handle under `key`
    async fn get_file(&self, key: &NodeId) -> StoreResult<Option<D::File>> {
        match self.get(HandleNamespace::Files, key).await? {
            Some(HandleRecord::File(handle)) => Ok(Some(handle)),
            Some(HandleRecord::Folder(_)) => Err(StoreError::KindMismatch {
                namespace: HandleNamespace::Files,
                key: key.clone(),
            }),
            None => Ok(None),
        }
    }

    /// Looks up the folder handle under `key`
    async fn get_folder(&self, key: &NodeId) -> StoreResult<Option<D>> {
        match self.get(HandleNamespace::Folders, key).await? {
            Some(HandleRecord::Folder(handle)) => Ok(Some(handle)),
            Some(HandleRecord::File(_)) => Err(StoreError::KindMismatch {
                namespace: HandleNamespace::Folders,
                key: key.clone(),
            }),
            None => Ok(None),
        }
    }

    /// Looks up the attached top-level directory
    async fn get_root(&self) -> StoreResult<Option<D>> {
        self.get_folder(&NodeId::root()).await
    }

    /// Removes the file handle under `key`
    async fn delete_file(&self, key: &NodeId) -> StoreResult<()> {
        self.delete(HandleNamespace::Files, key).await
    }

    /// Removes the folder handle under `key`
    async fn delete_folder(&self, key: &NodeId) -> StoreResult<()> {
        self.delete(HandleNamespace::Folders, key).await
    }
}

impl<D: DirectoryHandle, S: HandleStore<D> + ?Sized> HandleStoreExt<D> for S {}

/// Rejects a record put into the namespace of the other kind
pub(crate) fn check_namespace<D: DirectoryHandle>(
    namespace: HandleNamespace,
    key: &NodeId,
    record: &HandleRecord<D>,
) -> StoreResult<()> {
    if record.namespace() != namespace {
        return Err(StoreError::KindMismatch {
            namespace,
            key: key.clone(),
        });
    }
    Ok(())
}
