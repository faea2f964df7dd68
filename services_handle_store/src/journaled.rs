//! Durable journaled handle store
//!
//! Records live in a single append-only journal file, one JSON entry per
//! line, preceded by a header naming the store and its schema version.
//! Opening replays the journal into memory; every later write appends one
//! entry and syncs it before the call returns.
//!
//! ## File layout
//!
//! ```text
//! {"store":"terra","version":1,"namespaces":["file-handles","folder-handles"]}
//! {"op":"put","namespace":"folder-handles","key":"root","record":{...}}
//! {"op":"delete","namespace":"file-handles","key":"..."}
//! ```
//!
//! A torn last line (crash mid-append) is dropped during replay. Any other
//! unreadable line makes the store `Corrupted` until `clear_all` resets the
//! journal to an empty one. While a
//! `<name>.upgrade.lock` file sits next to the journal another connection
//! is migrating the schema and opening fails with [`StoreError::Blocked`].

use async_trait::async_trait;
use core_types::{HandleNamespace, NodeId};
use host_fs::DirectoryHandle;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::store::check_namespace;
use crate::{HandleRecord, HandleStore, StoreError, StoreResult};

/// First line of the journal file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalHeader {
    /// Store name
    pub store: String,
    /// Schema version the journal was written with
    pub version: u32,
    /// Namespaces created by the schema
    pub namespaces: Vec<HandleNamespace>,
}

/// One journal line after the header
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
#[serde(bound(
    serialize = "D: Serialize, D::File: Serialize",
    deserialize = "D: DeserializeOwned, D::File: DeserializeOwned"
))]
pub enum JournalEntry<D: DirectoryHandle> {
    /// A record was stored
    Put {
        namespace: HandleNamespace,
        key: NodeId,
        record: HandleRecord<D>,
    },
    /// A record was removed
    Delete {
        namespace: HandleNamespace,
        key: NodeId,
    },
}

type Namespaces<D> = BTreeMap<HandleNamespace, BTreeMap<NodeId, HandleRecord<D>>>;

/// Durable handle store backed by a journal file
///
/// The journal is opened on first use and kept open for the life of the
/// value; dropping the store and constructing a new one over the same
/// directory is a restart.
#[derive(Debug)]
pub struct JournaledHandleStore<D: DirectoryHandle> {
    dir: PathBuf,
    name: String,
    version: u32,
    image: Mutex<Option<Namespaces<D>>>,
}

impl<D> JournaledHandleStore<D>
where
    D: DirectoryHandle + Serialize + DeserializeOwned,
    D::File: Serialize + DeserializeOwned,
{
    /// Creates a store named `name` at schema `version` inside `dir`
    ///
    /// Nothing is touched on disk until the first call.
    pub fn new(dir: impl Into<PathBuf>, name: impl Into<String>, version: u32) -> Self {
        Self {
            dir: dir.into(),
            name: name.into(),
            version,
            image: Mutex::new(None),
        }
    }

    /// Path of the journal file
    pub fn journal_path(&self) -> PathBuf {
        self.dir.join(format!("{}.handles.jsonl", self.name))
    }

    /// Path of the upgrade lock file
    pub fn lock_path(&self) -> PathBuf {
        self.dir.join(format!("{}.upgrade.lock", self.name))
    }

    fn header(&self) -> JournalHeader {
        JournalHeader {
            store: self.name.clone(),
            version: self.version,
            namespaces: HandleNamespace::ALL.to_vec(),
        }
    }

    fn empty_image() -> Namespaces<D> {
        HandleNamespace::ALL
            .iter()
            .map(|ns| (*ns, BTreeMap::new()))
            .collect()
    }

    /// Reads and replays the journal, creating or upgrading it as needed
    async fn open(&self) -> StoreResult<Namespaces<D>> {
        if fs::try_exists(self.lock_path()).await.unwrap_or(false) {
            return Err(StoreError::Blocked(format!(
                "upgrade of store {} in progress",
                self.name
            )));
        }

        let path = self.journal_path();
        let contents = match fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                fs::create_dir_all(&self.dir)
                    .await
                    .map_err(|e| StoreError::Unavailable(e.to_string()))?;
                let image = Self::empty_image();
                self.compact(&image)
                    .await
                    .map_err(|e| StoreError::Unavailable(e.to_string()))?;
                info!(store = %self.name, path = %path.display(), "created handle store");
                return Ok(image);
            }
            Err(err) => return Err(StoreError::Unavailable(err.to_string())),
        };

        let mut lines = contents.lines();
        let header: JournalHeader = lines
            .next()
            .ok_or_else(|| StoreError::Corrupted("missing journal header".to_string()))
            .and_then(|line| {
                serde_json::from_str(line).map_err(|e| StoreError::Corrupted(e.to_string()))
            })?;

        if header.version > self.version {
            return Err(StoreError::Unavailable(format!(
                "store version {} is newer than {}",
                header.version, self.version
            )));
        }

        let mut image = Self::empty_image();
        let entries: Vec<&str> = lines.filter(|line| !line.trim().is_empty()).collect();
        let mut torn_tail = false;
        for (index, line) in entries.iter().enumerate() {
            match serde_json::from_str::<JournalEntry<D>>(line) {
                Ok(entry) => Self::apply(&mut image, entry),
                Err(err) if index + 1 == entries.len() => {
                    warn!(store = %self.name, error = %err, "dropping torn journal tail");
                    torn_tail = true;
                }
                Err(err) => return Err(StoreError::Corrupted(err.to_string())),
            }
        }

        if header.version < self.version || torn_tail {
            debug!(
                store = %self.name,
                from = header.version,
                to = self.version,
                "rewriting journal"
            );
            self.compact(&image).await?;
        }

        Ok(image)
    }

    fn apply(image: &mut Namespaces<D>, entry: JournalEntry<D>) {
        match entry {
            JournalEntry::Put {
                namespace,
                key,
                record,
            } => {
                image.entry(namespace).or_default().insert(key, record);
            }
            JournalEntry::Delete { namespace, key } => {
                if let Some(records) = image.get_mut(&namespace) {
                    records.remove(&key);
                }
            }
        }
    }

    /// Rewrites the journal as a header plus one put per live record
    async fn compact(&self, image: &Namespaces<D>) -> StoreResult<()> {
        let mut out = encode_line(&self.header())?;
        for (namespace, records) in image {
            for (key, record) in records {
                out.push_str(&encode_line(&JournalEntry::Put {
                    namespace: *namespace,
                    key: key.clone(),
                    record: record.clone(),
                })?);
            }
        }

        let path = self.journal_path();
        let tmp = path.with_extension("jsonl.tmp");
        fs::write(&tmp, out.as_bytes()).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn append(&self, entry: &JournalEntry<D>) -> StoreResult<()> {
        let line = encode_line(entry)?;
        let mut file = fs::OpenOptions::new()
            .append(true)
            .open(self.journal_path())
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.sync_data().await?;
        Ok(())
    }
}

fn encode_line<T: Serialize>(value: &T) -> StoreResult<String> {
    let mut line =
        serde_json::to_string(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
    line.push('\n');
    Ok(line)
}

async fn journal_exists(path: &Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}

/// Opens the journal into `$guard` if it is not open yet, yielding the image
macro_rules! opened {
    ($self:ident, $guard:ident) => {{
        if $guard.is_none() {
            *$guard = Some($self.open().await?);
        }
        match $guard.as_mut() {
            Some(image) => image,
            None => return Err(StoreError::Unavailable("store did not open".to_string())),
        }
    }};
}

#[async_trait(?Send)]
impl<D> HandleStore<D> for JournaledHandleStore<D>
where
    D: DirectoryHandle + Serialize + DeserializeOwned,
    D::File: Serialize + DeserializeOwned,
{
    async fn put(
        &self,
        namespace: HandleNamespace,
        key: &NodeId,
        record: HandleRecord<D>,
    ) -> StoreResult<()> {
        check_namespace(namespace, key, &record)?;
        let mut guard = self.image.lock().await;
        let image = opened!(self, guard);

        let entry = JournalEntry::Put {
            namespace,
            key: key.clone(),
            record,
        };
        self.append(&entry).await?;
        Self::apply(image, entry);
        Ok(())
    }

    async fn get(
        &self,
        namespace: HandleNamespace,
        key: &NodeId,
    ) -> StoreResult<Option<HandleRecord<D>>> {
        let mut guard = self.image.lock().await;
        let image = opened!(self, guard);
        Ok(image
            .get(&namespace)
            .and_then(|records| records.get(key).cloned()))
    }

    async fn delete(&self, namespace: HandleNamespace, key: &NodeId) -> StoreResult<()> {
        let mut guard = self.image.lock().await;
        let image = opened!(self, guard);

        let present = image
            .get(&namespace)
            .map(|records| records.contains_key(key))
            .unwrap_or(false);
        if !present {
            return Ok(());
        }

        let entry = JournalEntry::Delete {
            namespace,
            key: key.clone(),
        };
        self.append(&entry).await?;
        Self::apply(image, entry);
        Ok(())
    }

    async fn clear_all(&self) -> StoreResult<()> {
        let mut guard = self.image.lock().await;
        if guard.is_none() {
            if !journal_exists(&self.journal_path()).await {
                debug!(store = %self.name, "no namespaces to clear");
                return Ok(());
            }
            match self.open().await {
                Ok(image) => *guard = Some(image),
                Err(StoreError::Corrupted(reason)) => {
                    warn!(store = %self.name, %reason, "resetting corrupted journal");
                    *guard = Some(Self::empty_image());
                }
                Err(err) => return Err(err),
            }
        }

        let image = opened!(self, guard);
        for records in image.values_mut() {
            records.clear();
        }
        self.compact(image).await
    }

    async fn keys(&self, namespace: HandleNamespace) -> StoreResult<Vec<NodeId>> {
        let mut guard = self.image.lock().await;
        let image = opened!(self, guard);
        Ok(image
            .get(&namespace)
            .map(|records| records.keys().cloned().collect())
            .unwrap_or_default())
    }
}
