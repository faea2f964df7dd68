//! Settings stores
//!
//! Small synchronous key/value stores for flags that must outlive the
//! process, and [`SessionFlags`] which prefixes every key.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::persistence::{deserialize_settings, serialize_settings, SettingsData};
use crate::{SettingKey, SettingValue, SettingsResult};

/// Synchronous key/value settings store
pub trait SettingsStore {
    /// Reads the value under `key`
    fn get(&self, key: &SettingKey) -> SettingsResult<Option<SettingValue>>;

    /// Writes `value` under `key`
    fn set(&self, key: &SettingKey, value: SettingValue) -> SettingsResult<()>;

    /// Removes `key`; removing a missing key succeeds
    fn remove(&self, key: &SettingKey) -> SettingsResult<()>;
}

/// Process-local settings
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: RefCell<BTreeMap<SettingKey, SettingValue>>,
}

impl MemorySettings {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored values
    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    /// Returns true if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &SettingKey) -> SettingsResult<Option<SettingValue>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &SettingKey, value: SettingValue) -> SettingsResult<()> {
        self.values.borrow_mut().insert(key.clone(), value);
        Ok(())
    }

    fn remove(&self, key: &SettingKey) -> SettingsResult<()> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}

/// Settings persisted to a versioned JSON file
///
/// The file is read on first access and rewritten (temp file then rename)
/// on every change.
#[derive(Debug)]
pub struct FileSettings {
    path: PathBuf,
    cache: RefCell<Option<BTreeMap<SettingKey, SettingValue>>>,
}

impl FileSettings {
    /// Creates a store backed by `path`; nothing is read until first use
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: RefCell::new(None),
        }
    }

    /// Path of the settings file
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn load(&self) -> SettingsResult<BTreeMap<SettingKey, SettingValue>> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(deserialize_settings(&bytes)?.to_values()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no settings file yet");
                Ok(BTreeMap::new())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, values: &BTreeMap<SettingKey, SettingValue>) -> SettingsResult<()> {
        let bytes = serialize_settings(&SettingsData::from_values(values))?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn with_values<T>(
        &self,
        f: impl FnOnce(&mut BTreeMap<SettingKey, SettingValue>) -> T,
    ) -> SettingsResult<T> {
        let mut cache = self.cache.borrow_mut();
        if cache.is_none() {
            *cache = Some(self.load()?);
        }
        match cache.as_mut() {
            Some(values) => Ok(f(values)),
            None => Ok(f(&mut BTreeMap::new())),
        }
    }
}

impl SettingsStore for FileSettings {
    fn get(&self, key: &SettingKey) -> SettingsResult<Option<SettingValue>> {
        self.with_values(|values| values.get(key).cloned())
    }

    fn set(&self, key: &SettingKey, value: SettingValue) -> SettingsResult<()> {
        let snapshot = self.with_values(|values| {
            values.insert(key.clone(), value);
            values.clone()
        })?;
        self.save(&snapshot)
    }

    fn remove(&self, key: &SettingKey) -> SettingsResult<()> {
        let snapshot = self.with_values(|values| values.remove(key).map(|_| values.clone()))?;
        match snapshot {
            Some(values) => self.save(&values),
            None => Ok(()),
        }
    }
}

/// Prefixed boolean flags over a settings store
#[derive(Debug)]
pub struct SessionFlags<S: SettingsStore> {
    store: S,
    prefix: String,
}

impl<S: SettingsStore> SessionFlags<S> {
    /// Wraps `store`, prefixing every key with `prefix`
    pub fn new(store: S, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    /// Full key under which `key` is persisted
    pub fn key(&self, key: &str) -> SettingKey {
        SettingKey::prefixed(&self.prefix, key)
    }

    /// Reads a flag; missing or non-boolean values read as false
    pub fn get_flag(&self, key: &str) -> SettingsResult<bool> {
        let full = self.key(key);
        let Some(value) = self.store.get(&full)? else {
            return Ok(false);
        };
        match value.as_boolean() {
            Some(flag) => Ok(flag),
            None => {
                warn!(key = %full, value = %value, "flag is not a boolean");
                Ok(false)
            }
        }
    }

    /// Writes a flag
    pub fn set_flag(&self, key: &str, value: bool) -> SettingsResult<()> {
        self.store.set(&self.key(key), SettingValue::Boolean(value))
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }
}
