//! Settings persistence layer
//!
//! Encodes the flat key/value map to versioned JSON. Keys are stored as
//! plain strings in a `BTreeMap` so the file is byte-stable across saves.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{SettingKey, SettingValue, SettingsError, SettingsResult};

/// Serializable container for persisted settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsData {
    /// Version of the settings format
    pub version: u32,
    /// Values keyed by their prefixed key
    pub values: BTreeMap<String, SettingValue>,
}

impl SettingsData {
    /// Current version of the settings format
    pub const CURRENT_VERSION: u32 = 1;

    /// Creates empty settings data
    pub fn new() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            values: BTreeMap::new(),
        }
    }

    /// Creates settings data from typed keys
    pub fn from_values(values: &BTreeMap<SettingKey, SettingValue>) -> Self {
        let mut data = Self::new();
        for (key, value) in values {
            data.values.insert(key.as_str().to_string(), value.clone());
        }
        data
    }

    /// Converts back to typed keys
    pub fn to_values(&self) -> BTreeMap<SettingKey, SettingValue> {
        self.values
            .iter()
            .map(|(key, value)| (SettingKey::new(key.as_str()), value.clone()))
            .collect()
    }
}

impl Default for SettingsData {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializes settings to JSON bytes
pub fn serialize_settings(data: &SettingsData) -> SettingsResult<Vec<u8>> {
    serde_json::to_vec_pretty(data).map_err(|e| SettingsError::SerializationFailed(e.to_string()))
}

/// Deserializes settings from JSON bytes
pub fn deserialize_settings(bytes: &[u8]) -> SettingsResult<SettingsData> {
    let data: SettingsData = serde_json::from_slice(bytes)
        .map_err(|e| SettingsError::DeserializationFailed(e.to_string()))?;

    if data.version != SettingsData::CURRENT_VERSION {
        return Err(SettingsError::UnsupportedVersion(data.version));
    }

    Ok(data)
}
