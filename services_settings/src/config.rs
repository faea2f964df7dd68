//! Bridge configuration
//!
//! Every field has a default, so an empty JSON object is a valid config.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{SettingsError, SettingsResult};

/// Configuration for the host folder bridge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Name of the durable handle store
    pub store_name: String,
    /// Schema version of the handle store
    pub store_version: u32,
    /// Prefix for every persisted setting key
    pub storage_prefix: String,
    /// Key of the "host folder in use" flag, before prefixing
    pub host_flag_key: String,
    /// Await siblings of one directory concurrently during recursive walks
    pub concurrent_siblings: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            store_name: "terra".to_string(),
            store_version: 1,
            storage_prefix: "terra".to_string(),
            host_flag_key: "use-lfs".to_string(),
            concurrent_siblings: true,
        }
    }
}

impl BridgeConfig {
    /// Creates the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from JSON
    pub fn from_json(json: &str) -> SettingsResult<Self> {
        serde_json::from_str(json).map_err(|e| SettingsError::DeserializationFailed(e.to_string()))
    }

    /// Loads a configuration file, using defaults when it does not exist
    pub fn load(path: impl AsRef<Path>) -> SettingsResult<Self> {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(json) => Self::from_json(&json),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(SettingsError::Io(err)),
        }
    }

    /// Sets the handle store name
    pub fn with_store_name(mut self, name: impl Into<String>) -> Self {
        self.store_name = name.into();
        self
    }

    /// Sets the handle store schema version
    pub fn with_store_version(mut self, version: u32) -> Self {
        self.store_version = version;
        self
    }

    /// Sets the settings key prefix
    pub fn with_storage_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.storage_prefix = prefix.into();
        self
    }

    /// Sets the host flag key
    pub fn with_host_flag_key(mut self, key: impl Into<String>) -> Self {
        self.host_flag_key = key.into();
        self
    }

    /// Enables or disables concurrent sibling fan-out
    pub fn with_concurrent_siblings(mut self, enabled: bool) -> Self {
        self.concurrent_siblings = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.store_name, "terra");
        assert_eq!(config.store_version, 1);
        assert_eq!(config.storage_prefix, "terra");
        assert_eq!(config.host_flag_key, "use-lfs");
        assert!(config.concurrent_siblings);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = BridgeConfig::from_json(r#"{"store_name":"scratch"}"#).unwrap();
        assert_eq!(config.store_name, "scratch");
        assert_eq!(config.host_flag_key, "use-lfs");
        assert_eq!(BridgeConfig::from_json("{}").unwrap(), BridgeConfig::default());
    }

    #[test]
    fn test_builder() {
        let config = BridgeConfig::new()
            .with_store_name("other")
            .with_store_version(2)
            .with_storage_prefix("p")
            .with_host_flag_key("flag")
            .with_concurrent_siblings(false);
        assert_eq!(config.store_name, "other");
        assert_eq!(config.store_version, 2);
        assert_eq!(config.storage_prefix, "p");
        assert_eq!(config.host_flag_key, "flag");
        assert!(!config.concurrent_siblings);
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let config = BridgeConfig::load(temp.path().join("bridge.json")).unwrap();
        assert_eq!(config, BridgeConfig::default());
    }

    #[test]
    fn test_load_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bridge.json");
        std::fs::write(&path, r#"{"concurrent_siblings":false}"#).unwrap();
        assert!(!BridgeConfig::load(&path).unwrap().concurrent_siblings);

        std::fs::write(&path, "{").unwrap();
        assert!(matches!(
            BridgeConfig::load(&path),
            Err(SettingsError::DeserializationFailed(_))
        ));
    }
}
