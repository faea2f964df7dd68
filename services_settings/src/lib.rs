//! # Bridge Settings Service
//!
//! Configuration and small persisted flags for the host folder bridge.
//!
//! ## Philosophy
//!
//! - **Typed settings**: Values have explicit types, not bare strings
//! - **Prefixed keys**: Every persisted key is `{prefix}-{key}`
//! - **Versioned format**: The on-disk file carries a version for migrations
//! - **Defaults first**: A missing config file or field means the default
//!
//! ## Key Types
//!
//! - [`BridgeConfig`]: store name/version, key prefix, host flag key, fan-out
//! - [`SettingsStore`]: synchronous key/value store ([`MemorySettings`], [`FileSettings`])
//! - [`SessionFlags`]: prefixed boolean flags over a [`SettingsStore`]

pub mod config;
pub mod error;
pub mod persistence;
pub mod store;

pub use config::BridgeConfig;
pub use error::{SettingsError, SettingsResult};
pub use persistence::{deserialize_settings, serialize_settings, SettingsData};
pub use store::{FileSettings, MemorySettings, SessionFlags, SettingsStore};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Setting key (already prefixed when persisted)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingKey(String);

impl SettingKey {
    /// Creates a new setting key
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Creates `{prefix}-{key}`
    pub fn prefixed(prefix: &str, key: &str) -> Self {
        Self(format!("{}-{}", prefix, key))
    }

    /// Returns the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SettingKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Setting value (strongly typed)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SettingValue {
    /// Boolean value
    Boolean(bool),
    /// Integer value
    Integer(i64),
    /// String value
    String(String),
}

impl SettingValue {
    /// Tries to get as boolean
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            SettingValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Boolean(v) => write!(f, "{}", v),
            SettingValue::Integer(v) => write!(f, "{}", v),
            SettingValue::String(v) => write!(f, "\"{}\"", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixed_key() {
        let key = SettingKey::prefixed("terra", "use-lfs");
        assert_eq!(key.as_str(), "terra-use-lfs");
        assert_eq!(key.to_string(), "terra-use-lfs");
    }

    #[test]
    fn test_only_booleans_read_as_boolean() {
        assert_eq!(SettingValue::Boolean(true).as_boolean(), Some(true));
        assert_eq!(SettingValue::Integer(3).as_boolean(), None);
        assert_eq!(SettingValue::String("true".to_string()).as_boolean(), None);
    }

    #[test]
    fn test_setting_value_display() {
        assert_eq!(SettingValue::Boolean(false).to_string(), "false");
        assert_eq!(SettingValue::String("a".to_string()).to_string(), "\"a\"");
    }
}
