//! Settings errors

use thiserror::Error;

/// Errors raised while loading or saving settings
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Failed to serialize settings
    #[error("Failed to serialize settings: {0}")]
    SerializationFailed(String),

    /// Failed to deserialize settings
    #[error("Failed to deserialize settings: {0}")]
    DeserializationFailed(String),

    /// Unsupported settings version
    #[error("Unsupported settings version: {0}")]
    UnsupportedVersion(u32),

    /// Reading or writing the settings file failed
    #[error("Settings I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for settings operations
pub type SettingsResult<T> = Result<T, SettingsError>;
