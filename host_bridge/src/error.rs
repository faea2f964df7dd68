//! Bridge errors
//!
//! Permission denial is not an error; it is `Ok(false)` from the gate.

use core_types::{EntryKind, NodeId};
use host_fs::HostError;
use services_handle_store::StoreError;
use services_settings::SettingsError;
use thiserror::Error;

/// The permission query or request itself failed
#[derive(Debug, Error)]
pub enum PermissionError {
    #[error("Permission check failed: {0}")]
    Host(#[from] HostError),
}

/// Failure while importing a host folder
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Import failed in handle store: {0}")]
    Store(#[from] StoreError),

    #[error("Import failed on host: {0}")]
    Host(#[from] HostError),

    #[error("Import could not record session flag: {0}")]
    Settings(#[from] SettingsError),
}

/// Failure of a create, write, move or read operation
#[derive(Debug, Error)]
pub enum IoError {
    /// No host folder is attached
    #[error("No host folder is attached")]
    NotAttached,

    /// The handle store has no record for the node
    #[error("No {kind} handle for {id}")]
    MissingHandle { kind: EntryKind, id: NodeId },

    /// A folder cannot move onto itself or below itself
    #[error("Invalid move: {0}")]
    InvalidMove(String),

    /// The attached root is only replaced by an import or dropped by close
    #[error("The root folder cannot be {0}")]
    ReservedRoot(&'static str),

    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("Handle store error: {0}")]
    Store(#[from] StoreError),
}

/// The folder picker failed, as opposed to being dismissed
#[derive(Debug, Error)]
pub enum PickerError {
    #[error("Folder picker unavailable: {0}")]
    Unavailable(String),

    #[error("Folder picker host error: {0}")]
    Host(#[from] HostError),
}

/// Failure of a session level operation
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Permission(#[from] PermissionError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Picker(#[from] PickerError),
}

pub type IoResult<T> = Result<T, IoError>;
