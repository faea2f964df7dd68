//! Handle store errors

use core_types::{HandleNamespace, NodeId};
use thiserror::Error;

/// Errors raised by a handle store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be opened
    #[error("Handle store unavailable: {0}")]
    Unavailable(String),

    /// A schema upgrade by another connection is holding the store
    #[error("Handle store blocked: {0}")]
    Blocked(String),

    /// A record was put into the namespace of the other handle kind
    #[error("Handle record for {key} does not belong in {namespace}")]
    KindMismatch {
        namespace: HandleNamespace,
        key: NodeId,
    },

    /// Persisted contents could not be understood
    #[error("Handle store corrupted: {0}")]
    Corrupted(String),

    /// A handle could not be encoded for persistence
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Underlying I/O failure after the store was opened
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for handle store operations
pub type StoreResult<T> = Result<T, StoreError>;
