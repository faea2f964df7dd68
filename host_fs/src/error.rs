//! Host capability errors

use thiserror::Error;

/// Errors raised by host filesystem handles
#[derive(Debug, Error)]
pub enum HostError {
    /// The entry behind the handle no longer exists
    #[error("Entry not found: {0}")]
    NotFound(String),

    /// A file was found where a directory was expected, or the reverse
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// The entry name is not a single valid path component
    #[error("Invalid name: {0:?}")]
    InvalidName(String),

    /// The host refused the operation (no grant, read-only host)
    #[error("Not allowed: {0}")]
    NotAllowed(String),

    /// The operation would leave the host in an invalid state
    #[error("Invalid modification: {0}")]
    InvalidModification(String),

    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for host operations
pub type HostResult<T> = Result<T, HostError>;
