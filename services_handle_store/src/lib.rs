//! # Handle Store Service
//!
//! This crate persists host capability handles under VFS node ids.
//!
//! ## Philosophy
//!
//! - **Two namespaces**: `file-handles` and `folder-handles` never share keys
//! - **Reserved root**: `"root"` in `folder-handles` is the attached top-level directory
//! - **Lazy open**: The store is opened on first use, never at construction
//! - **Loud failures**: An unavailable or blocked store is an error, never a hang
//!
//! ## Backends
//!
//! - [`MemoryHandleStore`]: process-local store with fault injection
//! - [`JournaledHandleStore`]: durable append-only journal replayed on open

pub mod error;
pub mod journaled;
pub mod memory;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use journaled::{JournalEntry, JournalHeader, JournaledHandleStore};
pub use memory::{MemoryHandleStore, StoreFault};
pub use store::{HandleRecord, HandleStore, HandleStoreExt};
