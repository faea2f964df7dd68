//! # Core Types
//!
//! This crate defines the identifiers shared by every part of the host folder bridge.
//!
//! ## Philosophy
//!
//! - **Identity is stable**: A node keeps its `NodeId` across renames and moves,
//!   even when the host object behind it is replaced.
//! - **Namespaces never mix**: Files and folders live in separate keyed namespaces.
//! - **Handles are not paths**: Nothing here names a host location.
//!
//! ## Key Types
//!
//! - [`NodeId`]: Identifier of a VFS node, reused as the handle store key
//! - [`HandleNamespace`]: Which keyed namespace a handle record lives in
//! - [`EntryKind`]: Whether a host entry is a file or a directory

pub mod ids;
pub mod uuid_tools;

pub use ids::{EntryKind, HandleNamespace, NodeId, ROOT_KEY};
pub use uuid_tools::new_uuid;
