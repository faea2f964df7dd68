//! # VFS Tree
//!
//! The in-memory tree model of the editor's virtual file system.
//!
//! ## Philosophy
//!
//! - **Ids, not paths**: Nodes are addressed by [`NodeId`]; paths are a view
//! - **Two namespaces**: File ids and folder ids never need to be disjoint
//! - **Infallible model**: Tree operations are synchronous and never fail
//! - **No host knowledge**: The tree never touches a host directory
//!
//! ## Design
//!
//! - [`Vfs`] is the contract the host bridge consumes
//! - [`MemoryVfs`] is the reference tree kept in ordered maps
//! - [`PathResolver`] turns `/a/b.txt` into a node of a tree

pub mod memory;
pub mod node;
pub mod path;
pub mod tree;

pub use core_types::NodeId;
pub use memory::MemoryVfs;
pub use node::{FileNode, FileUpdate, FolderNode, FolderUpdate};
pub use path::{PathError, PathResolver, ResolvedPath};
pub use tree::Vfs;
