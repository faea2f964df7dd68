//! Path resolution over a tree
//!
//! Paths are a convenience for humans; the tree itself only knows ids.
//! `/` (or the empty path) names the top level.

use core_types::NodeId;
use thiserror::Error;

use crate::{FileNode, FolderNode, Vfs};

/// Errors that can occur during path resolution
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// Path is malformed
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Path component not found during traversal
    #[error("Not found: {0}")]
    NotFound(String),

    /// Attempted to traverse through a file
    #[error("Not a directory: {0}")]
    NotADirectory(String),
}

/// What a path names
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedPath {
    /// The top level
    Root,
    Folder(FolderNode),
    File(FileNode),
}

impl ResolvedPath {
    /// Folder id to use as a parent, `None` for the top level
    pub fn as_parent(&self) -> Result<Option<NodeId>, PathError> {
        match self {
            ResolvedPath::Root => Ok(None),
            ResolvedPath::Folder(folder) => Ok(Some(folder.id.clone())),
            ResolvedPath::File(file) => Err(PathError::NotADirectory(file.name.clone())),
        }
    }
}

/// Path resolver
pub struct PathResolver;

impl PathResolver {
    /// Splits a path into components; `/` yields no components
    ///
    /// # Examples
    ///
    /// ```
    /// use vfs_tree::PathResolver;
    ///
    /// let components = PathResolver::split_path("/docs/notes/todo.txt").unwrap();
    /// assert_eq!(components, vec!["docs", "notes", "todo.txt"]);
    /// assert!(PathResolver::split_path("/").unwrap().is_empty());
    /// ```
    pub fn split_path(path: &str) -> Result<Vec<&str>, PathError> {
        let path = path.trim_matches('/');
        if path.is_empty() {
            return Ok(Vec::new());
        }

        let components: Vec<&str> = path.split('/').collect();
        for component in &components {
            if !Self::is_valid_name(component) {
                return Err(PathError::InvalidPath(format!(
                    "bad component {:?} in {}",
                    component, path
                )));
            }
        }
        Ok(components)
    }

    /// Returns true if the name is valid for a tree entry
    pub fn is_valid_name(name: &str) -> bool {
        !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains('/')
            && !name.contains('\0')
    }

    /// Resolves `path` against `vfs`
    pub fn resolve<V: Vfs + ?Sized>(vfs: &V, path: &str) -> Result<ResolvedPath, PathError> {
        let components = Self::split_path(path)?;
        let mut current = ResolvedPath::Root;

        for component in components {
            let parent = current.as_parent()?;
            current = match vfs
                .find_folders_where(parent.as_ref())
                .into_iter()
                .find(|f| f.name == component)
            {
                Some(folder) => ResolvedPath::Folder(folder),
                None => vfs
                    .find_files_where(parent.as_ref())
                    .into_iter()
                    .find(|f| f.name == component)
                    .map(ResolvedPath::File)
                    .ok_or_else(|| PathError::NotFound(path.to_string()))?,
            };
        }

        Ok(current)
    }

    /// Resolves the parent folder of `path` and returns it with the last name
    pub fn resolve_parent<'a, V: Vfs + ?Sized>(
        vfs: &V,
        path: &'a str,
    ) -> Result<(Option<NodeId>, &'a str), PathError> {
        let mut components = Self::split_path(path)?;
        let name = components
            .pop()
            .ok_or_else(|| PathError::InvalidPath("path names the top level".to_string()))?;
        let parent_path = components.join("/");
        let parent = Self::resolve(vfs, &parent_path)?.as_parent()?;
        Ok((parent, name))
    }

    /// Absolute path of a folder, `/` joined
    pub fn folder_path<V: Vfs + ?Sized>(vfs: &V, id: &NodeId) -> Option<String> {
        let mut names = Vec::new();
        let mut current = Some(id.clone());
        while let Some(folder_id) = current {
            let folder = vfs.find_folder_by_id(&folder_id)?;
            names.push(folder.name);
            current = folder.parent_id;
        }
        names.reverse();
        Some(format!("/{}", names.join("/")))
    }

    /// Absolute path of a file
    pub fn file_path<V: Vfs + ?Sized>(vfs: &V, id: &NodeId) -> Option<String> {
        let file = vfs.find_file_by_id(id)?;
        match file.parent_id {
            Some(parent) => Some(format!("{}/{}", Self::folder_path(vfs, &parent)?, file.name)),
            None => Some(format!("/{}", file.name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryVfs;

    fn tree() -> (MemoryVfs, NodeId, NodeId) {
        let mut vfs = MemoryVfs::new();
        let sub = NodeId::new();
        let file = NodeId::new();
        vfs.create_folder(FolderNode::new(sub.clone(), "sub", None));
        vfs.create_file(FileNode::new(file.clone(), "b.txt", Some(sub.clone())));
        (vfs, sub, file)
    }

    #[test]
    fn test_split_nested_path() {
        let result = PathResolver::split_path("docs/notes/todo.txt").unwrap();
        assert_eq!(result, vec!["docs", "notes", "todo.txt"]);
    }

    #[test]
    fn test_split_path_with_trailing_slash() {
        let result = PathResolver::split_path("docs/").unwrap();
        assert_eq!(result, vec!["docs"]);
    }

    #[test]
    fn test_double_slash_rejected() {
        assert!(matches!(
            PathResolver::split_path("docs//notes.txt"),
            Err(PathError::InvalidPath(_))
        ));
        assert!(PathResolver::split_path("../x").is_err());
    }

    #[test]
    fn test_resolve() {
        let (vfs, sub, file) = tree();
        assert_eq!(PathResolver::resolve(&vfs, "/").unwrap(), ResolvedPath::Root);
        assert!(matches!(
            PathResolver::resolve(&vfs, "/sub").unwrap(),
            ResolvedPath::Folder(f) if f.id == sub
        ));
        assert!(matches!(
            PathResolver::resolve(&vfs, "sub/b.txt").unwrap(),
            ResolvedPath::File(f) if f.id == file
        ));
        assert_eq!(
            PathResolver::resolve(&vfs, "/nope"),
            Err(PathError::NotFound("/nope".to_string()))
        );
        assert!(matches!(
            PathResolver::resolve(&vfs, "/sub/b.txt/x"),
            Err(PathError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_resolve_parent() {
        let (vfs, sub, _) = tree();
        assert_eq!(
            PathResolver::resolve_parent(&vfs, "/sub/new.txt").unwrap(),
            (Some(sub), "new.txt")
        );
        assert_eq!(
            PathResolver::resolve_parent(&vfs, "top.txt").unwrap(),
            (None, "top.txt")
        );
        assert!(PathResolver::resolve_parent(&vfs, "/").is_err());
    }

    #[test]
    fn test_paths_of_nodes() {
        let (vfs, sub, file) = tree();
        assert_eq!(PathResolver::folder_path(&vfs, &sub).unwrap(), "/sub");
        assert_eq!(PathResolver::file_path(&vfs, &file).unwrap(), "/sub/b.txt");
        assert!(PathResolver::file_path(&vfs, &NodeId::new()).is_none());
    }
}
