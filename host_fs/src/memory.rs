//! In-memory host
//!
//! A host directory tree held entirely in memory. Handles address entries by
//! their location under the host root, so a handle to a removed entry starts
//! working again once something is created at the same place.
//!
//! The host also plays the user behind the permission prompt: the current
//! grant and the answer given to the next prompt are both scriptable.

use async_trait::async_trait;
use core_types::EntryKind;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::handle::{
    validate_name, DirectoryHandle, FileHandle, HostEntry, HostHandle, PermissionMode,
    PermissionState,
};
use crate::{HostError, HostResult};

#[derive(Debug, Clone)]
enum MemNode {
    File(Vec<u8>),
    Directory(BTreeMap<String, MemNode>),
}

impl MemNode {
    fn empty_dir() -> Self {
        MemNode::Directory(BTreeMap::new())
    }
}

#[derive(Debug)]
struct HostState {
    root_name: String,
    root: MemNode,
    permission: PermissionState,
    prompt_answer: PermissionState,
    prompts: usize,
    read_only: bool,
}

impl HostState {
    fn node(&self, path: &[String]) -> Option<&MemNode> {
        let mut current = &self.root;
        for component in path {
            match current {
                MemNode::Directory(children) => current = children.get(component)?,
                MemNode::File(_) => return None,
            }
        }
        Some(current)
    }

    fn node_mut(&mut self, path: &[String]) -> Option<&mut MemNode> {
        let mut current = &mut self.root;
        for component in path {
            match current {
                MemNode::Directory(children) => current = children.get_mut(component)?,
                MemNode::File(_) => return None,
            }
        }
        Some(current)
    }

    fn dir_mut(&mut self, path: &[String]) -> HostResult<&mut BTreeMap<String, MemNode>> {
        match self.node_mut(path) {
            Some(MemNode::Directory(children)) => Ok(children),
            Some(MemNode::File(_)) => Err(HostError::TypeMismatch(join(path))),
            None => Err(HostError::NotFound(join(path))),
        }
    }

    fn check_writable(&self) -> HostResult<()> {
        if self.read_only {
            Err(HostError::NotAllowed("host is read-only".to_string()))
        } else {
            Ok(())
        }
    }
}

fn join(path: &[String]) -> String {
    format!("/{}", path.join("/"))
}

fn split(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|c| !c.is_empty())
        .map(|c| c.to_string())
        .collect()
}

/// An in-memory host filesystem
///
/// Cloning a `MemoryHost` yields another reference to the same tree.
#[derive(Debug, Clone)]
pub struct MemoryHost {
    state: Rc<RefCell<HostState>>,
}

impl MemoryHost {
    /// Creates an empty host whose root directory is called `root_name`
    ///
    /// Permission starts out granted.
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            state: Rc::new(RefCell::new(HostState {
                root_name: root_name.into(),
                root: MemNode::empty_dir(),
                permission: PermissionState::Granted,
                prompt_answer: PermissionState::Granted,
                prompts: 0,
                read_only: false,
            })),
        }
    }

    /// Handle onto the host root directory
    pub fn root(&self) -> MemoryDirectory {
        let name = self.state.borrow().root_name.clone();
        MemoryDirectory {
            host: self.clone(),
            path: Vec::new(),
            name,
        }
    }

    /// Sets the current grant reported by `query_permission`
    pub fn set_permission(&self, state: PermissionState) {
        self.state.borrow_mut().permission = state;
    }

    /// Sets the answer the user gives to the next permission prompts
    pub fn answer_prompts_with(&self, answer: PermissionState) {
        self.state.borrow_mut().prompt_answer = answer;
    }

    /// Number of permission prompts shown so far
    pub fn prompt_count(&self) -> usize {
        self.state.borrow().prompts
    }

    /// Makes every mutating operation fail with `NotAllowed`
    pub fn set_read_only(&self, read_only: bool) {
        self.state.borrow_mut().read_only = read_only;
    }

    /// Creates a file (and missing parent directories) outside of any handle
    pub fn add_file(&self, path: &str, contents: impl Into<Vec<u8>>) {
        let mut components = split(path);
        let Some(name) = components.pop() else {
            return;
        };
        let mut state = self.state.borrow_mut();
        let mut current = &mut state.root;
        for component in components {
            let MemNode::Directory(children) = current else {
                return;
            };
            current = children.entry(component).or_insert_with(MemNode::empty_dir);
        }
        if let MemNode::Directory(children) = current {
            children.insert(name, MemNode::File(contents.into()));
        }
    }

    /// Creates a directory (and missing parents) outside of any handle
    pub fn add_dir(&self, path: &str) {
        let mut state = self.state.borrow_mut();
        let mut current = &mut state.root;
        for component in split(path) {
            let MemNode::Directory(children) = current else {
                return;
            };
            current = children.entry(component).or_insert_with(MemNode::empty_dir);
        }
    }

    /// Returns true if a file or directory exists at `path`
    pub fn exists(&self, path: &str) -> bool {
        self.state.borrow().node(&split(path)).is_some()
    }

    /// Reads a file by path, bypassing handles
    pub fn read_file(&self, path: &str) -> Option<Vec<u8>> {
        match self.state.borrow().node(&split(path)) {
            Some(MemNode::File(bytes)) => Some(bytes.clone()),
            _ => None,
        }
    }

    /// Every file path in the host, sorted
    pub fn file_paths(&self) -> Vec<String> {
        self.collect_paths(EntryKind::File)
    }

    /// Every directory path below the root, sorted
    pub fn dir_paths(&self) -> Vec<String> {
        self.collect_paths(EntryKind::Directory)
    }

    fn collect_paths(&self, kind: EntryKind) -> Vec<String> {
        fn walk(node: &MemNode, prefix: &str, kind: EntryKind, out: &mut Vec<String>) {
            if let MemNode::Directory(children) = node {
                for (name, child) in children {
                    let path = format!("{}/{}", prefix, name);
                    match (child, kind) {
                        (MemNode::File(_), EntryKind::File) => out.push(path.clone()),
                        (MemNode::Directory(_), EntryKind::Directory) => out.push(path.clone()),
                        _ => {}
                    }
                    walk(child, &path, kind, out);
                }
            }
        }

        let mut out = Vec::new();
        walk(&self.state.borrow().root, "", kind, &mut out);
        out.sort();
        out
    }

    fn same_host(&self, other: &MemoryHost) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    fn query(&self) -> PermissionState {
        self.state.borrow().permission
    }

    fn prompt(&self) -> PermissionState {
        let mut state = self.state.borrow_mut();
        state.prompts += 1;
        if !state.permission.is_granted() {
            state.permission = state.prompt_answer;
        }
        state.permission
    }

    fn remove_at(&self, path: &[String], kind: EntryKind) -> HostResult<()> {
        let mut state = self.state.borrow_mut();
        state.check_writable()?;
        let Some((name, parent)) = path.split_last() else {
            return Err(HostError::NotAllowed("cannot remove the host root".to_string()));
        };
        let children = state.dir_mut(parent)?;
        match (children.get(name), kind) {
            (None, _) => Err(HostError::NotFound(join(path))),
            (Some(MemNode::File(_)), EntryKind::File) => {
                children.remove(name);
                Ok(())
            }
            (Some(MemNode::Directory(grandchildren)), EntryKind::Directory) => {
                if !grandchildren.is_empty() {
                    return Err(HostError::InvalidModification(format!(
                        "directory not empty: {}",
                        join(path)
                    )));
                }
                children.remove(name);
                Ok(())
            }
            (Some(_), _) => Err(HostError::TypeMismatch(join(path))),
        }
    }
}

/// Handle onto a directory of a [`MemoryHost`]
#[derive(Debug, Clone)]
pub struct MemoryDirectory {
    host: MemoryHost,
    path: Vec<String>,
    name: String,
}

impl MemoryDirectory {
    /// Location of the directory under the host root, e.g. `/src/lib`
    pub fn path(&self) -> String {
        join(&self.path)
    }

    fn child_path(&self, name: &str) -> Vec<String> {
        let mut path = self.path.clone();
        path.push(name.to_string());
        path
    }
}

/// Handle onto a file of a [`MemoryHost`]
#[derive(Debug, Clone)]
pub struct MemoryFile {
    host: MemoryHost,
    path: Vec<String>,
}

impl MemoryFile {
    /// Location of the file under the host root, e.g. `/src/main.py`
    pub fn path(&self) -> String {
        join(&self.path)
    }
}

#[async_trait(?Send)]
impl HostHandle for MemoryDirectory {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> EntryKind {
        EntryKind::Directory
    }

    async fn query_permission(&self, _mode: PermissionMode) -> HostResult<PermissionState> {
        Ok(self.host.query())
    }

    async fn request_permission(&self, _mode: PermissionMode) -> HostResult<PermissionState> {
        Ok(self.host.prompt())
    }

    async fn is_same_entry(&self, other: &Self) -> HostResult<bool> {
        Ok(self.host.same_host(&other.host) && self.path == other.path)
    }

    async fn remove(&self) -> HostResult<()> {
        self.host.remove_at(&self.path, EntryKind::Directory)
    }
}

#[async_trait(?Send)]
impl DirectoryHandle for MemoryDirectory {
    type File = MemoryFile;

    async fn entries(&self) -> HostResult<Vec<HostEntry<Self>>> {
        let state = self.host.state.borrow();
        let children = match state.node(&self.path) {
            Some(MemNode::Directory(children)) => children,
            Some(MemNode::File(_)) => return Err(HostError::TypeMismatch(self.path())),
            None => return Err(HostError::NotFound(self.path())),
        };

        let entries = children
            .iter()
            .map(|(name, node)| match node {
                MemNode::File(_) => HostEntry::File(MemoryFile {
                    host: self.host.clone(),
                    path: self.child_path(name),
                }),
                MemNode::Directory(_) => HostEntry::Directory(MemoryDirectory {
                    host: self.host.clone(),
                    path: self.child_path(name),
                    name: name.clone(),
                }),
            })
            .collect();
        Ok(entries)
    }

    async fn get_file_handle(&self, name: &str, create: bool) -> HostResult<MemoryFile> {
        validate_name(name)?;
        let mut state = self.host.state.borrow_mut();
        let read_only = state.read_only;
        let children = state.dir_mut(&self.path)?;
        match children.get(name) {
            Some(MemNode::File(_)) => {}
            Some(MemNode::Directory(_)) => {
                return Err(HostError::TypeMismatch(join(&self.child_path(name))))
            }
            None if !create => return Err(HostError::NotFound(join(&self.child_path(name)))),
            None => {
                if read_only {
                    return Err(HostError::NotAllowed("host is read-only".to_string()));
                }
                children.insert(name.to_string(), MemNode::File(Vec::new()));
            }
        }
        Ok(MemoryFile {
            host: self.host.clone(),
            path: self.child_path(name),
        })
    }

    async fn get_directory_handle(&self, name: &str, create: bool) -> HostResult<MemoryDirectory> {
        validate_name(name)?;
        let mut state = self.host.state.borrow_mut();
        let read_only = state.read_only;
        let children = state.dir_mut(&self.path)?;
        match children.get(name) {
            Some(MemNode::Directory(_)) => {}
            Some(MemNode::File(_)) => {
                return Err(HostError::TypeMismatch(join(&self.child_path(name))))
            }
            None if !create => return Err(HostError::NotFound(join(&self.child_path(name)))),
            None => {
                if read_only {
                    return Err(HostError::NotAllowed("host is read-only".to_string()));
                }
                children.insert(name.to_string(), MemNode::empty_dir());
            }
        }
        Ok(MemoryDirectory {
            host: self.host.clone(),
            path: self.child_path(name),
            name: name.to_string(),
        })
    }
}

#[async_trait(?Send)]
impl HostHandle for MemoryFile {
    fn name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }

    fn kind(&self) -> EntryKind {
        EntryKind::File
    }

    async fn query_permission(&self, _mode: PermissionMode) -> HostResult<PermissionState> {
        Ok(self.host.query())
    }

    async fn request_permission(&self, _mode: PermissionMode) -> HostResult<PermissionState> {
        Ok(self.host.prompt())
    }

    async fn is_same_entry(&self, other: &Self) -> HostResult<bool> {
        Ok(self.host.same_host(&other.host) && self.path == other.path)
    }

    async fn remove(&self) -> HostResult<()> {
        self.host.remove_at(&self.path, EntryKind::File)
    }
}

#[async_trait(?Send)]
impl FileHandle for MemoryFile {
    async fn size(&self) -> HostResult<u64> {
        match self.host.state.borrow().node(&self.path) {
            Some(MemNode::File(bytes)) => Ok(bytes.len() as u64),
            Some(MemNode::Directory(_)) => Err(HostError::TypeMismatch(self.path())),
            None => Err(HostError::NotFound(self.path())),
        }
    }

    async fn read(&self) -> HostResult<Vec<u8>> {
        match self.host.state.borrow().node(&self.path) {
            Some(MemNode::File(bytes)) => Ok(bytes.clone()),
            Some(MemNode::Directory(_)) => Err(HostError::TypeMismatch(self.path())),
            None => Err(HostError::NotFound(self.path())),
        }
    }

    async fn write_all(&self, contents: &[u8]) -> HostResult<()> {
        let mut state = self.host.state.borrow_mut();
        state.check_writable()?;
        match state.node_mut(&self.path) {
            Some(MemNode::File(bytes)) => {
                *bytes = contents.to_vec();
                Ok(())
            }
            Some(MemNode::Directory(_)) => Err(HostError::TypeMismatch(join(&self.path))),
            None => Err(HostError::NotFound(join(&self.path))),
        }
    }
}
