//! CLI commands over a host folder bridge
//!
//! Every command takes paths relative to the attached folder and goes
//! through the bridge, so the tree and the handle store stay in step.

use core_types::NodeId;
use host_bridge::{HostBridge, PresetPicker};
use host_fs::{HostHandle, LocalDirectory};
use services_handle_store::{HandleStoreExt, JournaledHandleStore};
use services_settings::{BridgeConfig, FileSettings};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use vfs_tree::{MemoryVfs, PathResolver, ResolvedPath, Vfs};

/// Bridge over the local disk with state kept in a directory
pub type LocalBridge =
    HostBridge<LocalDirectory, JournaledHandleStore<LocalDirectory>, MemoryVfs, FileSettings>;

/// CLI Command handler
pub struct CommandHandler {
    /// The bridge every command goes through
    pub bridge: LocalBridge,
}

impl CommandHandler {
    /// Creates a handler keeping its handle store and settings in `state_dir`
    pub fn new(state_dir: &Path, config: BridgeConfig) -> Self {
        let store = JournaledHandleStore::new(
            state_dir,
            config.store_name.clone(),
            config.store_version,
        );
        let settings = FileSettings::new(state_dir.join("settings.json"));
        let vfs = Rc::new(RefCell::new(MemoryVfs::new()));
        Self {
            bridge: HostBridge::new(store, vfs, settings, config),
        }
    }

    /// Re-attaches the folder of the last session, if any
    pub async fn boot(&self) -> String {
        format!("Session {}", self.bridge.init().await)
    }

    /// Runs one command line
    pub async fn execute(&self, line: &str) -> Result<String, String> {
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        let args: Vec<&str> = rest.split_whitespace().collect();

        match (command, args.as_slice()) {
            ("open", [path]) => self.open(path).await,
            ("close", []) => self.close().await,
            ("status", []) => self.status().await,
            ("tree", []) => Ok(self.tree()),
            ("cat", [path]) => self.cat(path).await,
            ("write", [path, ..]) => {
                let content = rest[path.len()..].trim_start();
                self.write(path, content).await
            }
            ("mkdir", [path]) => self.mkdir(path).await,
            ("rm", [path]) => self.rm(path).await,
            ("mv", [from, to]) => self.mv(from, to, None).await,
            ("mv", [from, to, name]) => self.mv(from, to, Some(*name)).await,
            ("help", []) => Ok(HELP.to_string()),
            _ => Err(format!("unknown command: {} (try help)", line)),
        }
    }

    /// Attaches the directory at `path`, replacing the current tree
    ///
    /// Example: `terra open ~/project`
    pub async fn open(&self, path: &str) -> Result<String, String> {
        let dir = LocalDirectory::open(path)
            .await
            .map_err(|e| format!("open failed: {}", e))?;
        let name = dir.name().to_string();
        let picked = self
            .bridge
            .open_folder_picker(&PresetPicker::new(dir))
            .await
            .map_err(|e| format!("open failed: {}", e))?;

        if picked {
            Ok(format!("Opened {}", name))
        } else {
            Err(format!("open failed: permission to {} refused", name))
        }
    }

    /// Detaches the current folder; files on disk stay
    pub async fn close(&self) -> Result<String, String> {
        self.bridge
            .close_folder()
            .await
            .map_err(|e| format!("close failed: {}", e))?;
        Ok("Closed".to_string())
    }

    pub async fn status(&self) -> Result<String, String> {
        let root = self
            .bridge
            .store()
            .get_root()
            .await
            .map_err(|e| format!("status failed: {}", e))?;

        let mut output = format!("Phase: {}\n", self.bridge.phase());
        output.push_str(&format!("Loaded: {}\n", self.bridge.is_loaded()));
        if let Some(root) = root {
            output.push_str(&format!("Folder: {}\n", root.name()));
        }
        Ok(output)
    }

    /// Renders the tree, folders first, two spaces per level
    pub fn tree(&self) -> String {
        fn render(vfs: &MemoryVfs, parent: Option<&NodeId>, depth: usize, out: &mut String) {
            for folder in vfs.find_folders_where(parent) {
                out.push_str(&format!("{}{}/\n", "  ".repeat(depth), folder.name));
                render(vfs, Some(&folder.id), depth + 1, out);
            }
            for file in vfs.find_files_where(parent) {
                out.push_str(&format!("{}{}\n", "  ".repeat(depth), file.name));
            }
        }

        let vfs = self.bridge.vfs();
        let mut out = String::new();
        render(&vfs.borrow(), None, 0, &mut out);
        out
    }

    fn resolve(&self, path: &str) -> Result<ResolvedPath, String> {
        PathResolver::resolve(&*self.bridge.vfs().borrow(), path).map_err(|e| e.to_string())
    }

    /// Example: `terra cat src/main.py`
    pub async fn cat(&self, path: &str) -> Result<String, String> {
        match self.resolve(path).map_err(|e| format!("cat failed: {}", e))? {
            ResolvedPath::File(file) => self
                .bridge
                .get_file_content(&file.id)
                .await
                .map_err(|e| format!("cat failed: {}", e)),
            _ => Err(format!("cat failed: {} is a folder", path)),
        }
    }

    /// Replaces the content of `path`, creating the file if needed
    ///
    /// Example: `terra write notes.txt hello world`
    pub async fn write(&self, path: &str, content: &str) -> Result<String, String> {
        let (parent, id, name) = match self.resolve(path) {
            Ok(ResolvedPath::File(file)) => (file.parent_id, file.id, file.name),
            Ok(_) => return Err(format!("write failed: {} is a folder", path)),
            Err(_) => {
                let (parent, name) = PathResolver::resolve_parent(&*self.bridge.vfs().borrow(), path)
                    .map_err(|e| format!("write failed: {}", e))?;
                (parent, NodeId::new(), name.to_string())
            }
        };

        self.bridge
            .write_file_to_folder(parent.as_ref(), &id, &name, content)
            .await
            .map_err(|e| format!("write failed: {}", e))?;
        Ok(format!("Wrote {} bytes to {}", content.len(), path))
    }

    /// Example: `terra mkdir src/lib`
    pub async fn mkdir(&self, path: &str) -> Result<String, String> {
        let (parent, name) = PathResolver::resolve_parent(&*self.bridge.vfs().borrow(), path)
            .map_err(|e| format!("mkdir failed: {}", e))?;
        let name = name.to_string();

        self.bridge
            .create_folder(&NodeId::new(), parent.as_ref(), &name)
            .await
            .map_err(|e| format!("mkdir failed: {}", e))?;
        Ok(format!("Created directory: {}", path))
    }

    /// Removes a file or a whole folder
    pub async fn rm(&self, path: &str) -> Result<String, String> {
        let removed = match self.resolve(path).map_err(|e| format!("rm failed: {}", e))? {
            ResolvedPath::File(file) => self.bridge.delete_file(&file.id).await,
            ResolvedPath::Folder(folder) => self.bridge.delete_folder(&folder.id).await,
            ResolvedPath::Root => return Err("rm failed: cannot remove the top level".to_string()),
        };

        if removed {
            Ok(format!("Removed {}", path))
        } else {
            Err(format!("rm failed: {} could not be removed", path))
        }
    }

    /// Moves `from` into folder `to`, optionally renaming it
    ///
    /// Example: `terra mv notes.txt docs todo.txt`
    pub async fn mv(&self, from: &str, to: &str, name: Option<&str>) -> Result<String, String> {
        let source = self.resolve(from).map_err(|e| format!("mv failed: {}", e))?;
        let parent = self
            .resolve(to)
            .and_then(|target| target.as_parent().map_err(|e| e.to_string()))
            .map_err(|e| format!("mv failed: {}", e))?;

        let moved = match source {
            ResolvedPath::File(file) => {
                let new_name = name.unwrap_or(file.name.as_str());
                self.bridge
                    .move_file(&file.id, new_name, parent.as_ref())
                    .await
            }
            ResolvedPath::Folder(folder) => {
                self.bridge
                    .move_folder(&folder.id, name, parent.as_ref())
                    .await
            }
            ResolvedPath::Root => return Err("mv failed: cannot move the top level".to_string()),
        };
        moved.map_err(|e| format!("mv failed: {}", e))?;

        Ok(format!("Moved {} to {}", from, to))
    }
}

const HELP: &str = "\
open <dir>               attach a folder
close                    detach the folder
status                   show the session
tree                     list the tree
cat <file>               print a file
write <file> <text...>   replace a file's content
mkdir <dir>              create a folder
rm <path>                remove a file or folder
mv <from> <to> [name]    move into folder <to>";
