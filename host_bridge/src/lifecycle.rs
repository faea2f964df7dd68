//! Session lifecycle
//!
//! ```text
//! COLD ──flag unset──────────────────────────────▶ DETACHED
//!   │ flag set
//!   ▼
//! ATTACHING ──no root handle─────────────────────▶ DETACHED
//!   │ ──permission denied (tree + store wiped)───▶ DETACHED
//!   │ granted, import ok
//!   ▼
//! ATTACHED
//! ```
//!
//! Store or import failures during boot also end in DETACHED with a clean
//! state; boot itself never fails.

use host_fs::{DirectoryHandle, HostHandle, PermissionMode};
use services_handle_store::{HandleStore, HandleStoreExt};
use services_settings::SettingsStore;
use tracing::{error, info, warn};
use vfs_tree::Vfs;

use crate::picker::FolderPicker;
use crate::state::SessionPhase;
use crate::{BridgeError, HostBridge, PermissionGate};

impl<D, S, V, F> HostBridge<D, S, V, F>
where
    D: DirectoryHandle,
    S: HandleStore<D>,
    V: Vfs,
    F: SettingsStore,
{
    /// Decides at startup whether the last session's folder is re-attached
    pub async fn init(&self) -> SessionPhase {
        self.state.set_phase(SessionPhase::Cold);
        let phase = self.boot().await;
        self.state.set_phase(phase);
        info!(%phase, loaded = self.is_loaded(), "session boot finished");
        phase
    }

    async fn boot(&self) -> SessionPhase {
        match self.host_flag() {
            Ok(true) => {}
            Ok(false) => return SessionPhase::Detached,
            Err(err) => {
                warn!(error = %err, "could not read host flag");
                return SessionPhase::Detached;
            }
        }

        self.state.set_phase(SessionPhase::Attaching);
        let root = match self.store.get_root().await {
            Ok(Some(root)) => root,
            Ok(None) => {
                info!("host flag set but no root handle stored");
                return SessionPhase::Detached;
            }
            Err(err) => {
                warn!(error = %err, "handle store unavailable at boot");
                return SessionPhase::Detached;
            }
        };

        let granted = match PermissionGate::verify(&root, PermissionMode::ReadWrite).await {
            Ok(granted) => granted,
            Err(err) => {
                warn!(error = %err, "permission check failed at boot");
                false
            }
        };
        if !granted {
            info!(root = root.name(), "permission to host folder lost");
            self.detach_clean().await;
            return SessionPhase::Detached;
        }

        match self.import_folder(root).await {
            Ok(()) => SessionPhase::Attached,
            Err(err) => {
                error!(error = %err, "import at boot failed");
                self.detach_clean().await;
                SessionPhase::Detached
            }
        }
    }

    /// Wipes the tree and store after a failed or refused attach
    async fn detach_clean(&self) {
        self.state.set_loaded(false);
        if let Err(err) = self.wipe().await {
            error!(error = %err, "failed to clear handle store");
        }
    }

    /// Lets the user pick a host folder and imports it
    ///
    /// Returns `Ok(false)` when the picker was dismissed or permission was
    /// refused; the current session is then left as it was.
    pub async fn open_folder_picker<P>(&self, picker: &P) -> Result<bool, BridgeError>
    where
        P: FolderPicker<D> + ?Sized,
    {
        let Some(dir) = picker.pick().await? else {
            info!("folder picker dismissed");
            return Ok(false);
        };
        if !PermissionGate::verify(&dir, PermissionMode::ReadWrite).await? {
            info!(name = dir.name(), "permission to picked folder refused");
            return Ok(false);
        }

        self.state.set_phase(SessionPhase::Attaching);
        self.observer.before_attach();
        match self.import_folder(dir).await {
            Ok(()) => {
                self.state.set_phase(SessionPhase::Attached);
                Ok(true)
            }
            Err(err) => {
                self.detach_clean().await;
                self.state.set_phase(SessionPhase::Detached);
                Err(err.into())
            }
        }
    }

    /// Detaches the host folder; host files are left untouched
    pub async fn close_folder(&self) -> Result<(), BridgeError> {
        self.state.set_loaded(false);
        self.state.set_phase(SessionPhase::Detached);
        self.set_host_flag(false)?;
        self.wipe().await?;
        info!("host folder closed");
        Ok(())
    }
}
