//! Permission gate

use host_fs::{HostHandle, PermissionMode};
use tracing::debug;

use crate::PermissionError;

/// Checks and, if needed, requests access to a handle
pub struct PermissionGate;

impl PermissionGate {
    /// Returns true if `handle` is usable in `mode`
    ///
    /// Queries first and only prompts when the grant is not already there.
    /// A denied prompt is `Ok(false)`.
    pub async fn verify<H: HostHandle>(
        handle: &H,
        mode: PermissionMode,
    ) -> Result<bool, PermissionError> {
        if handle.query_permission(mode).await?.is_granted() {
            return Ok(true);
        }

        let state = handle.request_permission(mode).await?;
        debug!(name = handle.name(), %mode, ?state, "permission requested");
        Ok(state.is_granted())
    }
}
