//! Session state
//!
//! Two process-wide flags. `busy` is advisory: it is raised for the duration
//! of one structural mutation so callers can disable triggering UI, but it
//! never blocks a second caller.

use std::cell::Cell;
use std::fmt;

/// Where the boot sequence stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// Startup, nothing decided yet
    Cold,
    /// A root handle is being verified or imported
    Attaching,
    /// A host folder is imported
    Attached,
    /// Running without a host folder
    Detached,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionPhase::Cold => write!(f, "cold"),
            SessionPhase::Attaching => write!(f, "attaching"),
            SessionPhase::Attached => write!(f, "attached"),
            SessionPhase::Detached => write!(f, "detached"),
        }
    }
}

/// `loaded` and `busy` flags plus the current phase
#[derive(Debug)]
pub struct SessionState {
    loaded: Cell<bool>,
    busy: Cell<bool>,
    phase: Cell<SessionPhase>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            loaded: Cell::new(false),
            busy: Cell::new(false),
            phase: Cell::new(SessionPhase::Cold),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.get()
    }

    pub fn set_loaded(&self, loaded: bool) {
        self.loaded.set(loaded);
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase.get()
    }

    pub fn set_phase(&self, phase: SessionPhase) {
        self.phase.set(phase);
    }

    /// Raises `busy` until the returned guard is dropped
    pub fn begin_mutation(&self) -> BusyGuard<'_> {
        self.busy.set(true);
        BusyGuard { busy: &self.busy }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Clears `busy` on drop, on every exit path
#[derive(Debug)]
pub struct BusyGuard<'a> {
    busy: &'a Cell<bool>,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.busy.set(false);
    }
}
