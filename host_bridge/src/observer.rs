//! Hooks for the tree widget

/// Notified when the bridge reshapes the whole tree
///
/// Every hook defaults to a no-op.
pub trait TreeObserver {
    /// The tree was wiped
    fn tree_cleared(&self) {}

    /// The tree title is now `title`, the attached folder's name
    fn title_changed(&self, _title: &str) {}

    /// A full import finished
    fn tree_loaded(&self) {}

    /// A picked folder is about to replace the session: close open editors
    /// and stop any other remote backend
    fn before_attach(&self) {}
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl TreeObserver for NoopObserver {}
