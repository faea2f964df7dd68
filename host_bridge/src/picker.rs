//! Folder picker seam

use async_trait::async_trait;
use host_fs::DirectoryHandle;
use std::cell::RefCell;

use crate::PickerError;

/// Asks the user for a host directory
#[async_trait(?Send)]
pub trait FolderPicker<D: DirectoryHandle> {
    /// The chosen directory, or `None` when the user dismissed the picker
    async fn pick(&self) -> Result<Option<D>, PickerError>;
}

/// Picker that hands out a directory chosen ahead of time, once
#[derive(Debug)]
pub struct PresetPicker<D> {
    choice: RefCell<Option<D>>,
}

impl<D> PresetPicker<D> {
    /// Picks `dir` on the next call
    pub fn new(dir: D) -> Self {
        Self {
            choice: RefCell::new(Some(dir)),
        }
    }

    /// Behaves like a dismissed picker
    pub fn dismissed() -> Self {
        Self {
            choice: RefCell::new(None),
        }
    }
}

#[async_trait(?Send)]
impl<D: DirectoryHandle> FolderPicker<D> for PresetPicker<D> {
    async fn pick(&self) -> Result<Option<D>, PickerError> {
        Ok(self.choice.borrow_mut().take())
    }
}
