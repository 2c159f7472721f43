use std::path::{Path, PathBuf};

use super::Action;
use crate::error::ActionError;

/// Removes the file. Used only as the *alternative* (duplicate) action;
/// not reversible.
#[derive(Debug, Default)]
pub struct Delete {
    removed_from: Option<PathBuf>,
}

impl Action for Delete {
    fn execute(&mut self, path: &Path) -> Result<PathBuf, ActionError> {
        std::fs::remove_file(path)?;
        self.removed_from = Some(path.to_path_buf());
        Ok(path.to_path_buf())
    }

    fn current_path(&self) -> Option<&Path> {
        None
    }

    fn undo(&mut self) -> Result<(), ActionError> {
        Err(ActionError::NotReversible)
    }
}
