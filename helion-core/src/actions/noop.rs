use std::path::{Path, PathBuf};

use super::Action;
use crate::error::ActionError;

/// Leaves the file exactly where it was discovered.
#[derive(Debug, Default)]
pub struct Noop {
    current: Option<PathBuf>,
}

impl Action for Noop {
    fn execute(&mut self, path: &Path) -> Result<PathBuf, ActionError> {
        self.current = Some(path.to_path_buf());
        Ok(path.to_path_buf())
    }

    fn current_path(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    fn undo(&mut self) -> Result<(), ActionError> {
        Ok(())
    }
}
