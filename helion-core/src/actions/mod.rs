//! Relocation actions: pluggable, per-file filesystem operations the Finder
//! applies to a discovered candidate. Each is reversible except `Delete`.

mod delete;
mod mv;
mod noop;

pub use delete::Delete;
pub use mv::Move;
pub use noop::Noop;

use std::path::{Path, PathBuf};

use crate::error::ActionError;

/// A relocation action in progress. `execute` performs the filesystem
/// operation and records enough state for a subsequent `undo` to reverse it;
/// `current_path` exposes the file's resulting location.
pub trait Action: Send {
    fn execute(&mut self, path: &Path) -> Result<PathBuf, ActionError>;

    /// The file's location after the last successful `execute`, or `None`
    /// before any call (or after a `Delete`, which has none).
    fn current_path(&self) -> Option<&Path>;

    fn undo(&mut self) -> Result<(), ActionError>;
}

/// The two action variants `§4.3`/`§6` name, selected by configuration key
/// (`actions.standard` / `actions.alternative`). A fixed, tagged set rather
/// than dynamic class lookup, per the design notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Noop,
    Move,
    Delete,
}

impl ActionKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "Noop" => Some(ActionKind::Noop),
            "Move" => Some(ActionKind::Move),
            "Delete" => Some(ActionKind::Delete),
            _ => None,
        }
    }
}
