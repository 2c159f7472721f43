use std::path::{Path, PathBuf};

use super::Action;
use crate::error::ActionError;

/// `EXDEV`: rename(2) across filesystems. `fs::rename` surfaces this as a
/// plain `io::Error`; there is no portable `ErrorKind` for it yet.
const EXDEV: i32 = 18;

/// Relocates a file from under `src` into the same relative position under
/// `dst`, preserving the subpath below `src`. Reversible: `undo` moves the
/// file back and removes any directories `execute` had to create.
#[derive(Debug, Clone)]
pub struct Move {
    src: PathBuf,
    dst: PathBuf,
    original: Option<PathBuf>,
    current: Option<PathBuf>,
    created_dirs: Vec<PathBuf>,
}

impl Move {
    pub fn new(src: impl Into<PathBuf>, dst: impl Into<PathBuf>) -> Self {
        Self {
            src: src.into(),
            dst: dst.into(),
            original: None,
            current: None,
            created_dirs: Vec::new(),
        }
    }
}

impl Action for Move {
    fn execute(&mut self, path: &Path) -> Result<PathBuf, ActionError> {
        let parent = path.parent().unwrap_or(path);
        let subdir = parent
            .strip_prefix(&self.src)
            .map_err(|_| ActionError::NotUnderSource(path.to_path_buf()))?;
        let filename = path
            .file_name()
            .ok_or_else(|| ActionError::NotUnderSource(path.to_path_buf()))?;

        let target_dir = self.dst.join(subdir);
        let created = ensure_dir_recording_created(&target_dir)?;
        let target = target_dir.join(filename);

        rename_or_copy(path, &target)?;

        self.original = Some(path.to_path_buf());
        self.current = Some(target.clone());
        self.created_dirs = created;
        Ok(target)
    }

    fn current_path(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    fn undo(&mut self) -> Result<(), ActionError> {
        let current = self.current.take().ok_or(ActionError::NotReversible)?;
        let original = self.original.take().ok_or(ActionError::NotReversible)?;

        rename_or_copy(&current, &original)?;

        for dir in self.created_dirs.drain(..).rev() {
            // Ignore failures: a non-empty directory (e.g. a sibling file
            // landed there between execute and undo) is left in place.
            let _ = std::fs::remove_dir(&dir);
        }
        Ok(())
    }
}

fn ensure_dir_recording_created(dir: &Path) -> Result<Vec<PathBuf>, ActionError> {
    if dir.exists() {
        return Ok(Vec::new());
    }
    let mut missing = Vec::new();
    let mut cursor = dir;
    loop {
        if cursor.exists() {
            break;
        }
        missing.push(cursor.to_path_buf());
        match cursor.parent() {
            Some(parent) => cursor = parent,
            None => break,
        }
    }
    missing.reverse();
    for d in &missing {
        std::fs::create_dir(d)?;
    }
    Ok(missing)
}

fn rename_or_copy(from: &Path, to: &Path) -> Result<(), ActionError> {
    match std::fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(err) if err.raw_os_error() == Some(EXDEV) => {
            std::fs::copy(from, to)?;
            std::fs::remove_file(from)?;
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn moves_preserving_subpath_below_source() {
        let root = tempdir().unwrap();
        let src = root.path().join("source");
        let dst = root.path().join("storage");
        std::fs::create_dir_all(src.join("a/b")).unwrap();
        let file = src.join("a/b/x.fits");
        std::fs::write(&file, b"data").unwrap();

        let mut action = Move::new(&src, &dst);
        let new_path = action.execute(&file).unwrap();

        assert_eq!(new_path, dst.join("a/b/x.fits"));
        assert!(new_path.exists());
        assert!(!file.exists());
    }

    #[test]
    fn undo_is_the_identity_and_removes_created_directories() {
        let root = tempdir().unwrap();
        let src = root.path().join("source");
        let dst = root.path().join("storage");
        std::fs::create_dir_all(src.join("a/b")).unwrap();
        let file = src.join("a/b/x.fits");
        std::fs::write(&file, b"data").unwrap();

        let mut action = Move::new(&src, &dst);
        action.execute(&file).unwrap();
        action.undo().unwrap();

        assert!(file.exists());
        assert!(!dst.join("a").exists(), "empty directories created during execute should be removed");
    }

    #[test]
    fn rejects_paths_outside_source() {
        let root = tempdir().unwrap();
        let src = root.path().join("source");
        let dst = root.path().join("storage");
        std::fs::create_dir_all(&src).unwrap();
        let outside = root.path().join("elsewhere/x.fits");
        std::fs::create_dir_all(outside.parent().unwrap()).unwrap();
        std::fs::write(&outside, b"data").unwrap();

        let mut action = Move::new(&src, &dst);
        let err = action.execute(&outside).unwrap_err();
        assert!(matches!(err, ActionError::NotUnderSource(_)));
    }
}
