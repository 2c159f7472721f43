use std::path::PathBuf;

use walkdir::WalkDir;

use super::{Candidate, Discovery, ExcludeList};

/// Depth-first traversal of a directory tree, yielding each regular file's
/// path relative to `root`. Symlinks are not followed, so a self-referential
/// link cannot turn the walk into an infinite loop.
#[derive(Debug, Clone)]
pub struct WalkStrategy {
    root: PathBuf,
    exclude: ExcludeList,
}

impl WalkStrategy {
    pub fn new(root: impl Into<PathBuf>, exclude: ExcludeList) -> Self {
        Self {
            root: root.into(),
            exclude,
        }
    }
}

impl Discovery for WalkStrategy {
    fn discover(&self) -> Box<dyn Iterator<Item = std::io::Result<Candidate>> + '_> {
        let root = self.root.clone();
        let iter = WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_map(move |entry| match entry {
                Ok(entry) if !entry.file_type().is_file() => None,
                Ok(entry) => {
                    let relpath = match entry.path().strip_prefix(&root) {
                        Ok(p) => p.to_path_buf(),
                        Err(_) => entry.path().to_path_buf(),
                    };
                    if self.exclude.matches(&relpath.to_string_lossy()) {
                        None
                    } else {
                        Some(Ok(Candidate { relpath }))
                    }
                }
                Err(err) => Some(Err(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    err,
                ))),
            });
        Box::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn yields_nested_files_relative_to_root() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        fs::write(dir.path().join("a/b/x.fits"), b"data").unwrap();

        let strategy = WalkStrategy::new(dir.path(), ExcludeList::default());
        let found: Vec<_> = strategy
            .discover()
            .map(|r| r.unwrap().relpath)
            .collect();

        assert_eq!(found, vec![PathBuf::from("a/b/x.fits")]);
    }

    #[test]
    fn suppresses_paths_matching_exclude_patterns() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a")).unwrap();
        fs::write(dir.path().join("a/keep.fits"), b"data").unwrap();
        fs::write(dir.path().join("a/skip.tmp"), b"data").unwrap();

        let exclude = ExcludeList::compile(&[r"\.tmp$".to_string()]).unwrap();
        let strategy = WalkStrategy::new(dir.path(), exclude);
        let found: Vec<_> = strategy
            .discover()
            .map(|r| r.unwrap().relpath.to_string_lossy().to_string())
            .collect();

        assert_eq!(found, vec!["a/keep.fits".to_string()]);
    }

    #[test]
    fn restarts_fresh_on_each_call() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("x.fits"), b"data").unwrap();
        let strategy = WalkStrategy::new(dir.path(), ExcludeList::default());

        let first: Vec<_> = strategy.discover().collect();
        let second: Vec<_> = strategy.discover().collect();
        assert_eq!(first.len(), second.len());
    }
}
