use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use blake2::{Blake2b512, Digest};
use tracing::{debug, info, warn};

use crate::actions::{Action, ActionKind, Delete, Move, Noop};
use crate::catalog::Catalog;
use crate::discovery::Discovery;
use crate::error::Result;
use crate::shutdown::ShutdownFlag;

/// Constructs a fresh boxed [`Action`] for the given kind, source and storage
/// roots. A fixed, tagged set rather than name-based class lookup.
fn build_action(kind: ActionKind, source: &Path, storage: &Path) -> Box<dyn Action> {
    match kind {
        ActionKind::Noop => Box::new(Noop::default()),
        ActionKind::Move => Box::new(Move::new(source, storage)),
        ActionKind::Delete => Box::new(Delete::default()),
    }
}

/// Configuration the Finder needs beyond the discovery strategy itself.
#[derive(Debug, Clone)]
pub struct FinderConfig {
    pub source: PathBuf,
    pub storage: PathBuf,
    pub standard: ActionKind,
    pub alternative: ActionKind,
    pub pause: Duration,
}

/// Outcome of processing a single candidate path, returned for logging and
/// testing purposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindOutcome {
    /// A new file was hashed, relocated, and cataloged.
    Committed { files_id: i64 },
    /// A duplicate was detected; the alternative action ran, nothing was
    /// inserted.
    Duplicate,
    /// The path disappeared, failed to hash, or its action failed; no
    /// catalog change was made.
    Skipped,
}

/// Single-threaded discover → hash → dedup → relocate → catalog loop (§4.4).
pub struct Finder<D> {
    discovery: D,
    catalog: Catalog,
    config: FinderConfig,
}

impl<D: Discovery> Finder<D> {
    pub fn new(discovery: D, catalog: Catalog, config: FinderConfig) -> Self {
        Self {
            discovery,
            catalog,
            config,
        }
    }

    /// Runs ticks until `shutdown` is requested, sleeping `config.pause`
    /// between them. The flag is only consulted at the sleep boundary: a
    /// tick already in progress always finishes its current path (§5).
    pub async fn run(&self, shutdown: &ShutdownFlag) -> Result<()> {
        loop {
            self.tick().await?;
            if shutdown.is_set() {
                return Ok(());
            }
            tokio::time::sleep(self.config.pause).await;
            if shutdown.is_set() {
                return Ok(());
            }
        }
    }

    /// Runs one tick: drains the discovery strategy's lazy sequence,
    /// processing each candidate in turn. Does not sleep; callers loop and
    /// sleep `config.pause` between calls (§4.4 step 7).
    pub async fn tick(&self) -> Result<Vec<FindOutcome>> {
        let mut outcomes = Vec::new();
        for candidate in self.discovery.discover() {
            let candidate = match candidate {
                Ok(c) => c,
                Err(err) => {
                    warn!(error = %err, "discovery strategy reported an error, skipping");
                    outcomes.push(FindOutcome::Skipped);
                    continue;
                }
            };
            let outcome = self.process_one(&candidate.relpath).await;
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// Processes one discovered relative path through steps 2-6 of §4.4.
    async fn process_one(&self, relpath: &Path) -> FindOutcome {
        let abspath = self.config.source.join(relpath);

        let (checksum, size_bytes) = match hash_and_stat(&abspath) {
            Ok(pair) => pair,
            Err(err) => {
                warn!(path = %abspath.display(), error = %err, "file vanished or could not be read, skipping");
                return FindOutcome::Skipped;
            }
        };

        let filename = match abspath.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => {
                warn!(path = %abspath.display(), "path has no utf-8 filename, skipping");
                return FindOutcome::Skipped;
            }
        };

        let duplicate = match self.catalog.is_duplicate(&checksum, &filename).await {
            Ok(dup) => dup,
            Err(err) => {
                warn!(path = %abspath.display(), error = %err, "duplicate check failed, skipping");
                return FindOutcome::Skipped;
            }
        };

        let kind = if duplicate {
            self.config.alternative
        } else {
            self.config.standard
        };
        let mut action = build_action(kind, &self.config.source, &self.config.storage);

        let new_path = match action.execute(&abspath) {
            Ok(p) => p,
            Err(err) => {
                warn!(path = %abspath.display(), error = %err, "relocation action failed, skipping");
                return FindOutcome::Skipped;
            }
        };

        if duplicate {
            debug!(path = %abspath.display(), "duplicate handled by alternative action");
            return FindOutcome::Duplicate;
        }

        let relpath_parent = relpath
            .parent()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();

        let mut tx = match self.catalog.begin().await {
            Ok(tx) => tx,
            Err(err) => {
                warn!(error = %err, "could not open catalog transaction, undoing action");
                undo_action(action.as_mut(), &new_path);
                return FindOutcome::Skipped;
            }
        };

        let insert_result = tx
            .insert_file(&relpath_parent, &filename, &checksum, size_bytes)
            .await;

        let files_id = match insert_result {
            Ok(id) => id,
            Err(err) => {
                warn!(error = %err, "insert failed, rolling back and undoing action");
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "rollback itself failed");
                }
                undo_action(action.as_mut(), &new_path);
                return FindOutcome::Skipped;
            }
        };

        match tx.commit().await {
            Ok(()) => {
                info!(files_id, path = %new_path.display(), "file cataloged");
                FindOutcome::Committed { files_id }
            }
            Err(err) => {
                warn!(error = %err, "commit failed, undoing action");
                undo_action(action.as_mut(), &new_path);
                FindOutcome::Skipped
            }
        }
    }
}

/// Best-effort undo after a failed commit. An undo failure is logged; the
/// file is then left in its moved location and the next tick will see it as
/// a duplicate by checksum, converging via the alternative action.
fn undo_action(action: &mut dyn Action, new_path: &Path) {
    if let Err(err) = action.undo() {
        tracing::error!(
            path = %new_path.display(),
            error = %err,
            "undo failed after a failed commit; file is stranded and will be reconciled as a duplicate"
        );
    }
}

fn hash_and_stat(path: &Path) -> std::io::Result<(String, i64)> {
    let metadata = fs::metadata(path)?;
    let size_bytes = metadata.len() as i64;

    let mut file = fs::File::open(path)?;
    let mut hasher = Blake2b512::new();
    std::io::copy(&mut file, &mut hasher)?;
    let digest = hasher.finalize();
    Ok((hex::encode(digest), size_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_and_stats_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.fits");
        std::fs::write(&path, b"hello world").unwrap();

        let (checksum, size) = hash_and_stat(&path).unwrap();
        assert_eq!(size, 11);
        assert_eq!(checksum.len(), 128); // BLAKE2b-512 hex digest
    }

    #[test]
    fn hash_and_stat_fails_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.fits");
        assert!(hash_and_stat(&path).is_err());
    }
}
