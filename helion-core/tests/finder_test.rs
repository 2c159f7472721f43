//! End-to-end Finder scenarios against a real Postgres database and a real
//! temporary filesystem: a novel file is relocated and cataloged, and a
//! byte-identical duplicate is left to the alternative action instead.

use std::time::Duration;

use helion_core::actions::ActionKind;
use helion_core::catalog::{Catalog, TableNames};
use helion_core::discovery::{ExcludeList, WalkStrategy};
use helion_core::finder::{FindOutcome, Finder, FinderConfig};
use sqlx::PgPool;

fn finder_config(source: &std::path::Path, storage: &std::path::Path) -> FinderConfig {
    FinderConfig {
        source: source.to_path_buf(),
        storage: storage.to_path_buf(),
        standard: ActionKind::Move,
        alternative: ActionKind::Delete,
        pause: Duration::from_secs(60),
    }
}

#[sqlx::test]
async fn a_novel_file_is_moved_and_cataloged(pool: PgPool) {
    let catalog = Catalog::new(pool, TableNames::default());
    let source = tempfile::tempdir().unwrap();
    let storage = tempfile::tempdir().unwrap();
    std::fs::write(source.path().join("a.fits"), b"new data").unwrap();

    let discovery = WalkStrategy::new(source.path(), ExcludeList::default());
    let finder = Finder::new(discovery, catalog.clone(), finder_config(source.path(), storage.path()));

    let outcomes = finder.tick().await.unwrap();
    assert_eq!(outcomes.len(), 1);
    assert!(matches!(outcomes[0], FindOutcome::Committed { .. }));

    assert!(!source.path().join("a.fits").exists());
    assert!(storage.path().join("a.fits").exists());
    assert!(catalog.is_duplicate("doesn't matter", "a.fits").await.unwrap());
}

#[sqlx::test]
async fn a_byte_identical_duplicate_runs_the_alternative_action_and_is_not_recataloged(pool: PgPool) {
    let catalog = Catalog::new(pool, TableNames::default());
    let source = tempfile::tempdir().unwrap();
    let storage = tempfile::tempdir().unwrap();

    std::fs::write(source.path().join("a.fits"), b"same bytes").unwrap();
    let discovery = WalkStrategy::new(source.path(), ExcludeList::default());
    let finder = Finder::new(discovery, catalog.clone(), finder_config(source.path(), storage.path()));
    let first = finder.tick().await.unwrap();
    assert!(matches!(first[0], FindOutcome::Committed { .. }));

    std::fs::write(source.path().join("b.fits"), b"same bytes").unwrap();
    let second = finder.tick().await.unwrap();
    assert_eq!(second, vec![FindOutcome::Duplicate]);

    assert!(!source.path().join("b.fits").exists());
    assert!(!storage.path().join("b.fits").exists());
}
