//! Exercises the catalog directly against a real Postgres database: the
//! uniqueness constraints (I2), the latest-status projection (I3), and
//! transaction atomicity (P8).

use helion_core::catalog::{Catalog, TableNames};
use helion_model::Status;
use sqlx::PgPool;
use std::time::Duration;

#[sqlx::test]
async fn inserting_a_file_with_a_duplicate_checksum_fails(pool: PgPool) {
    let catalog = Catalog::new(pool, TableNames::default());

    let mut tx = catalog.begin().await.unwrap();
    tx.insert_file("a", "one.fits", "abc123", 10).await.unwrap();
    tx.commit().await.unwrap();

    let mut tx = catalog.begin().await.unwrap();
    let err = tx
        .insert_file("b", "two.fits", "abc123", 20)
        .await
        .unwrap_err();
    assert!(matches!(err, helion_core::CatalogError::DuplicateFile));
}

#[sqlx::test]
async fn files_without_events_reports_only_eventless_rows(pool: PgPool) {
    let catalog = Catalog::new(pool, TableNames::default());

    let mut tx = catalog.begin().await.unwrap();
    let with_event = tx.insert_file("a", "one.fits", "aaa", 1).await.unwrap();
    let without_event = tx.insert_file("a", "two.fits", "bbb", 1).await.unwrap();
    tx.insert_event(
        with_event,
        Status::Untried,
        chrono::Utc::now(),
        Duration::ZERO,
        None,
        None,
    )
    .await
    .unwrap();
    tx.commit().await.unwrap();

    let ids = catalog.files_without_events().await.unwrap();
    assert_eq!(ids, vec![without_event]);
}

#[sqlx::test]
async fn latest_status_projection_follows_the_most_recent_event(pool: PgPool) {
    let catalog = Catalog::new(pool, TableNames::default());

    let mut tx = catalog.begin().await.unwrap();
    let id = tx.insert_file("a", "one.fits", "aaa", 1).await.unwrap();
    let t0 = chrono::Utc::now() - chrono::Duration::seconds(10);
    let t1 = chrono::Utc::now();
    tx.insert_event(id, Status::Pending, t0, Duration::ZERO, None, None)
        .await
        .unwrap();
    tx.insert_event(id, Status::Success, t1, Duration::from_secs(1), Some("v1"), None)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let pending = catalog.files_with_latest_status(Status::Pending, 10).await.unwrap();
    assert!(pending.is_empty());

    let success = catalog.files_with_latest_status(Status::Success, 10).await.unwrap();
    assert_eq!(success.len(), 1);
    assert_eq!(success[0].id, id);
}

#[sqlx::test]
async fn a_rolled_back_transaction_leaves_no_trace(pool: PgPool) {
    let catalog = Catalog::new(pool, TableNames::default());

    let mut tx = catalog.begin().await.unwrap();
    tx.insert_file("a", "one.fits", "aaa", 1).await.unwrap();
    tx.rollback().await.unwrap();

    assert!(!catalog.is_duplicate("aaa", "one.fits").await.unwrap());
}
