use std::time::Duration;

use chrono::{DateTime, Utc};
use helion_model::{Event, File, Status};
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::{debug, instrument};

use super::names::TableNames;
use crate::error::{CatalogError, Result};

/// Durable, transactional store for the `files`/`events` tables.
///
/// Table/schema names are resolved once at construction via [`TableNames`];
/// every query below interpolates the already-validated qualified name and
/// binds all actual data through parameters.
#[derive(Clone)]
pub struct Catalog {
    pool: PgPool,
    names: TableNames,
}

impl Catalog {
    pub fn new(pool: PgPool, names: TableNames) -> Self {
        Self { pool, names }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Opens one logical transaction. Callers commit or roll it back
    /// explicitly; dropping it without either rolls back (sqlx's default).
    pub async fn begin(&self) -> Result<CatalogTransaction<'_>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(CatalogError::classify)?;
        Ok(CatalogTransaction {
            tx,
            names: self.names.clone(),
        })
    }

    /// Scan for files with zero events — the (I1) repair query that backs
    /// the Ingester's "fetch new" step.
    #[instrument(skip(self))]
    pub async fn files_without_events(&self) -> Result<Vec<i64>> {
        let sql = format!(
            "SELECT f.id FROM {files} f \
             LEFT JOIN {events} e ON e.files_id = f.id \
             WHERE e.files_id IS NULL",
            files = self.names.files.qualified(),
            events = self.names.events.qualified(),
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(CatalogError::classify)?;
        Ok(rows.into_iter().map(|r| r.get::<i64, _>("id")).collect())
    }

    /// Whether a file with this checksum or this filename is already
    /// cataloged — the check the Finder makes before choosing between its
    /// standard and alternative (duplicate) action (I2).
    #[instrument(skip(self))]
    pub async fn is_duplicate(&self, checksum: &str, filename: &str) -> Result<bool> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {files} WHERE checksum = $1 OR filename = $2)",
            files = self.names.files.qualified(),
        );
        let row = sqlx::query(&sql)
            .bind(checksum)
            .bind(filename)
            .fetch_one(&self.pool)
            .await
            .map_err(CatalogError::classify)?;
        Ok(row.get::<bool, _>(0))
    }

    /// The (I3) projection: files whose event with the greatest `start_time`
    /// has the given status, limited to `limit` rows. Ordering among the
    /// returned files beyond the limit is unspecified.
    #[instrument(skip(self))]
    pub async fn files_with_latest_status(
        &self,
        status: Status,
        limit: i64,
    ) -> Result<Vec<File>> {
        let sql = format!(
            "SELECT f.id, f.relpath, f.filename, f.checksum, f.size_bytes, f.added_on \
             FROM {files} f \
             JOIN ( \
                 SELECT files_id, MAX(start_time) AS start_time FROM {events} GROUP BY files_id \
             ) latest ON latest.files_id = f.id \
             JOIN {events} e ON e.files_id = latest.files_id AND e.start_time = latest.start_time \
             WHERE e.status = $1 \
             LIMIT $2",
            files = self.names.files.qualified(),
            events = self.names.events.qualified(),
        );
        let rows = sqlx::query(&sql)
            .bind(status)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(CatalogError::classify)?;

        Ok(rows
            .into_iter()
            .map(|row| File {
                id: row.get("id"),
                relpath: row.get("relpath"),
                filename: row.get("filename"),
                checksum: row.get("checksum"),
                size_bytes: row.get("size_bytes"),
                added_on: row.get("added_on"),
            })
            .collect())
    }
}

/// One Finder iteration's or one Ingester batch phase's worth of writes.
pub struct CatalogTransaction<'c> {
    tx: Transaction<'c, Postgres>,
    names: TableNames,
}

impl<'c> CatalogTransaction<'c> {
    /// Transactional counterpart of [`Catalog::files_without_events`], used
    /// by the Ingester's fetch-new step so the scan and the `UNTRIED`
    /// inserts it triggers commit or roll back together.
    pub async fn files_without_events(&mut self) -> Result<Vec<i64>> {
        let sql = format!(
            "SELECT f.id FROM {files} f \
             LEFT JOIN {events} e ON e.files_id = f.id \
             WHERE e.files_id IS NULL",
            files = self.names.files.qualified(),
            events = self.names.events.qualified(),
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(CatalogError::classify)?;
        Ok(rows.into_iter().map(|r| r.get::<i64, _>("id")).collect())
    }

    /// Transactional counterpart of [`Catalog::files_with_latest_status`],
    /// used by the Ingester's grab-batch step so the selection and the
    /// `PENDING` markers it writes are part of the same commit/rollback
    /// unit.
    pub async fn files_with_latest_status(
        &mut self,
        status: Status,
        limit: i64,
    ) -> Result<Vec<File>> {
        let sql = format!(
            "SELECT f.id, f.relpath, f.filename, f.checksum, f.size_bytes, f.added_on \
             FROM {files} f \
             JOIN ( \
                 SELECT files_id, MAX(start_time) AS start_time FROM {events} GROUP BY files_id \
             ) latest ON latest.files_id = f.id \
             JOIN {events} e ON e.files_id = latest.files_id AND e.start_time = latest.start_time \
             WHERE e.status = $1 \
             LIMIT $2",
            files = self.names.files.qualified(),
            events = self.names.events.qualified(),
        );
        let rows = sqlx::query(&sql)
            .bind(status)
            .bind(limit)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(CatalogError::classify)?;

        Ok(rows
            .into_iter()
            .map(|row| File {
                id: row.get("id"),
                relpath: row.get("relpath"),
                filename: row.get("filename"),
                checksum: row.get("checksum"),
                size_bytes: row.get("size_bytes"),
                added_on: row.get("added_on"),
            })
            .collect())
    }

    /// Inserts a new file row. Fails with [`CatalogError::DuplicateFile`] if
    /// `filename` or `checksum` collides with an existing row (I2).
    pub async fn insert_file(
        &mut self,
        relpath: &str,
        filename: &str,
        checksum: &str,
        size_bytes: i64,
    ) -> Result<i64> {
        let sql = format!(
            "INSERT INTO {files} (relpath, filename, checksum, size_bytes, added_on) \
             VALUES ($1, $2, $3, $4, NOW()) RETURNING id",
            files = self.names.files.qualified(),
        );
        let row = sqlx::query(&sql)
            .bind(relpath)
            .bind(filename)
            .bind(checksum)
            .bind(size_bytes)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(CatalogError::classify)?;
        Ok(row.get("id"))
    }

    /// Appends one event. `(files_id, start_time)` must be unique; events are
    /// never updated in place (P3).
    pub async fn insert_event(
        &mut self,
        files_id: i64,
        status: Status,
        start_time: DateTime<Utc>,
        duration: Duration,
        ingest_ver: Option<&str>,
        err_message: Option<&str>,
    ) -> Result<()> {
        let sql = format!(
            "INSERT INTO {events} (files_id, start_time, status, duration, ingest_ver, err_message) \
             VALUES ($1, $2, $3, $4, $5, $6)",
            events = self.names.events.qualified(),
        );
        sqlx::query(&sql)
            .bind(files_id)
            .bind(start_time)
            .bind(status)
            .bind(duration.as_secs_f64())
            .bind(ingest_ver)
            .bind(err_message)
            .execute(&mut *self.tx)
            .await
            .map_err(CatalogError::classify)?;
        Ok(())
    }

    pub async fn insert_event_record(&mut self, event: &Event) -> Result<()> {
        self.insert_event(
            event.files_id,
            event.status,
            event.start_time,
            event.duration,
            event.ingest_ver.as_deref(),
            event.err_message.as_deref(),
        )
        .await
    }

    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await.map_err(CatalogError::classify)?;
        debug!("catalog transaction committed");
        Ok(())
    }

    pub async fn rollback(self) -> Result<()> {
        self.tx.rollback().await.map_err(CatalogError::classify)?;
        Ok(())
    }
}
