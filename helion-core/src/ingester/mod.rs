//! The Ingester: a periodic coordinator loop that promotes cataloged files
//! through a bounded worker pool running the ingest plugin, and records one
//! event per outcome (§4.5).

mod request;
mod screen;
mod worker;

pub use request::{Reply, Request};
pub use screen::{IgnoreReason, ScreenLists};

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use helion_model::{File, Status};
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::error::{CoreError, Result};
use crate::plugin::PluginFactory;
use crate::shutdown::ShutdownFlag;

/// Configuration the Ingester needs beyond the catalog and plugin factory.
#[derive(Debug, Clone)]
pub struct IngesterConfig {
    /// Prefix used to assemble absolute paths from catalog records.
    pub storage: PathBuf,
    pub screen: ScreenLists,
    /// Status to select for processing. Rejected at construction if `SUCCESS`.
    pub file_status: Status,
    pub batch_size: i64,
    pub num_threads: usize,
    pub pause: Duration,
    pub daemon: bool,
}

/// What one `run_batch` call accomplished, for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// No file had the configured status; caller sleeps (daemon) or stops.
    NoWork,
    Processed {
        selected: usize,
        ignored: usize,
        invalid: usize,
        dispatched: usize,
        unknown: usize,
    },
}

pub struct Ingester {
    catalog: Catalog,
    plugin_factory: Arc<dyn PluginFactory>,
    config: IngesterConfig,
}

impl Ingester {
    pub fn new(catalog: Catalog, plugin_factory: Arc<dyn PluginFactory>, config: IngesterConfig) -> Result<Self> {
        if config.file_status == Status::Success {
            return Err(CoreError::Configuration(
                "file_status may not be SUCCESS".to_string(),
            ));
        }
        Ok(Self {
            catalog,
            plugin_factory,
            config,
        })
    }

    /// Runs batches until `shutdown` is requested, or (one-shot mode) until
    /// a batch finds no work. The flag is only consulted between batches: a
    /// batch in progress always finishes, including its commit (§5).
    pub async fn run(&self, shutdown: &ShutdownFlag) -> Result<()> {
        loop {
            let outcome = self.run_batch().await?;
            if shutdown.is_set() {
                return Ok(());
            }
            match outcome {
                BatchOutcome::NoWork if !self.config.daemon => return Ok(()),
                _ => {}
            }
            tokio::time::sleep(self.config.pause).await;
        }
    }

    /// Runs exactly one coordinator iteration (§4.5 steps 1-6).
    pub async fn run_batch(&self) -> Result<BatchOutcome> {
        if self.config.file_status == Status::Untried {
            self.fetch_new().await?;
        }

        let candidates = self.grab_batch().await?;
        if candidates.is_empty() {
            debug!(status = %self.config.file_status, "no files to process this tick");
            return Ok(BatchOutcome::NoWork);
        }

        let (requests, synthetic) = self.pre_screen(&candidates).await;

        let worker_count = self.config.num_threads.min(requests.len());
        let replies = worker::dispatch(requests.clone(), worker_count, Arc::clone(&self.plugin_factory)).await;

        let dispatched = requests.len();
        let mut replied_ids: HashSet<i64> = HashSet::new();
        let mut events: Vec<(i64, Status, Duration, Option<String>, Option<String>)> = Vec::new();

        for (id, status, message) in synthetic.iter().cloned() {
            events.push((id, status, Duration::ZERO, None, message));
        }

        for reply in &replies {
            replied_ids.insert(reply.id);
            events.push((
                reply.id,
                reply.status,
                reply.duration,
                reply.version.clone(),
                reply.message.clone(),
            ));
        }

        let mut unknown = 0usize;
        for request in &requests {
            if !replied_ids.contains(&request.id) {
                unknown += 1;
                warn!(files_id = request.id, "no reply received for dispatched request, recording UNKNOWN");
                events.push((request.id, Status::Unknown, Duration::ZERO, None, None));
            }
        }

        let ignored = synthetic
            .iter()
            .filter(|(_, s, _)| *s == Status::Ignored)
            .count();
        let invalid = synthetic
            .iter()
            .filter(|(_, s, _)| *s == Status::Invalid)
            .count();

        self.commit_events(events).await?;

        info!(
            selected = candidates.len(),
            ignored,
            invalid,
            dispatched,
            unknown,
            "ingester batch committed"
        );

        Ok(BatchOutcome::Processed {
            selected: candidates.len(),
            ignored,
            invalid,
            dispatched,
            unknown,
        })
    }

    /// Step 1: files with zero events get one synthetic `UNTRIED` event each,
    /// in a single transaction (I1).
    async fn fetch_new(&self) -> Result<()> {
        let mut tx = self.catalog.begin().await?;
        let ids = tx.files_without_events().await?;
        if ids.is_empty() {
            return tx.rollback().await;
        }
        let now = Utc::now();
        for id in ids {
            tx.insert_event(id, Status::Untried, now, Duration::ZERO, None, None)
                .await?;
        }
        tx.commit().await
    }

    /// Step 2: select up to `batch_size` files at the configured status and
    /// mark each `PENDING`, atomically.
    async fn grab_batch(&self) -> Result<Vec<File>> {
        let mut tx = self.catalog.begin().await?;
        let files = tx
            .files_with_latest_status(self.config.file_status, self.config.batch_size)
            .await?;
        if files.is_empty() {
            tx.rollback().await?;
            return Ok(Vec::new());
        }
        let now = Utc::now();
        for file in &files {
            tx.insert_event(file.id, Status::Pending, now, Duration::ZERO, None, None)
                .await?;
        }
        tx.commit().await?;
        Ok(files)
    }

    /// Step 3: classifies every candidate into a dispatchable [`Request`] or
    /// a synthesized outcome (`IGNORED`/`INVALID`), without touching the
    /// catalog.
    async fn pre_screen(&self, candidates: &[File]) -> (Vec<Request>, Vec<(i64, Status, Option<String>)>) {
        let mut requests = Vec::new();
        let mut synthetic = Vec::new();

        for file in candidates {
            let relative = file.storage_relative_path();
            if let Some(reason) = self.config.screen.classify(&relative) {
                synthetic.push((file.id, Status::Ignored, Some(reason.message().to_string())));
                continue;
            }

            let path = self.config.storage.join(&relative);
            match tokio::fs::metadata(&path).await {
                Err(_) => {
                    synthetic.push((
                        file.id,
                        Status::Invalid,
                        Some("no such file in the storage area".to_string()),
                    ));
                }
                Ok(meta) if meta.len() == 0 => {
                    synthetic.push((file.id, Status::Invalid, Some("file has 0 bytes".to_string())));
                }
                Ok(_) => requests.push(Request {
                    id: file.id,
                    filepath: path,
                }),
            }
        }

        (requests, synthetic)
    }

    /// Step 6: commits every event produced by this batch in one
    /// transaction; a failure here discards the whole batch's outcomes (P8).
    async fn commit_events(
        &self,
        events: Vec<(i64, Status, Duration, Option<String>, Option<String>)>,
    ) -> Result<()> {
        let mut tx = self.catalog.begin().await?;
        let now = Utc::now();
        for (files_id, status, duration, ingest_ver, err_message) in events {
            tx.insert_event(
                files_id,
                status,
                now,
                duration,
                ingest_ver.as_deref(),
                err_message.as_deref(),
            )
            .await?;
        }
        tx.commit().await
    }
}
