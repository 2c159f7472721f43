use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};

use helion_model::Status;

/// One file handed to a worker for ingestion. Dataclass-style: plain,
/// immutable, no inheritance (§9).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub id: i64,
    pub filepath: PathBuf,
}

/// One worker's report on a [`Request`], paired back to it by `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub id: i64,
    pub version: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub duration: Duration,
    pub message: Option<String>,
    pub status: Status,
}
