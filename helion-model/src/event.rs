#[cfg(feature = "chrono")]
use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::status::Status;

/// An append-only row in the `events` table: one observation about a file
/// at a point in time.
///
/// `(files_id, start_time)` is the composite primary key; events are never
/// updated in place (P3). `start_time` uses UTC with microsecond resolution
/// so the "latest event per file" projection (I3) stays well-ordered across
/// process restarts even under clock skew (see DESIGN.md, time representation).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Event {
    pub files_id: i64,
    #[cfg(feature = "chrono")]
    pub start_time: DateTime<Utc>,
    pub status: Status,
    pub duration: Duration,
    pub ingest_ver: Option<String>,
    pub err_message: Option<String>,
}

impl Event {
    /// A zero-duration event with no plugin metadata, as synthesized by the
    /// Ingester's fetch/pre-screen stages (`UNTRIED`, `IGNORED`, `INVALID`,
    /// `UNKNOWN`).
    #[cfg(feature = "chrono")]
    pub fn synthetic(files_id: i64, start_time: DateTime<Utc>, status: Status) -> Self {
        Self {
            files_id,
            start_time,
            status,
            duration: Duration::ZERO,
            ingest_ver: None,
            err_message: None,
        }
    }

    #[cfg(feature = "chrono")]
    pub fn synthetic_with_message(
        files_id: i64,
        start_time: DateTime<Utc>,
        status: Status,
        message: impl Into<String>,
    ) -> Self {
        Self {
            err_message: Some(message.into()),
            ..Self::synthetic(files_id, start_time, status)
        }
    }
}
