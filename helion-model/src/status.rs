use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Closed set of dispositions a [`crate::event::Event`] can record for a file.
///
/// The wire representation is the exact uppercase string below; this is the
/// representation stored in the `events.status` column and accepted in
/// configuration (`file_status`, etc).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub enum Status {
    /// Never handed to the ingest plugin.
    Untried,
    /// Selected into a batch; dispatch has begun.
    Pending,
    /// Ingest plugin reported success.
    Success,
    /// Ingest plugin reported a failure.
    Failure,
    /// Pre-screened out by the include/exclude lists.
    Ignored,
    /// Pre-screened out because the file is missing or empty.
    Invalid,
    /// No reply arrived for this file by the end of a batch.
    Unknown,
    /// Seeded by the backfill tool from a pre-existing storage area.
    Backfill,
    /// Operator-requested reprocessing of a file in a terminal state.
    Rerun,
}

impl Status {
    pub const ALL: [Status; 9] = [
        Status::Untried,
        Status::Pending,
        Status::Success,
        Status::Failure,
        Status::Ignored,
        Status::Invalid,
        Status::Unknown,
        Status::Backfill,
        Status::Rerun,
    ];

    /// `true` for statuses that represent a finished attempt (no further
    /// action is expected from the Ingester on its own).
    pub fn is_terminal(self) -> bool {
        !matches!(self, Status::Untried | Status::Pending)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Untried => "UNTRIED",
            Status::Pending => "PENDING",
            Status::Success => "SUCCESS",
            Status::Failure => "FAILURE",
            Status::Ignored => "IGNORED",
            Status::Invalid => "INVALID",
            Status::Unknown => "UNKNOWN",
            Status::Backfill => "BACKFILL",
            Status::Rerun => "RERUN",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UNTRIED" => Ok(Status::Untried),
            "PENDING" => Ok(Status::Pending),
            "SUCCESS" => Ok(Status::Success),
            "FAILURE" => Ok(Status::Failure),
            "IGNORED" => Ok(Status::Ignored),
            "INVALID" => Ok(Status::Invalid),
            "UNKNOWN" => Ok(Status::Unknown),
            "BACKFILL" => Ok(Status::Backfill),
            "RERUN" => Ok(Status::Rerun),
            other => Err(ModelError::InvalidStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for Status {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Status> for String {
    fn from(value: Status) -> Self {
        value.as_str().to_string()
    }
}

#[cfg(feature = "sqlx")]
impl sqlx::Type<sqlx::Postgres> for Status {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <str as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

#[cfg(feature = "sqlx")]
impl<'q> sqlx::Encode<'q, sqlx::Postgres> for Status {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <&str as sqlx::Encode<'q, sqlx::Postgres>>::encode(self.as_str(), buf)
    }
}

#[cfg(feature = "sqlx")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Status {
    fn decode(
        value: sqlx::postgres::PgValueRef<'r>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let raw = <&str as sqlx::Decode<'r, sqlx::Postgres>>::decode(value)?;
        Ok(raw.parse()?)
    }
}
