#[cfg(feature = "chrono")]
use chrono::{DateTime, Utc};

/// A row in the `files` table: exactly one physical artifact under the
/// storage root.
///
/// `filename` and `checksum` are each globally unique (I2); `relpath` is the
/// directory component below the storage root, so the file's canonical
/// on-disk location is `storage/{relpath}/{filename}`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct File {
    pub id: i64,
    pub relpath: String,
    pub filename: String,
    pub checksum: String,
    pub size_bytes: i64,
    #[cfg(feature = "chrono")]
    pub added_on: DateTime<Utc>,
}

impl File {
    /// Path of this file relative to the storage root, e.g. `a/b/x.fits`.
    pub fn storage_relative_path(&self) -> String {
        if self.relpath.is_empty() {
            self.filename.clone()
        } else {
            format!("{}/{}", self.relpath.trim_end_matches('/'), self.filename)
        }
    }
}
