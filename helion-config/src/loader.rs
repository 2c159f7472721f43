use std::path::Path;

use crate::error::ConfigError;
use crate::model::RawConfig;

/// Reads and parses a TOML configuration document from `path`, then applies
/// the two environment overrides this codebase's binaries honor:
/// `DATABASE_URL` (overrides `database.url`) and `RUST_LOG` (overrides
/// `log.filter`), mirroring how `ferrex-server` lets CLI/env values win over
/// the file on disk.
///
/// This only parses and overlays; it does not validate (see
/// [`crate::validate`]) — a syntactically valid but semantically wrong
/// document still loads here and is rejected one layer up.
pub fn load(path: &Path) -> Result<RawConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let mut raw: RawConfig = toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;

    if let Ok(url) = std::env::var("DATABASE_URL") {
        if !url.trim().is_empty() {
            raw.database.url = Some(url);
        }
    }
    if let Ok(filter) = std::env::var("RUST_LOG") {
        if !filter.trim().is_empty() {
            raw.log.filter = Some(filter);
        }
    }

    Ok(raw)
}
