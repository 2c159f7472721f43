//! Configuration loading, schema validation, and the typed settings the
//! `helion-finder`/`helion-ingester` binaries build their loops from.
//!
//! This crate owns everything SPEC_FULL.md calls the "ambient stack" for
//! configuration: TOML parsing ([`loader`]), environment overrides, and
//! fail-fast startup validation ([`validate`]) against the schema in §6/§7.
//! `helion-core` stays free of any notion of a config file format.

pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::ConfigError;
pub use loader::load;
pub use model::RawConfig;
pub use validate::{validate, DiscoveryKind, FinderSettings, IngesterSettings, ValidatedConfig};

use std::path::Path;

/// Loads, parses, and validates the configuration document at `path` in one
/// call — the entry point both binaries use before touching the database or
/// the filesystem areas it describes.
pub fn load_and_validate(path: &Path) -> Result<ValidatedConfig, ConfigError> {
    let raw = loader::load(path)?;
    validate::validate(raw)
}
