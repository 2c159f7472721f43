//! Startup schema validation (§7, §8 P9): turns a [`RawConfig`] into a
//! [`ValidatedConfig`] the binaries can build a [`helion_core::catalog::Catalog`]
//! and the Finder/Ingester loops from, or rejects it with the first
//! offending key path. Never partially validates: either every check below
//! passes and a complete, ready-to-run configuration comes back, or the
//! first failure is returned and nothing is built.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDate;
use helion_core::actions::ActionKind;
use helion_core::catalog::TableNames;
use helion_core::discovery::{ExcludeList, ManifestStrategy, WalkStrategy};
use helion_core::finder::FinderConfig;
use helion_core::ingester::{IngesterConfig, ScreenLists};
use helion_model::Status;

use crate::error::ConfigError;
use crate::model::{RawConfig, RawFinder, RawIngester};

/// Either discovery strategy the Finder binary might construct, selected by
/// `search.method`. Kept as an enum (rather than a trait object the binary
/// stores) so the binary can match on it once and call `Finder::<_>::run`
/// with the concrete type — the core's `Finder<D>` stays generic.
pub enum DiscoveryKind {
    Walk(WalkStrategy),
    Manifest(ManifestStrategy),
}

pub struct FinderSettings {
    pub config: FinderConfig,
    pub discovery: DiscoveryKind,
}

pub struct IngesterSettings {
    pub config: IngesterConfig,
    pub plugin_name: String,
    pub plugin_config: BTreeMap<String, toml::Value>,
}

pub struct ValidatedConfig {
    pub database_url: String,
    pub table_names: TableNames,
    pub log_filter: String,
    pub finder: Option<FinderSettings>,
    pub ingester: Option<IngesterSettings>,
}

const DEFAULT_LOG_FILTER: &str = "helion=info";

/// Runs every check in SPEC_FULL.md §7 against `raw` and assembles a
/// [`ValidatedConfig`], or returns the first violation found. Validation
/// order is deterministic (database, then finder, then ingester) so the
/// same invalid document always reports the same first error.
pub fn validate(raw: RawConfig) -> Result<ValidatedConfig, ConfigError> {
    let database_url = raw
        .database
        .url
        .clone()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ConfigError::invalid("database.url", "is required"))?;

    let table_names = TableNames::new(
        raw.database.tablenames.file.schema.as_deref(),
        raw.database.tablenames.file.table.as_deref().unwrap_or("files"),
        raw.database.tablenames.event.schema.as_deref(),
        raw.database.tablenames.event.table.as_deref().unwrap_or("events"),
    )
    .map_err(|_| ConfigError::invalid("database.tablenames", "contains an invalid identifier"))?;

    let log_filter = raw
        .log
        .filter
        .clone()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let finder = raw.finder.map(validate_finder).transpose()?;
    let ingester = raw.ingester.map(validate_ingester).transpose()?;

    Ok(ValidatedConfig {
        database_url,
        table_names,
        log_filter,
        finder,
        ingester,
    })
}

fn validate_finder(raw: RawFinder) -> Result<FinderSettings, ConfigError> {
    if !raw.source.is_dir() {
        return Err(ConfigError::invalid(
            "finder.source",
            format!("{} does not exist or is not a directory", raw.source.display()),
        ));
    }
    if !raw.storage.is_dir() {
        return Err(ConfigError::invalid(
            "finder.storage",
            format!("{} does not exist or is not a directory", raw.storage.display()),
        ));
    }

    let standard = parse_action(&raw.actions.standard, "finder.actions.standard")?;
    let alternative = parse_action(&raw.actions.alternative, "finder.actions.alternative")?;

    let exclude = ExcludeList::compile(&raw.search.exclude_list)
        .map_err(|err| ConfigError::invalid("finder.search.exclude_list", err.to_string()))?;

    let discovery = match raw.search.method.as_str() {
        "scan" => DiscoveryKind::Walk(WalkStrategy::new(raw.source.clone(), exclude)),
        "parse_rsync_logs" => {
            let date = match &raw.search.date {
                Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
                    ConfigError::invalid("finder.search.date", format!("{s:?} is not YYYY-MM-DD"))
                })?,
                None => chrono::Utc::now().date_naive(),
            };
            DiscoveryKind::Manifest(ManifestStrategy::new(
                raw.source.clone(),
                exclude,
                date,
                raw.search.past_days,
                raw.search.future_days,
                Duration::from_secs(raw.search.delay_secs),
            ))
        }
        other => {
            return Err(ConfigError::invalid(
                "finder.search.method",
                format!("{other:?} is not one of \"scan\", \"parse_rsync_logs\""),
            ));
        }
    };

    Ok(FinderSettings {
        config: FinderConfig {
            source: raw.source,
            storage: raw.storage,
            standard,
            alternative,
            pause: Duration::from_secs(raw.pause_secs),
        },
        discovery,
    })
}

fn validate_ingester(raw: RawIngester) -> Result<IngesterSettings, ConfigError> {
    if raw.plugin.name.trim().is_empty() {
        return Err(ConfigError::invalid("ingester.plugin.name", "is required"));
    }

    let file_status = Status::from_str(&raw.file_status).map_err(|_| {
        ConfigError::invalid(
            "ingester.file_status",
            format!("{:?} is not a recognized status", raw.file_status),
        )
    })?;
    if file_status == Status::Success {
        return Err(ConfigError::invalid(
            "ingester.file_status",
            "may not be SUCCESS",
        ));
    }

    if raw.batch_size <= 0 {
        return Err(ConfigError::invalid("ingester.batch_size", "must be positive"));
    }

    let screen = ScreenLists::compile(&raw.include_list, &raw.exclude_list).map_err(|err| {
        ConfigError::invalid("ingester.include_list/exclude_list", err.to_string())
    })?;

    let config = IngesterConfig {
        storage: raw.storage,
        screen,
        file_status,
        batch_size: raw.batch_size,
        num_threads: raw.num_threads,
        pause: Duration::from_secs(raw.pause_secs),
        daemon: raw.daemon,
    };

    Ok(IngesterSettings {
        config,
        plugin_name: raw.plugin.name,
        plugin_config: raw.plugin.config,
    })
}

fn parse_action(name: &str, key: &'static str) -> Result<ActionKind, ConfigError> {
    ActionKind::parse(name)
        .ok_or_else(|| ConfigError::invalid(key, format!("{name:?} is not one of \"Noop\", \"Move\", \"Delete\"")))
}
