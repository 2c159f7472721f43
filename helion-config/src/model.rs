//! Raw, `serde`-deserializable shape of the TOML configuration document.
//!
//! These structs mirror the configuration surface in SPEC_FULL.md §6
//! directly; they carry no behavior of their own; [`crate::validate`] turns
//! them into the typed settings the Finder/Ingester binaries actually run
//! with, rejecting anything a [`RawConfig`] can represent but the core
//! cannot act on (an unknown action name, `file_status = "SUCCESS"`, ...).

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct RawConfig {
    pub database: RawDatabase,
    #[serde(default)]
    pub log: RawLog,
    pub finder: Option<RawFinder>,
    pub ingester: Option<RawIngester>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawDatabase {
    pub url: Option<String>,
    #[serde(default)]
    pub tablenames: RawTableNames,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTableNames {
    #[serde(default)]
    pub file: RawTableName,
    #[serde(default)]
    pub event: RawTableName,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTableName {
    pub schema: Option<String>,
    pub table: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLog {
    pub filter: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawFinder {
    pub source: PathBuf,
    pub storage: PathBuf,
    #[serde(default)]
    pub actions: RawActions,
    #[serde(default)]
    pub search: RawSearch,
    #[serde(default = "default_pause_secs")]
    pub pause_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawActions {
    #[serde(default = "default_standard_action")]
    pub standard: String,
    #[serde(default = "default_alternative_action")]
    pub alternative: String,
}

impl Default for RawActions {
    fn default() -> Self {
        Self {
            standard: default_standard_action(),
            alternative: default_alternative_action(),
        }
    }
}

fn default_standard_action() -> String {
    "Move".to_string()
}

fn default_alternative_action() -> String {
    "Delete".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSearch {
    #[serde(default = "default_search_method")]
    pub method: String,
    #[serde(default)]
    pub exclude_list: Vec<String>,
    /// `YYYY-MM-DD`; defaults to the current date if omitted.
    pub date: Option<String>,
    #[serde(default)]
    pub past_days: u64,
    #[serde(default)]
    pub future_days: u64,
    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,
}

impl Default for RawSearch {
    fn default() -> Self {
        Self {
            method: default_search_method(),
            exclude_list: Vec::new(),
            date: None,
            past_days: 0,
            future_days: 0,
            delay_secs: default_delay_secs(),
        }
    }
}

fn default_search_method() -> String {
    "scan".to_string()
}

fn default_delay_secs() -> u64 {
    60
}

fn default_pause_secs() -> u64 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawIngester {
    pub storage: PathBuf,
    pub plugin: RawPlugin,
    #[serde(default)]
    pub include_list: Vec<String>,
    #[serde(default)]
    pub exclude_list: Vec<String>,
    #[serde(default = "default_file_status")]
    pub file_status: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: i64,
    #[serde(default = "default_num_threads")]
    pub num_threads: usize,
    #[serde(default = "default_ingester_pause_secs")]
    pub pause_secs: u64,
    #[serde(default = "default_daemon")]
    pub daemon: bool,
}

fn default_file_status() -> String {
    "UNTRIED".to_string()
}

fn default_batch_size() -> i64 {
    50
}

fn default_num_threads() -> usize {
    4
}

fn default_ingester_pause_secs() -> u64 {
    5
}

fn default_daemon() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPlugin {
    pub name: String,
    #[serde(default)]
    pub config: BTreeMap<String, toml::Value>,
}
