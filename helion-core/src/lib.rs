//! Core Finder/Ingester pipeline for the Helion file intake system: the
//! catalog store, discovery strategies, relocation actions, the ingest
//! plugin contract, and the Finder and Ingester loops built on top of them.
//!
//! Configuration loading, CLI wiring, and logging setup live in
//! `helion-config` and the top-level binary; this crate only exposes the
//! mechanisms they drive.

pub mod actions;
pub mod catalog;
pub mod discovery;
pub mod error;
pub mod finder;
pub mod ingester;
pub mod plugin;
pub mod shutdown;

pub use error::{ActionError, CatalogError, CoreError, Result};
pub use shutdown::ShutdownFlag;
