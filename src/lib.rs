//! Shared glue between the `helion-finder` and `helion-ingester` binaries:
//! logging setup, graceful-shutdown signal wiring, and the fixed plugin
//! registry a deployment selects from via `ingester.plugin.name`.
//!
//! Neither binary's `main` does anything with these beyond calling them
//! once at startup; the actual Finder/Ingester loops live in `helion-core`
//! and know nothing about CLI, config files, or `tracing_subscriber`.

pub mod logging;
pub mod plugins;
pub mod shutdown;
