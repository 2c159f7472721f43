//! The ingest plugin contract (§4.6): the external operation an Ingester
//! worker invokes once per file. Two concrete shapes exist — a direct
//! "ingest raw" plugin and a two-step pipeline — selected by configuration
//! name rather than by dynamic class lookup.

mod pipeline;
mod raw;

pub use pipeline::PipelinePlugin;
pub use raw::RawPlugin;

use std::path::Path;

/// One worker's handle on the external ingest operation.
///
/// Plugin instances are constructed inside the worker that uses them and
/// never shared across workers: downstream ingest libraries typically hold
/// non-thread-safe handles (database connections, open files).
pub trait IngestPlugin: Send {
    /// Registers the file at `path` with the external system. May block for
    /// seconds to minutes. Any non-success condition is raised as an error.
    fn execute(&mut self, path: &Path) -> anyhow::Result<()>;

    /// Version of the underlying ingest library, constant for the life of
    /// this instance.
    fn version(&self) -> String;
}

/// Builds a fresh, worker-local [`IngestPlugin`]. Implementations are the
/// fixed, tagged set a deployment selects by `plugin.name`; there is no
/// runtime class loading.
pub trait PluginFactory: Send + Sync {
    fn build(&self) -> anyhow::Result<Box<dyn IngestPlugin>>;
}

/// Walks an error's cause chain to its root and returns the first line of
/// its message — the exact text an Ingester worker records on a `FAILURE`
/// reply (§4.5 error taxonomy).
pub fn root_cause_first_line(err: &anyhow::Error) -> String {
    let root: &(dyn std::error::Error + 'static) = err.chain().last().unwrap_or_else(|| err.as_ref());
    root.to_string().lines().next().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn walks_to_the_root_cause_and_takes_the_first_line() {
        let leaf = anyhow::anyhow!("disk full\nretry later");
        let wrapped = leaf.context("writing visit record failed");
        assert_eq!(root_cause_first_line(&wrapped), "disk full");
    }

    #[test]
    fn a_bare_error_is_its_own_root() {
        let err = anyhow::anyhow!("single line failure");
        assert_eq!(root_cause_first_line(&err), "single line failure");
    }
}
