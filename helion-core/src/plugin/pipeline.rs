use std::path::Path;

use super::IngestPlugin;

/// A two-step pipeline: ingest, then register a derived record (the
/// "define visits" step). Assembled once at construction and run as a
/// single logical [`IngestPlugin::execute`] — a failure in either step is
/// reported as one failure, with no partial-success state for the caller
/// to reason about.
pub struct PipelinePlugin {
    ingest: Box<dyn IngestPlugin>,
    define_visits: Box<dyn IngestPlugin>,
}

impl PipelinePlugin {
    pub fn new(ingest: Box<dyn IngestPlugin>, define_visits: Box<dyn IngestPlugin>) -> Self {
        Self {
            ingest,
            define_visits,
        }
    }
}

impl IngestPlugin for PipelinePlugin {
    fn execute(&mut self, path: &Path) -> anyhow::Result<()> {
        self.ingest
            .execute(path)
            .map_err(|err| err.context("ingest step failed"))?;
        self.define_visits
            .execute(path)
            .map_err(|err| err.context("define-visits step failed"))
    }

    /// Reports the ingest step's version; the define-visits step runs
    /// against the same underlying repository release.
    fn version(&self) -> String {
        self.ingest.version()
    }
}
