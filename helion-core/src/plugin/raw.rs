use std::path::Path;
use std::sync::Arc;

use super::IngestPlugin;

/// A direct "ingest raw" plugin: `execute` is a single call into the
/// external routine, with no intermediate steps.
pub struct RawPlugin {
    operation: Arc<dyn Fn(&Path) -> anyhow::Result<()> + Send + Sync>,
    version: String,
}

impl RawPlugin {
    pub fn new(
        version: impl Into<String>,
        operation: Arc<dyn Fn(&Path) -> anyhow::Result<()> + Send + Sync>,
    ) -> Self {
        Self {
            operation,
            version: version.into(),
        }
    }
}

impl IngestPlugin for RawPlugin {
    fn execute(&mut self, path: &Path) -> anyhow::Result<()> {
        (self.operation)(path)
    }

    fn version(&self) -> String {
        self.version.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delegates_to_the_wrapped_operation() {
        let mut plugin = RawPlugin::new("v1.0", Arc::new(|_: &Path| Ok(())));
        assert!(plugin.execute(Path::new("/tmp/x.fits")).is_ok());
        assert_eq!(plugin.version(), "v1.0");
    }

    #[test]
    fn surfaces_the_operation_s_error() {
        let mut plugin = RawPlugin::new(
            "v1.0",
            Arc::new(|_: &Path| Err(anyhow::anyhow!("repository rejected the file"))),
        );
        let err = plugin.execute(Path::new("/tmp/x.fits")).unwrap_err();
        assert_eq!(err.to_string(), "repository rejected the file");
    }
}
