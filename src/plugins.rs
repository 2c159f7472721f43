//! The fixed, tagged set of ingest plugins a deployment can select via
//! `ingester.plugin.name` (§4.6, §9 — no runtime class loading). The real
//! science-repository client is an external collaborator this repository
//! does not have access to; `registry-touch` is the one concrete,
//! self-contained plugin shipped here so `helion-ingester` is runnable
//! end-to-end. A production deployment adds its own [`PluginFactory`] to
//! this match and recompiles.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use helion_config::ConfigError;
use helion_core::plugin::{IngestPlugin, PluginFactory};

/// Builds the [`PluginFactory`] named by `ingester.plugin.name`, or a fatal
/// `ConfigError` if the name is not one this binary knows how to build —
/// the Rust equivalent of the source's "unknown plugin name" startup error.
pub fn build(name: &str, _config: &BTreeMap<String, toml::Value>) -> Result<Arc<dyn PluginFactory>, ConfigError> {
    match name {
        "registry-touch" => Ok(Arc::new(RegistryTouchFactory)),
        other => Err(ConfigError::invalid(
            "ingester.plugin.name",
            format!("{other:?} is not a recognized plugin"),
        )),
    }
}

/// Builds a fresh [`RegistryTouchPlugin`] per worker, per §4.6's
/// construct-inside-the-worker requirement.
struct RegistryTouchFactory;

impl PluginFactory for RegistryTouchFactory {
    fn build(&self) -> anyhow::Result<Box<dyn IngestPlugin>> {
        Ok(Box::new(RegistryTouchPlugin))
    }
}

/// Stands in for a real science-repository ingest client: confirms the file
/// is readable and non-empty and reports a fixed version string. Pre-screen
/// (§4.5 step 3) already filters out missing/empty files before a request
/// reaches a worker, so this mostly re-confirms what pre-screen already
/// checked under the file's storage-area lock window.
struct RegistryTouchPlugin;

impl IngestPlugin for RegistryTouchPlugin {
    fn execute(&mut self, path: &Path) -> anyhow::Result<()> {
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("stat {} during ingest", path.display()))?;
        if metadata.len() == 0 {
            anyhow::bail!("file has 0 bytes");
        }
        Ok(())
    }

    fn version(&self) -> String {
        "registry-touch-0.1".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_the_registry_touch_plugin_by_name() {
        let factory = build("registry-touch", &BTreeMap::new()).unwrap();
        let mut plugin = factory.build().unwrap();
        assert_eq!(plugin.version(), "registry-touch-0.1");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.fits");
        std::fs::write(&path, b"data").unwrap();
        assert!(plugin.execute(&path).is_ok());
    }

    #[test]
    fn rejects_an_unknown_plugin_name() {
        let err = build("not-a-real-plugin", &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key, .. } if key == "ingester.plugin.name"));
    }

    #[test]
    fn an_empty_file_is_reported_as_a_failure() {
        let factory = build("registry-touch", &BTreeMap::new()).unwrap();
        let mut plugin = factory.build().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.fits");
        std::fs::write(&path, b"").unwrap();
        assert!(plugin.execute(&path).is_err());
    }
}
