//! # artreq Plugins
//!
//! Plugin API version requirements of compiled plugins.
//!
//! Plugin loading sits behind the [`PluginLoader`] trait so requirement
//! extraction works with any loader:
//! - [`SharedLibraryLoader`] opens real shared objects exporting the plugin C ABI
//! - tests and embedders can supply their own loader
//!
//! The declared required API version is reported verbatim; validating it is
//! the loader's job.

pub mod api;
pub mod loader;

pub use loader::{LoaderError, SharedLibraryLoader, SharedLibraryPlugin};

use artreq_core::{ArtifactRequirement, RequirementError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Metadata a plugin declares about itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginInfo {
    /// Plugin name
    pub name: String,
    /// Plugin version
    pub version: String,
    /// Description
    pub description: Option<String>,
    /// Maintainer contact
    pub contact: Option<String>,
    /// Plugin API version the plugin was built against
    pub required_api_version: String,
}

/// An opened plugin
pub trait PluginHandle {
    fn info(&self) -> &PluginInfo;
}

/// Capability to open a plugin artifact
pub trait PluginLoader {
    type Plugin: PluginHandle;
    type Error: std::error::Error + Send + Sync + 'static;

    fn open(&self, path: &Path) -> Result<Self::Plugin, Self::Error>;
}

/// Extract the plugin API version requirement of a plugin artifact
pub fn plugin_requirement<L: PluginLoader>(
    loader: &L,
    path: impl AsRef<Path>,
) -> artreq_core::Result<ArtifactRequirement> {
    let path = path.as_ref();
    let plugin = loader
        .open(path)
        .map_err(|err| RequirementError::plugin_load(path, err))?;

    Ok(ArtifactRequirement::plugin_api(
        plugin.info().required_api_version.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use artreq_core::RequirementKey;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[derive(Debug, thiserror::Error)]
    #[error("no plugin at {0:?}")]
    struct FakeError(PathBuf);

    struct FakePlugin(PluginInfo);

    impl PluginHandle for FakePlugin {
        fn info(&self) -> &PluginInfo {
            &self.0
        }
    }

    #[derive(Default)]
    struct FakeLoader {
        plugins: HashMap<PathBuf, PluginInfo>,
    }

    impl FakeLoader {
        fn with(mut self, path: &str, required_api_version: &str) -> Self {
            self.plugins.insert(
                PathBuf::from(path),
                PluginInfo {
                    name: "dummy".to_string(),
                    version: "0.1.0".to_string(),
                    description: None,
                    contact: None,
                    required_api_version: required_api_version.to_string(),
                },
            );
            self
        }
    }

    impl PluginLoader for FakeLoader {
        type Plugin = FakePlugin;
        type Error = FakeError;

        fn open(&self, path: &Path) -> Result<FakePlugin, FakeError> {
            self.plugins
                .get(path)
                .cloned()
                .map(FakePlugin)
                .ok_or_else(|| FakeError(path.to_path_buf()))
        }
    }

    #[test]
    fn test_plugin_requirement_verbatim() {
        let loader = FakeLoader::default().with("/plugins/libk8saudit.so", "2.0.0");
        let req = plugin_requirement(&loader, "/plugins/libk8saudit.so").unwrap();
        assert_eq!(req, ArtifactRequirement::plugin_api("2.0.0"));
        assert_eq!(req.key(), RequirementKey::PluginApiVersion);
    }

    #[test]
    fn test_version_not_normalized() {
        let loader = FakeLoader::default().with("libdummy.so", "3");
        let req = plugin_requirement(&loader, "libdummy.so").unwrap();
        assert_eq!(req.version(), "3");
    }

    #[test]
    fn test_load_failure_wrapped() {
        let loader = FakeLoader::default();
        let err = plugin_requirement(&loader, "/plugins/missing.so").unwrap_err();
        match &err {
            RequirementError::PluginLoad { path, source } => {
                assert_eq!(path, &PathBuf::from("/plugins/missing.so"));
                assert!(source.to_string().contains("missing.so"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_shared_library_loader_failure_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("libnothing.so");
        let err = plugin_requirement(&SharedLibraryLoader::default(), &path).unwrap_err();
        assert!(matches!(err, RequirementError::PluginLoad { .. }));
        assert_eq!(err.path(), path.as_path());
    }

    #[test]
    fn test_plugin_info_serialization() {
        let info = PluginInfo {
            name: "cloudtrail".to_string(),
            version: "0.12.0".to_string(),
            description: Some("Reads CloudTrail logs".to_string()),
            contact: None,
            required_api_version: "3.0.0".to_string(),
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["required_api_version"], "3.0.0");
        assert_eq!(json["contact"], serde_json::Value::Null);
    }
}
