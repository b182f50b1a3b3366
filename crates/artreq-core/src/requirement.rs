//! Artifact requirement model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Requirement name for the rules engine version
pub const ENGINE_VERSION_KEY: &str = "engine_version";

/// Requirement name for the plugin API version
pub const PLUGIN_API_VERSION_KEY: &str = "plugin_api_version";

/// The fixed set of requirement names an artifact can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementKey {
    /// Minimum rules engine version, declared by rules files
    EngineVersion,
    /// Plugin API version, declared by plugin shared objects
    PluginApiVersion,
}

impl RequirementKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EngineVersion => ENGINE_VERSION_KEY,
            Self::PluginApiVersion => PLUGIN_API_VERSION_KEY,
        }
    }
}

impl fmt::Display for RequirementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named version requirement attached to an artifact
///
/// Serializes as `{"name": ..., "version": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactRequirement {
    name: RequirementKey,
    version: String,
}

impl ArtifactRequirement {
    pub fn new(name: RequirementKey, version: impl Into<String>) -> Self {
        Self {
            name,
            version: version.into(),
        }
    }

    /// Engine version requirement
    pub fn engine(version: impl Into<String>) -> Self {
        Self::new(RequirementKey::EngineVersion, version)
    }

    /// Plugin API version requirement
    pub fn plugin_api(version: impl Into<String>) -> Self {
        Self::new(RequirementKey::PluginApiVersion, version)
    }

    pub fn key(&self) -> RequirementKey {
        self.name
    }

    pub fn name(&self) -> &'static str {
        self.name.as_str()
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

impl fmt::Display for ArtifactRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requirement_serialization() {
        let req = ArtifactRequirement::engine("0.3.0");
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"name":"engine_version","version":"0.3.0"}"#);

        let back: ArtifactRequirement =
            serde_json::from_str(r#"{"name":"plugin_api_version","version":"2.0.0"}"#).unwrap();
        assert_eq!(back, ArtifactRequirement::plugin_api("2.0.0"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let parsed: Result<ArtifactRequirement, _> =
            serde_json::from_str(r#"{"name":"kernel_version","version":"1.0.0"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ArtifactRequirement::plugin_api("3.1.0").to_string(),
            "plugin_api_version:3.1.0"
        );
    }
}
