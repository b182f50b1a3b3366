//! Error types for requirement extraction

use std::path::PathBuf;
use thiserror::Error;

/// Result type for requirement extraction
pub type Result<T> = std::result::Result<T, RequirementError>;

/// Boxed cause reported by a plugin loader
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Requirement extraction errors
///
/// Every variant carries the artifact path so callers can report the failure
/// without going back to the file.
#[derive(Error, Debug)]
pub enum RequirementError {
    /// The artifact could not be opened
    #[error("unable to open file {path:?}: {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The rules file was opened but reading it failed part way
    #[error("unable to read file {path:?}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The rules file declares no engine version
    #[error("requirements for rulesfile {path:?}: requirements not found")]
    RequirementNotFound { path: PathBuf },

    /// The token after the anchor is not a version
    #[error(
        "unable to parse requirement {token:?} in {path:?}: expected a numeric value or a valid semver string"
    )]
    VersionParse { path: PathBuf, token: String },

    /// The plugin loader rejected the artifact
    #[error("unable to open plugin {path:?}: {source}")]
    PluginLoad {
        path: PathBuf,
        #[source]
        source: BoxError,
    },
}

impl RequirementError {
    /// Whether this is the "no requirement declared" outcome rather than a failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RequirementNotFound { .. })
    }

    /// Path of the artifact the error refers to
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::FileOpen { path, .. }
            | Self::FileRead { path, .. }
            | Self::RequirementNotFound { path }
            | Self::VersionParse { path, .. }
            | Self::PluginLoad { path, .. } => path,
        }
    }

    /// Wrap a loader failure for the given plugin path
    pub fn plugin_load(path: impl Into<PathBuf>, source: impl Into<BoxError>) -> Self {
        Self::PluginLoad {
            path: path.into(),
            source: source.into(),
        }
    }
}
