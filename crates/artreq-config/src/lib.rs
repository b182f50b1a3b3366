//! # artreq Configuration
//!
//! Configuration sources (in priority order):
//! 1. CLI arguments (applied by the binary)
//! 2. Environment variables (`ARTREQ_SECTION__KEY`)
//! 3. Config file (`--config` or the user config dir `config.toml`)
//! 4. Defaults

use artreq_plugins::api::DEFAULT_FRAMEWORK_API_VERSION;
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Prefix of environment variable overrides
pub const ENV_PREFIX: &str = "ARTREQ_";

/// Get the configuration directory
pub fn config_dir() -> PathBuf {
    ProjectDirs::from("dev", "artreq", "artreq")
        .map(|d| d.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config/artreq"))
}

/// Default config file location
pub fn default_config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output rendering
    pub output: OutputConfig,
    /// Directory scanning
    pub scan: ScanConfig,
    /// Plugin loading
    pub plugins: PluginsConfig,
}

/// How extracted requirements are printed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Json,
            pretty: true,
        }
    }
}

/// Output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Text,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            other => Err(format!("unknown output format {other:?}, expected json or text")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Text => f.write_str("text"),
        }
    }
}

/// Which files a directory scan treats as artifacts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Extensions of rules files
    pub rules_extensions: Vec<String>,
    /// Extensions of plugin shared objects
    pub plugin_extensions: Vec<String>,
    /// Follow symlinks while walking
    pub follow_links: bool,
    /// Maximum directory depth, unlimited when unset
    pub max_depth: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            rules_extensions: vec!["yaml".to_string(), "yml".to_string()],
            plugin_extensions: vec!["so".to_string(), "dylib".to_string(), "dll".to_string()],
            follow_links: false,
            max_depth: None,
        }
    }
}

/// Plugin loader settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginsConfig {
    /// Plugin API version implemented by the host
    pub framework_api_version: String,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            framework_api_version: DEFAULT_FRAMEWORK_API_VERSION.to_string(),
        }
    }
}

impl Config {
    /// Layered configuration sources, optionally including a TOML file
    pub fn figment(file: Option<&Path>) -> Figment {
        let figment = match file {
            Some(path) => Figment::new().merge(Toml::file(path)),
            None => Figment::new(),
        };
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load configuration
    ///
    /// An explicit path must exist; otherwise the user config file is used
    /// when present.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let file = match explicit {
            Some(path) if !path.exists() => {
                anyhow::bail!("config file {:?} does not exist", path)
            }
            Some(path) => Some(path.to_path_buf()),
            None => Some(default_config_path()).filter(|p| p.exists()),
        };

        match &file {
            Some(path) => tracing::debug!("Loading configuration from {:?}", path),
            None => tracing::debug!("No config file, using defaults"),
        }

        let mut config: Config = Self::figment(file.as_deref()).extract()?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Strip leading dots and case from configured extensions
    pub fn normalize(&mut self) {
        for ext in self
            .scan
            .rules_extensions
            .iter_mut()
            .chain(self.scan.plugin_extensions.iter_mut())
        {
            *ext = ext.trim().trim_start_matches('.').to_ascii_lowercase();
        }
    }

    /// Check settings that cannot be expressed in the types
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.scan.rules_extensions.is_empty() && self.scan.plugin_extensions.is_empty() {
            anyhow::bail!("scan needs at least one rules or plugin extension");
        }

        if let Some(ext) = self
            .scan
            .rules_extensions
            .iter()
            .find(|ext| self.scan.plugin_extensions.contains(ext))
        {
            anyhow::bail!("extension {ext:?} is configured both for rules files and plugins");
        }

        if self.plugins.framework_api_version.trim().is_empty() {
            anyhow::bail!("plugins.framework_api_version must not be empty");
        }

        Ok(())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.pretty);
        assert_eq!(config.scan.rules_extensions, vec!["yaml", "yml"]);
        assert_eq!(
            config.plugins.framework_api_version,
            DEFAULT_FRAMEWORK_API_VERSION.to_string()
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let toml = Config::default().to_toml().unwrap();
        assert!(toml.contains("[output]"));
        assert!(toml.contains("[scan]"));
        assert!(toml.contains("[plugins]"));
    }

    #[test]
    fn test_file_overlay() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "artreq.toml",
                r#"
                [output]
                format = "text"

                [scan]
                plugin_extensions = [".SO"]
                "#,
            )?;

            let config = Config::load(Some(Path::new("artreq.toml"))).map_err(|e| e.to_string())?;
            assert_eq!(config.output.format, OutputFormat::Text);
            assert!(config.output.pretty);
            assert_eq!(config.scan.plugin_extensions, vec!["so"]);
            assert_eq!(config.scan.rules_extensions, vec!["yaml", "yml"]);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("artreq.toml", "[plugins]\nframework_api_version = \"3.1.0\"\n")?;
            jail.set_env("ARTREQ_PLUGINS__FRAMEWORK_API_VERSION", "3.6.0");
            jail.set_env("ARTREQ_OUTPUT__PRETTY", "false");

            let config = Config::load(Some(Path::new("artreq.toml"))).map_err(|e| e.to_string())?;
            assert_eq!(config.plugins.framework_api_version, "3.6.0");
            assert!(!config.output.pretty);
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn test_overlapping_extensions_rejected() {
        let mut config = Config::default();
        config.scan.plugin_extensions.push("yaml".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert!("yaml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Text.to_string(), "text");
    }
}
