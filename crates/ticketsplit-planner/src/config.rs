//! Configuration loading for the planner binary.
//!
//! The canonical configuration lives in `ticketsplit.yaml` next to the
//! binary's working directory. Every field has a production default, so
//! the file is optional: a missing file means "run with defaults", while
//! a present-but-broken file is a hard error (silently ignoring a typoed
//! cap would be worse).

use std::path::Path;

use serde::Deserialize;

use ticketsplit_engine::EngineConfig;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level planner configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlannerConfig {
    /// Allocation engine tunables (cap, fairness spread, pass budget).
    #[serde(default)]
    pub engine: EngineConfig,

    /// Pretty-print the output JSON. Defaults to compact output for
    /// piping into other tools.
    #[serde(default)]
    pub pretty: bool,
}

impl PlannerConfig {
    /// Load configuration from the given path, falling back to defaults
    /// when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if an existing file cannot be read, or
    /// [`ConfigError::Yaml`] if its content is not valid YAML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_gives_production_defaults() {
        let config = PlannerConfig::parse("{}").unwrap();
        assert_eq!(config.engine.per_user_cap, 50);
        assert_eq!(config.engine.fairness_spread, 2);
        assert!(!config.pretty);
    }

    #[test]
    fn partial_yaml_overrides_only_named_fields() {
        let yaml = "engine:\n  per_user_cap: 10\npretty: true\n";
        let config = PlannerConfig::parse(yaml).unwrap();
        assert_eq!(config.engine.per_user_cap, 10);
        assert_eq!(config.engine.fairness_spread, 2);
        assert!(config.pretty);
    }

    #[test]
    fn invalid_yaml_is_a_hard_error() {
        assert!(PlannerConfig::parse("engine: [not a map").is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = PlannerConfig::load(Path::new("/nonexistent/ticketsplit.yaml")).unwrap();
        assert_eq!(config, PlannerConfig::default());
    }
}
