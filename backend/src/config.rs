//! Runtime configuration.
//!
//! Configuration is read from `impact.toml` and then overridden by
//! environment variables:
//!
//! | Variable                      | Setting                          |
//! |-------------------------------|----------------------------------|
//! | `IMPACT_MAX_CONCURRENCY`      | `analysis.max_concurrency`       |
//! | `IMPACT_PREDICTOR_TIMEOUT_MS` | `analysis.predictor_timeout_ms`  |
//! | `IMPACT_PREDICTOR_URL`        | `predictor.url`                  |
//! | `IMPACT_PREDICTOR_ENABLED`    | `predictor.enabled`              |
//! | `REPOSITORY_TYPE`             | `repository.type`                |
//! | `HOST` / `PORT`               | `server.host` / `server.port`    |
//!
//! Every field has a default, so an empty file (or no file) is valid.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::db::RepositoryType;
use crate::engine::RuleEngine;
use crate::services::impact_analysis::MAX_CONCURRENCY_LIMIT;

pub const CONFIG_FILE_NAME: &str = "impact.toml";

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactConfig {
    pub analysis: AnalysisSettings,
    pub predictor: PredictorSettings,
    pub repository: RepositorySettings,
    pub server: ServerSettings,
    /// Policy tables of the rule engine
    pub rules: RuleEngine,
}

/// Orchestrator limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// Upper bound on concurrently running camp analyses
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Per-camp budget for the external predictor call
    #[serde(default = "default_predictor_timeout_ms")]
    pub predictor_timeout_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictorSettings {
    #[serde(default)]
    pub enabled: bool,
    /// Base URL of the prediction service, e.g. `http://ml:8000`
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type", default = "default_repository_type")]
    pub repo_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_max_concurrency() -> usize {
    8
}

fn default_predictor_timeout_ms() -> u64 {
    3000
}

fn default_repository_type() -> String {
    "local".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            predictor_timeout_ms: default_predictor_timeout_ms(),
        }
    }
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            repo_type: default_repository_type(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl AnalysisSettings {
    pub fn predictor_timeout(&self) -> Duration {
        Duration::from_millis(self.predictor_timeout_ms)
    }
}

impl ImpactConfig {
    /// Parse configuration from TOML text without validating it.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Locate `impact.toml` in the current directory, `backend/` or the
    /// parent directory.
    pub fn find_default_file() -> Option<PathBuf> {
        [
            PathBuf::from(CONFIG_FILE_NAME),
            PathBuf::from("backend").join(CONFIG_FILE_NAME),
            PathBuf::from("..").join(CONFIG_FILE_NAME),
        ]
        .into_iter()
        .find(|path| path.exists())
    }

    /// File from the default location (or defaults), then environment
    /// overrides, then validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::find_default_file() {
            Some(path) => {
                log::info!("Loading configuration from {}", path.display());
                Self::from_file(&path)?
            }
            None => {
                log::info!("No {} found, using defaults", CONFIG_FILE_NAME);
                Self::default()
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup. Unset variables leave the
    /// current value in place; unparsable ones are rejected.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("IMPACT_MAX_CONCURRENCY") {
            self.analysis.max_concurrency = parse_var("IMPACT_MAX_CONCURRENCY", &value)?;
        }
        if let Some(value) = lookup("IMPACT_PREDICTOR_TIMEOUT_MS") {
            self.analysis.predictor_timeout_ms = parse_var("IMPACT_PREDICTOR_TIMEOUT_MS", &value)?;
        }
        if let Some(value) = lookup("IMPACT_PREDICTOR_URL") {
            self.predictor.url = Some(value);
        }
        if let Some(value) = lookup("IMPACT_PREDICTOR_ENABLED") {
            self.predictor.enabled = parse_bool("IMPACT_PREDICTOR_ENABLED", &value)?;
        }
        if let Some(value) = lookup("REPOSITORY_TYPE") {
            self.repository.repo_type = value;
        }
        if let Some(value) = lookup("HOST") {
            self.server.host = value;
        }
        if let Some(value) = lookup("PORT") {
            self.server.port = parse_var("PORT", &value)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_CONCURRENCY_LIMIT).contains(&self.analysis.max_concurrency) {
            return Err(ConfigError::Invalid(format!(
                "analysis.max_concurrency must be between 1 and {}, got {}",
                MAX_CONCURRENCY_LIMIT, self.analysis.max_concurrency
            )));
        }
        if !(1..=60_000).contains(&self.analysis.predictor_timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "analysis.predictor_timeout_ms must be between 1 and 60000, got {}",
                self.analysis.predictor_timeout_ms
            )));
        }
        if self.predictor.enabled && self.predictor_url().is_none() {
            return Err(ConfigError::Invalid(
                "predictor.enabled requires predictor.url".to_string(),
            ));
        }
        self.repository_type()?;
        self.rules.validate().map_err(ConfigError::Invalid)
    }

    pub fn repository_type(&self) -> Result<RepositoryType, ConfigError> {
        self.repository
            .repo_type
            .parse()
            .map_err(ConfigError::Invalid)
    }

    /// Predictor URL, if one is configured and non-blank.
    pub fn predictor_url(&self) -> Option<&str> {
        self.predictor
            .url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{} has an invalid value: {:?}", key, value)))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Invalid(format!(
            "{} has an invalid value: {:?}",
            key, value
        ))),
    }
}
