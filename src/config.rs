//! TOML configuration with defaults for every field.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;
use tracing_subscriber::{fmt, EnvFilter};

use crate::{
    domain::{
        similarity::{DEFAULT_LIMIT, DEFAULT_RANGE},
        Basis, SearchOptions, SimilaritySort,
    },
    infra::catalog::DEFAULT_BASE_URL,
    util::persistence::config_dir,
};

const CONFIG_FILENAME: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub search: SearchConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
    /// Lifetime of the on-disk catalog snapshot.
    pub ttl_minutes: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            ttl_minutes: 6 * 60,
        }
    }
}

impl CatalogConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_minutes * 60)
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    pub range: f64,
    pub limit: usize,
    pub sort: SimilaritySort,
    pub basis: Basis,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            range: DEFAULT_RANGE,
            limit: DEFAULT_LIMIT,
            sort: SimilaritySort::Proximity,
            basis: Basis::Clean,
        }
    }
}

impl SearchConfig {
    pub fn options(&self) -> SearchOptions {
        SearchOptions {
            range: self.range,
            limit: self.limit,
            sort: self.sort,
            basis: self.basis,
            ..SearchOptions::default()
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl LoggingConfig {
    /// Initialize the tracing subscriber. `RUST_LOG` overrides the configured level.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).with_writer(std::io::stderr).init();
            }
            _ => {
                fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
            }
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            format: "pretty".into(),
        }
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        config_dir().map(|dir| dir.join(CONFIG_FILENAME))
    }

    /// Loads `path`, or defaults if the file does not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if !path.as_ref().exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.catalog.base_url).map_err(|e| ConfigError::InvalidValue {
            field: "catalog.base_url",
            reason: e.to_string(),
        })?;
        if !self.search.range.is_finite() || self.search.range < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "search.range",
                reason: format!("{} is not a non-negative amount", self.search.range),
            });
        }
        if self.search.limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "search.limit",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}
