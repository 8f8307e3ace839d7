use chrono::Duration;
use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use thiserror::Error;

use crate::interlink::{
    PropagationContext, SiderealModel, DEFAULT_MAX_RANGE_KM, DEFAULT_STEP, EARTH_RADIUS_KM,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub scan: ScanDefaults,
    #[serde(default)]
    pub propagation: PropagationConfig,
    #[serde(default)]
    pub catalog: Option<CatalogConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:5000".to_string()
}

/// Values used when a request leaves them out.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanDefaults {
    #[serde(default = "default_step", deserialize_with = "deserialize_duration")]
    pub step: Duration,
    #[serde(default = "default_max_range_km")]
    pub max_range_km: f64,
    #[serde(default = "default_earth_radius_km")]
    pub earth_radius_km: f64,
    /// Requests needing more samples than this are refused up front.
    #[serde(default = "default_max_samples")]
    pub max_samples: u64,
}

impl Default for ScanDefaults {
    fn default() -> Self {
        Self {
            step: default_step(),
            max_range_km: default_max_range_km(),
            earth_radius_km: default_earth_radius_km(),
            max_samples: default_max_samples(),
        }
    }
}

fn default_step() -> Duration {
    DEFAULT_STEP
}

fn default_max_range_km() -> f64 {
    DEFAULT_MAX_RANGE_KM
}

fn default_earth_radius_km() -> f64 {
    EARTH_RADIUS_KM
}

fn default_max_samples() -> u64 {
    100_000
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropagationConfig {
    #[serde(default)]
    pub sidereal: SiderealModel,
}

impl PropagationConfig {
    pub fn context(&self) -> PropagationContext {
        PropagationContext {
            sidereal: self.sidereal,
            ..PropagationContext::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    pub tle_folder: PathBuf,
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    let std = humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)?;
    Duration::from_std(std).map_err(serde::de::Error::custom)
}
