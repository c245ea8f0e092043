//! Pipeline configuration.
//!
//! Values come from the environment (a `.env` file is loaded once, if
//! present). Every setting has a default so a bare environment works.
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use crate::error::{GuardianError, Result};

static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenvy::dotenv();
});

/// Read an environment variable after making sure `.env` was loaded.
/// Empty values count as unset.
pub fn env_var(key: &str) -> Option<String> {
    Lazy::force(&DOTENV_LOADED);
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Read and parse an environment variable, `Ok(None)` when unset.
pub fn env_parse<T: FromStr>(key: &str) -> Result<Option<T>> {
    match env_var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| GuardianError::Config {
                key: key.to_string(),
                value: raw,
            }),
        None => Ok(None),
    }
}

/// Values substituted when the reasoning service omits a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDefaults {
    #[serde(default = "default_vision_confidence")]
    pub vision_confidence: f64,

    #[serde(default = "default_vision_uncertainty")]
    pub vision_uncertainty_inches: f64,

    #[serde(default = "default_measurement_uncertainty")]
    pub measurement_uncertainty_inches: f64,

    #[serde(default)]
    pub strike_probability: f64,

    /// Upper bound on bridges kept from one lookup
    #[serde(default = "default_max_bridges")]
    pub max_bridges: usize,
}

fn default_vision_confidence() -> f64 {
    0.8
}

fn default_vision_uncertainty() -> f64 {
    5.0
}

fn default_measurement_uncertainty() -> f64 {
    3.0
}

fn default_max_bridges() -> usize {
    10
}

impl Default for StageDefaults {
    fn default() -> Self {
        Self {
            vision_confidence: default_vision_confidence(),
            vision_uncertainty_inches: default_vision_uncertainty(),
            measurement_uncertainty_inches: default_measurement_uncertainty(),
            strike_probability: 0.0,
            max_bridges: default_max_bridges(),
        }
    }
}

/// Settings for one pipeline instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_location")]
    pub default_location: String,

    #[serde(default = "default_bridge_radius_km")]
    pub bridge_radius_km: f64,

    #[serde(default)]
    pub defaults: StageDefaults,
}

pub fn default_location() -> String {
    "Boston, MA".to_string()
}

fn default_bridge_radius_km() -> f64 {
    10.0
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_location: default_location(),
            bridge_radius_km: default_bridge_radius_km(),
            defaults: StageDefaults::default(),
        }
    }
}

impl PipelineConfig {
    /// Defaults overridden by `GUARDIAN_*` variables.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(location) = env_var("GUARDIAN_DEFAULT_LOCATION") {
            config.default_location = location;
        }
        if let Some(radius) = env_parse("GUARDIAN_BRIDGE_RADIUS_KM")? {
            config.bridge_radius_km = radius;
        }
        if let Some(confidence) = env_parse("GUARDIAN_DEFAULT_CONFIDENCE")? {
            config.defaults.vision_confidence = confidence;
        }
        if let Some(uncertainty) = env_parse("GUARDIAN_VISION_UNCERTAINTY_INCHES")? {
            config.defaults.vision_uncertainty_inches = uncertainty;
        }
        if let Some(uncertainty) = env_parse("GUARDIAN_MEASUREMENT_UNCERTAINTY_INCHES")? {
            config.defaults.measurement_uncertainty_inches = uncertainty;
        }
        if let Some(max) = env_parse("GUARDIAN_MAX_BRIDGES")? {
            config.defaults.max_bridges = max;
        }

        Ok(config)
    }
}
