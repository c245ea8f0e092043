//! Credentials, endpoints and the assembled tool set.
use std::sync::Arc;
use std::time::Duration;

use guardian_core::config::{env_parse, env_var};
use reqwest::Client;
use tracing::info;

use crate::bridges::{BridgeSource, OverpassClient, StaticBridges, OVERPASS_URL};
use crate::error::Result;
use crate::geocoding::{Geocoder, MapboxGeocoder, StaticGeocoder};
use crate::lookup::WithFallback;
use crate::vehicle_specs::{StaticVehicleCatalog, VehicleCatalog};
use crate::weather::{OpenWeatherClient, StaticWeather, WeatherSource};

const LOOKUP_TIMEOUT_SECS: u64 = 5;
const OVERPASS_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, PartialEq)]
pub struct ToolsConfig {
    pub mapbox_token: Option<String>,
    pub openweather_api_key: Option<String>,
    pub overpass_url: String,
    /// Skip every primary and answer from the static tables.
    pub offline: bool,
    pub lookup_timeout: Duration,
    pub overpass_timeout: Duration,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            mapbox_token: None,
            openweather_api_key: None,
            overpass_url: OVERPASS_URL.to_string(),
            offline: false,
            lookup_timeout: Duration::from_secs(LOOKUP_TIMEOUT_SECS),
            overpass_timeout: Duration::from_secs(OVERPASS_TIMEOUT_SECS),
        }
    }
}

impl ToolsConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self {
            mapbox_token: env_var("MAPBOX_TOKEN").or_else(|| env_var("VITE_MAPBOX_TOKEN")),
            openweather_api_key: env_var("OPENWEATHER_API_KEY"),
            ..Self::default()
        };
        if let Some(url) = env_var("GUARDIAN_OVERPASS_URL") {
            config.overpass_url = url;
        }
        if let Some(offline) = env_parse("GUARDIAN_OFFLINE")? {
            config.offline = offline;
        }
        Ok(config)
    }

    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }
}

/// The external lookups the stages consult.
#[derive(Clone)]
pub struct ToolSet {
    pub geocoder: Arc<dyn Geocoder>,
    pub bridges: Arc<dyn BridgeSource>,
    pub weather: Arc<dyn WeatherSource>,
    pub vehicles: Arc<dyn VehicleCatalog>,
}

impl ToolSet {
    /// Primaries are enabled per service when credentials are present and
    /// `offline` is off. Each one falls back to its static table on error.
    pub fn from_config(config: &ToolsConfig) -> Result<Self> {
        if config.offline {
            info!("tool set running offline");
            return Ok(Self::offline());
        }

        let lookups = Client::builder().timeout(config.lookup_timeout).build()?;
        let overpass = Client::builder().timeout(config.overpass_timeout).build()?;

        let geocoder = config
            .mapbox_token
            .as_ref()
            .map(|token| MapboxGeocoder::new(lookups.clone(), token.clone()));
        let weather = config
            .openweather_api_key
            .as_ref()
            .map(|key| OpenWeatherClient::new(lookups.clone(), key.clone()));
        let bridges = OverpassClient::new(overpass).with_url(config.overpass_url.clone());

        info!(
            mapbox = geocoder.is_some(),
            openweather = weather.is_some(),
            overpass = %config.overpass_url,
            "tool set configured"
        );

        Ok(Self {
            geocoder: Arc::new(WithFallback::new(geocoder, StaticGeocoder)),
            bridges: Arc::new(WithFallback::new(Some(bridges), StaticBridges)),
            weather: Arc::new(WithFallback::new(weather, StaticWeather)),
            vehicles: Arc::new(StaticVehicleCatalog),
        })
    }

    /// Static tables only; no network.
    pub fn offline() -> Self {
        Self {
            geocoder: Arc::new(StaticGeocoder),
            bridges: Arc::new(StaticBridges),
            weather: Arc::new(StaticWeather),
            vehicles: Arc::new(StaticVehicleCatalog),
        }
    }
}
