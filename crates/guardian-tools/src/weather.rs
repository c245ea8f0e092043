//! Current weather and its effect on effective clearance
use async_trait::async_trait;
use guardian_core::{Coordinates, WeatherConditions};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, ToolError};
use crate::lookup::{Lookup, WithFallback};

pub const OPENWEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Temperature assumed when the provider omits one, in °F.
const DEFAULT_TEMPERATURE_F: f64 = 50.0;
const FREEZING_F: f64 = 32.0;

#[async_trait]
pub trait WeatherSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn conditions_at(&self, at: Coordinates) -> Result<Lookup<WeatherConditions>>;
}

/// Clearance adjustment (inches) and warnings for a condition/temperature.
///
/// Snow or ice gives -2. Below freezing the adjustment is -1, replacing the
/// snow/ice value.
pub fn clearance_impact(condition: &str, temperature_f: f64) -> (i32, Vec<String>) {
    let condition = condition.to_lowercase();
    let mut impact = 0;
    let mut warnings = Vec::new();

    if condition.contains("snow") || condition.contains("ice") {
        impact = -2;
        warnings.push("Ice/snow may reduce bridge clearance by 2 inches".to_string());
    }

    if temperature_f < FREEZING_F {
        impact = -1;
        warnings.push("Freezing conditions - watch for ice".to_string());
    }

    (impact, warnings)
}

// ============================================================================
// OPENWEATHER
// ============================================================================

pub struct OpenWeatherClient {
    client: Client,
    url: String,
    api_key: String,
}

impl OpenWeatherClient {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            url: OPENWEATHER_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct OpenWeatherResponse {
    #[serde(default)]
    weather: Vec<OpenWeatherSummary>,
    main: Option<OpenWeatherMain>,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherSummary {
    #[serde(default)]
    main: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherMain {
    temp: Option<f64>,
}

fn conditions_from_openweather(body: OpenWeatherResponse) -> WeatherConditions {
    let summary = body.weather.into_iter().next();
    let temperature = body
        .main
        .and_then(|m| m.temp)
        .unwrap_or(DEFAULT_TEMPERATURE_F);
    let (condition, description) = match summary {
        Some(s) => (s.main, s.description),
        None => (String::new(), None),
    };
    let (clearance_impact_inches, warnings) = clearance_impact(&condition, temperature);

    WeatherConditions {
        condition,
        description,
        temperature: Some(temperature),
        clearance_impact_inches,
        warnings,
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    fn name(&self) -> &'static str {
        "openweather_api"
    }

    async fn conditions_at(&self, at: Coordinates) -> Result<Lookup<WeatherConditions>> {
        debug!(lat = at.latitude, lon = at.longitude, "fetching weather");
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("lat", at.latitude.to_string()),
                ("lon", at.longitude.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "imperial".to_string()),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ToolError::Status {
                service: self.name(),
                status: response.status().as_u16(),
            });
        }
        let body: OpenWeatherResponse = response.json().await?;
        Ok(Lookup::primary(conditions_from_openweather(body), self.name()))
    }
}

// ============================================================================
// STATIC TABLE
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct StaticWeather;

impl StaticWeather {
    pub fn current(&self) -> Lookup<WeatherConditions> {
        Lookup::fallback(
            WeatherConditions {
                condition: "Clear".to_string(),
                description: Some("clear sky".to_string()),
                temperature: Some(68.0),
                clearance_impact_inches: 0,
                warnings: Vec::new(),
            },
            self.name(),
        )
        .with_note("Using mock data - OpenWeather API unavailable")
    }
}

#[async_trait]
impl WeatherSource for StaticWeather {
    fn name(&self) -> &'static str {
        "mock_weather_data"
    }

    async fn conditions_at(&self, _at: Coordinates) -> Result<Lookup<WeatherConditions>> {
        Ok(self.current())
    }
}

#[async_trait]
impl<P: WeatherSource, F: WeatherSource> WeatherSource for WithFallback<P, F> {
    fn name(&self) -> &'static str {
        self.active_name(|p| p.name(), |f| f.name())
    }

    async fn conditions_at(&self, at: Coordinates) -> Result<Lookup<WeatherConditions>> {
        self.resolve(
            "weather",
            |p| p.name(),
            |p| p.conditions_at(at),
            |f| f.conditions_at(at),
        )
        .await
    }
}
