//! Address → coordinates
use async_trait::async_trait;
use guardian_core::{Coordinates, Place};
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, ToolError};
use crate::lookup::{Lookup, WithFallback};

pub const MAPBOX_GEOCODING_URL: &str = "https://api.mapbox.com/geocoding/v5/mapbox.places";

#[async_trait]
pub trait Geocoder: Send + Sync {
    fn name(&self) -> &'static str;

    async fn geocode(&self, address: &str) -> Result<Lookup<Place>>;
}

// ============================================================================
// MAPBOX
// ============================================================================

pub struct MapboxGeocoder {
    client: Client,
    base_url: String,
    token: String,
}

impl MapboxGeocoder {
    pub fn new(client: Client, token: impl Into<String>) -> Self {
        Self {
            client,
            base_url: MAPBOX_GEOCODING_URL.to_string(),
            token: token.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn request_url(&self, address: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| ToolError::Url(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ToolError::Url(format!("{} cannot take path segments", self.base_url)))?
            .push(&format!("{}.json", address));
        url.query_pairs_mut()
            .append_pair("access_token", &self.token)
            .append_pair("limit", "1");
        Ok(url)
    }
}

#[derive(Debug, Deserialize)]
struct MapboxResponse {
    #[serde(default)]
    features: Vec<MapboxFeature>,
}

#[derive(Debug, Deserialize)]
struct MapboxFeature {
    geometry: MapboxGeometry,
    place_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MapboxGeometry {
    /// `[longitude, latitude]`
    coordinates: Vec<f64>,
}

fn place_from_mapbox(body: MapboxResponse, address: &str) -> Result<Place> {
    let feature = body
        .features
        .into_iter()
        .next()
        .ok_or(ToolError::Empty("mapbox_geocoding"))?;
    match feature.geometry.coordinates[..] {
        [longitude, latitude, ..] => Ok(Place {
            coordinates: Coordinates::new(latitude, longitude),
            place_name: feature.place_name.unwrap_or_else(|| address.to_string()),
        }),
        _ => Err(ToolError::Malformed(
            "feature geometry has fewer than two coordinates".to_string(),
        )),
    }
}

#[async_trait]
impl Geocoder for MapboxGeocoder {
    fn name(&self) -> &'static str {
        "mapbox_geocoding"
    }

    async fn geocode(&self, address: &str) -> Result<Lookup<Place>> {
        let url = self.request_url(address)?;
        debug!(address, "geocoding via mapbox");
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ToolError::Status {
                service: self.name(),
                status: response.status().as_u16(),
            });
        }
        let body: MapboxResponse = response.json().await?;
        Ok(Lookup::primary(place_from_mapbox(body, address)?, self.name()))
    }
}

// ============================================================================
// STATIC TABLE
// ============================================================================

struct KnownCity {
    key: &'static str,
    name: &'static str,
    latitude: f64,
    longitude: f64,
}

const KNOWN_CITIES: &[KnownCity] = &[
    KnownCity { key: "boston", name: "Boston, MA", latitude: 42.3601, longitude: -71.0589 },
    KnownCity { key: "new york", name: "New York, NY", latitude: 40.7128, longitude: -74.0060 },
    KnownCity { key: "chicago", name: "Chicago, IL", latitude: 41.8781, longitude: -87.6298 },
    KnownCity { key: "los angeles", name: "Los Angeles, CA", latitude: 34.0522, longitude: -118.2437 },
];

/// Known-city table. Unmatched addresses resolve to Boston.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticGeocoder;

impl StaticGeocoder {
    pub fn resolve(&self, address: &str) -> Lookup<Place> {
        let lower = address.to_lowercase();
        match KNOWN_CITIES.iter().find(|city| lower.contains(city.key)) {
            Some(city) => Lookup::fallback(
                Place {
                    coordinates: Coordinates::new(city.latitude, city.longitude),
                    place_name: city.name.to_string(),
                },
                self.name(),
            )
            .with_note("Using mock data - geocoding API unavailable"),
            None => Lookup::fallback(
                Place {
                    coordinates: Coordinates::new(42.3601, -71.0589),
                    place_name: "Boston, MA (default)".to_string(),
                },
                self.name(),
            )
            .with_note("Unknown location - defaulting to Boston"),
        }
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    fn name(&self) -> &'static str {
        "mock_geocoding"
    }

    async fn geocode(&self, address: &str) -> Result<Lookup<Place>> {
        Ok(self.resolve(address))
    }
}

#[async_trait]
impl<P: Geocoder, F: Geocoder> Geocoder for WithFallback<P, F> {
    fn name(&self) -> &'static str {
        self.active_name(|p| p.name(), |f| f.name())
    }

    async fn geocode(&self, address: &str) -> Result<Lookup<Place>> {
        self.resolve(
            "geocoding",
            |p| p.name(),
            |p| p.geocode(address),
            |f| f.geocode(address),
        )
        .await
    }
}
