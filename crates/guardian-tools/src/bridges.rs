//! Bridges with posted clearances around a point
use std::collections::HashMap;

use async_trait::async_trait;
use guardian_core::{Bridge, Coordinates};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, ToolError};
use crate::lookup::{Lookup, WithFallback};

pub const OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

#[async_trait]
pub trait BridgeSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn bridges_near(&self, at: Coordinates, radius_km: f64) -> Result<Lookup<Vec<Bridge>>>;
}

// ============================================================================
// OVERPASS (OpenStreetMap)
// ============================================================================

pub struct OverpassClient {
    client: Client,
    url: String,
}

impl OverpassClient {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            url: OVERPASS_URL.to_string(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

/// Overpass QL for bridge ways tagged with `maxheight` within `radius_km`.
pub fn overpass_query(at: Coordinates, radius_km: f64) -> String {
    let radius_m = radius_km * 1000.0;
    format!(
        "[out:json][timeout:10];\n(\n  way(around:{r},{lat},{lon})[\"bridge\"=\"yes\"][\"maxheight\"];\n  way(around:{r},{lat},{lon})[\"bridge\"][\"maxheight\"];\n);\nout body;\n>;\nout skel qt;\n",
        r = radius_m,
        lat = at.latitude,
        lon = at.longitude,
    )
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    #[serde(rename = "type")]
    kind: String,
    id: u64,
    #[serde(default)]
    tags: HashMap<String, String>,
}

fn bridges_from_overpass(body: OverpassResponse) -> Vec<Bridge> {
    body.elements
        .into_iter()
        .filter(|e| e.kind == "way")
        .filter_map(|e| {
            let maxheight = e.tags.get("maxheight")?.clone();
            let name = e
                .tags
                .get("name")
                .cloned()
                .unwrap_or_else(|| "Unnamed Bridge".to_string());
            let mut bridge = Bridge::new(e.id.to_string(), name, maxheight);
            if let Some(kind) = e.tags.get("bridge") {
                bridge = bridge.with_type(kind.clone());
            }
            if let Some(reference) = e.tags.get("ref") {
                bridge = bridge.with_ref(reference.clone());
            }
            Some(bridge)
        })
        .collect()
}

#[async_trait]
impl BridgeSource for OverpassClient {
    fn name(&self) -> &'static str {
        "osm_overpass_api"
    }

    async fn bridges_near(&self, at: Coordinates, radius_km: f64) -> Result<Lookup<Vec<Bridge>>> {
        debug!(lat = at.latitude, lon = at.longitude, radius_km, "querying overpass");
        let response = self
            .client
            .post(&self.url)
            .body(overpass_query(at, radius_km))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ToolError::Status {
                service: self.name(),
                status: response.status().as_u16(),
            });
        }
        let body: OverpassResponse = response.json().await?;
        let bridges = bridges_from_overpass(body);
        if bridges.is_empty() {
            return Err(ToolError::Empty(self.name()));
        }
        Ok(Lookup::primary(bridges, self.name()))
    }
}

// ============================================================================
// STATIC TABLE
// ============================================================================

/// Demo bridge lists keyed by a rough Boston bounding box.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticBridges;

impl StaticBridges {
    pub fn near(&self, at: Coordinates) -> Lookup<Vec<Bridge>> {
        let in_boston = at.latitude > 42.0
            && at.latitude < 43.0
            && at.longitude > -72.0
            && at.longitude < -70.0;
        let bridges = if in_boston {
            vec![
                Bridge::new("mock_001", "Storrow Drive Overpass", "10'6\"")
                    .with_type("arch")
                    .with_ref("US-1"),
                Bridge::new("mock_002", "Memorial Drive Bridge", "11'0\"").with_type("beam"),
                Bridge::new("mock_003", "BU Bridge", "14'0\"")
                    .with_type("arch")
                    .with_ref("MA-2"),
            ]
        } else {
            vec![
                Bridge::new("mock_generic_001", "Local Bridge #1", "13'6\"").with_type("beam"),
                Bridge::new("mock_generic_002", "Highway Overpass", "14'6\"").with_type("concrete"),
            ]
        };
        Lookup::fallback(bridges, self.name()).with_note("Using mock data - OSM API unavailable")
    }
}

#[async_trait]
impl BridgeSource for StaticBridges {
    fn name(&self) -> &'static str {
        "mock_data_fallback"
    }

    async fn bridges_near(&self, at: Coordinates, _radius_km: f64) -> Result<Lookup<Vec<Bridge>>> {
        Ok(self.near(at))
    }
}

#[async_trait]
impl<P: BridgeSource, F: BridgeSource> BridgeSource for WithFallback<P, F> {
    fn name(&self) -> &'static str {
        self.active_name(|p| p.name(), |f| f.name())
    }

    async fn bridges_near(&self, at: Coordinates, radius_km: f64) -> Result<Lookup<Vec<Bridge>>> {
        self.resolve(
            "bridge_query",
            |p| p.name(),
            |p| p.bridges_near(at, radius_km),
            |f| f.bridges_near(at, radius_km),
        )
        .await
    }
}
