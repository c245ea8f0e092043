//! Shared fixtures: canned reasoning replies and tool doubles.
#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use guardian_core::{Bridge, Coordinates, ImageInput, Place, RunInput, WeatherConditions};
use guardian_reasoning::ScriptedService;
use guardian_stages::Services;
use guardian_tools::{
    BridgeSource, Geocoder, Lookup, Result, StaticBridges, StaticGeocoder, StaticVehicleCatalog,
    StaticWeather, ToolError, ToolSet, WeatherSource, WithFallback,
};

// Prompt fragments used to route scripted replies to the right stage.
pub const VISION_KEY: &str = "analyzing vehicle dimensions";
pub const MEASUREMENT_KEY: &str = "vehicle measurement expert";
pub const RISK_KEY: &str = "NEARBY BRIDGES";
pub const RECOMMENDATION_KEY: &str = "route safety advisor";

pub const VISION_REPLY: &str = r#"Here is my analysis:
```json
{
  "vehicle_detected": true,
  "vehicle_type": "U-Haul 15' box truck",
  "make_model_estimate": "U-Haul 15'",
  "base_height_estimate_inches": 120,
  "estimation_method": "wheel diameter and cab door height",
  "visible_items": [
    {"item": "AC unit", "description": "low profile unit", "height_estimate_inches": 10,
     "estimation_confidence": 0.7, "visual_reasoning": "about a third of the wheel diameter"}
  ],
  "total_height_estimate_inches": 130,
  "reference_objects_used": ["wheel diameter", "door height"],
  "perspective_notes": "slight low angle",
  "reasoning": "base plus AC unit"
}
```"#;

pub const MEASUREMENT_REPLY: &str = r#"{
  "base_height_inches": 150,
  "base_height_source": "database",
  "roof_equipment": [
    {"item": "AC unit", "height_added_inches": 10, "source": "visual_measurement", "confidence": 0.7}
  ],
  "total_height_inches": 160,
  "uncertainty_inches": 2,
  "reasoning": "catalogue height plus AC unit"
}"#;

pub const RISK_REPLY: &str = r#"```json
{
  "dangerous_bridges": [
    {"bridge_name": "Storrow Drive Overpass", "clearance": "10'6\"", "risk_level": "CRITICAL",
     "reasoning": "vehicle is 34 inches taller than the posted clearance"},
    {"bridge_name": "Memorial Drive Bridge", "clearance": "11'0\"", "risk_level": "CRITICAL",
     "reasoning": "vehicle is 28 inches taller than the posted clearance"}
  ],
  "overall_risk": "CRITICAL",
  "strike_probability": 0.95,
  "detailed_reasoning": "two bridges are far too low"
}
```"#;

pub const RECOMMENDATION_REPLY: &str = r#"{
  "recommendations": ["Do not use Storrow Drive", "Use I-90 for east-west travel"],
  "safe_routes": ["I-90 (Mass Pike)"],
  "avoid_routes": ["Storrow Drive", "Memorial Drive"],
  "summary": "The truck cannot pass under two nearby bridges."
}"#;

pub fn image() -> ImageInput {
    ImageInput::from_bytes(b"\xff\xd8\xff\xe0 not really a jpeg", None)
}

pub fn input_with_image(location: &str) -> RunInput {
    RunInput {
        image: Some(image()),
        location: Some(location.to_string()),
    }
}

/// All four reasoning replies for a successful run.
pub fn scripted_full_run() -> ScriptedService {
    ScriptedService::new()
        .reply(VISION_KEY, VISION_REPLY)
        .reply(MEASUREMENT_KEY, MEASUREMENT_REPLY)
        .reply(RISK_KEY, RISK_REPLY)
        .reply(RECOMMENDATION_KEY, RECOMMENDATION_REPLY)
}

pub fn offline_services(reasoning: Arc<ScriptedService>) -> Services {
    Services::new(reasoning, ToolSet::offline())
}

/// A primary lookup that is always down.
pub struct Unreachable;

#[async_trait]
impl Geocoder for Unreachable {
    fn name(&self) -> &'static str {
        "unreachable"
    }

    async fn geocode(&self, _address: &str) -> Result<Lookup<Place>> {
        Err(ToolError::Status {
            service: "unreachable",
            status: 502,
        })
    }
}

#[async_trait]
impl BridgeSource for Unreachable {
    fn name(&self) -> &'static str {
        "unreachable"
    }

    async fn bridges_near(&self, _at: Coordinates, _radius_km: f64) -> Result<Lookup<Vec<Bridge>>> {
        Err(ToolError::Empty("unreachable"))
    }
}

#[async_trait]
impl WeatherSource for Unreachable {
    fn name(&self) -> &'static str {
        "unreachable"
    }

    async fn conditions_at(&self, _at: Coordinates) -> Result<Lookup<WeatherConditions>> {
        Err(ToolError::Malformed("timed out".to_string()))
    }
}

/// Every primary configured and failing, static tables behind them.
pub fn failing_primaries() -> ToolSet {
    ToolSet {
        geocoder: Arc::new(WithFallback::new(Some(Unreachable), StaticGeocoder)),
        bridges: Arc::new(WithFallback::new(Some(Unreachable), StaticBridges)),
        weather: Arc::new(WithFallback::new(Some(Unreachable), StaticWeather)),
        vehicles: Arc::new(StaticVehicleCatalog),
    }
}

/// A bridge source that answers with no bridges at all.
pub struct NoBridges;

#[async_trait]
impl BridgeSource for NoBridges {
    fn name(&self) -> &'static str {
        "no_bridges"
    }

    async fn bridges_near(&self, _at: Coordinates, _radius_km: f64) -> Result<Lookup<Vec<Bridge>>> {
        Ok(Lookup::primary(Vec::new(), self.name()))
    }
}

/// A bridge source returning `n` generic bridges.
pub struct ManyBridges(pub usize);

#[async_trait]
impl BridgeSource for ManyBridges {
    fn name(&self) -> &'static str {
        "many_bridges"
    }

    async fn bridges_near(&self, _at: Coordinates, _radius_km: f64) -> Result<Lookup<Vec<Bridge>>> {
        let bridges = (0..self.0)
            .map(|i| Bridge::new(i.to_string(), format!("Bridge {}", i), "13'6\""))
            .collect();
        Ok(Lookup::primary(bridges, self.name()))
    }
}
