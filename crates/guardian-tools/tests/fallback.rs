use async_trait::async_trait;
use guardian_core::{Bridge, Coordinates, Place, WeatherConditions};
use guardian_tools::{
    BridgeSource, Geocoder, Lookup, Result, StaticBridges, StaticGeocoder, StaticWeather,
    ToolError, WeatherSource, WithFallback,
};

/// A primary that is always down.
struct Unreachable;

#[async_trait]
impl Geocoder for Unreachable {
    fn name(&self) -> &'static str {
        "unreachable"
    }

    async fn geocode(&self, _address: &str) -> Result<Lookup<Place>> {
        Err(ToolError::Status {
            service: "unreachable",
            status: 503,
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
        Err(ToolError::Malformed("no body".to_string()))
    }
}

/// A primary that answers with a fixed place.
struct Fixed;

#[async_trait]
impl Geocoder for Fixed {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn geocode(&self, address: &str) -> Result<Lookup<Place>> {
        Ok(Lookup::primary(
            Place {
                coordinates: Coordinates::new(1.0, 2.0),
                place_name: address.to_string(),
            },
            self.name(),
        ))
    }
}

#[tokio::test]
async fn test_failing_geocoder_falls_back_to_boston() {
    let geocoder = WithFallback::new(Some(Unreachable), StaticGeocoder);
    let found = geocoder.geocode("Boston, MA").await.unwrap();

    assert_eq!(found.value.coordinates, Coordinates::new(42.3601, -71.0589));
    assert_eq!(found.source.name(), "mock_geocoding");
    assert!(found.source.is_fallback());
}

#[tokio::test]
async fn test_working_primary_is_preferred() {
    let geocoder = WithFallback::new(Some(Fixed), StaticGeocoder);
    let found = geocoder.geocode("Somewhere").await.unwrap();

    assert_eq!(found.value.place_name, "Somewhere");
    assert!(!found.source.is_fallback());
    assert!(found.note.is_none());
}

#[tokio::test]
async fn test_failing_bridge_source_falls_back() {
    let bridges = WithFallback::new(Some(Unreachable), StaticBridges);
    let found = bridges
        .bridges_near(Coordinates::new(42.3601, -71.0589), 10.0)
        .await
        .unwrap();

    assert_eq!(found.value.len(), 3);
    assert_eq!(found.source.name(), "mock_data_fallback");
}

#[tokio::test]
async fn test_failing_weather_falls_back() {
    let weather = WithFallback::new(Some(Unreachable), StaticWeather);
    let found = weather
        .conditions_at(Coordinates::new(42.3601, -71.0589))
        .await
        .unwrap();

    assert_eq!(found.value.condition, "Clear");
    assert_eq!(found.value.temperature, Some(68.0));
    assert!(found.value.warnings.is_empty());
}

#[tokio::test]
async fn test_missing_primary_goes_straight_to_fallback() {
    let geocoder: WithFallback<Unreachable, StaticGeocoder> = WithFallback::new(None, StaticGeocoder);
    assert_eq!(Geocoder::name(&geocoder), "mock_geocoding");

    let found = geocoder.geocode("New York, NY").await.unwrap();
    assert!(found.source.is_fallback());
    assert_eq!(found.value.place_name, "New York, NY");
}
