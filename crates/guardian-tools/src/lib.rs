//! Guardian Tools: the lookups behind the location, bridge, weather and
//! measurement stages.
//!
//! Every remote lookup has a static fallback tier. A failing primary is
//! logged and replaced, so the stages see a value either way, tagged with
//! the tier that produced it.

pub mod bridges;
pub mod config;
pub mod error;
pub mod geocoding;
pub mod lookup;
pub mod vehicle_specs;
pub mod weather;

pub use bridges::{BridgeSource, OverpassClient, StaticBridges};
pub use config::{ToolSet, ToolsConfig};
pub use error::{Result, ToolError};
pub use geocoding::{Geocoder, MapboxGeocoder, StaticGeocoder};
pub use lookup::{Lookup, WithFallback};
pub use vehicle_specs::{StaticVehicleCatalog, VehicleCatalog};
pub use weather::{clearance_impact, OpenWeatherClient, StaticWeather, WeatherSource};
