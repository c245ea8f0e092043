//! Known rental-truck and RV heights

use guardian_core::VehicleSpecs;

struct KnownVehicle {
    key: &'static str,
    name: &'static str,
    base_height_inches: f64,
}

const KNOWN_VEHICLES: &[KnownVehicle] = &[
    KnownVehicle { key: "u-haul 10", name: "U-Haul 10' Truck", base_height_inches: 83.0 },
    KnownVehicle { key: "u-haul 15", name: "U-Haul 15' Truck", base_height_inches: 150.0 },
    KnownVehicle { key: "u-haul 20", name: "U-Haul 20' Truck", base_height_inches: 162.0 },
    KnownVehicle { key: "penske 16", name: "Penske 16' Truck", base_height_inches: 152.0 },
    KnownVehicle { key: "box truck", name: "Standard Box Truck", base_height_inches: 150.0 },
    KnownVehicle { key: "class a rv", name: "Class A RV", base_height_inches: 156.0 },
    KnownVehicle { key: "class c rv", name: "Class C RV", base_height_inches: 138.0 },
];

pub trait VehicleCatalog: Send + Sync {
    fn lookup(&self, vehicle_type: &str) -> VehicleSpecs;
}

/// Substring match in either direction against a small static table.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticVehicleCatalog;

impl VehicleCatalog for StaticVehicleCatalog {
    fn lookup(&self, vehicle_type: &str) -> VehicleSpecs {
        let lower = vehicle_type.trim().to_lowercase();
        let hit = if lower.is_empty() {
            None
        } else {
            KNOWN_VEHICLES
                .iter()
                .find(|v| lower.contains(v.key) || v.key.contains(lower.as_str()))
        };

        match hit {
            Some(v) => VehicleSpecs {
                found: true,
                vehicle_name: v.name.to_string(),
                base_height_inches: Some(v.base_height_inches),
            },
            None => VehicleSpecs {
                found: false,
                vehicle_name: vehicle_type.to_string(),
                base_height_inches: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_contained_key() {
        let specs = StaticVehicleCatalog.lookup("U-Haul 15' moving truck");
        assert!(specs.found);
        assert_eq!(specs.vehicle_name, "U-Haul 15' Truck");
        assert_eq!(specs.base_height_inches, Some(150.0));
    }

    #[test]
    fn test_lookup_partial_query() {
        let specs = StaticVehicleCatalog.lookup("Class C");
        assert!(specs.found);
        assert_eq!(specs.base_height_inches, Some(138.0));
    }

    #[test]
    fn test_lookup_miss_keeps_input_name() {
        let specs = StaticVehicleCatalog.lookup("Sprinter van");
        assert!(!specs.found);
        assert_eq!(specs.vehicle_name, "Sprinter van");
        assert_eq!(specs.base_height_inches, None);
    }

    #[test]
    fn test_lookup_blank_is_miss() {
        assert!(!StaticVehicleCatalog.lookup("  ").found);
    }
}
