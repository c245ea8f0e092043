//! Typed shapes of the reasoning-service replies.
use guardian_core::response::{check_non_negative, check_unit_interval, null_as_default};
use guardian_core::{BridgeRisk, ResponseSchema, RiskLevel, RoofEquipment, VisualDetection};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VisionResponse {
    pub vehicle_detected: bool,
    #[serde(default)]
    pub vehicle_type: Option<String>,
    #[serde(default)]
    pub make_model_estimate: Option<String>,
    #[serde(default)]
    pub base_height_estimate_inches: Option<f64>,
    #[serde(default)]
    pub estimation_method: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub visible_items: Vec<VisualDetection>,
    #[serde(default)]
    pub total_height_estimate_inches: Option<f64>,
    #[serde(default)]
    pub uncertainty_range_inches: Option<f64>,
    #[serde(default)]
    pub overall_confidence: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reference_objects_used: Vec<String>,
    #[serde(default)]
    pub perspective_notes: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

impl ResponseSchema for VisionResponse {
    fn validate(&self) -> Result<(), String> {
        check_unit_interval("overall_confidence", self.overall_confidence)?;
        check_non_negative("base_height_estimate_inches", self.base_height_estimate_inches)?;
        check_non_negative("total_height_estimate_inches", self.total_height_estimate_inches)?;
        check_non_negative("uncertainty_range_inches", self.uncertainty_range_inches)?;
        for item in &self.visible_items {
            check_unit_interval("visible_items.estimation_confidence", item.estimation_confidence)?;
            check_non_negative("visible_items.height_estimate_inches", item.height_estimate_inches)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MeasurementResponse {
    #[serde(default)]
    pub base_height_inches: Option<f64>,
    #[serde(default)]
    pub base_height_source: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub roof_equipment: Vec<RoofEquipment>,
    pub total_height_inches: f64,
    #[serde(default)]
    pub uncertainty_inches: Option<f64>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

impl ResponseSchema for MeasurementResponse {
    fn validate(&self) -> Result<(), String> {
        check_non_negative("base_height_inches", self.base_height_inches)?;
        check_non_negative("total_height_inches", Some(self.total_height_inches))?;
        check_non_negative("uncertainty_inches", self.uncertainty_inches)?;
        for equipment in &self.roof_equipment {
            check_non_negative(
                "roof_equipment.height_added_inches",
                Some(equipment.height_added_inches),
            )?;
            check_unit_interval("roof_equipment.confidence", equipment.confidence)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RiskResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub dangerous_bridges: Vec<BridgeRisk>,
    #[serde(default)]
    pub overall_risk: Option<RiskLevel>,
    #[serde(default)]
    pub strike_probability: Option<f64>,
    #[serde(default)]
    pub detailed_reasoning: Option<String>,
}

impl ResponseSchema for RiskResponse {
    fn validate(&self) -> Result<(), String> {
        check_unit_interval("strike_probability", self.strike_probability)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecommendationResponse {
    pub recommendations: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub safe_routes: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub avoid_routes: Vec<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

impl ResponseSchema for RecommendationResponse {}

#[cfg(test)]
mod tests {
    use super::*;
    use guardian_core::{parse_response, BridgeVerdict, GuardianError};

    #[test]
    fn test_vision_response_minimal() {
        let (vision, _) = parse_response::<VisionResponse>(r#"{"vehicle_detected": false}"#).unwrap();
        assert!(!vision.vehicle_detected);
        assert!(vision.visible_items.is_empty());
        assert_eq!(vision.overall_confidence, None);
    }

    #[test]
    fn test_vision_response_rejects_bad_confidence() {
        let err = parse_response::<VisionResponse>(
            r#"{"vehicle_detected": true, "overall_confidence": 80}"#,
        )
        .unwrap_err();
        assert!(matches!(err, GuardianError::Schema(_)));
    }

    #[test]
    fn test_vision_response_checks_items() {
        let err = parse_response::<VisionResponse>(
            r#"{"vehicle_detected": true, "visible_items": [{"item": "AC unit", "height_estimate_inches": -10}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("height_estimate_inches"));
    }

    #[test]
    fn test_null_lists_read_as_empty() {
        let (vision, _) = parse_response::<VisionResponse>(
            r#"{"vehicle_detected": true, "visible_items": null, "reference_objects_used": null}"#,
        )
        .unwrap();
        assert!(vision.visible_items.is_empty());

        let (measurement, _) = parse_response::<MeasurementResponse>(
            r#"{"total_height_inches": 150, "roof_equipment": null}"#,
        )
        .unwrap();
        assert!(measurement.roof_equipment.is_empty());
    }

    #[test]
    fn test_measurement_requires_total() {
        let err = parse_response::<MeasurementResponse>(r#"{"base_height_inches": 130}"#)
            .unwrap_err();
        assert!(err.to_string().contains("total_height_inches"));
    }

    #[test]
    fn test_risk_response_case_insensitive_levels() {
        let (risk, _) = parse_response::<RiskResponse>(
            r#"{"dangerous_bridges": [{"bridge_name": "Storrow Drive Overpass", "clearance": "10'6\"", "risk_level": "Critical"}],
                "overall_risk": "high", "strike_probability": 0.7}"#,
        )
        .unwrap();
        assert_eq!(risk.overall_risk, Some(RiskLevel::High));
        assert_eq!(risk.dangerous_bridges[0].risk_level, BridgeVerdict::Critical);
    }

    #[test]
    fn test_risk_response_rejects_unknown_verdict() {
        let err = parse_response::<RiskResponse>(
            r#"{"dangerous_bridges": [{"bridge_name": "X", "risk_level": "MAYBE"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, GuardianError::Schema(_)));
    }

    #[test]
    fn test_recommendation_requires_list() {
        assert!(parse_response::<RecommendationResponse>(r#"{"summary": "ok"}"#).is_err());
    }
}
