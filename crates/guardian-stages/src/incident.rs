//! Damage assessment from a photo taken after a bridge strike.
use std::str::FromStr;

use guardian_core::response::{check_non_negative, null_as_default};
use guardian_core::{ImageInput, ResponseSchema};
use guardian_reasoning::{ReasoningRequest, ReasoningService};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::consult::{consult, require_image, ConsultError};
use crate::prompts::{incident_prompt, INCIDENT_MAX_TOKENS};

/// Heights reported alongside the photo. Unreported values go to the model as 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncidentReport {
    #[serde(default)]
    pub vehicle_height_inches: Option<f64>,
    #[serde(default)]
    pub bridge_clearance_inches: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum DamageSeverity {
    Minor,
    Moderate,
    Severe,
    Catastrophic,
}

impl FromStr for DamageSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minor" => Ok(DamageSeverity::Minor),
            "moderate" => Ok(DamageSeverity::Moderate),
            "severe" => Ok(DamageSeverity::Severe),
            "catastrophic" => Ok(DamageSeverity::Catastrophic),
            other => Err(format!("unknown damage severity '{}'", other)),
        }
    }
}

impl TryFrom<String> for DamageSeverity {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageAssessment {
    pub severity: DamageSeverity,
    #[serde(default)]
    pub damage_type: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub affected_areas: Vec<String>,
    #[serde(default)]
    pub estimated_repair_cost: Option<String>,
    #[serde(default)]
    pub vehicle_likely_driveable: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrikeFindings {
    #[serde(default)]
    pub impact_point_inches: Option<f64>,
    #[serde(default)]
    pub actual_clearance_likely: Option<f64>,
    #[serde(default)]
    pub measurement_discrepancy: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub contributing_factors: Vec<String>,
    #[serde(default)]
    pub was_avoidable: Option<bool>,
    #[serde(default)]
    pub why_it_happened: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FollowUps {
    #[serde(default)]
    pub for_database: Option<String>,
    #[serde(default)]
    pub for_users: Option<String>,
    #[serde(default)]
    pub for_signage: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentAnalysis {
    pub damage_assessment: DamageAssessment,
    #[serde(default)]
    pub incident_analysis: Option<StrikeFindings>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lessons_learned: Vec<String>,
    #[serde(default)]
    pub recommendations: Option<FollowUps>,
    #[serde(default)]
    pub visual_description: Option<String>,
}

impl ResponseSchema for IncidentAnalysis {
    fn validate(&self) -> Result<(), String> {
        if let Some(findings) = &self.incident_analysis {
            check_non_negative("incident_analysis.impact_point_inches", findings.impact_point_inches)?;
            check_non_negative(
                "incident_analysis.actual_clearance_likely",
                findings.actual_clearance_likely,
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncidentAssessment {
    pub report: IncidentReport,
    /// Posted clearance minus reported height, when both were given.
    pub reported_margin_inches: Option<f64>,
    pub analysis: IncidentAnalysis,
    #[serde(skip)]
    pub raw: Value,
}

pub async fn analyze_incident(
    reasoning: &dyn ReasoningService,
    image: ImageInput,
    report: IncidentReport,
) -> Result<IncidentAssessment, ConsultError> {
    require_image(&image)?;
    for (field, value) in [
        ("vehicle height", report.vehicle_height_inches),
        ("bridge clearance", report.bridge_clearance_inches),
    ] {
        if let Some(v) = value {
            if !(v >= 0.0 && v.is_finite()) {
                return Err(ConsultError::InvalidRequest(format!(
                    "{} must be non-negative, got {}",
                    field, v
                )));
            }
        }
    }

    let request = ReasoningRequest::text(incident_prompt(&report))
        .with_image(image)
        .with_max_tokens(INCIDENT_MAX_TOKENS);
    let (analysis, raw) = consult::<IncidentAnalysis>(reasoning, "analyze_incident", request).await?;

    let reported_margin_inches = match (report.bridge_clearance_inches, report.vehicle_height_inches) {
        (Some(clearance), Some(height)) => Some(clearance - height),
        _ => None,
    };
    info!(
        severity = ?analysis.damage_assessment.severity,
        margin = ?reported_margin_inches,
        "incident analysed"
    );

    Ok(IncidentAssessment {
        report,
        reported_margin_inches,
        analysis,
        raw,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use guardian_reasoning::ScriptedService;

    const ANALYSIS: &str = r#"```json
{
  "damage_assessment": {
    "severity": "Severe",
    "damage_type": "roof_peel",
    "affected_areas": ["cargo box roof", "front cap"],
    "vehicle_likely_driveable": false
  },
  "incident_analysis": {
    "impact_point_inches": 128,
    "actual_clearance_likely": 125,
    "contributing_factors": null,
    "was_avoidable": true
  },
  "lessons_learned": ["Check posted clearance against the measured height"],
  "recommendations": {"for_signage": "Add an advance warning sign"}
}
```"#;

    fn photo() -> ImageInput {
        ImageInput::new("aGVsbG8=", "image/jpeg")
    }

    fn report() -> IncidentReport {
        IncidentReport {
            vehicle_height_inches: Some(130.0),
            bridge_clearance_inches: Some(126.0),
        }
    }

    #[tokio::test]
    async fn test_analyze_incident() {
        let service = ScriptedService::new().reply("bridge strike incident photo", ANALYSIS);
        let assessment = analyze_incident(&service, photo(), report()).await.unwrap();

        assert_eq!(assessment.analysis.damage_assessment.severity, DamageSeverity::Severe);
        assert_eq!(assessment.reported_margin_inches, Some(-4.0));
        let findings = assessment.analysis.incident_analysis.as_ref().unwrap();
        assert!(findings.contributing_factors.is_empty());
        assert_eq!(findings.was_avoidable, Some(true));

        let request = &service.requests()[0];
        assert!(request.prompt.contains("Reported vehicle height: 130\" (10.8 feet)"));
        assert_eq!(request.image, Some(photo()));
    }

    #[tokio::test]
    async fn test_analyze_incident_requires_severity() {
        let reply = r#"{"damage_assessment": {"damage_type": "scrape"}}"#;
        let service = ScriptedService::new().reply("bridge strike incident photo", reply);
        let err = analyze_incident(&service, photo(), IncidentReport::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("severity"));
    }

    #[tokio::test]
    async fn test_analyze_incident_rejects_negative_height() {
        let service = ScriptedService::new();
        let bad = IncidentReport {
            vehicle_height_inches: Some(-1.0),
            bridge_clearance_inches: None,
        };
        let err = analyze_incident(&service, photo(), bad).await.unwrap_err();
        assert!(matches!(err, ConsultError::InvalidRequest(_)));
        assert!(service.requests().is_empty());
    }
}
