//! Read posted clearances off a photo of a bridge sign.
use std::str::FromStr;

use guardian_core::response::{check_non_negative, check_unit_interval, null_as_default};
use guardian_core::{parse_maxheight, ImageInput, ResponseSchema};
use guardian_reasoning::{ReasoningRequest, ReasoningService};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::consult::{consult, require_image, ConsultError};
use crate::prompts::{SIGN_MAX_TOKENS, SIGN_PROMPT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum SignCondition {
    Clear,
    Faded,
    Damaged,
    Obscured,
}

impl FromStr for SignCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clear" => Ok(SignCondition::Clear),
            "faded" => Ok(SignCondition::Faded),
            "damaged" => Ok(SignCondition::Damaged),
            "obscured" => Ok(SignCondition::Obscured),
            other => Err(format!("unknown sign condition '{}'", other)),
        }
    }
}

impl TryFrom<String> for SignCondition {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One clearance figure read from the sign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostedClearance {
    #[serde(default)]
    pub clearance_inches: Option<f64>,
    #[serde(default)]
    pub clearance_display: Option<String>,
    #[serde(default)]
    pub applies_to: Option<String>,
    #[serde(default)]
    pub sign_condition: Option<SignCondition>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

impl PostedClearance {
    /// The figure in inches, read from the display text when the number is absent.
    pub fn inches(&self) -> Option<f64> {
        self.clearance_inches
            .or_else(|| self.clearance_display.as_deref().and_then(parse_maxheight))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignReading {
    #[serde(default, deserialize_with = "null_as_default")]
    pub clearances_found: Vec<PostedClearance>,
    #[serde(default)]
    pub minimum_clearance: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub sign_analysis: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub concerns: Vec<String>,
}

impl ResponseSchema for SignReading {
    fn validate(&self) -> Result<(), String> {
        check_non_negative("minimum_clearance", self.minimum_clearance)?;
        for found in &self.clearances_found {
            check_non_negative("clearances_found.clearance_inches", found.clearance_inches)?;
            check_unit_interval("clearances_found.confidence", found.confidence)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignReport {
    /// Lowest clearance on the sign, `None` when nothing legible was found.
    pub minimum_clearance_inches: Option<f64>,
    pub reading: SignReading,
    #[serde(skip)]
    pub raw: Value,
}

pub async fn read_bridge_sign(
    reasoning: &dyn ReasoningService,
    image: ImageInput,
) -> Result<SignReport, ConsultError> {
    require_image(&image)?;

    let request = ReasoningRequest::text(SIGN_PROMPT)
        .with_image(image)
        .with_max_tokens(SIGN_MAX_TOKENS);
    let (reading, raw) = consult::<SignReading>(reasoning, "read_bridge_sign", request).await?;

    // Trust the smallest figure actually read over the model's own summary.
    let minimum_clearance_inches = reading
        .clearances_found
        .iter()
        .filter_map(PostedClearance::inches)
        .reduce(f64::min)
        .or(reading.minimum_clearance);
    info!(
        signs = reading.clearances_found.len(),
        minimum = ?minimum_clearance_inches,
        "bridge sign read"
    );

    Ok(SignReport {
        minimum_clearance_inches,
        reading,
        raw,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use guardian_reasoning::ScriptedService;

    const READING: &str = r#"```json
{
  "clearances_found": [
    {"clearance_display": "10'6\"", "applies_to": "left lane", "sign_condition": "Faded", "confidence": 0.7},
    {"clearance_inches": 132, "clearance_display": "11'0\"", "applies_to": "right lane", "sign_condition": "clear", "confidence": 0.9}
  ],
  "minimum_clearance": 132,
  "warnings": null,
  "sign_analysis": "Two lane-specific clearance signs on a stone arch."
}
```"#;

    fn photo() -> ImageInput {
        ImageInput::new("aGVsbG8=", "image/jpeg")
    }

    #[tokio::test]
    async fn test_read_bridge_sign_takes_lowest_figure() {
        let service = ScriptedService::new().reply("clearance sign photo", READING);
        let report = read_bridge_sign(&service, photo()).await.unwrap();

        assert_eq!(report.minimum_clearance_inches, Some(126.0));
        assert_eq!(report.reading.clearances_found.len(), 2);
        assert_eq!(
            report.reading.clearances_found[0].sign_condition,
            Some(SignCondition::Faded)
        );
        assert!(report.reading.warnings.is_empty());

        let request = &service.requests()[0];
        assert_eq!(request.image, Some(photo()));
        assert_eq!(request.max_tokens, SIGN_MAX_TOKENS);
    }

    #[tokio::test]
    async fn test_read_bridge_sign_falls_back_to_reported_minimum() {
        let reply = r#"{"clearances_found": [{"clearance_display": "illegible"}], "minimum_clearance": 150}"#;
        let service = ScriptedService::new().reply("clearance sign photo", reply);
        let report = read_bridge_sign(&service, photo()).await.unwrap();
        assert_eq!(report.minimum_clearance_inches, Some(150.0));
    }

    #[tokio::test]
    async fn test_read_bridge_sign_requires_image() {
        let service = ScriptedService::new();
        let err = read_bridge_sign(&service, ImageInput::new("", "image/png"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConsultError::InvalidRequest(_)));
        assert!(service.requests().is_empty());
    }

    #[tokio::test]
    async fn test_read_bridge_sign_rejects_unknown_condition() {
        let reply = r#"{"clearances_found": [{"clearance_inches": 140, "sign_condition": "sparkly"}]}"#;
        let service = ScriptedService::new().reply("clearance sign photo", reply);
        let err = read_bridge_sign(&service, photo()).await.unwrap_err();
        assert!(matches!(err, ConsultError::Response(_)));
    }
}
