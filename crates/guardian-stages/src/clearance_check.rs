//! One-off "will it fit under this bridge" check, outside the pipeline.
use std::str::FromStr;

use guardian_core::response::{check_non_negative, check_unit_interval, null_as_default};
use guardian_core::{ClearanceStatus, ResponseSchema, RiskLevel, SafetyGrade};
use guardian_reasoning::{ReasoningRequest, ReasoningService};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::consult::{consult, ConsultError};
use crate::prompts::{clearance_prompt, CLEARANCE_MAX_TOKENS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearanceQuery {
    pub vehicle_height_inches: f64,
    pub bridge_name: String,
    pub bridge_clearance_inches: f64,
    #[serde(default)]
    pub vehicle_description: Option<String>,
}

impl ClearanceQuery {
    fn validate(&self) -> Result<(), String> {
        if !(self.vehicle_height_inches > 0.0 && self.vehicle_height_inches.is_finite()) {
            return Err(format!(
                "vehicle height must be positive, got {}",
                self.vehicle_height_inches
            ));
        }
        if !(self.bridge_clearance_inches > 0.0 && self.bridge_clearance_inches.is_finite()) {
            return Err(format!(
                "bridge clearance must be positive, got {}",
                self.bridge_clearance_inches
            ));
        }
        if self.bridge_name.trim().is_empty() {
            return Err("bridge name is empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum WillFit {
    Yes,
    No,
    Marginal,
}

impl FromStr for WillFit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" => Ok(WillFit::Yes),
            "no" => Ok(WillFit::No),
            "marginal" => Ok(WillFit::Marginal),
            other => Err(format!("unknown will_fit value '{}'", other)),
        }
    }
}

impl TryFrom<String> for WillFit {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ClearanceAction {
    Proceed,
    Caution,
    Avoid,
    Stop,
}

impl FromStr for ClearanceAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "proceed" => Ok(ClearanceAction::Proceed),
            "caution" => Ok(ClearanceAction::Caution),
            "avoid" => Ok(ClearanceAction::Avoid),
            "stop" => Ok(ClearanceAction::Stop),
            other => Err(format!("unknown action '{}'", other)),
        }
    }
}

impl TryFrom<String> for ClearanceAction {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearanceMargins {
    pub nominal_inches: f64,
    pub worst_case_inches: f64,
    #[serde(default)]
    pub comfortable_clearance: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearanceFactors {
    #[serde(default)]
    pub vehicle_uncertainty: Option<String>,
    #[serde(default)]
    pub suspension_compression: Option<String>,
    #[serde(default)]
    pub effective_vehicle_height: Option<f64>,
    #[serde(default)]
    pub effective_bridge_clearance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearanceAdvice {
    pub action: ClearanceAction,
    pub explanation: String,
    #[serde(default)]
    pub alternative_action: Option<String>,
}

/// The reasoning service's verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearanceCheck {
    pub will_fit: WillFit,
    pub margins: ClearanceMargins,
    pub risk_level: RiskLevel,
    pub strike_probability: f64,
    #[serde(default)]
    pub grade: Option<SafetyGrade>,
    #[serde(default)]
    pub factors: Option<ClearanceFactors>,
    pub recommendation: ClearanceAdvice,
    #[serde(default, deserialize_with = "null_as_default")]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub detailed_analysis: Option<String>,
}

impl ResponseSchema for ClearanceCheck {
    fn validate(&self) -> Result<(), String> {
        check_unit_interval("strike_probability", Some(self.strike_probability))?;
        if let Some(factors) = &self.factors {
            check_non_negative("factors.effective_vehicle_height", factors.effective_vehicle_height)?;
            check_non_negative(
                "factors.effective_bridge_clearance",
                factors.effective_bridge_clearance,
            )?;
        }
        if self.recommendation.explanation.trim().is_empty() {
            return Err("recommendation.explanation is empty".to_string());
        }
        Ok(())
    }
}

/// Verdict plus the locally computed margin for comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClearanceAssessment {
    pub query: ClearanceQuery,
    pub nominal_margin_inches: f64,
    pub status: ClearanceStatus,
    pub analysis: ClearanceCheck,
    #[serde(skip)]
    pub raw: Value,
}

pub async fn check_clearance(
    reasoning: &dyn ReasoningService,
    query: ClearanceQuery,
) -> Result<ClearanceAssessment, ConsultError> {
    query.validate().map_err(ConsultError::InvalidRequest)?;

    let request =
        ReasoningRequest::text(clearance_prompt(&query)).with_max_tokens(CLEARANCE_MAX_TOKENS);
    let (analysis, raw) = consult::<ClearanceCheck>(reasoning, "check_clearance", request).await?;

    let nominal_margin_inches = query.bridge_clearance_inches - query.vehicle_height_inches;
    let status = ClearanceStatus::classify(query.bridge_clearance_inches, query.vehicle_height_inches);
    info!(
        bridge = %query.bridge_name,
        margin = nominal_margin_inches,
        %status,
        will_fit = ?analysis.will_fit,
        "clearance checked"
    );

    Ok(ClearanceAssessment {
        query,
        nominal_margin_inches,
        status,
        analysis,
        raw,
    })
}
