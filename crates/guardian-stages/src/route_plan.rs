//! Graded route options between two places for a vehicle of known height.
//!
//! The reasoning service proposes a safe (A), a moderate (C) and a dangerous
//! (F) route. Each proposal's lowest clearance is re-classified locally
//! against the vehicle height so a grade that contradicts the arithmetic is
//! visible to the caller.
use guardian_core::response::{check_non_negative, check_unit_interval, null_as_default};
use guardian_core::{BridgeVerdict, ClearanceStatus, ResponseSchema, RiskLevel, SafetyGrade};
use guardian_reasoning::{ReasoningRequest, ReasoningService};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::consult::{consult, ConsultError};
use crate::prompts::{route_prompt, ROUTE_MAX_TOKENS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub vehicle_height_inches: f64,
    pub origin: String,
    pub destination: String,
    #[serde(default)]
    pub vehicle_description: Option<String>,
}

impl RouteRequest {
    fn validate(&self) -> Result<(), String> {
        if !(self.vehicle_height_inches > 0.0 && self.vehicle_height_inches.is_finite()) {
            return Err(format!(
                "vehicle height must be positive, got {}",
                self.vehicle_height_inches
            ));
        }
        if self.origin.trim().is_empty() {
            return Err("origin is empty".to_string());
        }
        if self.destination.trim().is_empty() {
            return Err("destination is empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRisk {
    pub overall_risk: RiskLevel,
    #[serde(default)]
    pub strike_probability: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub concerns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyBridge {
    pub name: String,
    #[serde(default)]
    pub clearance_inches: Option<f64>,
    #[serde(default)]
    pub margin_inches: Option<f64>,
    #[serde(default)]
    pub risk: Option<BridgeVerdict>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteAdvice {
    pub recommended: bool,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub when_to_use: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteOption {
    pub name: String,
    #[serde(default, rename = "type")]
    pub route_type: Option<String>,
    pub safety_grade: SafetyGrade,
    #[serde(default)]
    pub distance_miles: Option<f64>,
    #[serde(default)]
    pub duration_hours: Option<f64>,
    #[serde(default)]
    pub clearance_summary: Option<String>,
    /// Lowest clearance on the route, inches
    #[serde(default)]
    pub minimum_clearance: Option<f64>,
    #[serde(default)]
    pub bridges_analyzed: Option<u32>,
    #[serde(default)]
    pub risk_assessment: Option<RouteRisk>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub key_bridges: Vec<KeyBridge>,
    #[serde(default)]
    pub recommendation: Option<RouteAdvice>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub turn_by_turn_warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallRecommendation {
    #[serde(default)]
    pub best_route: Option<String>,
    #[serde(default)]
    pub why: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub avoid_routes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePlan {
    pub routes: Vec<RouteOption>,
    #[serde(default)]
    pub overall_recommendation: Option<OverallRecommendation>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub general_advice: Vec<String>,
}

impl ResponseSchema for RoutePlan {
    fn validate(&self) -> Result<(), String> {
        if self.routes.is_empty() {
            return Err("routes is empty".to_string());
        }
        for route in &self.routes {
            check_non_negative("routes.distance_miles", route.distance_miles)?;
            check_non_negative("routes.duration_hours", route.duration_hours)?;
            check_non_negative("routes.minimum_clearance", route.minimum_clearance)?;
            if let Some(risk) = &route.risk_assessment {
                check_unit_interval("routes.risk_assessment.strike_probability", risk.strike_probability)?;
            }
            for bridge in &route.key_bridges {
                check_non_negative("routes.key_bridges.clearance_inches", bridge.clearance_inches)?;
            }
        }
        Ok(())
    }
}

/// Local clearance verdict for one proposed route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteCheck {
    pub name: String,
    pub safety_grade: SafetyGrade,
    pub minimum_margin_inches: Option<f64>,
    pub status: Option<ClearanceStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePlanReport {
    pub request: RouteRequest,
    pub checks: Vec<RouteCheck>,
    pub plan: RoutePlan,
    #[serde(skip)]
    pub raw: Value,
}

impl RoutePlanReport {
    /// Best-graded route whose lowest clearance is known to fit.
    pub fn safest_fitting(&self) -> Option<&RouteCheck> {
        self.checks
            .iter()
            .filter(|check| matches!(check.status, Some(status) if status != ClearanceStatus::WillNotFit))
            .min_by_key(|check| check.safety_grade)
    }
}

fn check_route(route: &RouteOption, vehicle_height_inches: f64) -> RouteCheck {
    let minimum = route.minimum_clearance.or_else(|| {
        route
            .key_bridges
            .iter()
            .filter_map(|b| b.clearance_inches)
            .reduce(f64::min)
    });
    RouteCheck {
        name: route.name.clone(),
        safety_grade: route.safety_grade,
        minimum_margin_inches: minimum.map(|clearance| clearance - vehicle_height_inches),
        status: minimum.map(|clearance| ClearanceStatus::classify(clearance, vehicle_height_inches)),
    }
}

pub async fn plan_route(
    reasoning: &dyn ReasoningService,
    request: RouteRequest,
) -> Result<RoutePlanReport, ConsultError> {
    request.validate().map_err(ConsultError::InvalidRequest)?;

    let call = ReasoningRequest::text(route_prompt(&request)).with_max_tokens(ROUTE_MAX_TOKENS);
    let (plan, raw) = consult::<RoutePlan>(reasoning, "plan_route", call).await?;

    let checks: Vec<RouteCheck> = plan
        .routes
        .iter()
        .map(|route| check_route(route, request.vehicle_height_inches))
        .collect();
    info!(
        origin = %request.origin,
        destination = %request.destination,
        routes = checks.len(),
        "route plan received"
    );

    Ok(RoutePlanReport {
        request,
        checks,
        plan,
        raw,
    })
}
