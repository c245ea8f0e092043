use std::sync::Arc;

use async_trait::async_trait;
use guardian_core::{
    parse_response, ExecutionContext, RiskFindings, RiskLevel, RunState, Stage, StageError,
    StageOutput, StagePatch,
};
use guardian_reasoning::{ReasoningRequest, ReasoningService};

use crate::prompts::{risk_prompt, RISK_MAX_TOKENS};
use crate::schemas::RiskResponse;

/// Judges each nearby bridge against the measured height.
pub struct RiskStage {
    reasoning: Arc<dyn ReasoningService>,
}

impl RiskStage {
    pub fn new(reasoning: Arc<dyn ReasoningService>) -> Self {
        Self { reasoning }
    }
}

fn unassessed(message: &str) -> StageError {
    StageError::missing_with_sentinel(message, StagePatch::Risk(RiskFindings::unknown()))
}

#[async_trait]
impl Stage for RiskStage {
    fn id(&self) -> &'static str {
        "risk"
    }

    fn label(&self) -> &'static str {
        "Risk assessment"
    }

    async fn execute(
        &self,
        state: &RunState,
        ctx: &ExecutionContext,
    ) -> Result<StageOutput, StageError> {
        let height = state
            .measurement
            .total_height_inches
            .ok_or_else(|| unassessed("No vehicle height - cannot assess bridge risk"))?;
        // A list without a source is the bridge stage's sentinel, not a lookup result.
        let bridges = state
            .bridges
            .nearby
            .as_deref()
            .filter(|_| state.bridges.source.is_some())
            .ok_or_else(|| unassessed("No bridge data - cannot assess bridge risk"))?;

        if bridges.is_empty() {
            let findings = RiskFindings {
                dangerous_bridges: Some(Vec::new()),
                risk_level: Some(RiskLevel::Safe),
                strike_probability: Some(0.0),
                reasoning: Some("No bridges with posted clearances nearby".to_string()),
            };
            return Ok(StageOutput::new(
                StagePatch::Risk(findings),
                "Risk: SAFE (no bridges nearby)",
            ));
        }

        let uncertainty = state
            .measurement
            .uncertainty_inches
            .unwrap_or(ctx.defaults.measurement_uncertainty_inches);
        let weather_impact = state.weather.clearance_adjustment_inches.unwrap_or(0);

        let prompt = risk_prompt(height, uncertainty, weather_impact, bridges);
        let request = ReasoningRequest::text(prompt).with_max_tokens(RISK_MAX_TOKENS);
        let reply = self
            .reasoning
            .complete(request)
            .await
            .map_err(StageError::service)?;
        let (response, raw) = parse_response::<RiskResponse>(&reply)?;

        let level = response.overall_risk.unwrap_or_default();
        let action = format!(
            "Risk: {} ({} dangerous bridges)",
            level,
            response.dangerous_bridges.len()
        );
        let findings = RiskFindings {
            dangerous_bridges: Some(response.dangerous_bridges),
            risk_level: Some(level),
            strike_probability: Some(
                response
                    .strike_probability
                    .unwrap_or(ctx.defaults.strike_probability),
            ),
            reasoning: response.detailed_reasoning,
        };
        Ok(StageOutput::new(StagePatch::Risk(findings), action).with_result(raw))
    }
}
