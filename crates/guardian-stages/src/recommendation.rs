use std::sync::Arc;

use async_trait::async_trait;
use guardian_core::{
    parse_response, ExecutionContext, RecommendationFindings, RunState, Stage, StageError,
    StageOutput, StagePatch,
};
use guardian_reasoning::{ReasoningRequest, ReasoningService};

use crate::prompts::{recommendation_prompt, RECOMMENDATION_MAX_TOKENS};
use crate::schemas::RecommendationResponse;

/// Turns the accumulated findings into advice for the driver.
pub struct RecommendationStage {
    reasoning: Arc<dyn ReasoningService>,
}

impl RecommendationStage {
    pub fn new(reasoning: Arc<dyn ReasoningService>) -> Self {
        Self { reasoning }
    }
}

#[async_trait]
impl Stage for RecommendationStage {
    fn id(&self) -> &'static str {
        "recommendation"
    }

    fn label(&self) -> &'static str {
        "Recommendation"
    }

    async fn execute(
        &self,
        state: &RunState,
        _ctx: &ExecutionContext,
    ) -> Result<StageOutput, StageError> {
        if !state.risk.risk_level.is_some_and(|level| level.is_known()) {
            return Err(StageError::missing(
                "Risk level unknown - cannot generate recommendations",
            ));
        }

        let request = ReasoningRequest::text(recommendation_prompt(state))
            .with_max_tokens(RECOMMENDATION_MAX_TOKENS);
        let reply = self
            .reasoning
            .complete(request)
            .await
            .map_err(StageError::service)?;
        let (response, raw) = parse_response::<RecommendationResponse>(&reply)?;

        let action = format!("Generated {} recommendations", response.recommendations.len());
        let findings = RecommendationFindings {
            recommendations: Some(response.recommendations),
            safe_routes: Some(response.safe_routes),
            avoid_routes: Some(response.avoid_routes),
            summary: response.summary,
        };
        Ok(StageOutput::new(StagePatch::Recommendation(findings), action).with_result(raw))
    }
}
