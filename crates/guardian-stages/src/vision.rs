use std::sync::Arc;

use async_trait::async_trait;
use guardian_core::{
    parse_response, ExecutionContext, RunState, Stage, StageError, StageOutput, StagePatch,
    VisionFindings,
};
use guardian_reasoning::{ReasoningRequest, ReasoningService};

use crate::prompts::{VISION_MAX_TOKENS, VISION_PROMPT};
use crate::schemas::VisionResponse;

/// Identifies the vehicle and estimates its height from the photo.
pub struct VisionStage {
    reasoning: Arc<dyn ReasoningService>,
}

impl VisionStage {
    pub fn new(reasoning: Arc<dyn ReasoningService>) -> Self {
        Self { reasoning }
    }
}

fn findings_from(response: VisionResponse, ctx: &ExecutionContext) -> VisionFindings {
    VisionFindings {
        vehicle_detected: Some(response.vehicle_detected),
        vehicle_type: response.vehicle_type,
        make_model_estimate: response.make_model_estimate,
        base_height_estimate_inches: response.base_height_estimate_inches,
        total_height_visual_estimate_inches: response.total_height_estimate_inches,
        visual_detections: Some(response.visible_items),
        confidence: Some(
            response
                .overall_confidence
                .unwrap_or(ctx.defaults.vision_confidence),
        ),
        uncertainty_inches: Some(
            response
                .uncertainty_range_inches
                .unwrap_or(ctx.defaults.vision_uncertainty_inches),
        ),
        estimation_method: response.estimation_method,
        reference_objects_used: Some(response.reference_objects_used),
        perspective_notes: response.perspective_notes,
        reasoning: response.reasoning,
    }
}

#[async_trait]
impl Stage for VisionStage {
    fn id(&self) -> &'static str {
        "vision"
    }

    fn label(&self) -> &'static str {
        "Vision"
    }

    async fn execute(
        &self,
        state: &RunState,
        ctx: &ExecutionContext,
    ) -> Result<StageOutput, StageError> {
        let image = state.input.image.clone().ok_or_else(|| {
            StageError::missing_with_sentinel(
                "No image provided",
                StagePatch::Vision(VisionFindings::not_detected()),
            )
        })?;

        let request = ReasoningRequest::text(VISION_PROMPT)
            .with_image(image)
            .with_max_tokens(VISION_MAX_TOKENS);
        let reply = self
            .reasoning
            .complete(request)
            .await
            .map_err(StageError::service)?;
        let (response, raw) = parse_response::<VisionResponse>(&reply)?;

        let findings = findings_from(response, ctx);
        let action = format!(
            "Identified: {}",
            findings.vehicle_type.as_deref().unwrap_or("unknown vehicle")
        );
        Ok(StageOutput::new(StagePatch::Vision(findings), action).with_result(raw))
    }
}
