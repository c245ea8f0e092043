use std::sync::Arc;

use async_trait::async_trait;
use guardian_core::{
    parse_response, ExecutionContext, MeasurementFindings, RunState, Stage, StageError,
    StageOutput, StagePatch,
};
use guardian_reasoning::{ReasoningRequest, ReasoningService};
use guardian_tools::VehicleCatalog;

use crate::prompts::{measurement_prompt, MEASUREMENT_MAX_TOKENS};
use crate::schemas::MeasurementResponse;

/// Reconciles the visual estimate with catalogue specs into a final height.
pub struct MeasurementStage {
    reasoning: Arc<dyn ReasoningService>,
    vehicles: Arc<dyn VehicleCatalog>,
}

impl MeasurementStage {
    pub fn new(reasoning: Arc<dyn ReasoningService>, vehicles: Arc<dyn VehicleCatalog>) -> Self {
        Self {
            reasoning,
            vehicles,
        }
    }
}

#[async_trait]
impl Stage for MeasurementStage {
    fn id(&self) -> &'static str {
        "measurement"
    }

    fn label(&self) -> &'static str {
        "Measurement"
    }

    async fn execute(
        &self,
        state: &RunState,
        ctx: &ExecutionContext,
    ) -> Result<StageOutput, StageError> {
        if state.vision.vehicle_detected != Some(true) {
            return Err(StageError::missing("No vehicle detected - cannot measure"));
        }

        let vehicle_type = state.vision.vehicle_type.as_deref().unwrap_or_default();
        let specs = self.vehicles.lookup(vehicle_type);
        tracing::debug!(vehicle_type, found = specs.found, "vehicle specs looked up");

        let prompt = measurement_prompt(
            &state.vision,
            vehicle_type,
            &specs,
            ctx.defaults.vision_uncertainty_inches,
        );
        let request = ReasoningRequest::text(prompt).with_max_tokens(MEASUREMENT_MAX_TOKENS);
        let reply = self
            .reasoning
            .complete(request)
            .await
            .map_err(StageError::service)?;
        let (response, raw) = parse_response::<MeasurementResponse>(&reply)?;

        let findings = MeasurementFindings {
            vehicle_specs: Some(specs),
            base_height_inches: response.base_height_inches,
            base_height_source: response.base_height_source,
            roof_equipment: Some(response.roof_equipment),
            total_height_inches: Some(response.total_height_inches),
            uncertainty_inches: Some(
                response
                    .uncertainty_inches
                    .unwrap_or(ctx.defaults.measurement_uncertainty_inches),
            ),
            reasoning: response.reasoning,
        };
        let action = format!("Calculated height: {} inches", response.total_height_inches);
        Ok(StageOutput::new(StagePatch::Measurement(findings), action).with_result(raw))
    }
}
