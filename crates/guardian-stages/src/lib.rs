//! Guardian Stages: the seven BridgeGuardian stages and the pipeline driver.
//!
//! # Pipeline Flow
//!
//! ```text
//! vision → measurement → location → bridge_query → weather → risk → recommendation
//!   ↓          ↓            ↓            ↓            ↓        ↓          ↓
//! vehicle   height       coords       bridges     clearance  verdicts   advice
//!                                                 adjustment
//! ```
//!
//! Vision, measurement, risk and recommendation call the reasoning service;
//! the others consult the lookup tools.
//!
//! Four single-shot checks run outside the pipeline: [`check_clearance`],
//! [`read_bridge_sign`], [`plan_route`] and [`analyze_incident`].

mod bridge_query;
pub mod clearance_check;
mod consult;
pub mod incident;
mod location;
mod measurement;
pub mod prompts;
mod recommendation;
mod risk;
pub mod route_plan;
pub mod schemas;
pub mod sign_reading;
mod vision;
mod weather;

pub use bridge_query::BridgeQueryStage;
pub use clearance_check::{
    check_clearance, ClearanceAction, ClearanceAssessment, ClearanceCheck, ClearanceQuery, WillFit,
};
pub use consult::ConsultError;
pub use incident::{
    analyze_incident, DamageSeverity, IncidentAnalysis, IncidentAssessment, IncidentReport,
};
pub use location::LocationStage;
pub use measurement::MeasurementStage;
pub use recommendation::RecommendationStage;
pub use risk::RiskStage;
pub use route_plan::{plan_route, RouteCheck, RoutePlan, RoutePlanReport, RouteRequest};
pub use sign_reading::{read_bridge_sign, SignCondition, SignReading, SignReport};
pub use vision::VisionStage;
pub use weather::WeatherStage;

use std::sync::Arc;

use guardian_core::{ExecutionContext, PipelineConfig, PipelineRunner, RunInput, RunState, Stage};
use guardian_reasoning::ReasoningService;
use guardian_tools::ToolSet;
use tracing::info;

/// External collaborators shared by every run.
#[derive(Clone)]
pub struct Services {
    pub reasoning: Arc<dyn ReasoningService>,
    pub tools: ToolSet,
}

impl Services {
    pub fn new(reasoning: Arc<dyn ReasoningService>, tools: ToolSet) -> Self {
        Self { reasoning, tools }
    }
}

/// The seven stages in their fixed order.
pub fn standard_stages(services: &Services) -> Vec<Box<dyn Stage>> {
    vec![
        Box::new(VisionStage::new(services.reasoning.clone())),
        Box::new(MeasurementStage::new(
            services.reasoning.clone(),
            services.tools.vehicles.clone(),
        )),
        Box::new(LocationStage::new(services.tools.geocoder.clone())),
        Box::new(BridgeQueryStage::new(services.tools.bridges.clone())),
        Box::new(WeatherStage::new(services.tools.weather.clone())),
        Box::new(RiskStage::new(services.reasoning.clone())),
        Box::new(RecommendationStage::new(services.reasoning.clone())),
    ]
}

pub fn standard_pipeline(services: &Services) -> PipelineRunner {
    PipelineRunner::new(standard_stages(services))
}

/// Run the full pipeline once. An absent location falls back to the
/// configured default; the returned state carries every finding, log entry
/// and error.
pub async fn run_pipeline(
    mut input: RunInput,
    services: &Services,
    config: &PipelineConfig,
) -> RunState {
    if input.location.is_none() {
        input.location = Some(config.default_location.clone());
    }
    let ctx = ExecutionContext::new(config);
    info!(
        model = services.reasoning.model(),
        location = input.location.as_deref().unwrap_or_default(),
        has_image = input.image.is_some(),
        "starting analysis"
    );
    standard_pipeline(services)
        .run(RunState::new(input), &ctx)
        .await
}
