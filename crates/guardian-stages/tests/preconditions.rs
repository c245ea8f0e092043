//! Each stage run alone against a state missing its required input.

mod common;

use std::sync::Arc;

use common::*;
use guardian_core::{
    run_stage, Bridge, BridgeFindings, Coordinates, ExecutionContext, LookupSource,
    MeasurementFindings, RiskLevel, RunInput, RunState, Stage, VisionFindings,
};
use guardian_reasoning::ScriptedService;
use guardian_stages::standard_stages;

async fn run_alone(stage: &dyn Stage, state: RunState) -> RunState {
    run_stage(stage, state, &ExecutionContext::default()).await
}

fn stage_named(id: &str, reasoning: Arc<ScriptedService>) -> Box<dyn Stage> {
    standard_stages(&offline_services(reasoning))
        .into_iter()
        .find(|s| s.id() == id)
        .unwrap()
}

#[tokio::test]
async fn test_every_stage_records_one_error_on_empty_state() {
    let reasoning = Arc::new(ScriptedService::new());
    for stage in standard_stages(&offline_services(reasoning.clone())) {
        let state = RunState::new(RunInput::default());
        let state = run_alone(stage.as_ref(), state).await;

        assert_eq!(state.errors().len(), 1, "stage {}", stage.id());
        assert_eq!(state.execution_log().len(), 1, "stage {}", stage.id());
        let entry = &state.execution_log().entries()[0];
        assert_eq!(entry.stage, stage.id());
        assert!(entry.action.starts_with("Skipped: "), "stage {}", stage.id());
    }
    assert!(reasoning.requests().is_empty());
}

#[tokio::test]
async fn test_vision_sentinel() {
    let stage = stage_named("vision", Arc::new(ScriptedService::new()));
    let state = run_alone(stage.as_ref(), RunState::new(RunInput::default())).await;
    assert_eq!(state.vision, VisionFindings::not_detected());
    assert_eq!(state.errors(), ["No image provided"]);
}

#[tokio::test]
async fn test_measurement_requires_detected_vehicle() {
    let stage = stage_named("measurement", Arc::new(ScriptedService::new()));
    let mut state = RunState::new(RunInput::default());
    state.vision = VisionFindings::not_detected();

    let state = run_alone(stage.as_ref(), state).await;
    assert_eq!(state.errors(), ["No vehicle detected - cannot measure"]);
    assert_eq!(state.measurement, MeasurementFindings::default());
}

#[tokio::test]
async fn test_blank_location() {
    let stage = stage_named("location", Arc::new(ScriptedService::new()));
    let state = RunState::new(RunInput {
        image: None,
        location: Some("   ".to_string()),
    });

    let state = run_alone(stage.as_ref(), state).await;
    assert_eq!(state.errors(), ["No location provided"]);
    assert!(state.location.coordinates.is_none());
}

#[tokio::test]
async fn test_bridge_query_sentinel() {
    let stage = stage_named("bridge_query", Arc::new(ScriptedService::new()));
    let state = run_alone(stage.as_ref(), RunState::new(RunInput::default())).await;
    assert_eq!(state.bridges, BridgeFindings::empty());
    assert_eq!(
        state.errors(),
        ["No location coordinates - cannot query bridges"]
    );
}

#[tokio::test]
async fn test_risk_treats_bridge_sentinel_as_missing() {
    let reasoning = Arc::new(ScriptedService::new());
    let stage = stage_named("risk", reasoning.clone());
    let mut state = RunState::new(RunInput::default());
    state.measurement.total_height_inches = Some(140.0);
    state.bridges = BridgeFindings::empty();

    let state = run_alone(stage.as_ref(), state).await;
    assert_eq!(state.risk.risk_level, Some(RiskLevel::Unknown));
    assert_eq!(
        state.errors(),
        ["No bridge data - cannot assess bridge risk"]
    );
    assert!(reasoning.requests().is_empty());
}

#[tokio::test]
async fn test_risk_defaults_when_fields_absent() {
    let reasoning = Arc::new(ScriptedService::new().reply(RISK_KEY, r#"{"dangerous_bridges": []}"#));
    let stage = stage_named("risk", reasoning.clone());
    let mut state = RunState::new(RunInput::default());
    state.measurement.total_height_inches = Some(140.0);
    state.bridges = BridgeFindings {
        nearby: Some(vec![Bridge::new("1", "BU Bridge", "14'0\"")]),
        count: Some(1),
        source: Some(LookupSource::fallback("mock_data_fallback")),
        reasoning: None,
    };

    let state = run_alone(stage.as_ref(), state).await;
    assert!(state.errors().is_empty());
    assert_eq!(state.risk.risk_level, Some(RiskLevel::Unknown));
    assert_eq!(state.risk.strike_probability, Some(0.0));

    // uncertainty falls back to the measurement default of 3 inches
    let prompt = &reasoning.requests()[0].prompt;
    assert!(prompt.contains("Uncertainty: +/-3 inches"));
    assert!(prompt.contains("Weather impact: 0 inches"));
}

#[tokio::test]
async fn test_recommendation_requires_known_risk() {
    let stage = stage_named("recommendation", Arc::new(ScriptedService::new()));
    let mut state = RunState::new(RunInput::default());
    state.risk.risk_level = Some(RiskLevel::Unknown);

    let state = run_alone(stage.as_ref(), state).await;
    assert_eq!(
        state.errors(),
        ["Risk level unknown - cannot generate recommendations"]
    );
}

#[tokio::test]
async fn test_weather_requires_coordinates() {
    let stage = stage_named("weather", Arc::new(ScriptedService::new()));
    let state = run_alone(stage.as_ref(), RunState::new(RunInput::default())).await;
    assert_eq!(state.errors(), ["No location coordinates - cannot check weather"]);

    let mut located = RunState::new(RunInput::default());
    located.location.coordinates = Some(Coordinates::new(42.3601, -71.0589));
    let located = run_alone(stage.as_ref(), located).await;
    assert!(located.errors().is_empty());
    assert_eq!(located.weather.clearance_adjustment_inches, Some(0));
}
