//! End-to-end runs of the seven-stage pipeline against scripted services.

mod common;

use std::sync::Arc;

use common::*;
use guardian_core::{
    BridgeVerdict, Coordinates, LookupSource, PipelineConfig, RiskLevel, RunInput, RunState,
};
use guardian_reasoning::ScriptedService;
use guardian_stages::{run_pipeline, Services};
use guardian_tools::ToolSet;

const STAGES: [&str; 7] = [
    "vision",
    "measurement",
    "location",
    "bridge_query",
    "weather",
    "risk",
    "recommendation",
];

fn assert_one_entry_per_stage(state: &RunState) {
    let log = state.execution_log();
    assert_eq!(log.len(), STAGES.len());
    for (entry, stage) in log.entries().iter().zip(STAGES) {
        assert_eq!(entry.stage, stage);
        assert!(entry.duration_seconds >= 0.0);
    }
    for pair in log.entries().windows(2) {
        assert!(pair[0].timestamp <= pair[1].timestamp);
    }
}

// =============================================================================
// Full run
// =============================================================================

#[tokio::test]
async fn test_full_run_succeeds() {
    let reasoning = Arc::new(scripted_full_run());
    let services = offline_services(reasoning.clone());

    let state = run_pipeline(
        input_with_image("Boston, MA"),
        &services,
        &PipelineConfig::default(),
    )
    .await;

    assert!(state.errors().is_empty(), "errors: {:?}", state.errors());
    assert!(state.is_success());
    assert_one_entry_per_stage(&state);

    assert_eq!(state.vision.vehicle_detected, Some(true));
    assert_eq!(state.vision.confidence, Some(0.8));
    assert_eq!(state.vision.uncertainty_inches, Some(5.0));
    assert_eq!(state.vision.visual_detections.as_ref().map(Vec::len), Some(1));

    let specs = state.measurement.vehicle_specs.as_ref().unwrap();
    assert!(specs.found);
    assert_eq!(specs.vehicle_name, "U-Haul 15' Truck");
    assert_eq!(state.measurement.total_height_inches, Some(160.0));
    assert_eq!(state.measurement.uncertainty_inches, Some(2.0));

    assert_eq!(state.bridges.count, Some(3));
    assert_eq!(state.risk.risk_level, Some(RiskLevel::Critical));
    assert_eq!(state.risk.strike_probability, Some(0.95));
    let dangerous = state.risk.dangerous_bridges.as_ref().unwrap();
    assert_eq!(dangerous[0].risk_level, BridgeVerdict::Critical);

    assert_eq!(
        state.recommendation.avoid_routes.as_deref(),
        Some(&["Storrow Drive".to_string(), "Memorial Drive".to_string()][..])
    );
    assert!(state.recommendation.summary.is_some());

    let log = state.execution_log().entries();
    assert_eq!(log[0].action, "Identified: U-Haul 15' box truck");
    assert_eq!(log[1].action, "Calculated height: 160 inches");
    assert_eq!(log[5].action, "Risk: CRITICAL (2 dangerous bridges)");
    assert_eq!(log[0].result.as_ref().unwrap()["vehicle_detected"], true);
}

#[tokio::test]
async fn test_full_run_prompts_carry_upstream_findings() {
    let reasoning = Arc::new(scripted_full_run());
    let services = offline_services(reasoning.clone());

    run_pipeline(input_with_image("Boston, MA"), &services, &PipelineConfig::default()).await;

    let requests = reasoning.requests();
    assert_eq!(requests.len(), 4);

    assert!(requests[0].image.is_some());
    assert!(requests[1].image.is_none());
    assert!(requests[1].prompt.contains("Base height estimate: 120 inches"));
    assert!(requests[1].prompt.contains("U-Haul 15' Truck"));

    assert!(requests[2].prompt.contains("Height: 160 inches"));
    assert!(requests[2].prompt.contains("Storrow Drive Overpass"));
    assert!(requests[2].prompt.contains("WILL NOT FIT"));

    assert!(requests[3].prompt.contains("\"risk_level\": \"CRITICAL\""));
}

#[tokio::test]
async fn test_report_groups_by_stage() {
    let services = offline_services(Arc::new(scripted_full_run()));
    let state = run_pipeline(
        input_with_image("Chicago, IL"),
        &services,
        &PipelineConfig::default(),
    )
    .await;

    let report = serde_json::to_value(state.report()).unwrap();
    assert_eq!(report["success"], true);
    for group in [
        "vision",
        "measurement",
        "location",
        "bridges",
        "weather",
        "risk",
        "recommendation",
        "execution_log",
        "errors",
    ] {
        assert!(report.get(group).is_some(), "missing {}", group);
    }
    assert_eq!(report["location"]["place"]["place_name"], "Chicago, IL");
    assert_eq!(report["bridges"]["count"], 2);
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn test_no_image() {
    let reasoning = Arc::new(ScriptedService::new());
    let services = offline_services(reasoning.clone());
    let input = RunInput {
        image: None,
        location: Some("Boston, MA".to_string()),
    };

    let state = run_pipeline(input, &services, &PipelineConfig::default()).await;

    assert_eq!(state.vision.vehicle_detected, Some(false));
    assert!(state.measurement.total_height_inches.is_none());
    assert_eq!(state.risk.risk_level, Some(RiskLevel::Unknown));
    assert_eq!(state.risk.dangerous_bridges.as_deref(), Some(&[][..]));
    assert!(state.recommendation.recommendations.is_none());

    assert_eq!(
        state.errors(),
        [
            "No image provided",
            "No vehicle detected - cannot measure",
            "No vehicle height - cannot assess bridge risk",
            "Risk level unknown - cannot generate recommendations",
        ]
    );
    assert!(!state.is_success());
    assert_one_entry_per_stage(&state);
    assert!(reasoning.requests().is_empty());
}

#[tokio::test]
async fn test_boston_with_failing_primaries_uses_fallbacks() {
    let services = Services::new(Arc::new(ScriptedService::new()), failing_primaries());
    let input = RunInput {
        image: None,
        location: Some("Boston, MA".to_string()),
    };

    let state = run_pipeline(input, &services, &PipelineConfig::default()).await;

    assert_eq!(
        state.location.coordinates,
        Some(Coordinates::new(42.3601, -71.0589))
    );
    assert_eq!(
        state.location.source,
        Some(LookupSource::fallback("mock_geocoding"))
    );

    let bridges = state.bridges.nearby.as_ref().unwrap();
    assert_eq!(bridges.len(), 3);
    assert!(bridges.iter().any(|b| b.maxheight == "10'6\""));

    let conditions = state.weather.conditions.as_ref().unwrap();
    assert_eq!(conditions.condition, "Clear");
    assert_eq!(state.weather.clearance_adjustment_inches, Some(0));

    for stage in ["location", "bridge_query", "weather"] {
        let entries: Vec<_> = state.execution_log().for_stage(stage).collect();
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].action.starts_with("Failed"), "{} failed", stage);
    }
    assert!(state
        .errors()
        .iter()
        .all(|e| !e.contains("Location") && !e.contains("Bridge") && !e.contains("Weather")));
}

#[tokio::test]
async fn test_mid_flight_failure_is_recorded_and_run_continues() {
    let reasoning = Arc::new(
        ScriptedService::new()
            .reply(VISION_KEY, VISION_REPLY)
            .reply(MEASUREMENT_KEY, MEASUREMENT_REPLY)
            .fail(RISK_KEY, "connection reset by peer"),
    );
    let services = offline_services(reasoning);

    let state = run_pipeline(
        input_with_image("Boston, MA"),
        &services,
        &PipelineConfig::default(),
    )
    .await;

    let risk: Vec<_> = state.execution_log().for_stage("risk").collect();
    assert_eq!(risk.len(), 1);
    assert!(risk[0].action.starts_with("Failed: "));
    assert!(risk[0].action.contains("connection reset by peer"));
    assert!(risk[0].result.is_none());

    assert_eq!(state.errors().len(), 2);
    assert!(state.errors()[0].starts_with("Risk assessment error: "));
    assert!(state.errors()[0].contains("connection reset by peer"));
    assert_eq!(
        state.errors()[1],
        "Risk level unknown - cannot generate recommendations"
    );

    // earlier findings survive, the failed group is untouched
    assert_eq!(state.measurement.total_height_inches, Some(160.0));
    assert!(state.risk.risk_level.is_none());
    assert_one_entry_per_stage(&state);
}

#[tokio::test]
async fn test_unparseable_vision_reply() {
    let reasoning = Arc::new(
        ScriptedService::new().reply(VISION_KEY, "I'm sorry, I can't see a vehicle here."),
    );
    let services = offline_services(reasoning);

    let state = run_pipeline(
        input_with_image("Boston, MA"),
        &services,
        &PipelineConfig::default(),
    )
    .await;

    assert!(state.errors()[0].starts_with("Vision error: invalid JSON in response"));
    assert_eq!(state.errors()[1], "No vehicle detected - cannot measure");
    assert!(state.vision.vehicle_detected.is_none());
    assert_one_entry_per_stage(&state);
}

#[tokio::test]
async fn test_schema_violation_is_a_failure() {
    let reasoning = Arc::new(
        ScriptedService::new()
            .reply(VISION_KEY, VISION_REPLY)
            .reply(MEASUREMENT_KEY, r#"{"total_height_inches": "about eleven feet"}"#),
    );
    let services = offline_services(reasoning);

    let state = run_pipeline(
        input_with_image("Boston, MA"),
        &services,
        &PipelineConfig::default(),
    )
    .await;

    assert!(state.errors()[0].starts_with("Measurement error: response does not match schema"));
    assert!(state.measurement.vehicle_specs.is_none());
}

#[tokio::test]
async fn test_empty_bridge_list_is_safe_without_a_call() {
    let reasoning = Arc::new(
        ScriptedService::new()
            .reply(VISION_KEY, VISION_REPLY)
            .reply(MEASUREMENT_KEY, MEASUREMENT_REPLY)
            .reply(RECOMMENDATION_KEY, RECOMMENDATION_REPLY),
    );
    let mut tools = ToolSet::offline();
    tools.bridges = Arc::new(NoBridges);
    let services = Services::new(reasoning.clone(), tools);

    let state = run_pipeline(
        input_with_image("Boston, MA"),
        &services,
        &PipelineConfig::default(),
    )
    .await;

    assert!(state.is_success(), "errors: {:?}", state.errors());
    assert_eq!(state.bridges.count, Some(0));
    assert_eq!(state.risk.risk_level, Some(RiskLevel::Safe));
    assert_eq!(state.risk.strike_probability, Some(0.0));
    assert!(reasoning
        .requests()
        .iter()
        .all(|r| !r.prompt.contains(RISK_KEY)));
    assert!(state.recommendation.recommendations.is_some());
}

#[tokio::test]
async fn test_bridge_list_is_capped() {
    let mut tools = ToolSet::offline();
    tools.bridges = Arc::new(ManyBridges(25));
    let services = Services::new(Arc::new(ScriptedService::new()), tools);

    let state = run_pipeline(
        input_with_image("Boston, MA"),
        &services,
        &PipelineConfig::default(),
    )
    .await;

    assert_eq!(state.bridges.count, Some(25));
    assert_eq!(state.bridges.nearby.as_ref().map(Vec::len), Some(10));
}

#[tokio::test]
async fn test_missing_location_uses_configured_default() {
    let config = PipelineConfig {
        default_location: "Chicago, IL".to_string(),
        ..PipelineConfig::default()
    };
    let services = offline_services(Arc::new(ScriptedService::new()));

    let state = run_pipeline(RunInput::default(), &services, &config).await;

    assert_eq!(state.input.location.as_deref(), Some("Chicago, IL"));
    assert_eq!(
        state.location.coordinates,
        Some(Coordinates::new(41.8781, -87.6298))
    );
}
