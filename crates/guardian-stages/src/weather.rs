use std::sync::Arc;

use async_trait::async_trait;
use guardian_core::{
    ExecutionContext, RunState, Stage, StageError, StageOutput, StagePatch, WeatherFindings,
};
use guardian_tools::WeatherSource;

/// Current conditions and the clearance adjustment they imply.
pub struct WeatherStage {
    weather: Arc<dyn WeatherSource>,
}

impl WeatherStage {
    pub fn new(weather: Arc<dyn WeatherSource>) -> Self {
        Self { weather }
    }
}

#[async_trait]
impl Stage for WeatherStage {
    fn id(&self) -> &'static str {
        "weather"
    }

    fn label(&self) -> &'static str {
        "Weather"
    }

    async fn execute(
        &self,
        state: &RunState,
        _ctx: &ExecutionContext,
    ) -> Result<StageOutput, StageError> {
        let at = state.location.coordinates.ok_or_else(|| {
            StageError::missing("No location coordinates - cannot check weather")
        })?;

        let found = self
            .weather
            .conditions_at(at)
            .await
            .map_err(|e| StageError::service(format!("Weather check failed: {}", e)))?;

        let conditions = &found.value;
        let temperature = conditions
            .temperature
            .map(|t| format!("{}°F", t))
            .unwrap_or_else(|| "temperature n/a".to_string());
        let action = format!("Weather: {} ({})", conditions.condition, temperature);

        let findings = WeatherFindings {
            conditions: Some(conditions.clone()),
            clearance_adjustment_inches: Some(conditions.clearance_impact_inches),
            warnings: Some(conditions.warnings.clone()),
            source: Some(found.source.clone()),
        };
        Ok(StageOutput::new(StagePatch::Weather(findings), action).with_payload(&found))
    }
}
