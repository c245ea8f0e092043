use std::sync::Arc;

use async_trait::async_trait;
use guardian_core::{
    ExecutionContext, LocationFindings, RunState, Stage, StageError, StageOutput, StagePatch,
};
use guardian_tools::Geocoder;

/// Resolves the travel location to coordinates.
pub struct LocationStage {
    geocoder: Arc<dyn Geocoder>,
}

impl LocationStage {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self { geocoder }
    }
}

#[async_trait]
impl Stage for LocationStage {
    fn id(&self) -> &'static str {
        "location"
    }

    fn label(&self) -> &'static str {
        "Location"
    }

    async fn execute(
        &self,
        state: &RunState,
        _ctx: &ExecutionContext,
    ) -> Result<StageOutput, StageError> {
        let query = state
            .input
            .location
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| StageError::missing("No location provided"))?;

        let found = self
            .geocoder
            .geocode(query)
            .await
            .map_err(|e| StageError::service(format!("Location resolution failed: {}", e)))?;

        let coordinates = found.value.coordinates;
        let findings = LocationFindings {
            query: Some(query.to_string()),
            coordinates: Some(coordinates),
            place: Some(found.value.clone()),
            source: Some(found.source.clone()),
            note: found.note.clone(),
            reasoning: Some(format!(
                "Resolved '{}' to coordinates using {}",
                query,
                found.source.name()
            )),
        };
        let action = format!(
            "Location: ({:.4}, {:.4})",
            coordinates.latitude, coordinates.longitude
        );
        Ok(StageOutput::new(StagePatch::Location(findings), action).with_payload(&found))
    }
}
