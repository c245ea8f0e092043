use std::sync::Arc;

use async_trait::async_trait;
use guardian_core::{
    BridgeFindings, ExecutionContext, RunState, Stage, StageError, StageOutput, StagePatch,
};
use guardian_tools::BridgeSource;
use serde_json::json;

/// Finds bridges with posted clearances around the resolved location.
pub struct BridgeQueryStage {
    bridges: Arc<dyn BridgeSource>,
}

impl BridgeQueryStage {
    pub fn new(bridges: Arc<dyn BridgeSource>) -> Self {
        Self { bridges }
    }
}

#[async_trait]
impl Stage for BridgeQueryStage {
    fn id(&self) -> &'static str {
        "bridge_query"
    }

    fn label(&self) -> &'static str {
        "Bridge query"
    }

    async fn execute(
        &self,
        state: &RunState,
        ctx: &ExecutionContext,
    ) -> Result<StageOutput, StageError> {
        let at = state.location.coordinates.ok_or_else(|| {
            StageError::missing_with_sentinel(
                "No location coordinates - cannot query bridges",
                StagePatch::Bridges(BridgeFindings::empty()),
            )
        })?;

        let found = self
            .bridges
            .bridges_near(at, ctx.bridge_radius_km)
            .await
            .map_err(|e| StageError::service(format!("Bridge query failed: {}", e)))?;

        // count is what the source reported; the list itself is capped
        let count = found.value.len();
        let mut nearby = found.value;
        nearby.truncate(ctx.defaults.max_bridges);

        let reasoning = if found.source.is_fallback() {
            format!("Found {} bridges using fallback data ({})", count, found.source.name())
        } else {
            format!(
                "Found {} bridges within {} km using {}",
                count,
                ctx.bridge_radius_km,
                found.source.name()
            )
        };
        let payload = json!({
            "bridges_found": count,
            "bridges": nearby,
            "source": found.source,
            "note": found.note,
        });
        let findings = BridgeFindings {
            nearby: Some(nearby),
            count: Some(count),
            source: Some(found.source),
            reasoning: Some(reasoning),
        };
        Ok(
            StageOutput::new(StagePatch::Bridges(findings), format!("Found {} bridges", count))
                .with_result(payload),
        )
    }
}
