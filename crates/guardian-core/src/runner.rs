//! Pipeline Runner: runs stages in order and owns the log/error bookkeeping
use std::time::Instant;

use tracing::{info, info_span, warn, Instrument};

use crate::context::ExecutionContext;
use crate::data_model::RunState;
use crate::stage::{Stage, StageError};

pub struct PipelineRunner {
    stages: Vec<Box<dyn Stage>>,
    pipeline_id: String,
}

impl PipelineRunner {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        let pipeline_id = stages
            .iter()
            .map(|s| s.id())
            .collect::<Vec<_>>()
            .join("→");

        Self { stages, pipeline_id }
    }

    /// Run every stage once, in order. Stage failures are recorded in the
    /// returned state; they never stop the run.
    pub async fn run(&self, state: RunState, ctx: &ExecutionContext) -> RunState {
        let span = info_span!("pipeline", pipeline = %self.pipeline_id, run_id = %state.run_id);
        async move {
            info!("run started");
            let mut state = state;
            for stage in &self.stages {
                state = run_stage(stage.as_ref(), state, ctx).await;
            }
            info!(
                errors = state.errors().len(),
                log_entries = state.execution_log().len(),
                "run finished"
            );
            state
        }
        .instrument(span)
        .await
    }

    pub fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    pub fn stage_ids(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

/// Run a single stage: exactly one log entry, at most one error.
pub async fn run_stage(stage: &dyn Stage, mut state: RunState, ctx: &ExecutionContext) -> RunState {
    let span = info_span!("stage", stage = stage.id());
    async move {
        info!("starting");
        let start = Instant::now();
        let outcome = stage.execute(&state, ctx).await;
        let duration = start.elapsed().as_secs_f64();

        match outcome {
            Ok(output) => {
                info!(action = %output.action, duration, "completed");
                state.apply(output.patch);
                state
                    .log_mut()
                    .record(stage.id(), output.action, duration, output.result);
            }
            Err(StageError::MissingInput { message, sentinel }) => {
                warn!(%message, "skipped: missing input");
                if let Some(patch) = sentinel {
                    state.apply(patch);
                }
                state
                    .log_mut()
                    .record(stage.id(), format!("Skipped: {}", message), duration, None);
                state.push_error(message);
            }
            Err(err) => {
                warn!(error = %err, duration, "failed");
                state.push_error(format!("{} error: {}", stage.label(), err));
                state
                    .log_mut()
                    .record(stage.id(), format!("Failed: {}", err), duration, None);
            }
        }
        state
    }
    .instrument(span)
    .await
}
