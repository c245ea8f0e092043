//! Stage Trait: one contract for all seven pipeline stages
//!
//! A stage never mutates the run state. It reads the state and returns a
//! [`StagePatch`] for the single findings group it owns; the runner applies
//! the patch and does all log/error bookkeeping.
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::context::ExecutionContext;
use crate::data_model::{
    BridgeFindings, LocationFindings, MeasurementFindings, RecommendationFindings, RiskFindings,
    RunState, VisionFindings, WeatherFindings,
};
use crate::error::GuardianError;

#[async_trait]
pub trait Stage: Send + Sync {
    /// Stable id recorded in the execution log (ex: "vision")
    fn id(&self) -> &'static str;

    /// Human label used as the error prefix (ex: "Vision")
    fn label(&self) -> &'static str;

    /// Executes the stage
    async fn execute(
        &self,
        state: &RunState,
        ctx: &ExecutionContext,
    ) -> Result<StageOutput, StageError>;
}

/// Replacement value for the findings group owned by one stage.
#[derive(Debug, Clone, PartialEq)]
pub enum StagePatch {
    Vision(VisionFindings),
    Measurement(MeasurementFindings),
    Location(LocationFindings),
    Bridges(BridgeFindings),
    Weather(WeatherFindings),
    Risk(RiskFindings),
    Recommendation(RecommendationFindings),
}

impl RunState {
    pub(crate) fn apply(&mut self, patch: StagePatch) {
        match patch {
            StagePatch::Vision(v) => self.vision = v,
            StagePatch::Measurement(m) => self.measurement = m,
            StagePatch::Location(l) => self.location = l,
            StagePatch::Bridges(b) => self.bridges = b,
            StagePatch::Weather(w) => self.weather = w,
            StagePatch::Risk(r) => self.risk = r,
            StagePatch::Recommendation(r) => self.recommendation = r,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StageOutput {
    pub patch: StagePatch,
    /// Outcome description for the execution log
    pub action: String,
    /// Structured payload for the execution log
    pub result: Option<Value>,
}

impl StageOutput {
    pub fn new(patch: StagePatch, action: impl Into<String>) -> Self {
        Self {
            patch,
            action: action.into(),
            result: None,
        }
    }

    pub fn with_result(mut self, result: Value) -> Self {
        self.result = Some(result);
        self
    }

    /// Attach any serializable value as the log payload.
    pub fn with_payload<T: Serialize>(mut self, payload: &T) -> Self {
        self.result = serde_json::to_value(payload).ok();
        self
    }
}

#[derive(Debug, Error)]
pub enum StageError {
    /// A required upstream field is absent. The stage is skipped, not failed.
    #[error("{message}")]
    MissingInput {
        message: String,
        sentinel: Option<StagePatch>,
    },

    /// The reasoning service or a lookup could not be reached or refused.
    #[error("{0}")]
    Service(String),

    #[error(transparent)]
    Response(#[from] GuardianError),
}

impl StageError {
    pub fn missing(message: impl Into<String>) -> Self {
        StageError::MissingInput {
            message: message.into(),
            sentinel: None,
        }
    }

    pub fn missing_with_sentinel(message: impl Into<String>, sentinel: StagePatch) -> Self {
        StageError::MissingInput {
            message: message.into(),
            sentinel: Some(sentinel),
        }
    }

    pub fn service(err: impl std::fmt::Display) -> Self {
        StageError::Service(err.to_string())
    }
}
