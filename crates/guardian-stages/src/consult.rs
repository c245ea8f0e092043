//! Single-shot reasoning calls made outside the pipeline.
//!
//! Each standalone check sends one prompt (sometimes with a photo) and parses
//! the reply into its own [`ResponseSchema`] type. Unlike stages, failures
//! propagate to the caller.
use guardian_core::{parse_response, GuardianError, ImageInput, ResponseSchema};
use guardian_reasoning::{ReasoningError, ReasoningRequest, ReasoningService};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info_span, Instrument};

#[derive(Debug, Error)]
pub enum ConsultError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Reasoning(#[from] ReasoningError),

    #[error(transparent)]
    Response(#[from] GuardianError),
}

pub(crate) fn require_image(image: &ImageInput) -> Result<(), ConsultError> {
    if image.data.trim().is_empty() {
        return Err(ConsultError::InvalidRequest("image is empty".to_string()));
    }
    Ok(())
}

pub(crate) async fn consult<T: ResponseSchema>(
    reasoning: &dyn ReasoningService,
    task: &'static str,
    request: ReasoningRequest,
) -> Result<(T, Value), ConsultError> {
    let span = info_span!("consult", task, model = reasoning.model());
    async {
        let reply = reasoning.complete(request).await?;
        debug!(chars = reply.len(), "reply received");
        Ok::<_, ConsultError>(parse_response::<T>(&reply)?)
    }
    .instrument(span)
    .await
}
