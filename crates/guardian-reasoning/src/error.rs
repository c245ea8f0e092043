use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReasoningError {
    #[error("reasoning request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("reasoning service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("reasoning service returned no content")]
    EmptyCompletion,

    #[error("reasoning service is not configured: {0}")]
    NotConfigured(String),
}

pub type Result<T> = std::result::Result<T, ReasoningError>;
