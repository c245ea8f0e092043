use guardian_core::GuardianError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} returned HTTP {status}")]
    Status { service: &'static str, status: u16 },

    #[error("{0} returned no results")]
    Empty(&'static str),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("invalid url: {0}")]
    Url(String),

    #[error(transparent)]
    Config(#[from] GuardianError),
}

pub type Result<T> = std::result::Result<T, ToolError>;
