//! Unified Error Model
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GuardianError {
    /// The service response held no parseable JSON.
    #[error("invalid JSON in response: {0}")]
    Parse(String),

    /// JSON parsed but did not match the expected shape or value ranges.
    #[error("response does not match schema: {0}")]
    Schema(String),

    #[error("invalid value {value:?} for {key}")]
    Config { key: String, value: String },
}

pub type Result<T> = std::result::Result<T, GuardianError>;
