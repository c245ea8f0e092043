//! Guardian Reasoning: the language-model backend the stages call
//!
//! Stages only see [`ReasoningService`]. [`ChatCompletionsClient`] is the
//! production backend; [`ScriptedService`] answers from canned replies.

use std::sync::Arc;

use tracing::warn;

pub mod client;
pub mod config;
pub mod error;
pub mod scripted;
pub mod service;

pub use client::ChatCompletionsClient;
pub use config::ReasoningConfig;
pub use error::{ReasoningError, Result};
pub use scripted::{ScriptedService, UnconfiguredService};
pub use service::{ReasoningRequest, ReasoningService, DEFAULT_MAX_TOKENS};

/// The chat client when an API key is configured, otherwise a service that
/// fails every call.
pub fn service_from_config(config: &ReasoningConfig) -> Arc<dyn ReasoningService> {
    match ChatCompletionsClient::new(config) {
        Ok(client) => Arc::new(client),
        Err(ReasoningError::NotConfigured(reason)) => {
            warn!(%reason, "reasoning calls will fail");
            Arc::new(UnconfiguredService::new(reason))
        }
        Err(err) => {
            warn!(error = %err, "reasoning calls will fail");
            Arc::new(UnconfiguredService::new(err.to_string()))
        }
    }
}
