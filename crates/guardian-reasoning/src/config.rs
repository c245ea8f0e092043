use guardian_core::config::env_var;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://integrate.api.nvidia.com/v1";
pub const DEFAULT_MODEL: &str = "nvidia/llama-3.1-nemotron-70b-instruct-v1";

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key: None,
        }
    }
}

// Keeps the key out of logs.
impl std::fmt::Debug for ReasoningConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReasoningConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ReasoningConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: env_var("GUARDIAN_REASONING_URL").unwrap_or_else(default_base_url),
            model: env_var("GUARDIAN_REASONING_MODEL").unwrap_or_else(default_model),
            api_key: env_var("NVIDIA_API_KEY"),
        }
    }

    /// `<base_url>/chat/completions`, tolerant of a trailing slash.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}
