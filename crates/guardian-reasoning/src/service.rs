//! The contract every reasoning backend implements.
use async_trait::async_trait;
use guardian_core::ImageInput;

use crate::error::Result;

pub const DEFAULT_MAX_TOKENS: u32 = 1500;

/// One prompt, optionally with an image, and a completion budget.
#[derive(Debug, Clone, PartialEq)]
pub struct ReasoningRequest {
    pub prompt: String,
    pub image: Option<ImageInput>,
    pub max_tokens: u32,
}

impl ReasoningRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image: None,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_image(mut self, image: ImageInput) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Free text in, free text out. Callers parse the reply themselves.
#[async_trait]
pub trait ReasoningService: Send + Sync {
    fn model(&self) -> &str;

    async fn complete(&self, request: ReasoningRequest) -> Result<String>;
}
