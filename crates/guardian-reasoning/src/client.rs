//! OpenAI-compatible `/chat/completions` client
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span, Instrument};

use crate::config::ReasoningConfig;
use crate::error::{ReasoningError, Result};
use crate::service::{ReasoningRequest, ReasoningService};

// ============================================================================
// WIRE FORMAT
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: MessageContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    ImageUrl { image_url: ImageUrl },
    Text { text: String },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

fn build_message(request: ReasoningRequest) -> ChatMessage {
    let content = match request.image {
        Some(image) => MessageContent::Parts(vec![
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: image.data_url(),
                },
            },
            ContentPart::Text {
                text: request.prompt,
            },
        ]),
        None => MessageContent::Text(request.prompt),
    };
    ChatMessage {
        role: "user",
        content,
    }
}

fn first_completion(body: ChatResponse) -> Result<String> {
    body.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(ReasoningError::EmptyCompletion)
}

// ============================================================================
// CLIENT
// ============================================================================

/// Talks to any server implementing the chat-completions protocol.
///
/// No request timeout is set: multimodal completions can legitimately take
/// a long time.
pub struct ChatCompletionsClient {
    client: Client,
    url: String,
    model: String,
    api_key: String,
}

impl ChatCompletionsClient {
    pub fn new(config: &ReasoningConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| ReasoningError::NotConfigured("NVIDIA_API_KEY is not set".to_string()))?;
        Ok(Self {
            client: Client::new(),
            url: config.completions_url(),
            model: config.model.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl ReasoningService for ChatCompletionsClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: ReasoningRequest) -> Result<String> {
        let span = info_span!(
            "reasoning",
            model = %self.model,
            with_image = request.image.is_some(),
            max_tokens = request.max_tokens,
        );
        async move {
            let body = ChatRequest {
                model: &self.model,
                max_tokens: request.max_tokens,
                messages: vec![build_message(request)],
            };
            let response = self
                .client
                .post(&self.url)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ReasoningError::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            let reply: ChatResponse = response.json().await?;
            let text = first_completion(reply)?;
            debug!(chars = text.len(), "completion received");
            Ok(text)
        }
        .instrument(span)
        .await
    }
}
