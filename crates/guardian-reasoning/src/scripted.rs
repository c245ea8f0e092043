//! Canned-reply services for tests and dry runs.
use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{ReasoningError, Result};
use crate::service::{ReasoningRequest, ReasoningService};

/// Replies are matched to prompts by the first key the prompt contains;
/// each key holds a queue of replies consumed in order. Every request is
/// recorded.
#[derive(Default)]
pub struct ScriptedService {
    replies: Mutex<Vec<(String, VecDeque<Reply>)>>,
    requests: Mutex<Vec<ReasoningRequest>>,
}

enum Reply {
    Text(String),
    Fail(String),
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer prompts containing `key` with `text`.
    pub fn reply(self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.push(key.into(), Reply::Text(text.into()))
    }

    /// Fail prompts containing `key` with a service error carrying `message`.
    pub fn fail(self, key: impl Into<String>, message: impl Into<String>) -> Self {
        self.push(key.into(), Reply::Fail(message.into()))
    }

    fn push(self, key: String, reply: Reply) -> Self {
        if let Ok(mut replies) = self.replies.lock() {
            match replies.iter_mut().find(|(k, _)| *k == key) {
                Some((_, queue)) => queue.push_back(reply),
                None => replies.push((key, VecDeque::from([reply]))),
            }
        }
        self
    }

    pub fn requests(&self) -> Vec<ReasoningRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ReasoningService for ScriptedService {
    fn model(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ReasoningRequest) -> Result<String> {
        let reply = {
            let mut replies = self
                .replies
                .lock()
                .map_err(|_| ReasoningError::NotConfigured("script lock poisoned".to_string()))?;
            replies
                .iter_mut()
                .find(|(key, _)| request.prompt.contains(key.as_str()))
                .and_then(|(_, queue)| queue.pop_front())
        };
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        match reply {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Fail(message)) => Err(ReasoningError::Status {
                status: 503,
                body: message,
            }),
            None => Err(ReasoningError::EmptyCompletion),
        }
    }
}

/// Stands in when no credentials are configured. Every call fails, so the
/// reasoning stages record errors while lookups still run.
#[derive(Debug, Clone, Default)]
pub struct UnconfiguredService {
    reason: String,
}

impl UnconfiguredService {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl ReasoningService for UnconfiguredService {
    fn model(&self) -> &str {
        "unconfigured"
    }

    async fn complete(&self, _request: ReasoningRequest) -> Result<String> {
        Err(ReasoningError::NotConfigured(self.reason.clone()))
    }
}
