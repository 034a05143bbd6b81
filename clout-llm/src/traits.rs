use async_trait::async_trait;
use clout_common::Result;
use serde_json::{Map, Value};

use crate::json::parse_json_object;

/// One system + user exchange sent to a chat completion endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub system: String,
    pub user: String,
    /// Overrides the client's configured model for this call.
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            model: None,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Send the request and return the model's text reply.
    ///
    /// Fails when the transport fails, the service answers non-2xx, or the
    /// body carries no textual completion. No retries are attempted.
    async fn chat(&self, request: ChatRequest) -> Result<String>;

    /// Get the model name being used
    fn model_name(&self) -> &str;

    /// Chat, then pull the first JSON object out of the reply.
    async fn chat_json(&self, request: ChatRequest) -> Result<Map<String, Value>> {
        let text = self.chat(request).await?;
        tracing::debug!(reply = %text, "chat.reply");
        parse_json_object(&text)
    }
}
