use crate::traits::{ChatClient, ChatRequest};
use async_trait::async_trait;
use clout_common::{CloutError, Result};
use clout_http::{HttpClient, HttpError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Client for an OpenAI-compatible `chat/completions` endpoint.
pub struct OpenAiChatClient {
    client: HttpClient,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiChatClient {
    /// Create a client for the given credential, model and base endpoint.
    ///
    /// A blank credential is a configuration error.
    pub fn new(api_key: &str, model: impl Into<String>, endpoint: &str) -> Result<Self> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(CloutError::Config("no API key configured".into()));
        }
        let client = HttpClient::new(endpoint)
            .map_err(|e| CloutError::Config(format!("HttpClient init failed: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            model: model.into(),
        })
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.client = self.client.with_timeout(timeout);
        self
    }
}

#[async_trait]
impl ChatClient for OpenAiChatClient {
    async fn chat(&self, request: ChatRequest) -> Result<String> {
        let model = request.model.as_deref().unwrap_or(&self.model);
        let body = ChatCompletionRequest {
            model,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
        };

        tracing::debug!(model, max_tokens = ?request.max_tokens, "openai.chat");

        let resp: ChatCompletionResponse = self
            .client
            .post_json("chat/completions", Some(self.api_key.as_str()), &body)
            .await
            .map_err(http_to_clout)?;

        resp.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| {
                CloutError::MalformedResponse("response has no choices[0].message.content".into())
            })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn http_to_clout(e: HttpError) -> CloutError {
    match e {
        HttpError::Decode(..) => CloutError::MalformedResponse(e.to_string()),
        other => CloutError::Remote(other.to_string()),
    }
}
