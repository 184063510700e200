//! OpenAI-compatible chat completions client
//!
//! Works against Groq, OpenAI, and local runtimes exposing
//! `POST {base_url}/chat/completions`.

use std::time::Duration;

use async_trait::async_trait;

use super::backend::LlmBackend;
use super::error::LlmError;
use super::types::{ChatCompletionBody, ChatCompletionResponse, CompletionRequest, ResponseFormat};
use crate::core::config::LlmConfig;
use crate::core::constants::LLM_CONNECT_TIMEOUT_SECS;
use crate::core::secret::Secret;

/// Maximum number of error body characters kept in `LlmError::Http`
const MAX_ERROR_BODY_CHARS: usize = 512;

/// HTTP client for an OpenAI-compatible endpoint
///
/// Built once at startup and shared across requests.
pub struct OpenAiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Secret,
    timeout_secs: u64,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(LLM_CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(format!("QueryGenie/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LlmError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", config.base_url),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn map_send_error(&self, err: reqwest::Error) -> LlmError {
        if err.is_timeout() {
            LlmError::Timeout(self.timeout_secs)
        } else {
            LlmError::Connection(err.to_string())
        }
    }
}

#[async_trait]
impl LlmBackend for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Option<String>, LlmError> {
        let body = ChatCompletionBody {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            response_format: request.json_output.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        tracing::trace!(
            endpoint = %self.endpoint,
            model = %self.model,
            messages = request.messages.len(),
            "Sending chat completion"
        );

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(LlmError::Http {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let parsed: ChatCompletionResponse = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout(self.timeout_secs)
            } else {
                LlmError::InvalidResponse(e.to_string())
            }
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty());

        Ok(content)
    }

    fn backend_name(&self) -> &'static str {
        "openai-compatible"
    }
}
