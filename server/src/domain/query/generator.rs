//! AI filter generation with a conversational correction loop

use std::sync::Arc;

use thiserror::Error;

use super::prompt::{CORRECTION_PROMPT, build_system_prompt};
use crate::core::config::{ExhaustionPolicy, LlmConfig};
use crate::data::llm::{ChatMessage, CompletionRequest, LlmBackend, LlmError};
use crate::domain::filters::{FilterSet, parse_filter_response};

#[derive(Error, Debug)]
pub enum FilterGenerationError {
    #[error("AI failed to generate valid filters after {attempts} attempts")]
    Exhausted { attempts: u32 },

    #[error("AI service error: {0}")]
    Backend(#[source] LlmError),
}

/// Translates a natural-language query into a `FilterSet`
///
/// Each attempt sends the whole conversation. Unparseable output is echoed
/// back as an assistant turn followed by a correction request, so the next
/// attempt sees its own mistake. Empty responses and timeouts consume an
/// attempt without changing the conversation.
pub struct FilterGenerator {
    backend: Arc<dyn LlmBackend>,
    max_attempts: u32,
    on_exhausted: ExhaustionPolicy,
    debug: bool,
}

impl FilterGenerator {
    pub fn new(
        backend: Arc<dyn LlmBackend>,
        max_attempts: u32,
        on_exhausted: ExhaustionPolicy,
    ) -> Self {
        Self {
            backend,
            max_attempts: max_attempts.max(1),
            on_exhausted,
            debug: false,
        }
    }

    /// Log prompts and raw model output at info level
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn from_config(backend: Arc<dyn LlmBackend>, config: &LlmConfig) -> Self {
        Self::new(backend, config.max_attempts, config.on_exhausted)
    }

    pub async fn generate(
        &self,
        query: &str,
        headers: &[String],
    ) -> Result<FilterSet, FilterGenerationError> {
        let mut request = CompletionRequest {
            messages: vec![
                ChatMessage::system(build_system_prompt(headers)),
                ChatMessage::user(query),
            ],
            temperature: 0.0,
            json_output: true,
        };
        if self.debug {
            tracing::info!(query, prompt = %request.messages[0].content, "Filter generation prompt");
        }

        for attempt in 1..=self.max_attempts {
            let text = match self.backend.complete(&request).await {
                Ok(Some(text)) => text,
                Ok(None) => {
                    tracing::warn!(attempt, "AI returned an empty response");
                    continue;
                }
                Err(err) if err.is_timeout() => {
                    tracing::warn!(attempt, error = %err, "AI request timed out");
                    continue;
                }
                Err(err) => return self.on_backend_error(err),
            };
            if self.debug {
                tracing::info!(attempt, response = %text, "AI response");
            }

            match parse_filter_response(&text) {
                Ok(filters) => {
                    tracing::debug!(attempt, filters = filters.len(), "Generated filters");
                    return Ok(filters);
                }
                Err(err) => {
                    tracing::warn!(attempt, error = %err, "AI returned unusable output");
                    request.messages.push(ChatMessage::assistant(text));
                    request.messages.push(ChatMessage::user(CORRECTION_PROMPT));
                }
            }
        }

        match self.on_exhausted {
            ExhaustionPolicy::Fail => Err(FilterGenerationError::Exhausted {
                attempts: self.max_attempts,
            }),
            ExhaustionPolicy::Unfiltered => {
                tracing::warn!(
                    attempts = self.max_attempts,
                    "No usable filters from AI, returning unfiltered data"
                );
                Ok(FilterSet::default())
            }
        }
    }

    fn on_backend_error(&self, err: LlmError) -> Result<FilterSet, FilterGenerationError> {
        match self.on_exhausted {
            ExhaustionPolicy::Fail => Err(FilterGenerationError::Backend(err)),
            ExhaustionPolicy::Unfiltered => {
                tracing::warn!(
                    backend = self.backend.backend_name(),
                    error = %err,
                    "AI service failed, returning unfiltered data"
                );
                Ok(FilterSet::default())
            }
        }
    }
}
