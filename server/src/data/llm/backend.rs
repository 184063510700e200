//! LLM backend trait definition

use async_trait::async_trait;

use super::error::LlmError;
use super::types::CompletionRequest;

/// Chat completion backend
///
/// The production implementation talks to an OpenAI-compatible HTTP API;
/// tests substitute scripted backends.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Run one completion and return the assistant text
    ///
    /// Returns `Ok(None)` when the provider answered with no content.
    async fn complete(&self, request: &CompletionRequest) -> Result<Option<String>, LlmError>;

    /// Backend name for debugging/logging
    fn backend_name(&self) -> &'static str;
}
