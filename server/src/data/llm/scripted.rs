//! Scripted in-memory backend for tests

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::backend::LlmBackend;
use super::error::LlmError;
use super::types::CompletionRequest;

/// Replays queued results in order and records every request
///
/// Once the script runs out every call returns `Ok(None)`.
pub(crate) struct ScriptedBackend {
    script: Mutex<VecDeque<Result<Option<String>, LlmError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedBackend {
    pub(crate) fn new(script: Vec<Result<Option<String>, LlmError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Backend answering with the given texts, one per call
    pub(crate) fn replies(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(Some(t.to_string()))).collect())
    }

    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    pub(crate) fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<Option<String>, LlmError> {
        self.requests.lock().push(request.clone());
        self.script.lock().pop_front().unwrap_or(Ok(None))
    }

    fn backend_name(&self) -> &'static str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::llm::ChatMessage;

    fn request() -> CompletionRequest {
        CompletionRequest {
            messages: vec![ChatMessage::user("q")],
            temperature: 0.0,
            json_output: true,
        }
    }

    #[tokio::test]
    async fn test_replays_script_then_returns_none() {
        let backend = ScriptedBackend::replies(&["first"]);

        let first = backend.complete(&request()).await.unwrap();
        let second = backend.complete(&request()).await.unwrap();

        assert_eq!(first.as_deref(), Some("first"));
        assert!(second.is_none());
        assert_eq!(backend.calls(), 2);
        assert_eq!(backend.requests()[1].messages[0].content, "q");
    }
}
