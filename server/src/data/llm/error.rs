//! LLM backend error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("LLM request timed out after {0}s")]
    Timeout(u64),

    #[error("LLM connection error: {0}")]
    Connection(String),

    #[error("LLM returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Invalid LLM response: {0}")]
    InvalidResponse(String),

    #[error("LLM client configuration error: {0}")]
    Config(String),
}

impl LlmError {
    /// Timeouts consume an attempt; every other failure is terminal
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}
