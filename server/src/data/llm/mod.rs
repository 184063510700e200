//! LLM oracle access
//!
//! `LlmBackend` is the seam between filter generation and the model
//! provider. `OpenAiClient` is the production implementation.

mod backend;
mod error;
mod openai;
#[cfg(test)]
mod scripted;
mod types;

pub use backend::LlmBackend;
pub use error::LlmError;
pub use openai::OpenAiClient;
#[cfg(test)]
pub(crate) use scripted::ScriptedBackend;
pub use types::{ChatMessage, ChatRole, CompletionRequest};
