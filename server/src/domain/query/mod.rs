//! Natural-language query pipeline
//!
//! - `prompt` - system instructions for the LLM
//! - `generator` - LLM calls with the correction loop
//! - `service` - the request-level handler

mod generator;
mod prompt;
mod service;

pub use generator::{FilterGenerationError, FilterGenerator};
pub use prompt::{CORRECTION_PROMPT, build_system_prompt};
pub use service::{QueryError, QueryService};
