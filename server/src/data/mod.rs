//! External data sources
//!
//! - `llm` - the LLM oracle that turns queries into filters

pub mod llm;
