//! Domain logic for natural-language data filtering
//!
//! - `filters` - filter DSL, LLM output parsing, and row evaluation
//! - `query` - prompt building, filter generation, and query handling

pub mod filters;
pub mod query;

pub use query::{QueryError, QueryService};
