//! Filter conditions, LLM response parsing, and row evaluation

mod evaluate;
mod parser;
mod types;

pub use evaluate::{Dataset, DatasetError, Row, apply};
pub use parser::{ResponseParseError, parse_filter_response};
pub use types::{Condition, FilterSet, Operator, as_number};
