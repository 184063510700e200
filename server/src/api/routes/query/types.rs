//! Query API request types

use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

/// Request body for `POST /query`
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct QueryRequest {
    /// Natural-language description of the rows to keep
    #[validate(length(max = 4000, message = "Query must be at most 4000 characters"))]
    pub query: String,

    /// Rows to filter; each row is a JSON object keyed by column name
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Value>,
}
