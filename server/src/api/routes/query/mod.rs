//! Natural-language query endpoint

pub mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use types::QueryRequest;

use crate::api::extractors::ValidatedJson;
use crate::api::types::ApiError;
use crate::domain::QueryService;
use crate::domain::filters::Row;

/// Shared state for the query endpoint
#[derive(Clone)]
pub struct QueryApiState {
    pub service: Arc<QueryService>,
}

/// Build query routes
pub fn routes(service: Arc<QueryService>) -> Router<()> {
    let state = QueryApiState { service };

    Router::new()
        .route("/query", post(run_query))
        .with_state(state)
}

/// Filter rows with a natural-language query
///
/// Returns the rows that satisfy every generated condition, in their
/// original order. Cells missing from a row are returned as `null`.
#[utoipa::path(
    post,
    path = "/query",
    tag = "query",
    request_body = QueryRequest,
    responses(
        (status = 200, description = "Filtered rows"),
        (status = 400, description = "Malformed request body or data"),
        (status = 500, description = "AI filter generation or evaluation failed")
    )
)]
pub async fn run_query(
    State(state): State<QueryApiState>,
    ValidatedJson(req): ValidatedJson<QueryRequest>,
) -> Result<Json<Vec<Row>>, ApiError> {
    tracing::debug!(
        query_chars = req.query.chars().count(),
        rows = req.data.len(),
        "Received query"
    );
    let rows = state.service.run(&req.query, req.data).await?;
    Ok(Json(rows))
}
