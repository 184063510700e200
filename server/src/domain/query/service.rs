//! Query handling: rows in, filtered rows out

use serde_json::Value;
use thiserror::Error;

use super::generator::{FilterGenerationError, FilterGenerator};
use crate::domain::filters::{Dataset, DatasetError, Row, apply};

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("invalid data: {0}")]
    InvalidData(#[from] DatasetError),

    #[error(transparent)]
    Generation(#[from] FilterGenerationError),

    #[error("Failed to apply filters: {0}")]
    Evaluation(String),
}

/// Composes filter generation and evaluation for one request
pub struct QueryService {
    generator: FilterGenerator,
}

impl QueryService {
    pub fn new(generator: FilterGenerator) -> Self {
        Self { generator }
    }

    /// Filter `records` according to the natural-language `query`
    ///
    /// Empty input returns an empty result without calling the LLM. When the
    /// LLM yields no filters every row is returned.
    pub async fn run(&self, query: &str, records: Vec<Value>) -> Result<Vec<Row>, QueryError> {
        let dataset = Dataset::from_records(records)?;
        if dataset.is_empty() {
            return Ok(Vec::new());
        }

        let filters = self.generator.generate(query, dataset.headers()).await?;
        if filters.is_empty() {
            tracing::debug!(rows = dataset.len(), "No filters, returning all rows");
            return Ok(dataset.into_records());
        }

        let total = dataset.len();
        let filter_count = filters.len();
        let rows = tokio::task::spawn_blocking(move || apply(dataset, &filters).into_records())
            .await
            .map_err(|e| QueryError::Evaluation(e.to_string()))?;

        tracing::debug!(
            filters = filter_count,
            rows = total,
            kept = rows.len(),
            "Applied filters"
        );
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::core::config::ExhaustionPolicy;
    use crate::data::llm::ScriptedBackend;

    fn service(backend: &Arc<ScriptedBackend>, policy: ExhaustionPolicy) -> QueryService {
        QueryService::new(FilterGenerator::new(backend.clone(), 3, policy))
    }

    fn people() -> Vec<Value> {
        vec![
            json!({"name": "Alice", "age": 30}),
            json!({"name": "Bob", "age": 17}),
        ]
    }

    fn as_values(rows: Vec<Row>) -> Vec<Value> {
        rows.into_iter().map(Value::Object).collect()
    }

    #[tokio::test]
    async fn test_people_under_18() {
        let backend = Arc::new(ScriptedBackend::replies(&[
            r#"{"filters":[{"header":"age","operator":"<","value":18}]}"#,
        ]));
        let rows = service(&backend, ExhaustionPolicy::Fail)
            .run("people under 18", people())
            .await
            .unwrap();

        assert_eq!(as_values(rows), vec![json!({"name": "Bob", "age": 17})]);
    }

    #[tokio::test]
    async fn test_empty_data_skips_llm() {
        let backend = Arc::new(ScriptedBackend::replies(&[r#"{"filters":[]}"#]));
        let rows = service(&backend, ExhaustionPolicy::Fail)
            .run("anything", Vec::new())
            .await
            .unwrap();

        assert!(rows.is_empty());
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_no_filters_returns_all_rows() {
        let backend = Arc::new(ScriptedBackend::replies(&["nope", "nope", r#"{"filters":[]}"#]));
        let rows = service(&backend, ExhaustionPolicy::Fail)
            .run("show me everything", people())
            .await
            .unwrap();

        assert_eq!(as_values(rows), people());
        assert_eq!(backend.calls(), 3);
    }

    #[tokio::test]
    async fn test_missing_cells_rendered_as_null() {
        let backend = Arc::new(ScriptedBackend::replies(&[
            r#"{"filters":[{"header":"age","operator":">","value":"20"}]}"#,
        ]));
        let records = vec![
            json!({"name": "Alice", "age": 30}),
            json!({"name": "Eve", "age": 40, "city": "Oslo"}),
            json!({"name": "Bob", "age": 17}),
        ];
        let rows = service(&backend, ExhaustionPolicy::Fail)
            .run("older than 20", records)
            .await
            .unwrap();

        assert_eq!(
            as_values(rows),
            vec![
                json!({"name": "Alice", "age": 30, "city": null}),
                json!({"name": "Eve", "age": 40, "city": "Oslo"}),
            ]
        );
    }

    #[tokio::test]
    async fn test_invalid_row_is_rejected_before_llm() {
        let backend = Arc::new(ScriptedBackend::replies(&[r#"{"filters":[]}"#]));
        let err = service(&backend, ExhaustionPolicy::Fail)
            .run("q", vec![json!({"a": 1}), json!("not a row")])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            QueryError::InvalidData(DatasetError::NotAnObject { index: 1 })
        ));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_exhaustion_propagates() {
        let backend = Arc::new(ScriptedBackend::replies(&["x", "y", "z"]));
        let err = service(&backend, ExhaustionPolicy::Fail)
            .run("q", people())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            QueryError::Generation(FilterGenerationError::Exhausted { attempts: 3 })
        ));
    }

    #[tokio::test]
    async fn test_exhaustion_unfiltered_returns_all_rows() {
        let backend = Arc::new(ScriptedBackend::replies(&["x", "y", "z"]));
        let rows = service(&backend, ExhaustionPolicy::Unfiltered)
            .run("q", people())
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_evaluation_error_message() {
        let err = QueryError::Evaluation("task panicked".to_string());
        assert_eq!(err.to_string(), "Failed to apply filters: task panicked");
    }
}
