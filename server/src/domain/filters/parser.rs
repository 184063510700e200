//! LLM response parsing
//!
//! Turns the model's JSON text into a `FilterSet`. Document-level problems
//! are errors (the caller asks the model to correct itself); problems with
//! an individual condition only drop that condition.

use serde_json::Value;
use thiserror::Error;

use super::types::{Condition, FilterSet, as_number};

/// Reasons a model response cannot be used at all
#[derive(Error, Debug, PartialEq)]
pub enum ResponseParseError {
    #[error("response is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("response is not a JSON object")]
    NotAnObject,

    #[error("the 'filters' key does not contain a list")]
    FiltersNotArray,
}

/// Parse `{"filters": [...]}` into a `FilterSet`
///
/// A missing `filters` key yields an empty set. Malformed entries are
/// dropped, and numeric-operator values are coerced to finite numbers
/// (entries whose value cannot be coerced are dropped).
pub fn parse_filter_response(text: &str) -> Result<FilterSet, ResponseParseError> {
    let document: Value = serde_json::from_str(text.trim())
        .map_err(|e| ResponseParseError::InvalidJson(e.to_string()))?;

    let Value::Object(map) = document else {
        return Err(ResponseParseError::NotAnObject);
    };

    let entries = match map.get("filters") {
        None => return Ok(FilterSet::default()),
        Some(Value::Array(entries)) => entries,
        Some(_) => return Err(ResponseParseError::FiltersNotArray),
    };

    let mut conditions = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(mut condition) = Condition::from_json(entry) else {
            tracing::warn!(entry = %entry, "Dropping malformed filter condition");
            continue;
        };

        if condition.operator.is_numeric() {
            match as_number(&condition.value) {
                Some(n) => condition.value = Value::from(n),
                None => {
                    tracing::warn!(
                        header = %condition.header,
                        operator = %condition.operator,
                        value = %condition.value,
                        "Dropping numeric condition with non-numeric value"
                    );
                    continue;
                }
            }
        }

        conditions.push(condition);
    }

    Ok(FilterSet::new(conditions))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::super::types::Operator;
    use super::*;

    #[test]
    fn parse_single_numeric_filter() {
        let filters =
            parse_filter_response(r#"{"filters":[{"header":"age","operator":"<","value":18}]}"#)
                .unwrap();
        assert_eq!(filters.len(), 1);
        let cond = filters.iter().next().unwrap();
        assert_eq!(cond.operator, Operator::Lt);
        assert_eq!(cond.value, json!(18.0));
    }

    #[test]
    fn numeric_string_values_are_coerced() {
        let filters = parse_filter_response(
            r#"{"filters":[{"header":"price","operator":">=","value":" 9.5 "}]}"#,
        )
        .unwrap();
        assert_eq!(filters.iter().next().unwrap().value, json!(9.5));
    }

    #[test]
    fn non_numeric_value_on_numeric_operator_is_dropped() {
        let filters = parse_filter_response(
            r#"{"filters":[
                {"header":"age","operator":">","value":"abc"},
                {"header":"name","operator":"contains","value":"bo"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(filters.len(), 1);
        assert_eq!(filters.iter().next().unwrap().header, "name");
    }

    #[test]
    fn non_numeric_operators_keep_raw_value() {
        let filters = parse_filter_response(
            r#"{"filters":[{"header":"zip","operator":"===","value":"02134"}]}"#,
        )
        .unwrap();
        assert_eq!(filters.iter().next().unwrap().value, json!("02134"));
    }

    #[test]
    fn malformed_entries_are_dropped() {
        let filters = parse_filter_response(
            r#"{"filters":[
                {"header":"age","operator":"~=","value":1},
                {"header":"age","operator":"<"},
                "age < 3",
                {"header":"city","operator":"!==","value":"Paris"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(
            filters,
            FilterSet::new(vec![Condition::new("city", Operator::Neq, "Paris")])
        );
    }

    #[test]
    fn empty_filters_array() {
        assert!(parse_filter_response(r#"{"filters":[]}"#).unwrap().is_empty());
    }

    #[test]
    fn missing_filters_key_means_no_filters() {
        assert!(parse_filter_response(r#"{"result":"none"}"#).unwrap().is_empty());
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        assert!(parse_filter_response("\n  {\"filters\":[]}  \n").is_ok());
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(matches!(
            parse_filter_response("Sure! Here are your filters"),
            Err(ResponseParseError::InvalidJson(_))
        ));
        assert!(matches!(
            parse_filter_response("```json\n{\"filters\":[]}\n```"),
            Err(ResponseParseError::InvalidJson(_))
        ));
    }

    #[test]
    fn non_object_document_is_an_error() {
        assert_eq!(
            parse_filter_response(r#"[{"header":"age","operator":"<","value":18}]"#),
            Err(ResponseParseError::NotAnObject)
        );
    }

    #[test]
    fn filters_must_be_a_list() {
        assert_eq!(
            parse_filter_response(r#"{"filters":{"header":"age"}}"#),
            Err(ResponseParseError::FiltersNotArray)
        );
        assert_eq!(
            parse_filter_response(r#"{"filters":null}"#),
            Err(ResponseParseError::FiltersNotArray)
        );
    }
}
