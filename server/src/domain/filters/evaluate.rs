//! In-memory dataset and filter evaluation
//!
//! Conditions narrow the row set one after another (logical AND). A
//! condition that cannot be evaluated is skipped with a warning; evaluation
//! itself never fails.

use std::collections::HashSet;

use serde_json::{Map, Value};
use thiserror::Error;

use super::types::{Condition, FilterSet, Operator, as_number};

/// A single record: column name to scalar value, in insertion order
pub type Row = Map<String, Value>;

#[derive(Error, Debug, PartialEq)]
pub enum DatasetError {
    #[error("row {index} is not a JSON object")]
    NotAnObject { index: usize },
}

/// Rows plus the ordered, de-duplicated union of their keys
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl Dataset {
    /// Build a dataset from request records
    ///
    /// Headers are collected across all rows in first-seen order. Every
    /// record must be a JSON object.
    pub fn from_records(records: Vec<Value>) -> Result<Self, DatasetError> {
        let mut headers = Vec::new();
        let mut seen = HashSet::new();
        let mut rows = Vec::with_capacity(records.len());

        for (index, record) in records.into_iter().enumerate() {
            let Value::Object(row) = record else {
                return Err(DatasetError::NotAnObject { index });
            };
            for key in row.keys() {
                if seen.insert(key.clone()) {
                    headers.push(key.clone());
                }
            }
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    #[cfg(test)]
    pub(crate) fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn has_header(&self, header: &str) -> bool {
        self.headers.iter().any(|h| h == header)
    }

    /// Consume the dataset into output records
    ///
    /// Every record carries all headers in header order; absent cells are
    /// emitted as `null`.
    pub fn into_records(self) -> Vec<Row> {
        let Self { headers, rows } = self;
        rows.into_iter()
            .map(|mut row| {
                let mut out = Map::with_capacity(headers.len());
                for header in &headers {
                    let value = row.remove(header).unwrap_or(Value::Null);
                    out.insert(header.clone(), value);
                }
                out
            })
            .collect()
    }
}

/// Apply a filter set to a dataset
///
/// An empty filter set returns the dataset unchanged. Conditions naming an
/// unknown header, conditions with a null value, and numeric conditions with
/// a non-numeric value are skipped.
pub fn apply(dataset: Dataset, filters: &FilterSet) -> Dataset {
    if filters.is_empty() {
        return dataset;
    }

    let Dataset { headers, mut rows } = dataset;

    for condition in filters {
        if !headers.contains(&condition.header) {
            tracing::warn!(
                header = %condition.header,
                "Filter header not in dataset, skipping"
            );
            continue;
        }

        let Some(matcher) = Matcher::compile(condition) else {
            tracing::warn!(
                condition = %condition,
                "Could not apply filter, skipping"
            );
            continue;
        };

        let before = rows.len();
        rows.retain(|row| matcher.matches(row.get(&condition.header)));
        tracing::debug!(
            condition = %condition,
            before,
            after = rows.len(),
            "Applied filter"
        );
    }

    Dataset { headers, rows }
}

/// A condition prepared for evaluation against many rows
enum Matcher<'a> {
    Equal(&'a Value),
    NotEqual(&'a Value),
    Gt(f64),
    Lt(f64),
    Gte(f64),
    Lte(f64),
    Contains(String),
    NotContains(String),
}

impl<'a> Matcher<'a> {
    fn compile(condition: &'a Condition) -> Option<Self> {
        if condition.value.is_null() {
            return None;
        }
        let matcher = match condition.operator {
            Operator::Eq => Self::Equal(&condition.value),
            Operator::Neq => Self::NotEqual(&condition.value),
            Operator::Gt => Self::Gt(as_number(&condition.value)?),
            Operator::Lt => Self::Lt(as_number(&condition.value)?),
            Operator::Gte => Self::Gte(as_number(&condition.value)?),
            Operator::Lte => Self::Lte(as_number(&condition.value)?),
            Operator::Contains => Self::Contains(text_of(&condition.value)?.to_lowercase()),
            Operator::NotContains => {
                Self::NotContains(text_of(&condition.value)?.to_lowercase())
            }
        };
        Some(matcher)
    }

    fn matches(&self, cell: Option<&Value>) -> bool {
        let cell = cell.filter(|v| !v.is_null());
        match self {
            Self::Equal(target) => cell.is_some_and(|c| values_equal(c, target)),
            Self::NotEqual(target) => !cell.is_some_and(|c| values_equal(c, target)),
            Self::Gt(target) => cell.and_then(as_number).is_some_and(|n| n > *target),
            Self::Lt(target) => cell.and_then(as_number).is_some_and(|n| n < *target),
            Self::Gte(target) => cell.and_then(as_number).is_some_and(|n| n >= *target),
            Self::Lte(target) => cell.and_then(as_number).is_some_and(|n| n <= *target),
            Self::Contains(needle) => cell.is_some_and(|c| contains_ci(c, needle)),
            Self::NotContains(needle) => !cell.is_some_and(|c| contains_ci(c, needle)),
        }
    }
}

/// Strict typed equality; numbers compare by numeric value
fn values_equal(cell: &Value, target: &Value) -> bool {
    match (cell, target) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => a == b,
        },
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Array(_), Value::Array(_)) | (Value::Object(_), Value::Object(_)) => {
            cell == target
        }
        _ => false,
    }
}

fn contains_ci(cell: &Value, needle: &str) -> bool {
    text_of(cell).is_some_and(|text| text.to_lowercase().contains(needle))
}

/// String form used by substring matching; `None` for null
fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}
