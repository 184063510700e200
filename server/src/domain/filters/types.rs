//! Filter type definitions
//!
//! A `Condition` is a `(header, operator, value)` triple; a `FilterSet` is
//! their conjunction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Closed set of comparison operators understood by the evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "===")]
    Eq,
    #[serde(rename = "!==")]
    Neq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "!contains")]
    NotContains,
}

impl Operator {
    pub const ALL: [Operator; 8] = [
        Operator::Eq,
        Operator::Neq,
        Operator::Gt,
        Operator::Lt,
        Operator::Gte,
        Operator::Lte,
        Operator::Contains,
        Operator::NotContains,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "===",
            Self::Neq => "!==",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Gte => ">=",
            Self::Lte => "<=",
            Self::Contains => "contains",
            Self::NotContains => "!contains",
        }
    }

    /// Operators that compare both sides as floating-point numbers
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Gt | Self::Lt | Self::Gte | Self::Lte)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| format!("unknown operator '{}'", s))
    }
}

/// A single filter condition
///
/// `value` is never `null`. For numeric operators it holds a finite JSON
/// number once it has passed through [`super::parse_filter_response`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub header: String,
    pub operator: Operator,
    pub value: Value,
}

impl Condition {
    pub fn new(header: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            header: header.into(),
            operator,
            value: value.into(),
        }
    }

    /// Build a condition from loosely-typed JSON
    ///
    /// Returns `None` when the entry is not an object, the header is missing
    /// or empty, the operator is missing or unknown, or the value is null.
    pub fn from_json(entry: &Value) -> Option<Self> {
        let obj = entry.as_object()?;

        let header = obj.get("header")?.as_str()?;
        if header.is_empty() {
            return None;
        }

        let operator = obj.get("operator")?.as_str()?.parse::<Operator>().ok()?;

        let value = obj.get("value")?;
        if value.is_null() {
            return None;
        }

        Some(Self {
            header: header.to_string(),
            operator,
            value: value.clone(),
        })
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.header, self.operator, self.value)
    }
}

/// Coerce a JSON scalar to a finite `f64`
///
/// Accepts numbers and strings that parse as a number after trimming.
/// Booleans, nulls, nested values, and non-finite results are rejected.
pub fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Ordered conjunction of conditions; empty means "no filtering"
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FilterSet(Vec<Condition>);

impl FilterSet {
    pub fn new(conditions: Vec<Condition>) -> Self {
        Self(conditions)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Condition> {
        self.0.iter()
    }
}

impl From<Vec<Condition>> for FilterSet {
    fn from(conditions: Vec<Condition>) -> Self {
        Self(conditions)
    }
}

impl<'a> IntoIterator for &'a FilterSet {
    type Item = &'a Condition;
    type IntoIter = std::slice::Iter<'a, Condition>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn operator_round_trips_through_str() {
        for op in Operator::ALL {
            assert_eq!(op.as_str().parse::<Operator>().unwrap(), op);
        }
        assert!("==".parse::<Operator>().is_err());
        assert!("CONTAINS".parse::<Operator>().is_err());
    }

    #[test]
    fn operator_serde_uses_symbols() {
        let op: Operator = serde_json::from_str(r#""!contains""#).unwrap();
        assert_eq!(op, Operator::NotContains);
        assert_eq!(serde_json::to_string(&Operator::Gte).unwrap(), r#"">=""#);
    }

    #[test]
    fn only_ordering_operators_are_numeric() {
        let numeric: Vec<_> = Operator::ALL.iter().filter(|op| op.is_numeric()).collect();
        assert_eq!(
            numeric,
            vec![&Operator::Gt, &Operator::Lt, &Operator::Gte, &Operator::Lte]
        );
    }

    #[test]
    fn condition_from_json_valid() {
        let cond = Condition::from_json(&json!({"header": "age", "operator": "<", "value": 18}))
            .unwrap();
        assert_eq!(cond, Condition::new("age", Operator::Lt, 18));
    }

    #[test]
    fn condition_from_json_keeps_falsy_values() {
        let cond =
            Condition::from_json(&json!({"header": "count", "operator": "===", "value": 0}))
                .unwrap();
        assert_eq!(cond.value, json!(0));

        let cond =
            Condition::from_json(&json!({"header": "name", "operator": "===", "value": ""}))
                .unwrap();
        assert_eq!(cond.value, json!(""));
    }

    #[test]
    fn condition_from_json_rejects_malformed() {
        let cases = [
            json!("age < 18"),
            json!({"operator": "<", "value": 18}),
            json!({"header": "", "operator": "<", "value": 18}),
            json!({"header": 5, "operator": "<", "value": 18}),
            json!({"header": "age", "value": 18}),
            json!({"header": "age", "operator": "between", "value": 18}),
            json!({"header": "age", "operator": "<"}),
            json!({"header": "age", "operator": "<", "value": null}),
        ];
        for case in cases {
            assert!(Condition::from_json(&case).is_none(), "accepted {}", case);
        }
    }

    #[test]
    fn as_number_coerces_numbers_and_numeric_strings() {
        assert_eq!(as_number(&json!(17)), Some(17.0));
        assert_eq!(as_number(&json!(2.5)), Some(2.5));
        assert_eq!(as_number(&json!(" 42 ")), Some(42.0));
        assert_eq!(as_number(&json!("1e3")), Some(1000.0));
        assert_eq!(as_number(&json!("abc")), None);
        assert_eq!(as_number(&json!("")), None);
        assert_eq!(as_number(&json!("NaN")), None);
        assert_eq!(as_number(&json!("inf")), None);
        assert_eq!(as_number(&json!(true)), None);
        assert_eq!(as_number(&Value::Null), None);
        assert_eq!(as_number(&json!([1])), None);
    }

    #[test]
    fn filter_set_serializes_as_array() {
        let filters = FilterSet::new(vec![Condition::new("name", Operator::Contains, "ali")]);
        assert_eq!(
            serde_json::to_value(&filters).unwrap(),
            json!([{"header": "name", "operator": "contains", "value": "ali"}])
        );
        assert_eq!(filters.len(), 1);
        assert!(!filters.is_empty());
        assert!(FilterSet::default().is_empty());
    }
}
