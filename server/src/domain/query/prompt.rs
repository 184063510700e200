//! Instruction text sent to the LLM

use crate::domain::filters::Operator;

/// Follow-up turn appended after the model returns unusable output
pub const CORRECTION_PROMPT: &str = "Your previous response was not valid JSON. Please correct it. \
You must only return a JSON object with a 'filters' key containing an array, \
with no extra text or formatting.";

/// Build the system prompt for a dataset with the given headers
///
/// Deterministic: the same headers always produce the same text.
pub fn build_system_prompt(headers: &[String]) -> String {
    let header_list = serde_json::to_string(headers).unwrap_or_else(|_| "[]".to_string());
    let operators = Operator::ALL
        .iter()
        .map(|op| format!("'{}'", op.as_str()))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "You are an AI data analysis assistant. Convert the user's natural language query \
into a structured JSON filter over a table with the CSV headers listed below.\n\
Each filter object must have the keys 'header', 'operator', and 'value'.\n\
- 'header' must be exactly one of the CSV headers: {header_list}\n\
- 'operator' must be one of: {operators}.\n\
- 'value' must be a number for numeric comparisons, otherwise a string.\n\
If the query is ambiguous or cannot be converted, use an empty array [].\n\
You MUST only return a JSON object with a single key \"filters\" whose value is the \
array of filter objects. Do not include any extra text, explanations, or markdown \
formatting such as ```json."
    )
}
