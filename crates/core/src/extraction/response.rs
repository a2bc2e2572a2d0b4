//! Model response parsing.

use super::error::ExtractionError;
use super::types::RawInvoice;

/// Removes a ```` ```json ```` or ```` ``` ```` fence around the payload.
#[must_use]
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = if let Some((_, rest)) = text.split_once("```json") {
        rest.split("```").next().unwrap_or(rest)
    } else if let Some((_, rest)) = text.split_once("```") {
        rest.split("```").next().unwrap_or(rest)
    } else {
        text
    };
    inner.trim()
}

/// Parses the model answer into a [`RawInvoice`].
pub fn parse_model_response(text: &str) -> Result<RawInvoice, ExtractionError> {
    let json = strip_code_fences(text);
    if json.is_empty() {
        return Err(ExtractionError::EmptyResponse);
    }

    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| ExtractionError::InvalidJson(e.to_string()))?;
    if !value.is_object() {
        return Err(ExtractionError::InvalidJson(
            "expected a JSON object".to_string(),
        ));
    }
    serde_json::from_value(value).map_err(|e| ExtractionError::InvalidJson(e.to_string()))
}
