//! Extraction error types.

use thiserror::Error;

/// Errors raised while turning a PDF into an [`ExtractedInvoice`](super::ExtractedInvoice).
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// No API key available for the generative model.
    #[error("Gemini API key is not configured")]
    NotConfigured,

    /// The PDF could not be parsed.
    #[error("could not read PDF: {0}")]
    Pdf(String),

    /// The PDF parsed but has no text layer.
    #[error("PDF contains no extractable text")]
    EmptyText,

    /// The model request failed.
    #[error("generative model request failed: {0}")]
    Model(String),

    /// The model answered with nothing.
    #[error("generative model returned an empty response")]
    EmptyResponse,

    /// The model answer is not the expected JSON.
    #[error("model response is not valid JSON: {0}")]
    InvalidJson(String),

    /// Required fields are missing or malformed.
    #[error("extracted data is invalid: {0}")]
    InvalidData(String),
}

impl ExtractionError {
    /// Create an invalid data error.
    #[must_use]
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }
}

impl From<reqwest::Error> for ExtractionError {
    fn from(err: reqwest::Error) -> Self {
        let detail = if err.is_timeout() {
            "request timed out".to_string()
        } else {
            err.without_url().to_string()
        };
        Self::Model(detail)
    }
}
