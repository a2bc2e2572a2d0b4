//! Generative model abstraction.

use async_trait::async_trait;

use super::error::ExtractionError;

/// A model that answers a prompt with a JSON document.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Model identifier, for logs and health output.
    fn name(&self) -> &str;

    /// Returns false when the model cannot be called (e.g. no API key).
    fn is_configured(&self) -> bool;

    /// Sends the prompt and returns the raw text of the answer.
    async fn generate_json(&self, prompt: &str) -> Result<String, ExtractionError>;
}
