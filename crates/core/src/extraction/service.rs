//! The invoice processing service.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use serde::Serialize;
use tracing::{error, info};

use super::error::ExtractionError;
use super::model::GenerativeModel;
use super::pdf::extract_text;
use super::prompt::build_extraction_prompt;
use super::response::parse_model_response;
use super::types::ExtractedInvoice;
use super::validate::validate_invoice;
use crate::classification::classify;

/// Outcome of processing one uploaded PDF.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingResult {
    /// True when data was extracted.
    pub success: bool,
    /// Extracted invoice.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ExtractedInvoice>,
    /// Failure reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Wall-clock processing time.
    pub processing_time_ms: u64,
}

/// Turns invoice PDFs into classified [`ExtractedInvoice`]s.
#[derive(Clone)]
pub struct InvoiceProcessor {
    model: Arc<dyn GenerativeModel>,
}

impl InvoiceProcessor {
    /// Creates a processor backed by `model`.
    #[must_use]
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    /// Returns true when the model can be called.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.model.is_configured()
    }

    /// Model identifier.
    #[must_use]
    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Processes an uploaded PDF. Failures are reported in the result.
    pub async fn process(&self, pdf: Bytes, filename: &str) -> ProcessingResult {
        let started = Instant::now();
        let size = pdf.len();
        info!(filename, size, "Processing invoice PDF");

        let outcome = self.extract(pdf).await;
        let processing_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match outcome {
            Ok(invoice) => {
                info!(
                    filename,
                    processing_time_ms,
                    installments = invoice.installments.len(),
                    "Invoice extracted"
                );
                ProcessingResult {
                    success: true,
                    data: Some(invoice),
                    error: None,
                    processing_time_ms,
                }
            }
            Err(e) => {
                error!(filename, error = %e, "Invoice extraction failed");
                ProcessingResult {
                    success: false,
                    data: None,
                    error: Some(e.to_string()),
                    processing_time_ms,
                }
            }
        }
    }

    /// Extracts and classifies an invoice from PDF bytes.
    ///
    /// # Errors
    ///
    /// Fails before reading the PDF when the model is not configured.
    pub async fn extract(&self, pdf: Bytes) -> Result<ExtractedInvoice, ExtractionError> {
        if !self.model.is_configured() {
            return Err(ExtractionError::NotConfigured);
        }
        let text = extract_text(pdf).await?;
        self.extract_from_text(&text).await
    }

    /// Runs the model, validation and classification over invoice text.
    pub async fn extract_from_text(&self, text: &str) -> Result<ExtractedInvoice, ExtractionError> {
        if !self.model.is_configured() {
            return Err(ExtractionError::NotConfigured);
        }

        let prompt = build_extraction_prompt(text);
        let answer = self.model.generate_json(&prompt).await?;
        let raw = parse_model_response(&answer)?;
        let mut invoice = validate_invoice(raw)?;
        invoice.classifications = classify(&invoice.product_description, text);
        Ok(invoice)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::classification::ExpenseCategory;

    /// Returns a canned answer and records prompts.
    struct CannedModel {
        answer: Result<String, String>,
        configured: bool,
        prompts: Mutex<Vec<String>>,
    }

    impl CannedModel {
        fn answering(answer: &str) -> Arc<Self> {
            Arc::new(Self {
                answer: Ok(answer.to_string()),
                configured: true,
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl GenerativeModel for CannedModel {
        fn name(&self) -> &str {
            "canned"
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn generate_json(&self, prompt: &str) -> Result<String, ExtractionError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.answer.clone().map_err(ExtractionError::Model)
        }
    }

    const DIESEL_ANSWER: &str = r#"```json
{
  "invoice_number": "000.123",
  "issue_date": "2025-02-14",
  "product_description": "OLEO DIESEL B S10 ADITIVADO - 1000 LITROS",
  "total_amount": "6390.00",
  "supplier": {"company_name": "Posto Cerrado Ltda", "trade_name": "Posto Cerrado", "tax_id": "12.345.678/0001-90"},
  "billed_person": null,
  "installments": [
    {"installment_number": 1, "due_date": "2025-03-14", "amount": "3195.00"},
    {"installment_number": 2, "due_date": "2025-04-14", "amount": "3195.00"}
  ],
  "installment_count": 2,
  "overall_confidence": 0.92,
  "notes": null
}
```"#;

    #[tokio::test]
    async fn test_extract_from_text_classifies() {
        let model = CannedModel::answering(DIESEL_ANSWER);
        let processor = InvoiceProcessor::new(model.clone());

        let invoice = processor
            .extract_from_text("DANFE - combustível - ICMS")
            .await
            .unwrap();

        assert_eq!(invoice.invoice_number.as_deref(), Some("000.123"));
        assert_eq!(invoice.total_amount, dec!(6390.00));
        assert_eq!(invoice.installments.len(), 2);
        assert_eq!(invoice.overall_confidence, dec!(0.92));
        assert_eq!(
            invoice.classifications[0].category,
            ExpenseCategory::MaintenanceOperation
        );

        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("DANFE - combustível - ICMS"));
    }

    #[tokio::test]
    async fn test_unconfigured_model_fails_fast() {
        let model = Arc::new(CannedModel {
            answer: Ok(DIESEL_ANSWER.to_string()),
            configured: false,
            prompts: Mutex::new(Vec::new()),
        });
        let processor = InvoiceProcessor::new(model.clone());

        let result = processor.process(Bytes::from_static(b"%PDF-1.4"), "nf.pdf").await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Gemini API key is not configured"));
        assert!(model.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_process_reports_pdf_failure() {
        let processor = InvoiceProcessor::new(CannedModel::answering(DIESEL_ANSWER));
        let result = processor.process(Bytes::from_static(b"not a pdf"), "nf.pdf").await;

        assert!(!result.success);
        assert!(result.data.is_none());
        assert!(result.error.unwrap().starts_with("could not read PDF"));
    }

    #[tokio::test]
    async fn test_model_errors_propagate() {
        let model = Arc::new(CannedModel {
            answer: Err("quota exceeded".to_string()),
            configured: true,
            prompts: Mutex::new(Vec::new()),
        });
        let processor = InvoiceProcessor::new(model);
        let err = processor.extract_from_text("text").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "generative model request failed: quota exceeded"
        );
    }

    #[tokio::test]
    async fn test_invalid_answer_is_reported() {
        let processor = InvoiceProcessor::new(CannedModel::answering("I could not read it"));
        let err = processor.extract_from_text("text").await.unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidJson(_)));
    }

    #[test]
    fn test_result_serialization_skips_empty_fields() {
        let result = ProcessingResult {
            success: false,
            data: None,
            error: Some("boom".to_string()),
            processing_time_ms: 12,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": false, "error": "boom", "processing_time_ms": 12})
        );
    }
}
