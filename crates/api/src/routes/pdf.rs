//! Invoice PDF routes.
//!
//! Upload runs the extraction pipeline and always answers 200 with a
//! [`ProcessingResult`]; only malformed uploads are rejected up front.

use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
    routing::{get, post},
};
use bytes::Bytes;
use chrono::Utc;
use finadmin_core::classification::{ClassificationSuggestion, classify};
use finadmin_core::extraction::{ExtractedInvoice, ProcessingResult};
use finadmin_db::{InvoiceImportRepository, repositories::GeneratedAccount};
use finadmin_shared::{AppError, UploadConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
};

/// Multipart field carrying the PDF.
const FILE_FIELD: &str = "file";

/// Headroom above the file limit for multipart framing.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Creates the PDF routes. The upload body limit follows `upload`.
pub fn routes(upload: &UploadConfig) -> Router<AppState> {
    let body_limit = usize::try_from(upload.max_file_size_bytes())
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route(
            "/pdf/upload",
            post(upload_pdf).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/pdf/classify", post(classify_text))
        .route("/pdf/generate-account", post(generate_account))
        .route("/pdf/health", get(pdf_health))
}

/// Request body for ad-hoc classification.
#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    /// Product description.
    pub description: String,
    /// Full invoice text.
    #[serde(default)]
    pub text: String,
}

/// Request body for turning an extracted invoice into a payable account.
#[derive(Debug, Deserialize)]
pub struct GenerateAccountRequest {
    /// Invoice as returned by the upload.
    pub invoice: ExtractedInvoice,
    /// Classifications chosen by the user; the invoice's own when absent.
    pub classifications: Option<Vec<ClassificationSuggestion>>,
}

/// Status of the PDF pipeline.
#[derive(Debug, Serialize)]
pub struct PdfHealthResponse {
    /// Always `healthy`.
    pub status: &'static str,
    /// Service name.
    pub service: &'static str,
    /// RFC 3339 timestamp.
    pub timestamp: String,
    /// True when the generative model has credentials.
    pub gemini_configured: bool,
}

struct Upload {
    filename: String,
    content_type: Option<String>,
    content: Bytes,
}

fn multipart_error(err: &MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError(AppError::PayloadTooLarge(err.body_text()))
    } else {
        ApiError::validation(err.body_text())
    }
}

async fn read_upload(mut multipart: Multipart) -> ApiResult<Upload> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or("invoice.pdf").to_string();
        let content_type = field.content_type().map(str::to_string);
        let content = field.bytes().await.map_err(|e| multipart_error(&e))?;
        return Ok(Upload {
            filename,
            content_type,
            content,
        });
    }
    Err(ApiError::validation(format!(
        "multipart field '{FILE_FIELD}' is required"
    )))
}

fn check_upload(upload: &Upload, limits: &UploadConfig) -> ApiResult<()> {
    let is_pdf = upload
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.to_ascii_lowercase().contains("pdf"));
    if !is_pdf {
        return Err(ApiError::validation("Only PDF files are accepted"));
    }
    if upload.content.is_empty() {
        return Err(ApiError::validation("Uploaded file is empty"));
    }
    let size = u64::try_from(upload.content.len()).unwrap_or(u64::MAX);
    if size > limits.max_file_size_bytes() {
        return Err(ApiError(AppError::PayloadTooLarge(format!(
            "File too large. Maximum size: {}MB",
            limits.max_file_size_mb
        ))));
    }
    Ok(())
}

/// POST `/pdf/upload` - Extract invoice data from a PDF.
async fn upload_pdf(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ProcessingResult>> {
    let multipart = multipart.map_err(|e| ApiError::validation(e.body_text()))?;
    let upload = read_upload(multipart).await?;
    check_upload(&upload, &state.upload)?;

    if let Some(archive) = &state.archive {
        archive
            .store_best_effort(&upload.filename, upload.content.clone())
            .await;
    }

    let result = state
        .processor
        .process(upload.content, &upload.filename)
        .await;
    Ok(Json(result))
}

/// POST `/pdf/classify` - Classify a description without calling the model.
async fn classify_text(
    ApiJson(payload): ApiJson<ClassifyRequest>,
) -> Json<Vec<ClassificationSuggestion>> {
    let suggestions = classify(&payload.description, &payload.text);
    debug!(suggestions = suggestions.len(), "Classified description");
    Json(suggestions)
}

/// POST `/pdf/generate-account` - Create a payable account from an extracted invoice.
async fn generate_account(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<GenerateAccountRequest>,
) -> ApiResult<(StatusCode, Json<GeneratedAccount>)> {
    let generated = InvoiceImportRepository::new((*state.db).clone())
        .generate_account(payload.invoice, payload.classifications)
        .await?;
    Ok((StatusCode::CREATED, Json(generated)))
}

/// GET `/pdf/health` - PDF pipeline status.
async fn pdf_health(State(state): State<AppState>) -> Json<PdfHealthResponse> {
    Json(PdfHealthResponse {
        status: "healthy",
        service: "PDF Processing",
        timestamp: Utc::now().to_rfc3339(),
        gemini_configured: state.processor.is_configured(),
    })
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use serde_json::json;

    use super::*;
    use crate::test_support::{
        FakeModel, get, json_body, json_request, send, state, state_with_model,
    };

    const BOUNDARY: &str = "finadmin-test-boundary";

    fn multipart_request(content_type: &str, content: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"nf.pdf\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/v1/pdf/upload")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn empty_db() -> DatabaseConnection {
        MockDatabase::new(DatabaseBackend::Postgres).into_connection()
    }

    fn invoice_json(tax_id: &str, installment_amount: &str) -> serde_json::Value {
        json!({
            "invoice_number": "4521",
            "issue_date": "2025-03-01",
            "product_description": "Adubo NPK 20-05-20",
            "total_amount": "1500.00",
            "supplier": {
                "company_name": "Agropecuária Boa Safra Ltda",
                "trade_name": null,
                "tax_id": tax_id
            },
            "billed_person": null,
            "installments": [
                {"installment_number": 1, "due_date": "2025-04-01", "amount": installment_amount}
            ],
            "installment_count": 1,
            "overall_confidence": "0.9",
            "notes": null
        })
    }

    #[tokio::test]
    async fn test_health_reports_model_configuration() {
        let response = send(state(empty_db()), get("/api/v1/pdf/health")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "PDF Processing");
        assert_eq!(body["gemini_configured"], false);

        let response = send(
            state_with_model(empty_db(), FakeModel::answering("{}")),
            get("/api/v1/pdf/health"),
        )
        .await;
        assert_eq!(json_body(response).await["gemini_configured"], true);
    }

    #[tokio::test]
    async fn test_upload_rejects_non_pdf() {
        let response = send(
            state(empty_db()),
            multipart_request("text/plain", b"hello"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["message"],
            "Only PDF files are accepted"
        );
    }

    #[tokio::test]
    async fn test_upload_rejects_empty_file() {
        let response = send(
            state(empty_db()),
            multipart_request("application/pdf", b""),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["message"], "Uploaded file is empty");
    }

    #[tokio::test]
    async fn test_upload_rejects_oversized_file() {
        let mut app_state = state(empty_db());
        app_state.upload.max_file_size_mb = 1;
        let content = vec![b'a'; 1024 * 1024 + 1];

        let response = send(app_state, multipart_request("application/pdf", &content)).await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            json_body(response).await["message"],
            "File too large. Maximum size: 1MB"
        );
    }

    #[tokio::test]
    async fn test_upload_without_model_reports_failure() {
        let response = send(
            state(empty_db()),
            multipart_request("application/pdf", b"%PDF-1.4 not really a pdf"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Gemini API key is not configured");
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn test_classify_falls_back_to_administrative() {
        let response = send(
            state(empty_db()),
            json_request(
                "POST",
                "/api/v1/pdf/classify",
                &json!({"description": "xyz"}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["category"], "administrative");
        assert_eq!(
            body[0]["description"],
            "Automatic classification - review manually"
        );
    }

    #[tokio::test]
    async fn test_generate_account_rejects_bad_cnpj() {
        let response = send(
            state(empty_db()),
            json_request(
                "POST",
                "/api/v1/pdf/generate-account",
                &json!({"invoice": invoice_json("123", "1500.00")}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["message"], "CNPJ must have 14 digits");
    }

    #[tokio::test]
    async fn test_generate_account_rejects_mismatched_installments() {
        let response = send(
            state(empty_db()),
            json_request(
                "POST",
                "/api/v1/pdf/generate-account",
                &json!({"invoice": invoice_json("12345678000190", "1000.00")}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
