//! PDF text extraction.

use bytes::Bytes;
use tracing::{debug, warn};

use super::error::ExtractionError;

/// Returns true when the bytes start with a PDF header.
#[must_use]
pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    bytes[start..].starts_with(b"%PDF-")
}

/// Extracts the text layer of a PDF.
///
/// Parsing runs on the blocking pool. A parser panic is reported as
/// [`ExtractionError::Pdf`] instead of taking the worker down.
pub async fn extract_text(pdf: Bytes) -> Result<String, ExtractionError> {
    if !looks_like_pdf(&pdf) {
        return Err(ExtractionError::Pdf("file is not a PDF document".to_string()));
    }

    let size = pdf.len();
    let result = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&pdf))
        .await
        .map_err(|e| {
            if e.is_panic() {
                warn!(size, "PDF parser panicked");
                ExtractionError::Pdf("the PDF parser failed on this document".to_string())
            } else {
                ExtractionError::Pdf(e.to_string())
            }
        })?;

    let text = result.map_err(|e| ExtractionError::Pdf(e.to_string()))?;
    let text = text.trim();
    if text.is_empty() {
        return Err(ExtractionError::EmptyText);
    }

    debug!(size, chars = text.chars().count(), "PDF text extracted");
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looks_like_pdf() {
        assert!(looks_like_pdf(b"%PDF-1.7\n..."));
        assert!(looks_like_pdf(b"\r\n %PDF-1.4"));
        assert!(!looks_like_pdf(b"PK\x03\x04"));
        assert!(!looks_like_pdf(b""));
    }

    #[tokio::test]
    async fn test_rejects_non_pdf_bytes() {
        let err = extract_text(Bytes::from_static(b"hello world")).await.unwrap_err();
        assert!(matches!(err, ExtractionError::Pdf(_)));
    }

    #[tokio::test]
    async fn test_truncated_pdf_is_an_error() {
        let err = extract_text(Bytes::from_static(b"%PDF-1.4\n1 0 obj\n<<"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::Pdf(_) | ExtractionError::EmptyText
        ));
    }
}
