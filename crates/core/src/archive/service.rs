//! Invoice archive implementation.

use bytes::Bytes;
use chrono::{DateTime, Datelike, Utc};
use opendal::{Operator, services};
use tracing::{debug, warn};
use uuid::Uuid;

use super::error::ArchiveError;

/// Stores uploaded invoice PDFs.
#[derive(Clone, Debug)]
pub struct InvoiceArchive {
    operator: Operator,
}

impl InvoiceArchive {
    /// Creates an archive rooted at a local directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the filesystem service cannot be built.
    pub fn local(root: &str) -> Result<Self, ArchiveError> {
        let builder = services::Fs::default().root(root);
        let operator = Operator::new(builder)
            .map_err(|e| ArchiveError::Configuration(e.to_string()))?
            .finish();
        Ok(Self { operator })
    }

    /// Writes a PDF and returns its key.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn store(
        &self,
        filename: &str,
        content: Bytes,
        now: DateTime<Utc>,
    ) -> Result<String, ArchiveError> {
        let key = archive_key(filename, Uuid::new_v4(), now);
        self.operator.write(&key, content).await?;
        debug!(key = %key, "Invoice archived");
        Ok(key)
    }

    /// Writes a PDF, logging instead of failing.
    pub async fn store_best_effort(&self, filename: &str, content: Bytes) -> Option<String> {
        match self.store(filename, content, Utc::now()).await {
            Ok(key) => Some(key),
            Err(e) => {
                warn!(filename, error = %e, "Failed to archive invoice");
                None
            }
        }
    }

    /// Reads an archived PDF.
    ///
    /// # Errors
    ///
    /// Returns an error if the key does not exist or cannot be read.
    pub async fn read(&self, key: &str) -> Result<Bytes, ArchiveError> {
        let buffer = self.operator.read(key).await?;
        Ok(buffer.to_bytes())
    }
}

/// Builds the storage key for an upload.
#[must_use]
pub fn archive_key(filename: &str, id: Uuid, now: DateTime<Utc>) -> String {
    format!(
        "{:04}/{:02}/{id}-{}",
        now.year(),
        now.month(),
        sanitize_filename(filename)
    )
}

/// Only ASCII alphanumerics, dots, hyphens and underscores survive.
#[must_use]
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);
    let sanitized: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim_matches('.').is_empty() {
        "invoice.pdf".to_string()
    } else {
        sanitized
    }
}
