//! Archive of uploaded invoice PDFs, backed by Apache OpenDAL.
//!
//! Keys follow `YYYY/MM/{uuid}-{sanitized filename}` so a directory listing
//! sorts by upload month.

mod error;
mod service;

pub use error::ArchiveError;
pub use service::{InvoiceArchive, archive_key, sanitize_filename};
