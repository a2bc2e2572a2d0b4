//! Invoice extraction from uploaded PDFs.
//!
//! # Pipeline
//!
//! ```text
//! PDF bytes ─▶ text (pdf-extract, blocking thread)
//!           ─▶ prompt ─▶ generative model (JSON response)
//!           ─▶ strip fences ─▶ parse ─▶ validate/normalize
//!           ─▶ keyword classification over text + product description
//! ```
//!
//! The model sits behind [`GenerativeModel`] so the pipeline can run
//! against a canned model in tests.

mod error;
mod gemini;
mod model;
mod pdf;
mod prompt;
mod response;
mod service;
mod types;
mod validate;

pub use error::ExtractionError;
pub use gemini::GeminiClient;
pub use model::GenerativeModel;
pub use pdf::{extract_text, looks_like_pdf};
pub use prompt::build_extraction_prompt;
pub use response::{parse_model_response, strip_code_fences};
pub use service::{InvoiceProcessor, ProcessingResult};
pub use types::{
    ExtractedBilledPerson, ExtractedInstallment, ExtractedInvoice, ExtractedSupplier,
    RawBilledPerson, RawInstallment, RawInvoice, RawSupplier,
};
pub use validate::{parse_amount, parse_date, validate_invoice};
