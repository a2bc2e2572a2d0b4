//! Expense classification.
//!
//! Nine fixed categories, each with a Portuguese keyword list, and a keyword
//! scorer that suggests up to three categories for an invoice.
//!
//! # Scoring
//!
//! A keyword found in the product description counts as a description hit;
//! otherwise a keyword found anywhere in the invoice text counts as a text
//! hit. The ratio of hits to list length is boosted for multiple hits and for
//! description hits, the tax category is penalized when the description
//! reads like a product list, and the result is clamped to 1.

mod category;
mod classifier;

pub use category::{CategoryInfo, ExpenseCategory, UnknownCategory};
pub use classifier::{
    ClassificationSuggestion, FALLBACK_CONFIDENCE, FALLBACK_DESCRIPTION, MAX_SUGGESTIONS,
    MIN_CONFIDENCE, classify, score_category,
};
