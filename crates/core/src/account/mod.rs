//! Payable and receivable account rules.
//!
//! Accounts are written together with their installments and
//! classifications, so everything here validates a whole plan at once
//! before anything touches the database.

mod error;
mod installment;
mod plan;

pub use error::AccountRuleError;
pub use installment::{InstallmentStatus, payable_status, receivable_status};
pub use plan::{
    ClassificationShare, InstallmentDraft, MAX_DOCUMENT_NUMBER_LEN, validate_amount,
    validate_classifications, validate_document_number, validate_installment_plan,
};
