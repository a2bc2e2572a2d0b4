//! Account rule errors.

use rust_decimal::Decimal;
use thiserror::Error;

/// Violations of account, installment and classification rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountRuleError {
    /// Monetary amount is zero or negative.
    #[error("{field} must be greater than zero")]
    NonPositiveAmount {
        /// Field that failed.
        field: &'static str,
    },

    /// Monetary amount has more than two decimal places.
    #[error("{field} must have at most 2 decimal places")]
    TooPrecise {
        /// Field that failed.
        field: &'static str,
    },

    /// Account has no installments.
    #[error("at least one installment is required")]
    NoInstallments,

    /// Installment number below 1.
    #[error("installment number must be at least 1, got {0}")]
    InvalidInstallmentNumber(i32),

    /// Same installment number used twice.
    #[error("installment number {0} appears more than once")]
    DuplicateInstallmentNumber(i32),

    /// Installment amount is zero or negative.
    #[error("installment {0} amount must be greater than zero")]
    NonPositiveInstallment(i32),

    /// Installments do not add up to the account total.
    #[error("installments sum to {actual} but the total amount is {expected}")]
    InstallmentSumMismatch {
        /// Account total.
        expected: Decimal,
        /// Sum of installment amounts.
        actual: Decimal,
    },

    /// Classification percentage outside `(0, 100]`.
    #[error("classification percentage must be greater than 0 and at most 100, got {0}")]
    InvalidPercentage(Decimal),

    /// Same type classified twice.
    #[error("type {0} is classified more than once")]
    DuplicateClassification(String),

    /// Text field longer than its column.
    #[error("{field} must be at most {max} characters")]
    TooLong {
        /// Field that failed.
        field: &'static str,
        /// Maximum length.
        max: usize,
    },

    /// Installment already paid or received.
    #[error("installment {0} is already settled")]
    AlreadySettled(i32),
}
