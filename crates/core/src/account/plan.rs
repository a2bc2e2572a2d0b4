//! Installment plan and classification validation.

use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::AccountRuleError;

/// Longest invoice or document number, matching `VARCHAR(50)`.
pub const MAX_DOCUMENT_NUMBER_LEN: usize = 50;

/// An installment about to be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentDraft {
    /// Position in the plan, starting at 1.
    pub installment_number: i32,
    /// Due date.
    pub due_date: NaiveDate,
    /// Amount due.
    pub amount: Decimal,
}

/// A share of an account assigned to an expense or revenue type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationShare<K> {
    /// Expense or revenue type.
    pub type_id: K,
    /// Share in percent.
    pub percentage: Decimal,
}

/// Checks a monetary amount fits `NUMERIC(15,2)` and is positive.
pub fn validate_amount(field: &'static str, amount: Decimal) -> Result<(), AccountRuleError> {
    if amount <= Decimal::ZERO {
        return Err(AccountRuleError::NonPositiveAmount { field });
    }
    if amount.normalize().scale() > 2 {
        return Err(AccountRuleError::TooPrecise { field });
    }
    Ok(())
}

/// Validates installments against the account total.
///
/// Numbers must be unique and at least 1, every amount positive, and the
/// amounts must add up to exactly `total`.
pub fn validate_installment_plan(
    total: Decimal,
    installments: &[InstallmentDraft],
) -> Result<(), AccountRuleError> {
    validate_amount("total_amount", total)?;
    if installments.is_empty() {
        return Err(AccountRuleError::NoInstallments);
    }

    let mut seen = HashSet::with_capacity(installments.len());
    let mut sum = Decimal::ZERO;
    for installment in installments {
        let number = installment.installment_number;
        if number < 1 {
            return Err(AccountRuleError::InvalidInstallmentNumber(number));
        }
        if !seen.insert(number) {
            return Err(AccountRuleError::DuplicateInstallmentNumber(number));
        }
        if installment.amount <= Decimal::ZERO {
            return Err(AccountRuleError::NonPositiveInstallment(number));
        }
        validate_amount("installment_amount", installment.amount)?;
        sum += installment.amount;
    }

    if sum != total {
        return Err(AccountRuleError::InstallmentSumMismatch {
            expected: total,
            actual: sum,
        });
    }
    Ok(())
}

/// Validates classification percentages and rejects repeated types.
pub fn validate_classifications<K>(shares: &[ClassificationShare<K>]) -> Result<(), AccountRuleError>
where
    K: Eq + Hash + Display,
{
    let mut seen = HashSet::with_capacity(shares.len());
    for share in shares {
        if share.percentage <= Decimal::ZERO || share.percentage > Decimal::ONE_HUNDRED {
            return Err(AccountRuleError::InvalidPercentage(share.percentage));
        }
        if !seen.insert(&share.type_id) {
            return Err(AccountRuleError::DuplicateClassification(
                share.type_id.to_string(),
            ));
        }
    }
    Ok(())
}

/// Trims an optional invoice/document number. Blank becomes `None`.
pub fn validate_document_number(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<String>, AccountRuleError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) if v.chars().count() > MAX_DOCUMENT_NUMBER_LEN => Err(AccountRuleError::TooLong {
            field,
            max: MAX_DOCUMENT_NUMBER_LEN,
        }),
        Some(v) => Ok(Some(v.to_string())),
    }
}
