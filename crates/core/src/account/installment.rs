//! Installment status.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Derived status of an installment. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstallmentStatus {
    /// Not yet due and not settled.
    Pending,
    /// Past due and not settled.
    Overdue,
    /// Payable installment with a payment date.
    Paid,
    /// Receivable installment with a receipt date.
    Received,
}

/// Status of a payable installment on `today`.
#[must_use]
pub fn payable_status(
    due_date: NaiveDate,
    payment_date: Option<NaiveDate>,
    today: NaiveDate,
) -> InstallmentStatus {
    if payment_date.is_some() {
        InstallmentStatus::Paid
    } else {
        open_status(due_date, today)
    }
}

/// Status of a receivable installment on `today`.
#[must_use]
pub fn receivable_status(
    due_date: NaiveDate,
    receipt_date: Option<NaiveDate>,
    today: NaiveDate,
) -> InstallmentStatus {
    if receipt_date.is_some() {
        InstallmentStatus::Received
    } else {
        open_status(due_date, today)
    }
}

fn open_status(due_date: NaiveDate, today: NaiveDate) -> InstallmentStatus {
    if due_date < today {
        InstallmentStatus::Overdue
    } else {
        InstallmentStatus::Pending
    }
}
