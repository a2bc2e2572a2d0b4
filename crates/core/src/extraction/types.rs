//! Extracted invoice types.
//!
//! `Raw*` types mirror what the model returns: every field optional and
//! amounts in whatever shape the model chose. `Extracted*` types are the
//! validated result handed to API clients and accepted back by
//! account generation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::classification::ClassificationSuggestion;

/// Model output before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct RawInvoice {
    pub invoice_number: Option<String>,
    pub issue_date: Option<String>,
    pub product_description: Option<String>,
    pub total_amount: Option<serde_json::Value>,
    pub supplier: Option<RawSupplier>,
    pub billed_person: Option<RawBilledPerson>,
    pub installments: Vec<RawInstallment>,
    pub installment_count: Option<serde_json::Value>,
    pub overall_confidence: Option<serde_json::Value>,
    pub notes: Option<String>,
}

/// Supplier as returned by the model.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct RawSupplier {
    pub company_name: Option<String>,
    pub trade_name: Option<String>,
    pub tax_id: Option<String>,
}

/// Billed person as returned by the model.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct RawBilledPerson {
    pub full_name: Option<String>,
    pub document_id: Option<String>,
}

/// Installment as returned by the model.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct RawInstallment {
    pub installment_number: Option<serde_json::Value>,
    pub due_date: Option<String>,
    pub amount: Option<serde_json::Value>,
}

/// A validated invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedInvoice {
    /// Invoice (nota fiscal) number.
    pub invoice_number: Option<String>,
    /// Issue date.
    pub issue_date: NaiveDate,
    /// Detailed description of goods or services.
    pub product_description: String,
    /// Invoice total.
    pub total_amount: Decimal,
    /// Issuing company.
    pub supplier: ExtractedSupplier,
    /// Person the invoice is billed to, when present.
    pub billed_person: Option<ExtractedBilledPerson>,
    /// Installment plan. Never empty.
    pub installments: Vec<ExtractedInstallment>,
    /// Number of installments stated on the invoice.
    pub installment_count: i32,
    /// Model confidence in `[0, 1]`.
    pub overall_confidence: Decimal,
    /// Free-form remarks from the model.
    pub notes: Option<String>,
    /// Keyword classification suggestions.
    #[serde(default)]
    pub classifications: Vec<ClassificationSuggestion>,
}

/// Issuing company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedSupplier {
    /// Legal name.
    pub company_name: String,
    /// Trade name.
    pub trade_name: Option<String>,
    /// CNPJ, masked when it could be normalized.
    pub tax_id: String,
}

/// Billed person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedBilledPerson {
    /// Full name.
    pub full_name: String,
    /// CPF, masked when it could be normalized.
    pub document_id: String,
}

/// A scheduled payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedInstallment {
    /// Position in the plan, starting at 1.
    pub installment_number: i32,
    /// Due date.
    pub due_date: NaiveDate,
    /// Amount due.
    pub amount: Decimal,
}
