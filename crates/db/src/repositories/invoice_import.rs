//! Turns an extracted invoice into a payable account.
//!
//! Supplier, billed person and expense types are looked up first and
//! created only when missing. Everything runs in a single transaction so a
//! rejected plan leaves no half-imported records behind.

use finadmin_core::account::{
    AccountRuleError, ClassificationShare, InstallmentDraft, validate_classifications,
    validate_document_number, validate_installment_plan,
};
use finadmin_core::classification::{ClassificationSuggestion, classify};
use finadmin_core::extraction::{ExtractedBilledPerson, ExtractedInvoice, ExtractedSupplier};
use finadmin_core::people::{DocumentError, normalize_cnpj, normalize_cpf};
use finadmin_shared::types::{BilledPersonId, SupplierId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::common::now;
use super::expense_type::get_or_create_for_category;
use super::payable_account::{CreatePayableAccountInput, insert_account};
use crate::entities::{billed_people, sea_orm_active_enums::ExpenseCategory, suppliers};

/// Error types for invoice imports.
#[derive(Debug, thiserror::Error)]
pub enum InvoiceImportError {
    /// Supplier CNPJ or billed person CPF cannot be normalized.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Installment or classification rule violated.
    #[error(transparent)]
    Rule(#[from] AccountRuleError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Identifiers of everything an import wrote or reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedAccount {
    /// New payable account.
    pub payable_account_id: Uuid,
    /// Supplier, reused or created.
    pub supplier_id: Uuid,
    /// Billed person, reused or created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billed_person_id: Option<Uuid>,
    /// Installments in number order.
    pub installment_ids: Vec<Uuid>,
    /// One expense type per suggested category.
    pub expense_type_ids: Vec<Uuid>,
}

/// Imports extracted invoices.
#[derive(Debug, Clone)]
pub struct InvoiceImportRepository {
    db: DatabaseConnection,
}

impl InvoiceImportRepository {
    /// Creates a new invoice import repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a payable account from an extracted invoice.
    ///
    /// `classifications` overrides the suggestions carried by the invoice.
    /// When both are empty the product description is classified again.
    ///
    /// # Errors
    ///
    /// Returns `Document` for a tax id that cannot be normalized and `Rule`
    /// when the installments do not match the total.
    pub async fn generate_account(
        &self,
        invoice: ExtractedInvoice,
        classifications: Option<Vec<ClassificationSuggestion>>,
    ) -> Result<GeneratedAccount, InvoiceImportError> {
        let supplier_tax_id = normalize_cnpj(&invoice.supplier.tax_id)?;
        let billed_document = invoice
            .billed_person
            .as_ref()
            .map(|p| normalize_cpf(&p.document_id))
            .transpose()?;
        let invoice_number =
            validate_document_number("invoice_number", invoice.invoice_number.as_deref())?;

        let installments: Vec<InstallmentDraft> = invoice
            .installments
            .iter()
            .map(|i| InstallmentDraft {
                installment_number: i.installment_number,
                due_date: i.due_date,
                amount: i.amount,
            })
            .collect();
        validate_installment_plan(invoice.total_amount, &installments)?;

        let suggestions = pick_suggestions(&invoice, classifications);
        let categories = distinct_categories(&suggestions);

        let txn = self.db.begin().await?;

        let supplier_id = upsert_supplier(&txn, &invoice.supplier, supplier_tax_id).await?;
        let billed_person_id = match (invoice.billed_person.as_ref(), billed_document) {
            (Some(person), Some(document_id)) => {
                Some(upsert_billed_person(&txn, person, document_id).await?)
            }
            _ => None,
        };

        let mut shares = Vec::with_capacity(categories.len());
        for (category, percentage) in &categories {
            let (expense_type, created) = get_or_create_for_category(&txn, *category).await?;
            if created {
                debug!(expense_type_id = %expense_type.id, ?category, "Expense type created for import");
            }
            shares.push(ClassificationShare {
                type_id: expense_type.id,
                percentage: *percentage,
            });
        }
        validate_classifications(&shares)?;

        let details = insert_account(
            &txn,
            CreatePayableAccountInput {
                invoice_number,
                issue_date: invoice.issue_date,
                product_description: invoice.product_description,
                total_amount: invoice.total_amount,
                supplier_id,
                billed_person_id,
                installments,
                classifications: shares.clone(),
            },
        )
        .await?;
        txn.commit().await?;

        info!(
            payable_account_id = %details.account.id,
            supplier_id = %supplier_id,
            categories = shares.len(),
            "Payable account generated from invoice"
        );
        Ok(GeneratedAccount {
            payable_account_id: details.account.id,
            supplier_id,
            billed_person_id,
            installment_ids: details.installments.iter().map(|i| i.id).collect(),
            expense_type_ids: shares.iter().map(|s| s.type_id).collect(),
        })
    }
}

fn pick_suggestions(
    invoice: &ExtractedInvoice,
    override_with: Option<Vec<ClassificationSuggestion>>,
) -> Vec<ClassificationSuggestion> {
    match override_with {
        Some(list) if !list.is_empty() => list,
        _ if !invoice.classifications.is_empty() => invoice.classifications.clone(),
        _ => classify(&invoice.product_description, ""),
    }
}

/// First suggestion per category wins; order is preserved.
fn distinct_categories(
    suggestions: &[ClassificationSuggestion],
) -> Vec<(ExpenseCategory, rust_decimal::Decimal)> {
    let mut out: Vec<(ExpenseCategory, rust_decimal::Decimal)> = Vec::new();
    for suggestion in suggestions {
        let category = ExpenseCategory::from(suggestion.category);
        if !out.iter().any(|(c, _)| *c == category) {
            out.push((category, suggestion.percentage));
        }
    }
    out
}

async fn upsert_supplier<C: ConnectionTrait>(
    db: &C,
    extracted: &ExtractedSupplier,
    tax_id: String,
) -> Result<Uuid, DbErr> {
    let existing = suppliers::Entity::find()
        .filter(suppliers::Column::TaxId.eq(tax_id.as_str()))
        .one(db)
        .await?;

    match existing {
        Some(supplier) if supplier.active => Ok(supplier.id),
        Some(supplier) => {
            let id = supplier.id;
            let mut model: suppliers::ActiveModel = supplier.into();
            model.active = Set(true);
            model.updated_at = Set(now());
            model.update(db).await?;
            info!(supplier_id = %id, "Supplier reactivated by invoice import");
            Ok(id)
        }
        None => {
            let now = now();
            let supplier = suppliers::ActiveModel {
                id: Set(SupplierId::new().into_inner()),
                company_name: Set(extracted.company_name.trim().to_string()),
                trade_name: Set(extracted
                    .trade_name
                    .as_deref()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)),
                tax_id: Set(tax_id),
                active: Set(true),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(db)
            .await?;
            info!(supplier_id = %supplier.id, "Supplier created by invoice import");
            Ok(supplier.id)
        }
    }
}

async fn upsert_billed_person<C: ConnectionTrait>(
    db: &C,
    extracted: &ExtractedBilledPerson,
    document_id: String,
) -> Result<Uuid, DbErr> {
    let existing = billed_people::Entity::find()
        .filter(billed_people::Column::DocumentId.eq(document_id.as_str()))
        .one(db)
        .await?;

    match existing {
        Some(person) if person.active => Ok(person.id),
        Some(person) => {
            let id = person.id;
            let mut model: billed_people::ActiveModel = person.into();
            model.active = Set(true);
            model.updated_at = Set(now());
            model.update(db).await?;
            info!(billed_person_id = %id, "Billed person reactivated by invoice import");
            Ok(id)
        }
        None => {
            let now = now();
            let person = billed_people::ActiveModel {
                id: Set(BilledPersonId::new().into_inner()),
                full_name: Set(extracted.full_name.trim().to_string()),
                document_id: Set(document_id),
                active: Set(true),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(db)
            .await?;
            info!(billed_person_id = %person.id, "Billed person created by invoice import");
            Ok(person.id)
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use finadmin_core::classification::ExpenseCategory as CoreCategory;
    use finadmin_core::extraction::ExtractedInstallment;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;
    use crate::entities::{expense_types, payable_accounts, payable_installments};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn invoice() -> ExtractedInvoice {
        ExtractedInvoice {
            invoice_number: Some("4521".to_string()),
            issue_date: date(2025, 3, 1),
            product_description: "Fertilizante NPK".to_string(),
            total_amount: dec!(900.00),
            supplier: ExtractedSupplier {
                company_name: "Agropecuária Boa Safra Ltda".to_string(),
                trade_name: None,
                tax_id: "12345678000190".to_string(),
            },
            billed_person: None,
            installments: vec![ExtractedInstallment {
                installment_number: 1,
                due_date: date(2025, 3, 1),
                amount: dec!(900.00),
            }],
            installment_count: 1,
            overall_confidence: dec!(0.9),
            notes: None,
            classifications: vec![ClassificationSuggestion {
                category: CoreCategory::AgriculturalInputs,
                description: "INSUMOS AGRÍCOLAS - fertilizante".to_string(),
                percentage: dec!(100.00),
                confidence: dec!(0.5),
            }],
        }
    }

    fn suggestion(category: CoreCategory) -> ClassificationSuggestion {
        ClassificationSuggestion {
            category,
            description: String::new(),
            percentage: dec!(100.00),
            confidence: dec!(0.3),
        }
    }

    #[test]
    fn test_override_suggestions_win() {
        let picked = pick_suggestions(&invoice(), Some(vec![suggestion(CoreCategory::Investments)]));
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].category, CoreCategory::Investments);
    }

    #[test]
    fn test_empty_override_falls_back_to_invoice() {
        let picked = pick_suggestions(&invoice(), Some(vec![]));
        assert_eq!(picked[0].category, CoreCategory::AgriculturalInputs);
    }

    #[test]
    fn test_no_suggestions_reclassifies_description() {
        let mut invoice = invoice();
        invoice.classifications.clear();
        let picked = pick_suggestions(&invoice, None);
        assert!(!picked.is_empty());
    }

    #[test]
    fn test_distinct_categories_keeps_first() {
        let mut second = suggestion(CoreCategory::Administrative);
        second.percentage = dec!(40);
        let categories = distinct_categories(&[
            suggestion(CoreCategory::Administrative),
            second,
            suggestion(CoreCategory::TaxesFees),
        ]);
        assert_eq!(
            categories,
            vec![
                (ExpenseCategory::Administrative, dec!(100.00)),
                (ExpenseCategory::TaxesFees, dec!(100.00)),
            ]
        );
    }

    #[tokio::test]
    async fn test_invalid_tax_id_rejected_before_querying() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let mut invoice = invoice();
        invoice.supplier.tax_id = "1234".to_string();

        let err = InvoiceImportRepository::new(db.clone())
            .generate_account(invoice, None)
            .await
            .unwrap_err();
        assert!(matches!(err, InvoiceImportError::Document(_)));
        assert!(db.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn test_generate_account_reuses_supplier_and_type() {
        let now = now();
        let supplier = suppliers::Model {
            id: Uuid::new_v4(),
            company_name: "Agropecuária Boa Safra Ltda".to_string(),
            trade_name: None,
            tax_id: "12.345.678/0001-90".to_string(),
            active: true,
            created_at: now,
            updated_at: now,
        };
        let expense_type = expense_types::Model {
            id: Uuid::new_v4(),
            description: "INSUMOS AGRÍCOLAS".to_string(),
            category: ExpenseCategory::AgriculturalInputs,
            notes: None,
            active: true,
            created_at: now,
            updated_at: now,
        };
        let account = payable_accounts::Model {
            id: Uuid::new_v4(),
            invoice_number: Some("4521".to_string()),
            issue_date: date(2025, 3, 1),
            product_description: "Fertilizante NPK".to_string(),
            total_amount: dec!(900.00),
            supplier_id: supplier.id,
            billed_person_id: None,
            active: true,
            created_at: now,
            updated_at: now,
        };
        let installment = payable_installments::Model {
            id: Uuid::new_v4(),
            payable_account_id: account.id,
            installment_number: 1,
            due_date: date(2025, 3, 1),
            installment_amount: dec!(900.00),
            payment_date: None,
            paid_amount: None,
            notes: None,
            active: true,
            created_at: now,
            updated_at: now,
        };
        let link = crate::entities::payable_account_expense_classifications::Model {
            id: Uuid::new_v4(),
            payable_account_id: account.id,
            expense_type_id: expense_type.id,
            percentage: dec!(100.00),
            created_at: now,
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![supplier.clone()]])
            .append_query_results([vec![expense_type.clone()]])
            .append_query_results([vec![account.clone()]])
            .append_query_results([vec![installment.clone()]])
            .append_query_results([vec![link]])
            .into_connection();

        let generated = InvoiceImportRepository::new(db.clone())
            .generate_account(invoice(), None)
            .await
            .unwrap();
        assert_eq!(
            generated,
            GeneratedAccount {
                payable_account_id: account.id,
                supplier_id: supplier.id,
                billed_person_id: None,
                installment_ids: vec![installment.id],
                expense_type_ids: vec![expense_type.id],
            }
        );

        let log = db.into_transaction_log();
        assert_eq!(log.len(), 1, "whole import is one transaction");
        let txn = format!("{:?}", log[0]);
        assert!(!txn.contains("INSERT INTO \\\"suppliers\\\""), "{txn}");
        assert!(txn.contains("12.345.678/0001-90"), "{txn}");
    }
}
