//! Receivable account repository.
//!
//! Mirrors the payable side: one transaction per account write, with
//! installments following the account's active flag.

use std::collections::HashSet;

use chrono::NaiveDate;
use finadmin_core::account::{
    AccountRuleError, ClassificationShare, InstallmentDraft, validate_amount,
    validate_classifications, validate_document_number, validate_installment_plan,
};
use finadmin_shared::types::{InstallmentId, PageRequest, PageResponse, ReceivableAccountId};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use super::common::{active_filter, fetch_page, now};
use crate::entities::{
    customers, receivable_account_revenue_classifications as classifications,
    receivable_accounts, receivable_installments, revenue_types,
};

/// Error types for receivable account operations.
#[derive(Debug, thiserror::Error)]
pub enum ReceivableAccountError {
    /// Account not found or inactive.
    #[error("Receivable account not found: {0}")]
    NotFound(Uuid),

    /// No installment with this number on the account.
    #[error("Installment {number} not found on receivable account {account_id}")]
    InstallmentNotFound {
        /// Account searched.
        account_id: Uuid,
        /// Requested installment number.
        number: i32,
    },

    /// Customer missing or inactive.
    #[error("Customer {0} does not exist or is inactive")]
    InactiveCustomer(Uuid),

    /// Revenue type missing or inactive.
    #[error("Revenue type {0} does not exist or is inactive")]
    InactiveRevenueType(Uuid),

    /// Installment or classification rule violated.
    #[error(transparent)]
    Rule(#[from] AccountRuleError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a receivable account.
#[derive(Debug, Clone)]
pub struct CreateReceivableAccountInput {
    /// Document number.
    pub document_number: Option<String>,
    /// Issue date.
    pub issue_date: NaiveDate,
    /// What is being received for.
    pub description: String,
    /// Total amount.
    pub total_amount: Decimal,
    /// Customer.
    pub customer_id: Uuid,
    /// Installment plan.
    pub installments: Vec<InstallmentDraft>,
    /// Revenue classifications.
    pub classifications: Vec<ClassificationShare<Uuid>>,
}

/// Input for updating a receivable account. The total and plan are fixed.
#[derive(Debug, Clone, Default)]
pub struct UpdateReceivableAccountInput {
    /// Document number; `Some(None)` clears it.
    pub document_number: Option<Option<String>>,
    /// Issue date.
    pub issue_date: Option<NaiveDate>,
    /// Description.
    pub description: Option<String>,
    /// Customer.
    pub customer_id: Option<Uuid>,
    /// Replaces every classification when present.
    pub classifications: Option<Vec<ClassificationShare<Uuid>>>,
}

/// Filter options for listing receivable accounts.
#[derive(Debug, Clone, Default)]
pub struct ReceivableAccountFilter {
    /// Customer.
    pub customer_id: Option<Uuid>,
    /// Exact document number.
    pub document_number: Option<String>,
    /// Issued on or after.
    pub issued_from: Option<NaiveDate>,
    /// Issued on or before.
    pub issued_to: Option<NaiveDate>,
    /// Active status; `None` lists active accounts.
    pub active: Option<bool>,
}

/// Input for recording an installment receipt.
#[derive(Debug, Clone)]
pub struct RecordReceiptInput {
    /// Date received.
    pub receipt_date: NaiveDate,
    /// Amount received; defaults to the installment amount.
    pub received_amount: Option<Decimal>,
    /// Notes.
    pub notes: Option<String>,
}

/// An account with its installments and classifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivableAccountDetails {
    /// The account row.
    pub account: receivable_accounts::Model,
    /// Installments ordered by number.
    pub installments: Vec<receivable_installments::Model>,
    /// Revenue classifications.
    pub classifications: Vec<classifications::Model>,
}

/// Receivable account repository.
#[derive(Debug, Clone)]
pub struct ReceivableAccountRepository {
    db: DatabaseConnection,
}

impl ReceivableAccountRepository {
    /// Creates a new receivable account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an account with its installments and classifications.
    ///
    /// # Errors
    ///
    /// Returns `Rule` for an invalid plan, `InactiveCustomer` or
    /// `InactiveRevenueType` for bad references.
    pub async fn create(
        &self,
        mut input: CreateReceivableAccountInput,
    ) -> Result<ReceivableAccountDetails, ReceivableAccountError> {
        input.document_number =
            validate_document_number("document_number", input.document_number.as_deref())?;
        validate_installment_plan(input.total_amount, &input.installments)?;
        validate_classifications(&input.classifications)?;

        self.ensure_customer_active(input.customer_id).await?;
        self.ensure_revenue_types_active(&input.classifications)
            .await?;

        let now = now();
        let account_id = ReceivableAccountId::new().into_inner();
        let txn = self.db.begin().await?;

        let account = receivable_accounts::ActiveModel {
            id: Set(account_id),
            document_number: Set(input.document_number),
            issue_date: Set(input.issue_date),
            description: Set(input.description),
            total_amount: Set(input.total_amount),
            customer_id: Set(input.customer_id),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let mut installments = Vec::with_capacity(input.installments.len());
        for draft in input.installments {
            let installment = receivable_installments::ActiveModel {
                id: Set(InstallmentId::new().into_inner()),
                receivable_account_id: Set(account_id),
                installment_number: Set(draft.installment_number),
                due_date: Set(draft.due_date),
                installment_amount: Set(draft.amount),
                receipt_date: Set(None),
                received_amount: Set(None),
                notes: Set(None),
                active: Set(true),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await?;
            installments.push(installment);
        }
        installments.sort_by_key(|i| i.installment_number);

        let classifications =
            insert_classifications(&txn, account_id, &input.classifications).await?;
        txn.commit().await?;

        info!(
            receivable_account_id = %account_id,
            customer_id = %account.customer_id,
            installments = installments.len(),
            "Receivable account created"
        );
        Ok(ReceivableAccountDetails {
            account,
            installments,
            classifications,
        })
    }

    /// Finds an active account by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<receivable_accounts::Model>, DbErr> {
        receivable_accounts::Entity::find_by_id(id)
            .filter(receivable_accounts::Column::Active.eq(true))
            .one(&self.db)
            .await
    }

    /// Gets an active account with installments and classifications.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for missing or inactive accounts.
    pub async fn get(&self, id: Uuid) -> Result<ReceivableAccountDetails, ReceivableAccountError> {
        let account = self.get_account(id).await?;
        let installments = self.installments_of(id).await?;
        let classifications = classifications::Entity::find()
            .filter(classifications::Column::ReceivableAccountId.eq(id))
            .order_by_asc(classifications::Column::CreatedAt)
            .order_by_asc(classifications::Column::Id)
            .all(&self.db)
            .await?;

        Ok(ReceivableAccountDetails {
            account,
            installments,
            classifications,
        })
    }

    /// Lists accounts, newest issue date first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: ReceivableAccountFilter,
        page: PageRequest,
    ) -> Result<PageResponse<receivable_accounts::Model>, DbErr> {
        let mut condition = Condition::all().add(active_filter(
            receivable_accounts::Column::Active,
            filter.active,
        ));
        if let Some(customer_id) = filter.customer_id {
            condition = condition.add(receivable_accounts::Column::CustomerId.eq(customer_id));
        }
        if let Some(number) = filter.document_number {
            condition =
                condition.add(receivable_accounts::Column::DocumentNumber.eq(number.trim()));
        }
        if let Some(from) = filter.issued_from {
            condition = condition.add(receivable_accounts::Column::IssueDate.gte(from));
        }
        if let Some(to) = filter.issued_to {
            condition = condition.add(receivable_accounts::Column::IssueDate.lte(to));
        }

        let select = receivable_accounts::Entity::find()
            .filter(condition)
            .order_by_desc(receivable_accounts::Column::IssueDate)
            .order_by_asc(receivable_accounts::Column::Id);
        fetch_page(&self.db, select, page).await
    }

    /// Updates account header fields and optionally replaces classifications.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for missing or inactive accounts.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateReceivableAccountInput,
    ) -> Result<ReceivableAccountDetails, ReceivableAccountError> {
        let existing = self.get_account(id).await?;

        if let Some(shares) = input.classifications.as_deref() {
            validate_classifications(shares)?;
            self.ensure_revenue_types_active(shares).await?;
        }
        if let Some(customer_id) = input.customer_id
            && customer_id != existing.customer_id
        {
            self.ensure_customer_active(customer_id).await?;
        }

        let mut account: receivable_accounts::ActiveModel = existing.into();
        if let Some(number) = input.document_number {
            account.document_number = Set(validate_document_number(
                "document_number",
                number.as_deref(),
            )?);
        }
        if let Some(issue_date) = input.issue_date {
            account.issue_date = Set(issue_date);
        }
        if let Some(description) = input.description {
            account.description = Set(description);
        }
        if let Some(customer_id) = input.customer_id {
            account.customer_id = Set(customer_id);
        }
        account.updated_at = Set(now());

        let txn = self.db.begin().await?;
        account.update(&txn).await?;
        if let Some(shares) = input.classifications {
            classifications::Entity::delete_many()
                .filter(classifications::Column::ReceivableAccountId.eq(id))
                .exec(&txn)
                .await?;
            insert_classifications(&txn, id, &shares).await?;
        }
        txn.commit().await?;

        info!(receivable_account_id = %id, "Receivable account updated");
        self.get(id).await
    }

    /// Soft-deletes an account and its installments.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for missing or inactive accounts.
    pub async fn soft_delete(&self, id: Uuid) -> Result<(), ReceivableAccountError> {
        self.get_account(id).await?;
        self.set_active(id, false).await?;
        info!(receivable_account_id = %id, "Receivable account deactivated");
        Ok(())
    }

    /// Reactivates an account and its installments.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no account has this ID.
    pub async fn reactivate(
        &self,
        id: Uuid,
    ) -> Result<ReceivableAccountDetails, ReceivableAccountError> {
        let existing = receivable_accounts::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ReceivableAccountError::NotFound(id))?;
        if !existing.active {
            self.set_active(id, true).await?;
            info!(receivable_account_id = %id, "Receivable account reactivated");
        }
        self.get(id).await
    }

    /// Lists the installments of an active account.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for missing or inactive accounts.
    pub async fn list_installments(
        &self,
        account_id: Uuid,
    ) -> Result<Vec<receivable_installments::Model>, ReceivableAccountError> {
        self.get_account(account_id).await?;
        Ok(self.installments_of(account_id).await?)
    }

    /// Records the receipt of one installment.
    ///
    /// # Errors
    ///
    /// Returns `Rule(AlreadySettled)` when the installment was already received.
    pub async fn record_receipt(
        &self,
        account_id: Uuid,
        number: i32,
        input: RecordReceiptInput,
    ) -> Result<receivable_installments::Model, ReceivableAccountError> {
        self.get_account(account_id).await?;
        let installment = receivable_installments::Entity::find()
            .filter(receivable_installments::Column::ReceivableAccountId.eq(account_id))
            .filter(receivable_installments::Column::InstallmentNumber.eq(number))
            .filter(receivable_installments::Column::Active.eq(true))
            .one(&self.db)
            .await?
            .ok_or(ReceivableAccountError::InstallmentNotFound { account_id, number })?;

        if installment.receipt_date.is_some() {
            return Err(AccountRuleError::AlreadySettled(number).into());
        }
        let amount = input
            .received_amount
            .unwrap_or(installment.installment_amount);
        validate_amount("received_amount", amount)?;

        let mut model: receivable_installments::ActiveModel = installment.into();
        model.receipt_date = Set(Some(input.receipt_date));
        model.received_amount = Set(Some(amount));
        if let Some(notes) = input.notes {
            model.notes = Set(Some(notes));
        }
        model.updated_at = Set(now());
        let installment = model.update(&self.db).await?;

        info!(
            receivable_account_id = %account_id,
            installment_number = number,
            received_amount = %amount,
            "Installment received"
        );
        Ok(installment)
    }

    async fn get_account(
        &self,
        id: Uuid,
    ) -> Result<receivable_accounts::Model, ReceivableAccountError> {
        self.find_by_id(id)
            .await?
            .ok_or(ReceivableAccountError::NotFound(id))
    }

    async fn installments_of(
        &self,
        account_id: Uuid,
    ) -> Result<Vec<receivable_installments::Model>, DbErr> {
        receivable_installments::Entity::find()
            .filter(receivable_installments::Column::ReceivableAccountId.eq(account_id))
            .order_by_asc(receivable_installments::Column::InstallmentNumber)
            .all(&self.db)
            .await
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<(), DbErr> {
        let now = now();
        let txn = self.db.begin().await?;
        receivable_accounts::Entity::update_many()
            .col_expr(receivable_accounts::Column::Active, Expr::value(active))
            .col_expr(receivable_accounts::Column::UpdatedAt, Expr::value(now))
            .filter(receivable_accounts::Column::Id.eq(id))
            .exec(&txn)
            .await?;
        receivable_installments::Entity::update_many()
            .col_expr(receivable_installments::Column::Active, Expr::value(active))
            .col_expr(receivable_installments::Column::UpdatedAt, Expr::value(now))
            .filter(receivable_installments::Column::ReceivableAccountId.eq(id))
            .exec(&txn)
            .await?;
        txn.commit().await
    }

    async fn ensure_customer_active(&self, id: Uuid) -> Result<(), ReceivableAccountError> {
        customers::Entity::find_by_id(id)
            .filter(customers::Column::Active.eq(true))
            .one(&self.db)
            .await?
            .map(|_| ())
            .ok_or(ReceivableAccountError::InactiveCustomer(id))
    }

    async fn ensure_revenue_types_active(
        &self,
        shares: &[ClassificationShare<Uuid>],
    ) -> Result<(), ReceivableAccountError> {
        if shares.is_empty() {
            return Ok(());
        }

        let found: HashSet<Uuid> = revenue_types::Entity::find()
            .filter(revenue_types::Column::Id.is_in(shares.iter().map(|s| s.type_id)))
            .filter(revenue_types::Column::Active.eq(true))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect();

        match shares.iter().find(|s| !found.contains(&s.type_id)) {
            Some(missing) => Err(ReceivableAccountError::InactiveRevenueType(missing.type_id)),
            None => Ok(()),
        }
    }
}

async fn insert_classifications<C: ConnectionTrait>(
    db: &C,
    account_id: Uuid,
    shares: &[ClassificationShare<Uuid>],
) -> Result<Vec<classifications::Model>, DbErr> {
    let now = now();
    let mut rows = Vec::with_capacity(shares.len());
    for share in shares {
        let row = classifications::ActiveModel {
            id: Set(Uuid::now_v7()),
            receivable_account_id: Set(account_id),
            revenue_type_id: Set(share.type_id),
            percentage: Set(share.percentage),
            created_at: Set(now),
        }
        .insert(db)
        .await?;
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Transaction};

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn account() -> receivable_accounts::Model {
        let now = now();
        receivable_accounts::Model {
            id: Uuid::new_v4(),
            document_number: None,
            issue_date: date(2025, 2, 10),
            description: "Venda de soja safra 24/25".to_string(),
            total_amount: dec!(48000.00),
            customer_id: Uuid::new_v4(),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn cascade_results() -> [MockExecResult; 2] {
        [
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
        ]
    }

    /// True when one transaction updates both the account and its installments.
    fn cascaded_in_one_transaction(log: &[Transaction]) -> bool {
        log.iter().any(|txn| {
            let statements = format!("{txn:?}");
            statements.contains("UPDATE \\\"receivable_accounts\\\" SET \\\"active\\\"")
                && statements
                    .contains("UPDATE \\\"receivable_installments\\\" SET \\\"active\\\"")
        })
    }

    fn installment(account_id: Uuid) -> receivable_installments::Model {
        let now = now();
        receivable_installments::Model {
            id: Uuid::new_v4(),
            receivable_account_id: account_id,
            installment_number: 1,
            due_date: date(2025, 3, 10),
            installment_amount: dec!(48000.00),
            receipt_date: None,
            received_amount: None,
            notes: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_revenue_type() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let revenue_type = Uuid::new_v4();
        let share = ClassificationShare {
            type_id: revenue_type,
            percentage: dec!(50),
        };

        let err = ReceivableAccountRepository::new(db)
            .create(CreateReceivableAccountInput {
                document_number: None,
                issue_date: date(2025, 2, 10),
                description: "Venda de soja".to_string(),
                total_amount: dec!(100.00),
                customer_id: Uuid::new_v4(),
                installments: vec![InstallmentDraft {
                    installment_number: 1,
                    due_date: date(2025, 3, 10),
                    amount: dec!(100.00),
                }],
                classifications: vec![share, share],
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ReceivableAccountError::Rule(AccountRuleError::DuplicateClassification(_))
        ));
    }

    #[tokio::test]
    async fn test_create_requires_active_customer() {
        let customer_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<customers::Model>::new()])
            .into_connection();

        let err = ReceivableAccountRepository::new(db)
            .create(CreateReceivableAccountInput {
                document_number: Some("NF-77".to_string()),
                issue_date: date(2025, 2, 10),
                description: "Venda de soja".to_string(),
                total_amount: dec!(100.00),
                customer_id,
                installments: vec![InstallmentDraft {
                    installment_number: 1,
                    due_date: date(2025, 3, 10),
                    amount: dec!(100.00),
                }],
                classifications: vec![],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ReceivableAccountError::InactiveCustomer(id) if id == customer_id));
    }

    #[tokio::test]
    async fn test_record_receipt_with_explicit_amount() {
        let existing = account();
        let open = installment(existing.id);
        let mut received = open.clone();
        received.receipt_date = Some(date(2025, 3, 9));
        received.received_amount = Some(dec!(47500.00));

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing.clone()]])
            .append_query_results([vec![open]])
            .append_query_results([vec![received.clone()]])
            .into_connection();

        let result = ReceivableAccountRepository::new(db)
            .record_receipt(
                existing.id,
                1,
                RecordReceiptInput {
                    receipt_date: date(2025, 3, 9),
                    received_amount: Some(dec!(47500.00)),
                    notes: Some("desconto pontualidade".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(result.received_amount, Some(dec!(47500.00)));
    }

    #[tokio::test]
    async fn test_record_receipt_rejects_non_positive_amount() {
        let existing = account();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing.clone()]])
            .append_query_results([vec![installment(existing.id)]])
            .into_connection();

        let err = ReceivableAccountRepository::new(db)
            .record_receipt(
                existing.id,
                1,
                RecordReceiptInput {
                    receipt_date: date(2025, 3, 9),
                    received_amount: Some(Decimal::ZERO),
                    notes: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ReceivableAccountError::Rule(AccountRuleError::NonPositiveAmount { .. })
        ));
    }

    #[tokio::test]
    async fn test_soft_delete_cascades_to_installments() {
        let existing = account();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing.clone()]])
            .append_exec_results(cascade_results())
            .into_connection();

        ReceivableAccountRepository::new(db.clone())
            .soft_delete(existing.id)
            .await
            .unwrap();

        let log = db.into_transaction_log();
        assert!(cascaded_in_one_transaction(&log), "{log:?}");
    }

    #[tokio::test]
    async fn test_reactivate_cascades_to_installments() {
        let mut inactive = account();
        inactive.active = false;
        let mut restored = inactive.clone();
        restored.active = true;
        let installment = installment(restored.id);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![inactive.clone()]])
            .append_exec_results(cascade_results())
            .append_query_results([vec![restored.clone()]])
            .append_query_results([vec![installment]])
            .append_query_results([Vec::<classifications::Model>::new()])
            .into_connection();

        let details = ReceivableAccountRepository::new(db.clone())
            .reactivate(inactive.id)
            .await
            .unwrap();
        assert!(details.account.active);
        assert_eq!(details.installments.len(), 1);

        let log = db.into_transaction_log();
        assert!(cascaded_in_one_transaction(&log), "{log:?}");
    }

    #[tokio::test]
    async fn test_soft_delete_inactive_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<receivable_accounts::Model>::new()])
            .into_connection();

        let err = ReceivableAccountRepository::new(db)
            .soft_delete(Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, ReceivableAccountError::NotFound(_)));
    }
}
