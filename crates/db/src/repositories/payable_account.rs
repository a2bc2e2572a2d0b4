//! Payable account repository.
//!
//! An account is written together with its installments and expense
//! classifications in one transaction. Installments follow the account's
//! active flag on soft delete and reactivation.

use std::collections::HashSet;

use chrono::NaiveDate;
use finadmin_core::account::{
    AccountRuleError, ClassificationShare, InstallmentDraft, validate_amount,
    validate_classifications, validate_document_number, validate_installment_plan,
};
use finadmin_shared::types::{InstallmentId, PageRequest, PageResponse, PayableAccountId};
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
    billed_people, expense_types, payable_account_expense_classifications as classifications,
    payable_accounts, payable_installments, suppliers,
};

/// Error types for payable account operations.
#[derive(Debug, thiserror::Error)]
pub enum PayableAccountError {
    /// Account not found or inactive.
    #[error("Payable account not found: {0}")]
    NotFound(Uuid),

    /// No installment with this number on the account.
    #[error("Installment {number} not found on payable account {account_id}")]
    InstallmentNotFound {
        /// Account searched.
        account_id: Uuid,
        /// Requested installment number.
        number: i32,
    },

    /// Supplier missing or inactive.
    #[error("Supplier {0} does not exist or is inactive")]
    InactiveSupplier(Uuid),

    /// Billed person missing or inactive.
    #[error("Billed person {0} does not exist or is inactive")]
    InactiveBilledPerson(Uuid),

    /// Expense type missing or inactive.
    #[error("Expense type {0} does not exist or is inactive")]
    InactiveExpenseType(Uuid),

    /// Installment or classification rule violated.
    #[error(transparent)]
    Rule(#[from] AccountRuleError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a payable account.
#[derive(Debug, Clone)]
pub struct CreatePayableAccountInput {
    /// Invoice number.
    pub invoice_number: Option<String>,
    /// Issue date.
    pub issue_date: NaiveDate,
    /// What was bought.
    pub product_description: String,
    /// Total amount.
    pub total_amount: Decimal,
    /// Supplier.
    pub supplier_id: Uuid,
    /// Person the invoice is billed to.
    pub billed_person_id: Option<Uuid>,
    /// Installment plan.
    pub installments: Vec<InstallmentDraft>,
    /// Expense classifications.
    pub classifications: Vec<ClassificationShare<Uuid>>,
}

/// Input for updating a payable account.
///
/// The total and the installment plan are fixed once written.
#[derive(Debug, Clone, Default)]
pub struct UpdatePayableAccountInput {
    /// Invoice number; `Some(None)` clears it.
    pub invoice_number: Option<Option<String>>,
    /// Issue date.
    pub issue_date: Option<NaiveDate>,
    /// What was bought.
    pub product_description: Option<String>,
    /// Supplier.
    pub supplier_id: Option<Uuid>,
    /// Billed person; `Some(None)` clears it.
    pub billed_person_id: Option<Option<Uuid>>,
    /// Replaces every classification when present.
    pub classifications: Option<Vec<ClassificationShare<Uuid>>>,
}

/// Filter options for listing payable accounts.
#[derive(Debug, Clone, Default)]
pub struct PayableAccountFilter {
    /// Supplier.
    pub supplier_id: Option<Uuid>,
    /// Billed person.
    pub billed_person_id: Option<Uuid>,
    /// Exact invoice number.
    pub invoice_number: Option<String>,
    /// Issued on or after.
    pub issued_from: Option<NaiveDate>,
    /// Issued on or before.
    pub issued_to: Option<NaiveDate>,
    /// Active status; `None` lists active accounts.
    pub active: Option<bool>,
}

/// Input for recording an installment payment.
#[derive(Debug, Clone)]
pub struct RecordPaymentInput {
    /// Date paid.
    pub payment_date: NaiveDate,
    /// Amount paid; defaults to the installment amount.
    pub paid_amount: Option<Decimal>,
    /// Notes.
    pub notes: Option<String>,
}

/// An account with its installments and classifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayableAccountDetails {
    /// The account row.
    pub account: payable_accounts::Model,
    /// Installments ordered by number.
    pub installments: Vec<payable_installments::Model>,
    /// Expense classifications.
    pub classifications: Vec<classifications::Model>,
}

/// Payable account repository.
#[derive(Debug, Clone)]
pub struct PayableAccountRepository {
    db: DatabaseConnection,
}

impl PayableAccountRepository {
    /// Creates a new payable account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an account with its installments and classifications.
    ///
    /// # Errors
    ///
    /// Returns `Rule` for an invalid plan and an `Inactive*` error when a
    /// referenced record is missing or inactive.
    pub async fn create(
        &self,
        mut input: CreatePayableAccountInput,
    ) -> Result<PayableAccountDetails, PayableAccountError> {
        input.invoice_number =
            validate_document_number("invoice_number", input.invoice_number.as_deref())?;
        validate_installment_plan(input.total_amount, &input.installments)?;
        validate_classifications(&input.classifications)?;

        self.ensure_supplier_active(input.supplier_id).await?;
        if let Some(person_id) = input.billed_person_id {
            self.ensure_billed_person_active(person_id).await?;
        }
        self.ensure_expense_types_active(&input.classifications)
            .await?;

        let txn = self.db.begin().await?;
        let details = insert_account(&txn, input).await?;
        txn.commit().await?;

        info!(
            payable_account_id = %details.account.id,
            supplier_id = %details.account.supplier_id,
            installments = details.installments.len(),
            "Payable account created"
        );
        Ok(details)
    }

    /// Finds an active account by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<payable_accounts::Model>, DbErr> {
        payable_accounts::Entity::find_by_id(id)
            .filter(payable_accounts::Column::Active.eq(true))
            .one(&self.db)
            .await
    }

    /// Gets an active account with installments and classifications.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for missing or inactive accounts.
    pub async fn get(&self, id: Uuid) -> Result<PayableAccountDetails, PayableAccountError> {
        let account = self.get_account(id).await?;
        let installments = self.installments_of(id).await?;
        let classifications = classifications::Entity::find()
            .filter(classifications::Column::PayableAccountId.eq(id))
            .order_by_asc(classifications::Column::CreatedAt)
            .order_by_asc(classifications::Column::Id)
            .all(&self.db)
            .await?;

        Ok(PayableAccountDetails {
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
        filter: PayableAccountFilter,
        page: PageRequest,
    ) -> Result<PageResponse<payable_accounts::Model>, DbErr> {
        let mut condition =
            Condition::all().add(active_filter(payable_accounts::Column::Active, filter.active));
        if let Some(supplier_id) = filter.supplier_id {
            condition = condition.add(payable_accounts::Column::SupplierId.eq(supplier_id));
        }
        if let Some(person_id) = filter.billed_person_id {
            condition = condition.add(payable_accounts::Column::BilledPersonId.eq(person_id));
        }
        if let Some(number) = filter.invoice_number {
            condition = condition.add(payable_accounts::Column::InvoiceNumber.eq(number.trim()));
        }
        if let Some(from) = filter.issued_from {
            condition = condition.add(payable_accounts::Column::IssueDate.gte(from));
        }
        if let Some(to) = filter.issued_to {
            condition = condition.add(payable_accounts::Column::IssueDate.lte(to));
        }

        let select = payable_accounts::Entity::find()
            .filter(condition)
            .order_by_desc(payable_accounts::Column::IssueDate)
            .order_by_asc(payable_accounts::Column::Id);
        fetch_page(&self.db, select, page).await
    }

    /// Updates account header fields and optionally replaces classifications.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for missing or inactive accounts, and the same
    /// reference and rule errors as [`Self::create`].
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdatePayableAccountInput,
    ) -> Result<PayableAccountDetails, PayableAccountError> {
        let existing = self.get_account(id).await?;

        if let Some(shares) = input.classifications.as_deref() {
            validate_classifications(shares)?;
            self.ensure_expense_types_active(shares).await?;
        }
        if let Some(supplier_id) = input.supplier_id
            && supplier_id != existing.supplier_id
        {
            self.ensure_supplier_active(supplier_id).await?;
        }
        if let Some(Some(person_id)) = input.billed_person_id
            && Some(person_id) != existing.billed_person_id
        {
            self.ensure_billed_person_active(person_id).await?;
        }

        let mut account: payable_accounts::ActiveModel = existing.into();
        if let Some(number) = input.invoice_number {
            account.invoice_number = Set(validate_document_number(
                "invoice_number",
                number.as_deref(),
            )?);
        }
        if let Some(issue_date) = input.issue_date {
            account.issue_date = Set(issue_date);
        }
        if let Some(description) = input.product_description {
            account.product_description = Set(description);
        }
        if let Some(supplier_id) = input.supplier_id {
            account.supplier_id = Set(supplier_id);
        }
        if let Some(person_id) = input.billed_person_id {
            account.billed_person_id = Set(person_id);
        }
        account.updated_at = Set(now());

        let txn = self.db.begin().await?;
        account.update(&txn).await?;
        if let Some(shares) = input.classifications {
            classifications::Entity::delete_many()
                .filter(classifications::Column::PayableAccountId.eq(id))
                .exec(&txn)
                .await?;
            insert_classifications(&txn, id, &shares).await?;
        }
        txn.commit().await?;

        info!(payable_account_id = %id, "Payable account updated");
        self.get(id).await
    }

    /// Soft-deletes an account and its installments.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for missing or inactive accounts.
    pub async fn soft_delete(&self, id: Uuid) -> Result<(), PayableAccountError> {
        self.get_account(id).await?;
        self.set_active(id, false).await?;
        info!(payable_account_id = %id, "Payable account deactivated");
        Ok(())
    }

    /// Reactivates an account and its installments.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no account has this ID.
    pub async fn reactivate(&self, id: Uuid) -> Result<PayableAccountDetails, PayableAccountError> {
        let existing = payable_accounts::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(PayableAccountError::NotFound(id))?;
        if !existing.active {
            self.set_active(id, true).await?;
            info!(payable_account_id = %id, "Payable account reactivated");
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
    ) -> Result<Vec<payable_installments::Model>, PayableAccountError> {
        self.get_account(account_id).await?;
        Ok(self.installments_of(account_id).await?)
    }

    /// Records the payment of one installment.
    ///
    /// # Errors
    ///
    /// Returns `Rule(AlreadySettled)` when the installment was already paid.
    pub async fn record_payment(
        &self,
        account_id: Uuid,
        number: i32,
        input: RecordPaymentInput,
    ) -> Result<payable_installments::Model, PayableAccountError> {
        self.get_account(account_id).await?;
        let installment = payable_installments::Entity::find()
            .filter(payable_installments::Column::PayableAccountId.eq(account_id))
            .filter(payable_installments::Column::InstallmentNumber.eq(number))
            .filter(payable_installments::Column::Active.eq(true))
            .one(&self.db)
            .await?
            .ok_or(PayableAccountError::InstallmentNotFound { account_id, number })?;

        if installment.payment_date.is_some() {
            return Err(AccountRuleError::AlreadySettled(number).into());
        }
        let amount = input.paid_amount.unwrap_or(installment.installment_amount);
        validate_amount("paid_amount", amount)?;

        let mut model: payable_installments::ActiveModel = installment.into();
        model.payment_date = Set(Some(input.payment_date));
        model.paid_amount = Set(Some(amount));
        if let Some(notes) = input.notes {
            model.notes = Set(Some(notes));
        }
        model.updated_at = Set(now());
        let installment = model.update(&self.db).await?;

        info!(
            payable_account_id = %account_id,
            installment_number = number,
            paid_amount = %amount,
            "Installment paid"
        );
        Ok(installment)
    }

    async fn get_account(&self, id: Uuid) -> Result<payable_accounts::Model, PayableAccountError> {
        self.find_by_id(id)
            .await?
            .ok_or(PayableAccountError::NotFound(id))
    }

    async fn installments_of(
        &self,
        account_id: Uuid,
    ) -> Result<Vec<payable_installments::Model>, DbErr> {
        payable_installments::Entity::find()
            .filter(payable_installments::Column::PayableAccountId.eq(account_id))
            .order_by_asc(payable_installments::Column::InstallmentNumber)
            .all(&self.db)
            .await
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<(), DbErr> {
        let now = now();
        let txn = self.db.begin().await?;
        payable_accounts::Entity::update_many()
            .col_expr(payable_accounts::Column::Active, Expr::value(active))
            .col_expr(payable_accounts::Column::UpdatedAt, Expr::value(now))
            .filter(payable_accounts::Column::Id.eq(id))
            .exec(&txn)
            .await?;
        payable_installments::Entity::update_many()
            .col_expr(payable_installments::Column::Active, Expr::value(active))
            .col_expr(payable_installments::Column::UpdatedAt, Expr::value(now))
            .filter(payable_installments::Column::PayableAccountId.eq(id))
            .exec(&txn)
            .await?;
        txn.commit().await
    }

    async fn ensure_supplier_active(&self, id: Uuid) -> Result<(), PayableAccountError> {
        suppliers::Entity::find_by_id(id)
            .filter(suppliers::Column::Active.eq(true))
            .one(&self.db)
            .await?
            .map(|_| ())
            .ok_or(PayableAccountError::InactiveSupplier(id))
    }

    async fn ensure_billed_person_active(&self, id: Uuid) -> Result<(), PayableAccountError> {
        billed_people::Entity::find_by_id(id)
            .filter(billed_people::Column::Active.eq(true))
            .one(&self.db)
            .await?
            .map(|_| ())
            .ok_or(PayableAccountError::InactiveBilledPerson(id))
    }

    async fn ensure_expense_types_active(
        &self,
        shares: &[ClassificationShare<Uuid>],
    ) -> Result<(), PayableAccountError> {
        if shares.is_empty() {
            return Ok(());
        }

        let found: HashSet<Uuid> = expense_types::Entity::find()
            .filter(expense_types::Column::Id.is_in(shares.iter().map(|s| s.type_id)))
            .filter(expense_types::Column::Active.eq(true))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect();

        match shares.iter().find(|s| !found.contains(&s.type_id)) {
            Some(missing) => Err(PayableAccountError::InactiveExpenseType(missing.type_id)),
            None => Ok(()),
        }
    }
}

/// Writes an already validated account with its children.
pub(crate) async fn insert_account<C: ConnectionTrait>(
    db: &C,
    input: CreatePayableAccountInput,
) -> Result<PayableAccountDetails, DbErr> {
    let now = now();
    let account_id = PayableAccountId::new().into_inner();

    let account = payable_accounts::ActiveModel {
        id: Set(account_id),
        invoice_number: Set(input.invoice_number),
        issue_date: Set(input.issue_date),
        product_description: Set(input.product_description),
        total_amount: Set(input.total_amount),
        supplier_id: Set(input.supplier_id),
        billed_person_id: Set(input.billed_person_id),
        active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    let mut installments = Vec::with_capacity(input.installments.len());
    for draft in input.installments {
        let installment = payable_installments::ActiveModel {
            id: Set(InstallmentId::new().into_inner()),
            payable_account_id: Set(account_id),
            installment_number: Set(draft.installment_number),
            due_date: Set(draft.due_date),
            installment_amount: Set(draft.amount),
            payment_date: Set(None),
            paid_amount: Set(None),
            notes: Set(None),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await?;
        installments.push(installment);
    }
    installments.sort_by_key(|i| i.installment_number);

    let classifications = insert_classifications(db, account_id, &input.classifications).await?;

    Ok(PayableAccountDetails {
        account,
        installments,
        classifications,
    })
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
            payable_account_id: Set(account_id),
            expense_type_id: Set(share.type_id),
            percentage: Set(share.percentage),
            created_at: Set(now),
        }
        .insert(db)
        .await?;
        rows.push(row);
    }
    Ok(rows)
}
