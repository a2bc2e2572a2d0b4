//! Payable account routes.
//!
//! Accounts are created with their whole installment plan. Installment
//! status is derived on every response from the due and payment dates.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use finadmin_core::account::{
    ClassificationShare, InstallmentDraft, InstallmentStatus, payable_status,
};
use finadmin_core::people::validate_name;
use finadmin_db::{
    PayableAccountRepository,
    entities::{payable_account_expense_classifications, payable_accounts, payable_installments},
    repositories::{
        CreatePayableAccountInput, PayableAccountDetails, PayableAccountFilter,
        RecordPaymentInput, UpdatePayableAccountInput,
    },
};
use finadmin_shared::types::PageResponse;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{double_option, non_blank, page_request};
use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery},
};

/// Creates the payable account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/payable-accounts",
            get(list_payable_accounts).post(create_payable_account),
        )
        .route(
            "/payable-accounts/{id}",
            get(get_payable_account)
                .put(update_payable_account)
                .delete(delete_payable_account),
        )
        .route(
            "/payable-accounts/{id}/reactivate",
            patch(reactivate_payable_account),
        )
        .route(
            "/payable-accounts/{id}/installments",
            get(list_payable_installments),
        )
        .route(
            "/payable-accounts/{id}/installments/{number}/payment",
            post(record_payment),
        )
}

/// One installment of a new account.
#[derive(Debug, Deserialize)]
pub struct InstallmentRequest {
    /// Position in the plan, starting at 1.
    pub installment_number: i32,
    /// Due date.
    pub due_date: NaiveDate,
    /// Amount due.
    pub amount: Decimal,
}

impl From<InstallmentRequest> for InstallmentDraft {
    fn from(r: InstallmentRequest) -> Self {
        Self {
            installment_number: r.installment_number,
            due_date: r.due_date,
            amount: r.amount,
        }
    }
}

/// Share of an account assigned to an expense type.
#[derive(Debug, Deserialize)]
pub struct ExpenseClassificationRequest {
    /// Expense type.
    pub expense_type_id: Uuid,
    /// Share in percent.
    pub percentage: Decimal,
}

impl From<ExpenseClassificationRequest> for ClassificationShare<Uuid> {
    fn from(r: ExpenseClassificationRequest) -> Self {
        Self {
            type_id: r.expense_type_id,
            percentage: r.percentage,
        }
    }
}

/// Request body for creating a payable account.
#[derive(Debug, Deserialize)]
pub struct CreatePayableAccountRequest {
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
    pub installments: Vec<InstallmentRequest>,
    /// Expense classifications.
    #[serde(default)]
    pub classifications: Vec<ExpenseClassificationRequest>,
}

/// Request body for updating a payable account.
#[derive(Debug, Deserialize)]
pub struct UpdatePayableAccountRequest {
    /// Invoice number; `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub invoice_number: Option<Option<String>>,
    /// Issue date.
    pub issue_date: Option<NaiveDate>,
    /// What was bought.
    pub product_description: Option<String>,
    /// Supplier.
    pub supplier_id: Option<Uuid>,
    /// Billed person; `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub billed_person_id: Option<Option<Uuid>>,
    /// Replaces every classification when present.
    pub classifications: Option<Vec<ExpenseClassificationRequest>>,
}

/// Query parameters for listing payable accounts.
#[derive(Debug, Deserialize)]
pub struct ListPayableAccountsQuery {
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
    /// `true` or `false`; active only when absent.
    pub active: Option<bool>,
    /// Page number.
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

/// Request body for paying an installment.
#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    /// Date paid.
    pub payment_date: NaiveDate,
    /// Amount paid; defaults to the installment amount.
    pub paid_amount: Option<Decimal>,
    /// Notes.
    pub notes: Option<String>,
}

/// Payable account header.
#[derive(Debug, Serialize)]
pub struct PayableAccountResponse {
    /// Account ID.
    pub id: Uuid,
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
    /// Billed person.
    pub billed_person_id: Option<Uuid>,
    /// Active flag.
    pub active: bool,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
    /// Last update time.
    pub updated_at: DateTime<FixedOffset>,
}

impl From<payable_accounts::Model> for PayableAccountResponse {
    fn from(m: payable_accounts::Model) -> Self {
        Self {
            id: m.id,
            invoice_number: m.invoice_number,
            issue_date: m.issue_date,
            product_description: m.product_description,
            total_amount: m.total_amount,
            supplier_id: m.supplier_id,
            billed_person_id: m.billed_person_id,
            active: m.active,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Payable installment with its derived status.
#[derive(Debug, Serialize)]
pub struct PayableInstallmentResponse {
    /// Installment ID.
    pub id: Uuid,
    /// Position in the plan.
    pub installment_number: i32,
    /// Due date.
    pub due_date: NaiveDate,
    /// Amount due.
    pub installment_amount: Decimal,
    /// Date paid.
    pub payment_date: Option<NaiveDate>,
    /// Amount paid.
    pub paid_amount: Option<Decimal>,
    /// Notes.
    pub notes: Option<String>,
    /// Pending, overdue or paid.
    pub status: InstallmentStatus,
}

impl PayableInstallmentResponse {
    fn new(m: payable_installments::Model, today: NaiveDate) -> Self {
        Self {
            status: payable_status(m.due_date, m.payment_date, today),
            id: m.id,
            installment_number: m.installment_number,
            due_date: m.due_date,
            installment_amount: m.installment_amount,
            payment_date: m.payment_date,
            paid_amount: m.paid_amount,
            notes: m.notes,
        }
    }
}

/// Expense classification of an account.
#[derive(Debug, Serialize)]
pub struct ExpenseClassificationResponse {
    /// Expense type.
    pub expense_type_id: Uuid,
    /// Share in percent.
    pub percentage: Decimal,
}

impl From<payable_account_expense_classifications::Model> for ExpenseClassificationResponse {
    fn from(m: payable_account_expense_classifications::Model) -> Self {
        Self {
            expense_type_id: m.expense_type_id,
            percentage: m.percentage,
        }
    }
}

/// Account with installments and classifications.
#[derive(Debug, Serialize)]
pub struct PayableAccountDetailsResponse {
    /// Account header.
    #[serde(flatten)]
    pub account: PayableAccountResponse,
    /// Installments ordered by number.
    pub installments: Vec<PayableInstallmentResponse>,
    /// Expense classifications.
    pub classifications: Vec<ExpenseClassificationResponse>,
}

impl PayableAccountDetailsResponse {
    fn new(details: PayableAccountDetails, today: NaiveDate) -> Self {
        Self {
            account: details.account.into(),
            installments: details
                .installments
                .into_iter()
                .map(|i| PayableInstallmentResponse::new(i, today))
                .collect(),
            classifications: details
                .classifications
                .into_iter()
                .map(ExpenseClassificationResponse::from)
                .collect(),
        }
    }
}

fn repo(state: &AppState) -> PayableAccountRepository {
    PayableAccountRepository::new((*state.db).clone())
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// POST `/payable-accounts` - Create an account with its installments.
async fn create_payable_account(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreatePayableAccountRequest>,
) -> ApiResult<(StatusCode, Json<PayableAccountDetailsResponse>)> {
    let input = CreatePayableAccountInput {
        invoice_number: payload.invoice_number,
        issue_date: payload.issue_date,
        product_description: validate_name("product_description", &payload.product_description)
            .map_err(ApiError::validation)?,
        total_amount: payload.total_amount,
        supplier_id: payload.supplier_id,
        billed_person_id: payload.billed_person_id,
        installments: payload.installments.into_iter().map(Into::into).collect(),
        classifications: payload.classifications.into_iter().map(Into::into).collect(),
    };

    let details = repo(&state).create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(PayableAccountDetailsResponse::new(details, today())),
    ))
}

/// GET `/payable-accounts` - List accounts.
async fn list_payable_accounts(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListPayableAccountsQuery>,
) -> ApiResult<Json<PageResponse<PayableAccountResponse>>> {
    let page = page_request(query.page, query.per_page)?;
    let filter = PayableAccountFilter {
        supplier_id: query.supplier_id,
        billed_person_id: query.billed_person_id,
        invoice_number: non_blank(query.invoice_number),
        issued_from: query.issued_from,
        issued_to: query.issued_to,
        active: query.active,
    };

    let accounts = repo(&state).list(filter, page).await?;
    Ok(Json(accounts.map(PayableAccountResponse::from)))
}

/// GET `/payable-accounts/{id}` - Get an account with its installments.
async fn get_payable_account(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<PayableAccountDetailsResponse>> {
    let details = repo(&state).get(id).await?;
    Ok(Json(PayableAccountDetailsResponse::new(details, today())))
}

/// PUT `/payable-accounts/{id}` - Update header fields or classifications.
async fn update_payable_account(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdatePayableAccountRequest>,
) -> ApiResult<Json<PayableAccountDetailsResponse>> {
    let input = UpdatePayableAccountInput {
        invoice_number: payload.invoice_number,
        issue_date: payload.issue_date,
        product_description: payload
            .product_description
            .map(|d| validate_name("product_description", &d))
            .transpose()
            .map_err(ApiError::validation)?,
        supplier_id: payload.supplier_id,
        billed_person_id: payload.billed_person_id,
        classifications: payload
            .classifications
            .map(|shares| shares.into_iter().map(Into::into).collect()),
    };

    let details = repo(&state).update(id, input).await?;
    Ok(Json(PayableAccountDetailsResponse::new(details, today())))
}

/// DELETE `/payable-accounts/{id}` - Soft-delete an account and its installments.
async fn delete_payable_account(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    repo(&state).soft_delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH `/payable-accounts/{id}/reactivate` - Reactivate an account and its installments.
async fn reactivate_payable_account(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<PayableAccountDetailsResponse>> {
    let details = repo(&state).reactivate(id).await?;
    Ok(Json(PayableAccountDetailsResponse::new(details, today())))
}

/// GET `/payable-accounts/{id}/installments` - List installments.
async fn list_payable_installments(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<PayableInstallmentResponse>>> {
    let today = today();
    let installments = repo(&state).list_installments(id).await?;
    Ok(Json(
        installments
            .into_iter()
            .map(|i| PayableInstallmentResponse::new(i, today))
            .collect(),
    ))
}

/// POST `/payable-accounts/{id}/installments/{number}/payment` - Pay an installment.
async fn record_payment(
    State(state): State<AppState>,
    ApiPath((id, number)): ApiPath<(Uuid, i32)>,
    ApiJson(payload): ApiJson<RecordPaymentRequest>,
) -> ApiResult<Json<PayableInstallmentResponse>> {
    let input = RecordPaymentInput {
        payment_date: payload.payment_date,
        paid_amount: payload.paid_amount,
        notes: non_blank(payload.notes),
    };

    let installment = repo(&state).record_payment(id, number, input).await?;
    Ok(Json(PayableInstallmentResponse::new(installment, today())))
}
