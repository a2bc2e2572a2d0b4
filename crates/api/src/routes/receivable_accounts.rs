//! Receivable account routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use finadmin_core::account::{ClassificationShare, InstallmentStatus, receivable_status};
use finadmin_core::people::validate_name;
use finadmin_db::{
    ReceivableAccountRepository,
    entities::{
        receivable_account_revenue_classifications, receivable_accounts, receivable_installments,
    },
    repositories::{
        CreateReceivableAccountInput, ReceivableAccountDetails, ReceivableAccountFilter,
        RecordReceiptInput, UpdateReceivableAccountInput,
    },
};
use finadmin_shared::types::PageResponse;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{double_option, non_blank, page_request};
use super::payable_accounts::InstallmentRequest;
use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery},
};

/// Creates the receivable account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/receivable-accounts",
            get(list_receivable_accounts).post(create_receivable_account),
        )
        .route(
            "/receivable-accounts/{id}",
            get(get_receivable_account)
                .put(update_receivable_account)
                .delete(delete_receivable_account),
        )
        .route(
            "/receivable-accounts/{id}/reactivate",
            patch(reactivate_receivable_account),
        )
        .route(
            "/receivable-accounts/{id}/installments",
            get(list_receivable_installments),
        )
        .route(
            "/receivable-accounts/{id}/installments/{number}/receipt",
            post(record_receipt),
        )
}

/// Share of an account assigned to a revenue type.
#[derive(Debug, Deserialize)]
pub struct RevenueClassificationRequest {
    /// Revenue type.
    pub revenue_type_id: Uuid,
    /// Share in percent.
    pub percentage: Decimal,
}

impl From<RevenueClassificationRequest> for ClassificationShare<Uuid> {
    fn from(r: RevenueClassificationRequest) -> Self {
        Self {
            type_id: r.revenue_type_id,
            percentage: r.percentage,
        }
    }
}

/// Request body for creating a receivable account.
#[derive(Debug, Deserialize)]
pub struct CreateReceivableAccountRequest {
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
    pub installments: Vec<InstallmentRequest>,
    /// Revenue classifications.
    #[serde(default)]
    pub classifications: Vec<RevenueClassificationRequest>,
}

/// Request body for updating a receivable account.
#[derive(Debug, Deserialize)]
pub struct UpdateReceivableAccountRequest {
    /// Document number; `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub document_number: Option<Option<String>>,
    /// Issue date.
    pub issue_date: Option<NaiveDate>,
    /// Description.
    pub description: Option<String>,
    /// Customer.
    pub customer_id: Option<Uuid>,
    /// Replaces every classification when present.
    pub classifications: Option<Vec<RevenueClassificationRequest>>,
}

/// Query parameters for listing receivable accounts.
#[derive(Debug, Deserialize)]
pub struct ListReceivableAccountsQuery {
    /// Customer.
    pub customer_id: Option<Uuid>,
    /// Exact document number.
    pub document_number: Option<String>,
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

/// Request body for receiving an installment.
#[derive(Debug, Deserialize)]
pub struct RecordReceiptRequest {
    /// Date received.
    pub receipt_date: NaiveDate,
    /// Amount received; defaults to the installment amount.
    pub received_amount: Option<Decimal>,
    /// Notes.
    pub notes: Option<String>,
}

/// Receivable account header.
#[derive(Debug, Serialize)]
pub struct ReceivableAccountResponse {
    /// Account ID.
    pub id: Uuid,
    /// Document number.
    pub document_number: Option<String>,
    /// Issue date.
    pub issue_date: NaiveDate,
    /// Description.
    pub description: String,
    /// Total amount.
    pub total_amount: Decimal,
    /// Customer.
    pub customer_id: Uuid,
    /// Active flag.
    pub active: bool,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
    /// Last update time.
    pub updated_at: DateTime<FixedOffset>,
}

impl From<receivable_accounts::Model> for ReceivableAccountResponse {
    fn from(m: receivable_accounts::Model) -> Self {
        Self {
            id: m.id,
            document_number: m.document_number,
            issue_date: m.issue_date,
            description: m.description,
            total_amount: m.total_amount,
            customer_id: m.customer_id,
            active: m.active,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Receivable installment with its derived status.
#[derive(Debug, Serialize)]
pub struct ReceivableInstallmentResponse {
    /// Installment ID.
    pub id: Uuid,
    /// Position in the plan.
    pub installment_number: i32,
    /// Due date.
    pub due_date: NaiveDate,
    /// Amount due.
    pub installment_amount: Decimal,
    /// Date received.
    pub receipt_date: Option<NaiveDate>,
    /// Amount received.
    pub received_amount: Option<Decimal>,
    /// Notes.
    pub notes: Option<String>,
    /// Pending, overdue or received.
    pub status: InstallmentStatus,
}

impl ReceivableInstallmentResponse {
    fn new(m: receivable_installments::Model, today: NaiveDate) -> Self {
        Self {
            status: receivable_status(m.due_date, m.receipt_date, today),
            id: m.id,
            installment_number: m.installment_number,
            due_date: m.due_date,
            installment_amount: m.installment_amount,
            receipt_date: m.receipt_date,
            received_amount: m.received_amount,
            notes: m.notes,
        }
    }
}

/// Revenue classification of an account.
#[derive(Debug, Serialize)]
pub struct RevenueClassificationResponse {
    /// Revenue type.
    pub revenue_type_id: Uuid,
    /// Share in percent.
    pub percentage: Decimal,
}

impl From<receivable_account_revenue_classifications::Model> for RevenueClassificationResponse {
    fn from(m: receivable_account_revenue_classifications::Model) -> Self {
        Self {
            revenue_type_id: m.revenue_type_id,
            percentage: m.percentage,
        }
    }
}

/// Account with installments and classifications.
#[derive(Debug, Serialize)]
pub struct ReceivableAccountDetailsResponse {
    /// Account header.
    #[serde(flatten)]
    pub account: ReceivableAccountResponse,
    /// Installments ordered by number.
    pub installments: Vec<ReceivableInstallmentResponse>,
    /// Revenue classifications.
    pub classifications: Vec<RevenueClassificationResponse>,
}

impl ReceivableAccountDetailsResponse {
    fn new(details: ReceivableAccountDetails, today: NaiveDate) -> Self {
        Self {
            account: details.account.into(),
            installments: details
                .installments
                .into_iter()
                .map(|i| ReceivableInstallmentResponse::new(i, today))
                .collect(),
            classifications: details
                .classifications
                .into_iter()
                .map(RevenueClassificationResponse::from)
                .collect(),
        }
    }
}

fn repo(state: &AppState) -> ReceivableAccountRepository {
    ReceivableAccountRepository::new((*state.db).clone())
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

async fn create_receivable_account(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateReceivableAccountRequest>,
) -> ApiResult<(StatusCode, Json<ReceivableAccountDetailsResponse>)> {
    let input = CreateReceivableAccountInput {
        document_number: payload.document_number,
        issue_date: payload.issue_date,
        description: validate_name("description", &payload.description)
            .map_err(ApiError::validation)?,
        total_amount: payload.total_amount,
        customer_id: payload.customer_id,
        installments: payload.installments.into_iter().map(Into::into).collect(),
        classifications: payload.classifications.into_iter().map(Into::into).collect(),
    };

    let details = repo(&state).create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ReceivableAccountDetailsResponse::new(details, today())),
    ))
}

async fn list_receivable_accounts(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListReceivableAccountsQuery>,
) -> ApiResult<Json<PageResponse<ReceivableAccountResponse>>> {
    let page = page_request(query.page, query.per_page)?;
    let filter = ReceivableAccountFilter {
        customer_id: query.customer_id,
        document_number: non_blank(query.document_number),
        issued_from: query.issued_from,
        issued_to: query.issued_to,
        active: query.active,
    };

    let accounts = repo(&state).list(filter, page).await?;
    Ok(Json(accounts.map(ReceivableAccountResponse::from)))
}

async fn get_receivable_account(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<ReceivableAccountDetailsResponse>> {
    let details = repo(&state).get(id).await?;
    Ok(Json(ReceivableAccountDetailsResponse::new(details, today())))
}

async fn update_receivable_account(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateReceivableAccountRequest>,
) -> ApiResult<Json<ReceivableAccountDetailsResponse>> {
    let input = UpdateReceivableAccountInput {
        document_number: payload.document_number,
        issue_date: payload.issue_date,
        description: payload
            .description
            .map(|d| validate_name("description", &d))
            .transpose()
            .map_err(ApiError::validation)?,
        customer_id: payload.customer_id,
        classifications: payload
            .classifications
            .map(|shares| shares.into_iter().map(Into::into).collect()),
    };

    let details = repo(&state).update(id, input).await?;
    Ok(Json(ReceivableAccountDetailsResponse::new(details, today())))
}

async fn delete_receivable_account(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    repo(&state).soft_delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn reactivate_receivable_account(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<ReceivableAccountDetailsResponse>> {
    let details = repo(&state).reactivate(id).await?;
    Ok(Json(ReceivableAccountDetailsResponse::new(details, today())))
}

async fn list_receivable_installments(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<ReceivableInstallmentResponse>>> {
    let today = today();
    let installments = repo(&state).list_installments(id).await?;
    Ok(Json(
        installments
            .into_iter()
            .map(|i| ReceivableInstallmentResponse::new(i, today))
            .collect(),
    ))
}

async fn record_receipt(
    State(state): State<AppState>,
    ApiPath((id, number)): ApiPath<(Uuid, i32)>,
    ApiJson(payload): ApiJson<RecordReceiptRequest>,
) -> ApiResult<Json<ReceivableInstallmentResponse>> {
    let input = RecordReceiptInput {
        receipt_date: payload.receipt_date,
        received_amount: payload.received_amount,
        notes: non_blank(payload.notes),
    };

    let installment = repo(&state).record_receipt(id, number, input).await?;
    Ok(Json(ReceivableInstallmentResponse::new(installment, today())))
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;

    use super::*;
    use crate::test_support::{get, json_body, json_request, send, state};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn account() -> receivable_accounts::Model {
        let now = Utc::now().into();
        receivable_accounts::Model {
            id: Uuid::new_v4(),
            document_number: Some("NF-88".to_string()),
            issue_date: date(2025, 2, 1),
            description: "Venda de 300 sacas de soja".to_string(),
            total_amount: dec!(45000.00),
            customer_id: Uuid::new_v4(),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn installment(account_id: Uuid, due: NaiveDate) -> receivable_installments::Model {
        let now = Utc::now().into();
        receivable_installments::Model {
            id: Uuid::new_v4(),
            receivable_account_id: account_id,
            installment_number: 1,
            due_date: due,
            installment_amount: dec!(45000.00),
            receipt_date: None,
            received_amount: None,
            notes: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_get_missing_account_is_404() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<receivable_accounts::Model>::new()])
            .into_connection();

        let id = Uuid::new_v4();
        let response = send(state(db), get(&format!("/api/v1/receivable-accounts/{id}"))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            json_body(response).await["message"],
            format!("Receivable account not found: {id}")
        );
    }

    #[tokio::test]
    async fn test_future_installment_is_pending() {
        let acc = account();
        let due = Utc::now().date_naive() + chrono::Days::new(30);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![acc.clone()]])
            .append_query_results([vec![installment(acc.id, due)]])
            .into_connection();

        let response = send(
            state(db),
            get(&format!("/api/v1/receivable-accounts/{}/installments", acc.id)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await[0]["status"], "PENDING");
    }

    #[tokio::test]
    async fn test_record_receipt() {
        let acc = account();
        let open = installment(acc.id, date(2025, 3, 1));
        let mut received = open.clone();
        received.receipt_date = Some(date(2025, 3, 5));
        received.received_amount = Some(dec!(44000.00));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![acc.clone()]])
            .append_query_results([vec![open]])
            .append_query_results([vec![received]])
            .into_connection();

        let response = send(
            state(db),
            json_request(
                "POST",
                &format!("/api/v1/receivable-accounts/{}/installments/1/receipt", acc.id),
                &json!({"receipt_date": "2025-03-05", "received_amount": "44000.00"}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "RECEIVED");
        assert_eq!(body["received_amount"], "44000.00");
    }

    #[tokio::test]
    async fn test_missing_installment_is_404() {
        let acc = account();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![acc.clone()]])
            .append_query_results([Vec::<receivable_installments::Model>::new()])
            .into_connection();

        let response = send(
            state(db),
            json_request(
                "POST",
                &format!("/api/v1/receivable-accounts/{}/installments/7/receipt", acc.id),
                &json!({"receipt_date": "2025-03-05"}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_without_installments_is_422() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let response = send(
            state(db),
            json_request(
                "POST",
                "/api/v1/receivable-accounts",
                &json!({
                    "issue_date": "2025-02-01",
                    "description": "Venda de soja",
                    "total_amount": "100.00",
                    "customer_id": Uuid::new_v4(),
                    "installments": []
                }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            json_body(response).await["message"],
            "at least one installment is required"
        );
    }
}
