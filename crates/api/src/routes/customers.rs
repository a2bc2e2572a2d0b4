//! Customer routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};
use chrono::{DateTime, FixedOffset};
use finadmin_core::people::{normalize_cpf, validate_name};
use finadmin_db::{
    CustomerRepository,
    entities::customers,
    repositories::{CreateCustomerInput, CustomerFilter, UpdateCustomerInput},
};
use finadmin_shared::{AppError, types::PageResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{SearchQuery, non_blank, page_request};
use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery},
};

/// Creates the customer routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list_customers).post(create_customer))
        .route("/customers/search", get(search_customers))
        .route(
            "/customers/document-id/{document_id}",
            get(get_customer_by_document),
        )
        .route(
            "/customers/{id}",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
        .route("/customers/{id}/reactivate", patch(reactivate_customer))
}

/// Request body for creating a person (customer or billed person).
#[derive(Debug, Deserialize)]
pub struct CreatePersonRequest {
    /// Full name.
    pub full_name: String,
    /// CPF, masked or digits only.
    pub document_id: String,
}

/// Request body for updating a person.
#[derive(Debug, Deserialize)]
pub struct UpdatePersonRequest {
    /// Full name.
    pub full_name: Option<String>,
    /// CPF, masked or digits only.
    pub document_id: Option<String>,
}

/// Query parameters for listing people.
#[derive(Debug, Deserialize)]
pub struct ListPeopleQuery {
    /// Case-insensitive substring of the name.
    pub full_name: Option<String>,
    /// CPF, masked or digits only.
    pub document_id: Option<String>,
    /// `true` or `false`; active only when absent.
    pub active: Option<bool>,
    /// Page number.
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

/// Person as returned by the customer and billed person endpoints.
#[derive(Debug, Serialize)]
pub struct PersonResponse {
    /// Record ID.
    pub id: Uuid,
    /// Full name.
    pub full_name: String,
    /// Masked CPF.
    pub document_id: String,
    /// Active flag.
    pub active: bool,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
    /// Last update time.
    pub updated_at: DateTime<FixedOffset>,
}

impl From<customers::Model> for PersonResponse {
    fn from(m: customers::Model) -> Self {
        Self {
            id: m.id,
            full_name: m.full_name,
            document_id: m.document_id,
            active: m.active,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl CreatePersonRequest {
    /// Validated name and normalized CPF.
    pub(crate) fn validated(&self) -> ApiResult<(String, String)> {
        Ok((
            validate_name("full_name", &self.full_name).map_err(ApiError::validation)?,
            normalize_cpf(&self.document_id)?,
        ))
    }
}

impl UpdatePersonRequest {
    /// Validated name and normalized CPF, each only when present.
    pub(crate) fn validated(&self) -> ApiResult<(Option<String>, Option<String>)> {
        let full_name = self
            .full_name
            .as_deref()
            .map(|n| validate_name("full_name", n))
            .transpose()
            .map_err(ApiError::validation)?;
        let document_id = self.document_id.as_deref().map(normalize_cpf).transpose()?;
        Ok((full_name, document_id))
    }
}

impl ListPeopleQuery {
    /// Name and normalized CPF filters.
    pub(crate) fn filters(&self) -> ApiResult<(Option<String>, Option<String>)> {
        let document_id = non_blank(self.document_id.clone())
            .map(|d| normalize_cpf(&d))
            .transpose()?;
        Ok((non_blank(self.full_name.clone()), document_id))
    }
}

fn repo(state: &AppState) -> CustomerRepository {
    CustomerRepository::new((*state.db).clone())
}

/// POST `/customers` - Create a customer.
async fn create_customer(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreatePersonRequest>,
) -> ApiResult<(StatusCode, Json<PersonResponse>)> {
    let (full_name, document_id) = payload.validated()?;
    let customer = repo(&state)
        .create(CreateCustomerInput {
            full_name,
            document_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(customer.into())))
}

/// GET `/customers` - List customers.
async fn list_customers(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListPeopleQuery>,
) -> ApiResult<Json<PageResponse<PersonResponse>>> {
    let page = page_request(query.page, query.per_page)?;
    let (full_name, document_id) = query.filters()?;
    let filter = CustomerFilter {
        full_name,
        document_id,
        active: query.active,
    };

    let customers = repo(&state).list(filter, page).await?;
    Ok(Json(customers.map(PersonResponse::from)))
}

/// GET `/customers/search` - Search customers by name.
async fn search_customers(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<Json<PageResponse<PersonResponse>>> {
    let (term, page) = query.parts()?;
    let customers = repo(&state).search(term, page).await?;
    Ok(Json(customers.map(PersonResponse::from)))
}

/// GET `/customers/document-id/{document_id}` - Find an active customer by CPF.
async fn get_customer_by_document(
    State(state): State<AppState>,
    ApiPath(document_id): ApiPath<String>,
) -> ApiResult<Json<PersonResponse>> {
    let document_id = normalize_cpf(&document_id)?;
    let customer = repo(&state)
        .find_by_document_id(&document_id)
        .await?
        .ok_or_else(|| {
            ApiError(AppError::NotFound(format!(
                "Customer with CPF {document_id} not found"
            )))
        })?;
    Ok(Json(customer.into()))
}

/// GET `/customers/{id}` - Get an active customer.
async fn get_customer(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<PersonResponse>> {
    Ok(Json(repo(&state).get(id).await?.into()))
}

/// PUT `/customers/{id}` - Update an active customer.
async fn update_customer(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdatePersonRequest>,
) -> ApiResult<Json<PersonResponse>> {
    let (full_name, document_id) = payload.validated()?;
    let customer = repo(&state)
        .update(
            id,
            UpdateCustomerInput {
                full_name,
                document_id,
            },
        )
        .await?;
    Ok(Json(customer.into()))
}

/// DELETE `/customers/{id}` - Soft-delete a customer.
async fn delete_customer(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    repo(&state).soft_delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH `/customers/{id}/reactivate` - Reactivate a customer.
async fn reactivate_customer(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<PersonResponse>> {
    Ok(Json(repo(&state).reactivate(id).await?.into()))
}
