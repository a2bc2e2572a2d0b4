//! Supplier routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};
use chrono::{DateTime, FixedOffset};
use finadmin_core::people::{normalize_cnpj, validate_name, validate_optional_name};
use finadmin_db::{
    SupplierRepository,
    entities::suppliers,
    repositories::{CreateSupplierInput, SupplierFilter, UpdateSupplierInput},
};
use finadmin_shared::{AppError, types::PageResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{SearchQuery, double_option, non_blank, page_request};
use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery},
};

/// Creates the supplier routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/suppliers", get(list_suppliers).post(create_supplier))
        .route("/suppliers/search", get(search_suppliers))
        .route("/suppliers/tax-id/{tax_id}", get(get_supplier_by_tax_id))
        .route(
            "/suppliers/{id}",
            get(get_supplier).put(update_supplier).delete(delete_supplier),
        )
        .route("/suppliers/{id}/reactivate", patch(reactivate_supplier))
}

/// Request body for creating a supplier.
#[derive(Debug, Deserialize)]
pub struct CreateSupplierRequest {
    /// Legal name.
    pub company_name: String,
    /// Trade name.
    pub trade_name: Option<String>,
    /// CNPJ, masked or digits only.
    pub tax_id: String,
}

/// Request body for updating a supplier.
#[derive(Debug, Deserialize)]
pub struct UpdateSupplierRequest {
    /// Legal name.
    pub company_name: Option<String>,
    /// Trade name; `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub trade_name: Option<Option<String>>,
    /// CNPJ, masked or digits only.
    pub tax_id: Option<String>,
}

/// Query parameters for listing suppliers.
#[derive(Debug, Deserialize)]
pub struct ListSuppliersQuery {
    /// Case-insensitive substring of the legal name.
    pub company_name: Option<String>,
    /// Case-insensitive substring of the trade name.
    pub trade_name: Option<String>,
    /// CNPJ, masked or digits only.
    pub tax_id: Option<String>,
    /// `true` or `false`; active only when absent.
    pub active: Option<bool>,
    /// Page number.
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

/// Supplier as returned by the API.
#[derive(Debug, Serialize)]
pub struct SupplierResponse {
    /// Supplier ID.
    pub id: Uuid,
    /// Legal name.
    pub company_name: String,
    /// Trade name.
    pub trade_name: Option<String>,
    /// Masked CNPJ.
    pub tax_id: String,
    /// Active flag.
    pub active: bool,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
    /// Last update time.
    pub updated_at: DateTime<FixedOffset>,
}

impl From<suppliers::Model> for SupplierResponse {
    fn from(m: suppliers::Model) -> Self {
        Self {
            id: m.id,
            company_name: m.company_name,
            trade_name: m.trade_name,
            tax_id: m.tax_id,
            active: m.active,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

fn repo(state: &AppState) -> SupplierRepository {
    SupplierRepository::new((*state.db).clone())
}

/// POST `/suppliers` - Create a supplier.
async fn create_supplier(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateSupplierRequest>,
) -> ApiResult<(StatusCode, Json<SupplierResponse>)> {
    let input = CreateSupplierInput {
        company_name: validate_name("company_name", &payload.company_name)
            .map_err(ApiError::validation)?,
        trade_name: validate_optional_name("trade_name", payload.trade_name.as_deref())
            .map_err(ApiError::validation)?,
        tax_id: normalize_cnpj(&payload.tax_id)?,
    };

    let supplier = repo(&state).create(input).await?;
    Ok((StatusCode::CREATED, Json(supplier.into())))
}

/// GET `/suppliers` - List suppliers.
async fn list_suppliers(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListSuppliersQuery>,
) -> ApiResult<Json<PageResponse<SupplierResponse>>> {
    let page = page_request(query.page, query.per_page)?;
    let filter = SupplierFilter {
        company_name: non_blank(query.company_name),
        trade_name: non_blank(query.trade_name),
        tax_id: non_blank(query.tax_id)
            .map(|t| normalize_cnpj(&t))
            .transpose()?,
        active: query.active,
    };

    let suppliers = repo(&state).list(filter, page).await?;
    Ok(Json(suppliers.map(SupplierResponse::from)))
}

/// GET `/suppliers/search` - Search suppliers by legal or trade name.
async fn search_suppliers(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<Json<PageResponse<SupplierResponse>>> {
    let (term, page) = query.parts()?;
    let suppliers = repo(&state).search(term, page).await?;
    Ok(Json(suppliers.map(SupplierResponse::from)))
}

/// GET `/suppliers/tax-id/{tax_id}` - Find an active supplier by CNPJ.
async fn get_supplier_by_tax_id(
    State(state): State<AppState>,
    ApiPath(tax_id): ApiPath<String>,
) -> ApiResult<Json<SupplierResponse>> {
    let tax_id = normalize_cnpj(&tax_id)?;
    let supplier = repo(&state).find_by_tax_id(&tax_id).await?.ok_or_else(|| {
        ApiError(AppError::NotFound(format!(
            "Supplier with CNPJ {tax_id} not found"
        )))
    })?;
    Ok(Json(supplier.into()))
}

/// GET `/suppliers/{id}` - Get an active supplier.
async fn get_supplier(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<SupplierResponse>> {
    let supplier = repo(&state).get(id).await?;
    Ok(Json(supplier.into()))
}

/// PUT `/suppliers/{id}` - Update an active supplier.
async fn update_supplier(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateSupplierRequest>,
) -> ApiResult<Json<SupplierResponse>> {
    let input = UpdateSupplierInput {
        company_name: payload
            .company_name
            .map(|n| validate_name("company_name", &n))
            .transpose()
            .map_err(ApiError::validation)?,
        trade_name: payload
            .trade_name
            .map(|t| validate_optional_name("trade_name", t.as_deref()))
            .transpose()
            .map_err(ApiError::validation)?,
        tax_id: payload
            .tax_id
            .map(|t| normalize_cnpj(&t))
            .transpose()?,
    };

    let supplier = repo(&state).update(id, input).await?;
    Ok(Json(supplier.into()))
}

/// DELETE `/suppliers/{id}` - Soft-delete a supplier.
async fn delete_supplier(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    repo(&state).soft_delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH `/suppliers/{id}/reactivate` - Reactivate a supplier.
async fn reactivate_supplier(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<SupplierResponse>> {
    let supplier = repo(&state).reactivate(id).await?;
    Ok(Json(supplier.into()))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;

    use super::*;
    use crate::test_support::{get, json_body, json_request, send, state};

    fn supplier(active: bool) -> suppliers::Model {
        let now = chrono::Utc::now().into();
        suppliers::Model {
            id: Uuid::new_v4(),
            company_name: "Agropecuária Boa Safra Ltda".to_string(),
            trade_name: Some("Boa Safra".to_string()),
            tax_id: "12.345.678/0001-90".to_string(),
            active,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_supplier_normalizes_tax_id() {
        let created = supplier(true);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<suppliers::Model>::new()])
            .append_query_results([vec![created.clone()]])
            .into_connection();

        let response = send(
            state(db),
            json_request(
                "POST",
                "/api/v1/suppliers",
                &json!({
                    "company_name": "  Agropecuária Boa Safra Ltda ",
                    "trade_name": "Boa Safra",
                    "tax_id": "12345678000190"
                }),
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["tax_id"], "12.345.678/0001-90");
        assert_eq!(body["id"], created.id.to_string());
    }

    #[tokio::test]
    async fn test_create_supplier_rejects_short_tax_id() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let response = send(
            state(db),
            json_request(
                "POST",
                "/api/v1/suppliers",
                &json!({"company_name": "Boa Safra", "tax_id": "1234"}),
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "VALIDATION_ERROR");
        assert_eq!(body["message"], "CNPJ must have 14 digits");
    }

    #[tokio::test]
    async fn test_create_supplier_requires_company_name() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let response = send(
            state(db),
            json_request(
                "POST",
                "/api/v1/suppliers",
                &json!({"company_name": "   ", "tax_id": "12345678000190"}),
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["message"], "company_name is required");
    }

    #[tokio::test]
    async fn test_create_duplicate_is_conflict() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![supplier(false)]])
            .into_connection();

        let response = send(
            state(db),
            json_request(
                "POST",
                "/api/v1/suppliers",
                &json!({"company_name": "Boa Safra", "tax_id": "12.345.678/0001-90"}),
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let message = json_body(response).await["message"].as_str().unwrap().to_string();
        assert!(message.contains("reactivate"), "{message}");
    }

    #[tokio::test]
    async fn test_get_missing_supplier_is_404() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<suppliers::Model>::new()])
            .into_connection();

        let response = send(state(db), get(&format!("/api/v1/suppliers/{}", Uuid::new_v4()))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_get_supplier_with_bad_uuid_is_400() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let response = send(state(db), get("/api/v1/suppliers/not-a-uuid")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_search_requires_term() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let response = send(state(db), get("/api/v1/suppliers/search?q=")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_lookup_by_unmasked_tax_id() {
        let existing = supplier(true);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing.clone()]])
            .into_connection();

        let response = send(state(db), get("/api/v1/suppliers/tax-id/12345678000190")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["company_name"], existing.company_name);
    }

    #[tokio::test]
    async fn test_list_rejects_oversized_page() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let response = send(state(db), get("/api/v1/suppliers?per_page=500")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_supplier_is_204() {
        let existing = supplier(true);
        let mut deleted = existing.clone();
        deleted.active = false;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing.clone()]])
            .append_query_results([vec![deleted]])
            .into_connection();

        let response = send(
            state(db),
            axum::http::Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/suppliers/{}", existing.id))
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
