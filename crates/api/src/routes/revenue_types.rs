//! Revenue type routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};
use chrono::{DateTime, FixedOffset};
use finadmin_core::people::validate_name;
use finadmin_db::{
    RevenueTypeRepository,
    entities::revenue_types,
    repositories::{CreateRevenueTypeInput, RevenueTypeFilter, UpdateRevenueTypeInput},
};
use finadmin_shared::types::PageResponse;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{SearchQuery, double_option, non_blank, page_request};
use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery},
};

/// Creates the revenue type routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/revenue-types",
            get(list_revenue_types).post(create_revenue_type),
        )
        .route("/revenue-types/search", get(search_revenue_types))
        .route(
            "/revenue-types/{id}",
            get(get_revenue_type)
                .put(update_revenue_type)
                .delete(delete_revenue_type),
        )
        .route(
            "/revenue-types/{id}/reactivate",
            patch(reactivate_revenue_type),
        )
}

/// Request body for creating a revenue type.
#[derive(Debug, Deserialize)]
pub struct CreateRevenueTypeRequest {
    /// Description.
    pub description: String,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Request body for updating a revenue type.
#[derive(Debug, Deserialize)]
pub struct UpdateRevenueTypeRequest {
    /// Description.
    pub description: Option<String>,
    /// Notes; `null` clears them.
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

/// Query parameters for listing revenue types.
#[derive(Debug, Deserialize)]
pub struct ListRevenueTypesQuery {
    /// Case-insensitive substring of the description.
    pub description: Option<String>,
    /// `true` or `false`; active only when absent.
    pub active: Option<bool>,
    /// Page number.
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

/// Revenue type as returned by the API.
#[derive(Debug, Serialize)]
pub struct RevenueTypeResponse {
    /// Revenue type ID.
    pub id: Uuid,
    /// Description.
    pub description: String,
    /// Notes.
    pub notes: Option<String>,
    /// Active flag.
    pub active: bool,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
    /// Last update time.
    pub updated_at: DateTime<FixedOffset>,
}

impl From<revenue_types::Model> for RevenueTypeResponse {
    fn from(m: revenue_types::Model) -> Self {
        Self {
            id: m.id,
            description: m.description,
            notes: m.notes,
            active: m.active,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

fn repo(state: &AppState) -> RevenueTypeRepository {
    RevenueTypeRepository::new((*state.db).clone())
}

async fn create_revenue_type(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateRevenueTypeRequest>,
) -> ApiResult<(StatusCode, Json<RevenueTypeResponse>)> {
    let input = CreateRevenueTypeInput {
        description: validate_name("description", &payload.description)
            .map_err(ApiError::validation)?,
        notes: non_blank(payload.notes),
    };

    let revenue_type = repo(&state).create(input).await?;
    Ok((StatusCode::CREATED, Json(revenue_type.into())))
}

async fn list_revenue_types(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListRevenueTypesQuery>,
) -> ApiResult<Json<PageResponse<RevenueTypeResponse>>> {
    let page = page_request(query.page, query.per_page)?;
    let filter = RevenueTypeFilter {
        description: non_blank(query.description),
        active: query.active,
    };

    let revenue_types = repo(&state).list(filter, page).await?;
    Ok(Json(revenue_types.map(RevenueTypeResponse::from)))
}

async fn search_revenue_types(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<Json<PageResponse<RevenueTypeResponse>>> {
    let (term, page) = query.parts()?;
    let revenue_types = repo(&state).search(term, page).await?;
    Ok(Json(revenue_types.map(RevenueTypeResponse::from)))
}

async fn get_revenue_type(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<RevenueTypeResponse>> {
    Ok(Json(repo(&state).get(id).await?.into()))
}

async fn update_revenue_type(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateRevenueTypeRequest>,
) -> ApiResult<Json<RevenueTypeResponse>> {
    let input = UpdateRevenueTypeInput {
        description: payload
            .description
            .map(|d| validate_name("description", &d))
            .transpose()
            .map_err(ApiError::validation)?,
        notes: payload.notes.map(non_blank),
    };

    let revenue_type = repo(&state).update(id, input).await?;
    Ok(Json(revenue_type.into()))
}

async fn delete_revenue_type(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    repo(&state).soft_delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn reactivate_revenue_type(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<RevenueTypeResponse>> {
    Ok(Json(repo(&state).reactivate(id).await?.into()))
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;

    use super::*;
    use crate::test_support::{json_body, json_request, send, state};

    fn revenue_type(notes: Option<&str>) -> revenue_types::Model {
        let now = chrono::Utc::now().into();
        revenue_types::Model {
            id: Uuid::new_v4(),
            description: "Venda de soja".to_string(),
            notes: notes.map(str::to_string),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_update_clears_notes() {
        let existing = revenue_type(Some("safra 24/25"));
        let updated = revenue_type(None);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing.clone()]])
            .append_query_results([vec![updated]])
            .into_connection();

        let response = send(
            state(db),
            json_request(
                "PUT",
                &format!("/api/v1/revenue-types/{}", existing.id),
                &json!({"notes": null}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(json_body(response).await["notes"].is_null());
    }

    #[tokio::test]
    async fn test_create_requires_description() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let response = send(
            state(db),
            json_request("POST", "/api/v1/revenue-types", &json!({"description": ""})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["message"], "description is required");
    }
}
