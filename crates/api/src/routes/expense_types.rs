//! Expense type routes and the category catalog.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};
use chrono::{DateTime, FixedOffset};
use finadmin_core::classification::{CategoryInfo, ExpenseCategory};
use finadmin_core::people::validate_name;
use finadmin_db::{
    ExpenseTypeRepository,
    entities::expense_types,
    repositories::{CreateExpenseTypeInput, ExpenseTypeFilter, UpdateExpenseTypeInput},
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

/// Creates the expense type routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/expense-types",
            get(list_expense_types).post(create_expense_type),
        )
        .route("/expense-types/categories", get(list_categories))
        .route("/expense-types/search", get(search_expense_types))
        .route(
            "/expense-types/{id}",
            get(get_expense_type)
                .put(update_expense_type)
                .delete(delete_expense_type),
        )
        .route(
            "/expense-types/{id}/reactivate",
            patch(reactivate_expense_type),
        )
}

/// Request body for creating an expense type.
#[derive(Debug, Deserialize)]
pub struct CreateExpenseTypeRequest {
    /// Description.
    pub description: String,
    /// Category code or label.
    pub category: String,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Request body for updating an expense type.
#[derive(Debug, Deserialize)]
pub struct UpdateExpenseTypeRequest {
    /// Description.
    pub description: Option<String>,
    /// Category code or label.
    pub category: Option<String>,
    /// Notes; `null` clears them.
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

/// Query parameters for listing expense types.
#[derive(Debug, Deserialize)]
pub struct ListExpenseTypesQuery {
    /// Category code or label.
    pub category: Option<String>,
    /// Case-insensitive substring of the description.
    pub description: Option<String>,
    /// `true` or `false`; active only when absent.
    pub active: Option<bool>,
    /// Page number.
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

/// Expense type as returned by the API.
#[derive(Debug, Serialize)]
pub struct ExpenseTypeResponse {
    /// Expense type ID.
    pub id: Uuid,
    /// Description.
    pub description: String,
    /// Category code.
    pub category: ExpenseCategory,
    /// Category display label.
    pub category_label: &'static str,
    /// Notes.
    pub notes: Option<String>,
    /// Active flag.
    pub active: bool,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
    /// Last update time.
    pub updated_at: DateTime<FixedOffset>,
}

impl From<expense_types::Model> for ExpenseTypeResponse {
    fn from(m: expense_types::Model) -> Self {
        let category = ExpenseCategory::from(m.category);
        Self {
            id: m.id,
            description: m.description,
            category,
            category_label: category.label(),
            notes: m.notes,
            active: m.active,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

fn repo(state: &AppState) -> ExpenseTypeRepository {
    ExpenseTypeRepository::new((*state.db).clone())
}

fn parse_category(value: &str) -> ApiResult<ExpenseCategory> {
    Ok(value.parse::<ExpenseCategory>()?)
}

/// GET `/expense-types/categories` - The category catalog.
async fn list_categories() -> Json<Vec<CategoryInfo>> {
    Json(ExpenseCategory::ALL.into_iter().map(ExpenseCategory::info).collect())
}

/// POST `/expense-types` - Create an expense type.
async fn create_expense_type(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateExpenseTypeRequest>,
) -> ApiResult<(StatusCode, Json<ExpenseTypeResponse>)> {
    let input = CreateExpenseTypeInput {
        description: validate_name("description", &payload.description)
            .map_err(ApiError::validation)?,
        category: parse_category(&payload.category)?.into(),
        notes: non_blank(payload.notes),
    };

    let expense_type = repo(&state).create(input).await?;
    Ok((StatusCode::CREATED, Json(expense_type.into())))
}

/// GET `/expense-types` - List expense types.
async fn list_expense_types(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListExpenseTypesQuery>,
) -> ApiResult<Json<PageResponse<ExpenseTypeResponse>>> {
    let page = page_request(query.page, query.per_page)?;
    let filter = ExpenseTypeFilter {
        category: non_blank(query.category)
            .map(|c| parse_category(&c))
            .transpose()?
            .map(Into::into),
        description: non_blank(query.description),
        active: query.active,
    };

    let expense_types = repo(&state).list(filter, page).await?;
    Ok(Json(expense_types.map(ExpenseTypeResponse::from)))
}

/// GET `/expense-types/search` - Search expense types by description.
async fn search_expense_types(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<Json<PageResponse<ExpenseTypeResponse>>> {
    let (term, page) = query.parts()?;
    let expense_types = repo(&state).search(term, page).await?;
    Ok(Json(expense_types.map(ExpenseTypeResponse::from)))
}

/// GET `/expense-types/{id}` - Get an active expense type.
async fn get_expense_type(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<ExpenseTypeResponse>> {
    Ok(Json(repo(&state).get(id).await?.into()))
}

/// PUT `/expense-types/{id}` - Update an active expense type.
async fn update_expense_type(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateExpenseTypeRequest>,
) -> ApiResult<Json<ExpenseTypeResponse>> {
    let input = UpdateExpenseTypeInput {
        description: payload
            .description
            .map(|d| validate_name("description", &d))
            .transpose()
            .map_err(ApiError::validation)?,
        category: payload
            .category
            .map(|c| parse_category(&c))
            .transpose()?
            .map(Into::into),
        notes: payload.notes.map(non_blank),
    };

    let expense_type = repo(&state).update(id, input).await?;
    Ok(Json(expense_type.into()))
}

/// DELETE `/expense-types/{id}` - Soft-delete an expense type.
async fn delete_expense_type(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    repo(&state).soft_delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH `/expense-types/{id}/reactivate` - Reactivate an expense type.
async fn reactivate_expense_type(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<ExpenseTypeResponse>> {
    Ok(Json(repo(&state).reactivate(id).await?.into()))
}

#[cfg(test)]
mod tests {
    use finadmin_db::entities::sea_orm_active_enums;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;

    use super::*;
    use crate::test_support::{get, json_body, json_request, send, state};

    fn expense_type() -> expense_types::Model {
        let now = chrono::Utc::now().into();
        expense_types::Model {
            id: Uuid::new_v4(),
            description: "Diesel S10".to_string(),
            category: sea_orm_active_enums::ExpenseCategory::MaintenanceOperation,
            notes: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_categories_catalog() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let response = send(state(db), get("/api/v1/expense-types/categories")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        let categories = body.as_array().unwrap();
        assert_eq!(categories.len(), 9);
        assert_eq!(categories[0]["code"], "agricultural_inputs");
        assert_eq!(categories[7]["label"], "IMPOSTOS E TAXAS");
        assert!(categories[0]["keywords"].as_array().unwrap().len() > 3);
    }

    #[tokio::test]
    async fn test_create_accepts_category_label() {
        let created = expense_type();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![created]])
            .into_connection();

        let response = send(
            state(db),
            json_request(
                "POST",
                "/api/v1/expense-types",
                &json!({"description": "Diesel S10", "category": "MANUTENÇÃO E OPERAÇÃO"}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = json_body(response).await;
        assert_eq!(body["category"], "maintenance_operation");
        assert_eq!(body["category_label"], "MANUTENÇÃO E OPERAÇÃO");
    }

    #[tokio::test]
    async fn test_unknown_category_is_400() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let response = send(state(db), get("/api/v1/expense-types?category=fuel")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["message"],
            "unknown expense category: fuel"
        );
    }
}
