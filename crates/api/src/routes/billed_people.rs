//! Billed person routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};
use finadmin_core::people::normalize_cpf;
use finadmin_db::{
    BilledPersonRepository,
    entities::billed_people,
    repositories::{BilledPersonFilter, CreateBilledPersonInput, UpdateBilledPersonInput},
};
use finadmin_shared::{AppError, types::PageResponse};
use uuid::Uuid;

use super::common::{SearchQuery, page_request};
use super::customers::{CreatePersonRequest, ListPeopleQuery, PersonResponse, UpdatePersonRequest};
use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery},
};

/// Creates the billed person routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/billed-people",
            get(list_billed_people).post(create_billed_person),
        )
        .route("/billed-people/search", get(search_billed_people))
        .route(
            "/billed-people/document-id/{document_id}",
            get(get_billed_person_by_document),
        )
        .route(
            "/billed-people/{id}",
            get(get_billed_person)
                .put(update_billed_person)
                .delete(delete_billed_person),
        )
        .route(
            "/billed-people/{id}/reactivate",
            patch(reactivate_billed_person),
        )
}

impl From<billed_people::Model> for PersonResponse {
    fn from(m: billed_people::Model) -> Self {
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

fn repo(state: &AppState) -> BilledPersonRepository {
    BilledPersonRepository::new((*state.db).clone())
}

/// POST `/billed-people` - Create a billed person.
async fn create_billed_person(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreatePersonRequest>,
) -> ApiResult<(StatusCode, Json<PersonResponse>)> {
    let (full_name, document_id) = payload.validated()?;
    let person = repo(&state)
        .create(CreateBilledPersonInput {
            full_name,
            document_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(person.into())))
}

/// GET `/billed-people` - List billed people.
async fn list_billed_people(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListPeopleQuery>,
) -> ApiResult<Json<PageResponse<PersonResponse>>> {
    let page = page_request(query.page, query.per_page)?;
    let (full_name, document_id) = query.filters()?;
    let filter = BilledPersonFilter {
        full_name,
        document_id,
        active: query.active,
    };

    let people = repo(&state).list(filter, page).await?;
    Ok(Json(people.map(PersonResponse::from)))
}

/// GET `/billed-people/search` - Search billed people by name.
async fn search_billed_people(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<Json<PageResponse<PersonResponse>>> {
    let (term, page) = query.parts()?;
    let people = repo(&state).search(term, page).await?;
    Ok(Json(people.map(PersonResponse::from)))
}

/// GET `/billed-people/document-id/{document_id}` - Find an active billed person by CPF.
async fn get_billed_person_by_document(
    State(state): State<AppState>,
    ApiPath(document_id): ApiPath<String>,
) -> ApiResult<Json<PersonResponse>> {
    let document_id = normalize_cpf(&document_id)?;
    let person = repo(&state)
        .find_by_document_id(&document_id)
        .await?
        .ok_or_else(|| {
            ApiError(AppError::NotFound(format!(
                "Billed person with CPF {document_id} not found"
            )))
        })?;
    Ok(Json(person.into()))
}

/// GET `/billed-people/{id}` - Get an active billed person.
async fn get_billed_person(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<PersonResponse>> {
    Ok(Json(repo(&state).get(id).await?.into()))
}

/// PUT `/billed-people/{id}` - Update an active billed person.
async fn update_billed_person(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdatePersonRequest>,
) -> ApiResult<Json<PersonResponse>> {
    let (full_name, document_id) = payload.validated()?;
    let person = repo(&state)
        .update(
            id,
            UpdateBilledPersonInput {
                full_name,
                document_id,
            },
        )
        .await?;
    Ok(Json(person.into()))
}

/// DELETE `/billed-people/{id}` - Soft-delete a billed person.
async fn delete_billed_person(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    repo(&state).soft_delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH `/billed-people/{id}/reactivate` - Reactivate a billed person.
async fn reactivate_billed_person(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<PersonResponse>> {
    Ok(Json(repo(&state).reactivate(id).await?.into()))
}
