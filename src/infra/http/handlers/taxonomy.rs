use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::taxonomy::{CreateCategoryCommand, CreateTagCommand};
use crate::application::viewer::Viewer;

use super::require_staff;
use crate::infra::http::error::{ApiError, taxonomy_to_api};
use crate::infra::http::models::{CategoryCreateRequest, TagCreateRequest};
use crate::infra::http::state::AppState;

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let categories = state
        .taxonomy
        .list_categories()
        .await
        .map_err(taxonomy_to_api)?;
    Ok(Json(categories))
}

pub async fn create_category(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Json(payload): Json<CategoryCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_staff(&viewer)?;
    let category = state
        .taxonomy
        .create_category(CreateCategoryCommand {
            name: payload.name,
            slug: payload.slug,
            description: payload.description,
        })
        .await
        .map_err(taxonomy_to_api)?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    require_staff(&viewer)?;
    state
        .taxonomy
        .delete_category(id)
        .await
        .map_err(taxonomy_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_tags(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let tags = state.taxonomy.list_tags().await.map_err(taxonomy_to_api)?;
    Ok(Json(tags))
}

pub async fn create_tag(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Json(payload): Json<TagCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_staff(&viewer)?;
    let tag = state
        .taxonomy
        .create_tag(CreateTagCommand {
            name: payload.name,
            slug: payload.slug,
        })
        .await
        .map_err(taxonomy_to_api)?;
    Ok((StatusCode::CREATED, Json(tag)))
}

pub async fn delete_tag(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    require_staff(&viewer)?;
    state.taxonomy.delete_tag(id).await.map_err(taxonomy_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}
