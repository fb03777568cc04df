use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::posts::{CreatePostCommand, TransitionOutcome, UpdatePostCommand};
use crate::application::repos::PostQueryFilter;
use crate::application::viewer::Viewer;
use crate::domain::lifecycle::Transition;

use super::require_staff;
use crate::infra::http::error::{ApiError, post_to_api};
use crate::infra::http::models::{
    AdminPostListQuery, BulkStatusRequest, PostCreateRequest, PostTagsRequest, PostUpdateRequest,
};
use crate::infra::http::state::AppState;

pub async fn get_post(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = state.posts.detail(&viewer, id).await.map_err(post_to_api)?;
    Ok(Json(detail))
}

pub async fn create_post(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Json(payload): Json<PostCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let author = require_staff(&viewer)?;

    let post = state
        .posts
        .create_post(CreatePostCommand {
            title: payload.title,
            content: payload.content,
            author_id: author.id,
            status: payload.status,
            category_id: payload.category_id,
            tag_ids: payload.tag_ids,
        })
        .await
        .map_err(post_to_api)?;

    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn update_post(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PostUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_staff(&viewer)?;

    let post = state
        .posts
        .update_post(UpdatePostCommand {
            id,
            title: payload.title,
            content: payload.content,
            category_id: payload.category_id,
            tag_ids: payload.tag_ids,
        })
        .await
        .map_err(post_to_api)?;

    Ok(Json(post))
}

pub async fn delete_post(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    require_staff(&viewer)?;
    state.posts.delete_post(id).await.map_err(post_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn replace_post_tags(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PostTagsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_staff(&viewer)?;
    state
        .posts
        .set_tags(id, &payload.tag_ids)
        .await
        .map_err(post_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn publish_post(
    state: State<AppState>,
    viewer: Extension<Viewer>,
    id: Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    transition_post(state, viewer, id, Transition::Publish).await
}

pub async fn archive_post(
    state: State<AppState>,
    viewer: Extension<Viewer>,
    id: Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    transition_post(state, viewer, id, Transition::Archive).await
}

pub async fn revert_post(
    state: State<AppState>,
    viewer: Extension<Viewer>,
    id: Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    transition_post(state, viewer, id, Transition::RevertToDraft).await
}

async fn transition_post(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<Uuid>,
    transition: Transition,
) -> Result<impl IntoResponse, ApiError> {
    require_staff(&viewer)?;

    match state
        .posts
        .transition(id, transition)
        .await
        .map_err(post_to_api)?
    {
        TransitionOutcome::Applied(post) => Ok(Json(post)),
        TransitionOutcome::Rejected { reason, .. } => Err(ApiError::invalid_transition(&reason)),
    }
}

pub async fn bulk_update_status(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Json(payload): Json<BulkStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_staff(&viewer)?;

    if payload.ids.is_empty() {
        return Err(ApiError::bad_request("ids must not be empty", None));
    }

    let report = state
        .posts
        .bulk_transition(&payload.ids, payload.action)
        .await
        .map_err(post_to_api)?;

    Ok(Json(report))
}

pub async fn list_admin_posts(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Query(query): Query<AdminPostListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    require_staff(&viewer)?;

    let filter = PostQueryFilter {
        status: query.status,
        category_id: query.category,
        tag_id: query.tag,
        author_id: query.author,
        title: query.title.filter(|title| !title.trim().is_empty()),
    };

    let page = state
        .posts
        .list_admin(&filter, query.page.as_deref())
        .await
        .map_err(post_to_api)?;

    Ok(Json(page))
}
