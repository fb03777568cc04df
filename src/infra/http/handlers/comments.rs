use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::viewer::Viewer;

use super::require_staff;
use crate::infra::http::error::{ApiError, comment_to_api};
use crate::infra::http::models::{
    CommentCreateRequest, CommentModerationRequest, CommentModerationResponse,
};
use crate::infra::http::state::AppState;

pub async fn create_comment(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(post_id): Path<Uuid>,
    Json(payload): Json<CommentCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let comment = state
        .comments
        .add_comment(&viewer, post_id, payload.content)
        .await
        .map_err(comment_to_api)?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn moderate_comments(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Json(payload): Json<CommentModerationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_staff(&viewer)?;
    let changed = state
        .comments
        .moderate(&payload.ids, payload.active)
        .await
        .map_err(comment_to_api)?;
    Ok(Json(CommentModerationResponse { changed }))
}
