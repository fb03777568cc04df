use axum::Json;
use axum::extract::{Extension, Query, State};
use axum::response::IntoResponse;

use crate::application::audit::RECENT_ACTIVITY_LIMIT;
use crate::application::repos::ActivityQueryFilter;
use crate::application::viewer::Viewer;

use super::require_staff;
use crate::infra::http::error::{ApiError, repo_to_api};
use crate::infra::http::models::ActivityListQuery;
use crate::infra::http::state::AppState;

const MAX_ACTIVITY_LIMIT: u32 = 200;

pub async fn recent_activity(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.audit.list_recent().await.map_err(repo_to_api)?;
    Ok(Json(rows))
}

pub async fn list_activity(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Query(query): Query<ActivityListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    require_staff(&viewer)?;

    let filter = ActivityQueryFilter {
        action: query.action,
        user_id: query.user,
        search: query
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
    };
    let limit = query
        .limit
        .unwrap_or(RECENT_ACTIVITY_LIMIT)
        .clamp(1, MAX_ACTIVITY_LIMIT);

    let rows = state
        .audit
        .list_filtered(&filter, limit)
        .await
        .map_err(repo_to_api)?;
    Ok(Json(rows))
}
