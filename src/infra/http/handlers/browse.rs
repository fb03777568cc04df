use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::response::IntoResponse;

use crate::application::viewer::Viewer;

use crate::infra::http::error::{ApiError, feed_to_api};
use crate::infra::http::models::{PageQuery, SearchQuery};
use crate::infra::http::state::AppState;

pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state
        .feed
        .list_published(query.page.as_deref())
        .await
        .map_err(feed_to_api)?;
    Ok(Json(page))
}

pub async fn category_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let listing = state
        .feed
        .category_posts(&slug, query.page.as_deref())
        .await
        .map_err(feed_to_api)?;
    Ok(Json(listing))
}

pub async fn tag_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let listing = state
        .feed
        .tag_posts(&slug, query.page.as_deref())
        .await
        .map_err(feed_to_api)?;
    Ok(Json(listing))
}

pub async fn search_posts(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let results = state
        .feed
        .search(query.q.as_deref(), query.page.as_deref())
        .await
        .map_err(feed_to_api)?;
    Ok(Json(results))
}

pub async fn list_drafts(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
) -> Result<impl IntoResponse, ApiError> {
    let drafts = state.feed.drafts(&viewer).await.map_err(feed_to_api)?;
    Ok(Json(drafts))
}

pub async fn sidebar(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let sidebar = state.feed.sidebar().await.map_err(feed_to_api)?;
    Ok(Json(sidebar))
}
