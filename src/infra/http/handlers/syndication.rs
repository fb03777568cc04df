use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;

use crate::infra::http::error::{ApiError, syndication_to_api};
use crate::infra::http::state::AppState;

const RSS_CONTENT_TYPE: &str = "application/rss+xml; charset=utf-8";

pub async fn rss_feed(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let xml = state
        .syndication
        .rss_feed()
        .await
        .map_err(syndication_to_api)?;
    Ok(([(header::CONTENT_TYPE, RSS_CONTENT_TYPE)], xml))
}
