pub mod error;
mod handlers;
mod middleware;
pub mod models;
pub mod state;

pub use state::AppState;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};

use crate::application::error::ErrorReport;
use crate::application::repos::RepoError;

use error::ApiError;
use middleware::{log_responses, resolve_viewer, set_request_context};

/// Assemble every route behind the request-id, logging and identity layers.
pub fn build_router(state: AppState) -> Router {
    let viewer_state = state.clone();

    Router::new()
        .route(
            "/posts",
            get(handlers::list_posts).post(handlers::create_post),
        )
        .route(
            "/posts/{id}",
            get(handlers::get_post)
                .patch(handlers::update_post)
                .delete(handlers::delete_post),
        )
        .route("/posts/{id}/tags", put(handlers::replace_post_tags))
        .route("/posts/{id}/publish", post(handlers::publish_post))
        .route("/posts/{id}/archive", post(handlers::archive_post))
        .route("/posts/{id}/revert", post(handlers::revert_post))
        .route("/posts/{id}/comments", post(handlers::create_comment))
        .route("/drafts", get(handlers::list_drafts))
        .route(
            "/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        // GET takes a slug, DELETE an id; both share one path segment.
        .route(
            "/categories/{key}",
            get(handlers::category_posts).delete(handlers::delete_category),
        )
        .route(
            "/tags",
            get(handlers::list_tags).post(handlers::create_tag),
        )
        .route(
            "/tags/{key}",
            get(handlers::tag_posts).delete(handlers::delete_tag),
        )
        .route("/search", get(handlers::search_posts))
        .route("/sidebar", get(handlers::sidebar))
        .route("/activity", get(handlers::recent_activity))
        .route("/rss.xml", get(handlers::rss_feed))
        .route("/admin/posts", get(handlers::list_admin_posts))
        .route("/admin/posts/bulk-status", post(handlers::bulk_update_status))
        .route(
            "/admin/comments/moderate",
            post(handlers::moderate_comments),
        )
        .route("/admin/activity", get(handlers::list_activity))
        .route("/_health/db", get(db_health))
        .fallback(unknown_route)
        .with_state(state)
        .layer(axum_middleware::from_fn_with_state(
            viewer_state,
            resolve_viewer,
        ))
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}

/// Unknown paths answer like staff-only routes do for non-staff callers.
async fn unknown_route() -> ApiError {
    ApiError::not_found("resource not found")
}

async fn db_health(State(state): State<AppState>) -> Response {
    db_health_response(state.health.ping().await)
}

fn db_health_response(result: Result<(), RepoError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::db_health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}
