use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};
use uuid::Uuid;

use crate::application::error::ErrorReport;
use crate::application::users::AuthError;
use crate::application::viewer::Viewer;

use super::error::ApiError;
use super::state::AppState;

#[derive(Clone)]
pub struct RequestContext {
    pub request_id: String,
}

/// Username of the authenticated caller, carried on the response for logging.
#[derive(Clone)]
struct RequestUser(String);

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let ctx = RequestContext {
        request_id: request_id.clone(),
    };
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(ctx);
    response
}

/// Resolve the optional bearer token into a [`Viewer`]. A missing header is an
/// anonymous caller; a header that does not authenticate is rejected.
pub async fn resolve_viewer(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let viewer = match request.headers().get(header::AUTHORIZATION) {
        None => Viewer::anonymous(),
        Some(value) => {
            let Some(token) = value
                .to_str()
                .ok()
                .and_then(|raw| raw.strip_prefix("Bearer "))
            else {
                return ApiError::unauthorized("Malformed authorization header").into_response();
            };

            match state.users.authenticate(token.trim()).await {
                Ok(viewer) => viewer,
                Err(AuthError::Invalid) => {
                    return ApiError::unauthorized("Invalid token").into_response();
                }
                Err(AuthError::Revoked) => {
                    return ApiError::unauthorized("Token revoked").into_response();
                }
            }
        }
    };

    let user = viewer
        .account()
        .map(|account| RequestUser(account.username.clone()));
    request.extensions_mut().insert(viewer);

    let mut response = next.run(request).await;
    if let Some(user) = user {
        response.extensions_mut().insert(user);
    }
    response
}

pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();

    let mut response = next.run(request).await;
    let status = response.status();

    if status.is_client_error() || status.is_server_error() {
        let elapsed_ms = start.elapsed().as_millis();
        let user = response
            .extensions_mut()
            .remove::<RequestUser>()
            .map(|user| user.0)
            .unwrap_or_default();
        let report = response.extensions_mut().remove::<ErrorReport>();
        let (source, messages) = match report {
            Some(report) => (report.source, report.messages),
            None => ("unknown", Vec::new()),
        };
        let detail = messages
            .first()
            .cloned()
            .unwrap_or_else(|| "no diagnostic available".to_string());

        if status.is_server_error() {
            error!(
                target = "pressroom::http::response",
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                query = uri.query().unwrap_or(""),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                chain = ?messages,
                request_id = request_id,
                user = user,
                "request failed",
            );
        } else {
            warn!(
                target = "pressroom::http::response",
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                query = uri.query().unwrap_or(""),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                chain = ?messages,
                request_id = request_id,
                user = user,
                "client request error",
            );
        }
    }

    response
}
