use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::comments::CommentError;
use crate::application::error::ErrorReport;
use crate::application::feed::FeedError;
use crate::application::posts::PostError;
use crate::application::repos::RepoError;
use crate::application::syndication::SyndicationError;
use crate::application::taxonomy::TaxonomyError;
use crate::domain::error::DomainError;
use crate::domain::lifecycle::InvalidTransition;

pub mod codes {
    pub const BAD_REQUEST: &str = "bad_request";
    pub const UNAUTHORIZED: &str = "unauthorized";
    pub const NOT_FOUND: &str = "not_found";
    pub const DUPLICATE: &str = "duplicate";
    pub const INVALID_INPUT: &str = "invalid_input";
    pub const INVALID_TRANSITION: &str = "invalid_transition";
    pub const VALIDATION: &str = "validation_failed";
    pub const INTEGRITY: &str = "integrity_error";
    pub const DB_TIMEOUT: &str = "db_timeout";
    pub const REPO: &str = "repo_error";
    pub const FEED: &str = "feed_error";
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorMessage,
    /// Rejected input returned to the caller so it can be corrected and resubmitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorMessage {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: &'static str,
    hint: Option<String>,
    echo: Option<String>,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        code: &'static str,
        message: &'static str,
        hint: Option<String>,
    ) -> Self {
        Self {
            status,
            code,
            message,
            hint,
            echo: None,
        }
    }

    pub fn bad_request(message: &'static str, hint: Option<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::BAD_REQUEST, message, hint)
    }

    pub fn unauthorized(message: &'static str) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, codes::UNAUTHORIZED, message, None)
    }

    pub fn not_found(message: &'static str) -> Self {
        Self::new(StatusCode::NOT_FOUND, codes::NOT_FOUND, message, None)
    }

    pub fn validation(err: &DomainError) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            codes::VALIDATION,
            "Validation failed",
            Some(err.to_string()),
        )
    }

    pub fn invalid_transition(reason: &InvalidTransition) -> Self {
        Self::new(
            StatusCode::CONFLICT,
            codes::INVALID_TRANSITION,
            "Invalid status transition",
            Some(reason.to_string()),
        )
    }

    pub fn with_echo(mut self, content: String) -> Self {
        self.echo = Some(content);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = format!(
            "{}: {}",
            self.code,
            self.hint.as_deref().unwrap_or(self.message)
        );
        let body = ApiErrorBody {
            error: ApiErrorMessage {
                code: self.code.to_string(),
                message: self.message.to_string(),
                hint: self.hint,
            },
            content: self.echo,
        };
        let mut response = (self.status, Json(body)).into_response();
        ErrorReport::from_message("infra::http", self.status, detail).attach(&mut response);
        response
    }
}

pub(crate) fn repo_to_api(err: RepoError) -> ApiError {
    match err {
        RepoError::Duplicate { constraint } => ApiError::new(
            StatusCode::CONFLICT,
            codes::DUPLICATE,
            "Duplicate record",
            Some(constraint),
        ),
        RepoError::NotFound => ApiError::not_found("resource not found"),
        RepoError::InvalidInput { message } => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_INPUT,
            "Invalid input",
            Some(message),
        ),
        RepoError::Integrity { message } => ApiError::new(
            StatusCode::CONFLICT,
            codes::INTEGRITY,
            "Integrity constraint violated",
            Some(message),
        ),
        RepoError::Timeout => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::DB_TIMEOUT,
            "Database timeout",
            None,
        ),
        RepoError::Persistence(message) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::REPO,
            "Persistence error",
            Some(message),
        ),
    }
}

pub(crate) fn post_to_api(err: PostError) -> ApiError {
    match err {
        PostError::NotFound => ApiError::not_found("post not found"),
        PostError::UnknownReference { .. } => ApiError::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            codes::INVALID_INPUT,
            "Unknown reference",
            Some(err.to_string()),
        ),
        PostError::Validation(err) => ApiError::validation(&err),
        PostError::Repo(err) => repo_to_api(err),
    }
}

pub(crate) fn feed_to_api(err: FeedError) -> ApiError {
    match err {
        FeedError::UnknownCategory(_) => ApiError::not_found("category not found"),
        FeedError::UnknownTag(_) => ApiError::not_found("tag not found"),
        FeedError::NotFound => ApiError::not_found("resource not found"),
        FeedError::Repo(err) => repo_to_api(err),
    }
}

pub(crate) fn comment_to_api(err: CommentError) -> ApiError {
    match err {
        CommentError::Unauthenticated => ApiError::unauthorized("Sign in to comment"),
        CommentError::PostNotFound => ApiError::not_found("post not found"),
        CommentError::Rejected { content, reason } => {
            ApiError::validation(&reason).with_echo(content)
        }
        CommentError::Repo(err) => repo_to_api(err),
    }
}

pub(crate) fn taxonomy_to_api(err: TaxonomyError) -> ApiError {
    match err {
        TaxonomyError::NotFound { entity } => ApiError::new(
            StatusCode::NOT_FOUND,
            codes::NOT_FOUND,
            "resource not found",
            Some(format!("{entity} not found")),
        ),
        TaxonomyError::SlugTaken { slug } => ApiError::new(
            StatusCode::CONFLICT,
            codes::DUPLICATE,
            "Slug already in use",
            Some(slug),
        ),
        TaxonomyError::Validation(err) => ApiError::validation(&err),
        TaxonomyError::Repo(err) => repo_to_api(err),
    }
}

pub(crate) fn syndication_to_api(err: SyndicationError) -> ApiError {
    match err {
        SyndicationError::Posts(err) => repo_to_api(err),
        SyndicationError::Link(err) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::FEED,
            "Failed to build feed links",
            Some(err.to_string()),
        ),
    }
}
