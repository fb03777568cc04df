//! Route handlers grouped by resource.
//!
//! Staff-only handlers answer non-staff callers with the same 404 a missing
//! resource gets, so hidden listings are indistinguishable from absent ones.

mod activity;
mod browse;
mod comments;
mod posts;
mod syndication;
mod taxonomy;

pub use activity::*;
pub use browse::*;
pub use comments::*;
pub use posts::*;
pub use syndication::*;
pub use taxonomy::*;

use crate::application::viewer::Viewer;
use crate::domain::entities::UserRecord;

use super::error::ApiError;

pub(crate) fn require_staff(viewer: &Viewer) -> Result<&UserRecord, ApiError> {
    match viewer.account() {
        Some(account) if account.is_staff => Ok(account),
        _ => Err(ApiError::not_found("resource not found")),
    }
}
