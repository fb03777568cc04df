//! Post status state machine.
//!
//! `draft -> published` via publish, `published -> archived` via archive and
//! `published -> draft` via revert. Archived posts have no outgoing edge.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::types::PostStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Publish,
    Archive,
    RevertToDraft,
}

impl Transition {
    pub fn as_str(self) -> &'static str {
        match self {
            Transition::Publish => "publish",
            Transition::Archive => "archive",
            Transition::RevertToDraft => "revert_to_draft",
        }
    }

    /// The only status this transition may start from.
    pub fn source(self) -> PostStatus {
        match self {
            Transition::Publish => PostStatus::Draft,
            Transition::Archive | Transition::RevertToDraft => PostStatus::Published,
        }
    }

    pub fn target(self) -> PostStatus {
        match self {
            Transition::Publish => PostStatus::Published,
            Transition::Archive => PostStatus::Archived,
            Transition::RevertToDraft => PostStatus::Draft,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot {} a post that is {current}; it must be {}", transition.as_str(), transition.source())]
pub struct InvalidTransition {
    pub transition: Transition,
    pub current: PostStatus,
}

/// Resolve the status a post reaches when `transition` is applied in `current`.
pub fn apply(current: PostStatus, transition: Transition) -> Result<PostStatus, InvalidTransition> {
    if current == transition.source() {
        Ok(transition.target())
    } else {
        Err(InvalidTransition {
            transition,
            current,
        })
    }
}
