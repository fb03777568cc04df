//! Domain layer types and invariants.

pub mod comments;
pub mod entities;
pub mod error;
pub mod lifecycle;
pub mod search;
pub mod slug;
pub mod types;
