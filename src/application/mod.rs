//! Application services orchestrating domain logic and persistence.

pub mod audit;
pub mod comments;
pub mod context;
pub mod error;
pub mod feed;
pub mod pagination;
pub mod posts;
pub mod repos;
pub mod seed;
pub mod syndication;
pub mod taxonomy;
pub mod users;
pub mod viewer;
