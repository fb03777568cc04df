//! Pressroom: a small editorial blog backend.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
