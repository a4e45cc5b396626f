//! # Press Common Library
//!
//! Shared code for the Press services including:
//! - Database schema initialisation and models
//! - Configuration loading and root folder resolution
//! - Session cookie authentication
//! - Slug normalisation and timestamp parsing

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod slug;
pub mod time;

pub use error::{Error, Result};
pub use slug::create_slug;
