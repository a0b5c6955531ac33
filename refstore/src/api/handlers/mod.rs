//! axum request handlers.

pub mod files;
pub mod status;
