//! Request handlers, one module per app.
//!
//! Handlers answer with JSON page contexts, or with a 302 after a successful write.

pub mod news;
pub mod notes;
pub mod users;

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

/// 302 Found to `location`.
pub(crate) fn found(location: impl Into<String>) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.into())]).into_response()
}
