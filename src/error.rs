//! Error types for the persistence layer and the request boundary.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Failures reported by a `Repository` write.
#[derive(Debug, Error)]
pub enum RepoError {
    /// Another note already uses this slug (enforced by the unique index).
    #[error("slug `{0}` is already taken")]
    SlugTaken(String),

    /// Another account already uses this username.
    #[error("username `{0}` is already taken")]
    UsernameTaken(String),

    /// The parent record of an insert does not exist.
    #[error("{0} does not exist")]
    MissingParent(&'static str),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// AppError
///
/// Errors that end a request. Validation failures are not errors here: handlers
/// re-render the form with a 200 instead.
///
/// `NotFound` doubles as the answer to a caller who is not the owner of a record, so
/// an unauthorized caller cannot tell a foreign record from a missing one.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found")]
    NotFound,

    #[error("internal service error: {0}")]
    Internal(String),
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<argon2::password_hash::Error> for AppError {
    fn from(err: argon2::password_hash::Error) -> Self {
        AppError::Internal(format!("password hashing failed: {err}"))
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AppError::Internal(format!("token signing failed: {err}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not Found").into_response(),
            AppError::Internal(detail) => {
                // Logged in full, returned generic.
                tracing::error!(%detail, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}
