//! Error type for the authentication service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::DatabaseError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::validation::FieldError;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Unauthorized")]
    Unauthorized,

    /// One or more request fields were rejected
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal server error")]
    InternalServerError,
}

impl From<DatabaseError> for AuthError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Duplicate(constraint) if constraint.contains("email") => {
                AuthError::Conflict("Email is already registered".to_string())
            }
            DatabaseError::Duplicate(constraint) if constraint.contains("username") => {
                AuthError::Conflict("Username is already taken".to_string())
            }
            other => {
                error!("Database failure: {}", other);
                AuthError::InternalServerError
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AuthError::Unauthorized => (StatusCode::UNAUTHORIZED, json!({ "error": "Unauthorized" })),
            AuthError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Validation failed", "fields": fields }),
            ),
            AuthError::Conflict(message) => (StatusCode::CONFLICT, json!({ "error": message })),
            AuthError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal server error" }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_constraints_map_to_conflicts() {
        let err: AuthError = DatabaseError::Duplicate("users_email_key".to_string()).into();
        assert!(matches!(err, AuthError::Conflict(m) if m == "Email is already registered"));

        let err: AuthError = DatabaseError::Duplicate("users_username_key".to_string()).into();
        assert!(matches!(err, AuthError::Conflict(m) if m == "Username is already taken"));
    }

    #[test]
    fn test_other_database_errors_are_internal() {
        let err: AuthError = DatabaseError::Migration("bad".to_string()).into();
        assert!(matches!(err, AuthError::InternalServerError));

        let err: AuthError = DatabaseError::Duplicate("users_pkey".to_string()).into();
        assert!(matches!(err, AuthError::InternalServerError));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AuthError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::Validation(vec![]).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::Conflict("taken".to_string()).into_response().status(),
            StatusCode::CONFLICT
        );
    }
}
