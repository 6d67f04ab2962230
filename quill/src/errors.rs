use crate::db::errors::DbError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Bearer token present but failed verification (signature, structure, expiry)
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Authentication required but not provided
    #[error("Authentication required")]
    Unauthenticated,

    /// Login failed. Unknown email and wrong password collapse into this single
    /// variant so the response never reveals which one it was.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Caller is authenticated but not permitted to act on the resource
    #[error("Access denied to {resource}")]
    AccessDenied { resource: String },

    /// Requested resource not found
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: String, id: String },

    /// Signup with an email that is already registered
    #[error("An account with this email address already exists")]
    DuplicateEmail,

    /// Request body failed validation rules
    #[error("{message}")]
    Validation { message: String },

    /// Invalid request data or business rule violation
    #[error("{message}")]
    BadRequest { message: String },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Database operation error
    #[error(transparent)]
    Database(#[from] DbError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// JSON error payload returned to clients.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub code: &'static str,
    pub status: u16,
    pub timestamp: String,
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidToken => StatusCode::UNAUTHORIZED,
            Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::AccessDenied { .. } => StatusCode::FORBIDDEN,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::DuplicateEmail => StatusCode::CONFLICT,
            Error::Validation { .. } => StatusCode::BAD_REQUEST,
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Database(db_err) => match db_err {
                DbError::NotFound => StatusCode::NOT_FOUND,
                DbError::UniqueViolation { .. } => StatusCode::CONFLICT,
                DbError::ForeignKeyViolation { .. } => StatusCode::BAD_REQUEST,
                DbError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for the error body.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidToken => "INVALID_TOKEN",
            Error::Unauthenticated => "UNAUTHENTICATED",
            Error::InvalidCredentials => "INVALID_CREDENTIALS",
            Error::AccessDenied { .. } => "ACCESS_DENIED",
            Error::NotFound { .. } => "NOT_FOUND",
            Error::DuplicateEmail => "DUPLICATE_EMAIL",
            Error::Validation { .. } => "VALIDATION_FAILED",
            Error::BadRequest { .. } => "BAD_REQUEST",
            Error::Internal { .. } => "INTERNAL_SERVER_ERROR",
            Error::Database(db_err) => match db_err {
                DbError::NotFound => "NOT_FOUND",
                DbError::UniqueViolation { constraint, .. } => {
                    match constraint.as_deref() {
                        Some(c) if c.contains("email") => "DUPLICATE_EMAIL",
                        _ => "CONFLICT",
                    }
                }
                DbError::ForeignKeyViolation { .. } => "BAD_REQUEST",
                DbError::Other(_) => "INTERNAL_SERVER_ERROR",
            },
            Error::Other(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::InvalidToken => "Invalid or expired token".to_string(),
            Error::Unauthenticated => "Authentication required".to_string(),
            Error::InvalidCredentials => "Invalid email or password".to_string(),
            Error::AccessDenied { resource } => format!("Access denied to {resource}"),
            Error::NotFound { resource, id } => format!("{resource} with ID {id} not found"),
            Error::DuplicateEmail => "An account with this email address already exists".to_string(),
            Error::Validation { message } => message.clone(),
            Error::BadRequest { message } => message.clone(),
            Error::Internal { .. } => "Internal server error".to_string(),
            Error::Database(db_err) => match db_err {
                DbError::NotFound => "Resource not found".to_string(),
                DbError::UniqueViolation { constraint, table, .. } => match (table.as_deref(), constraint.as_deref()) {
                    (Some("users"), Some(c)) if c.contains("email") => {
                        "An account with this email address already exists".to_string()
                    }
                    _ => "Resource already exists".to_string(),
                },
                DbError::ForeignKeyViolation { .. } => "Invalid reference to related resource".to_string(),
                DbError::Other(_) => "Database error occurred".to_string(),
            },
            Error::Other(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Database(DbError::Other(_)) | Error::Internal { .. } | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Database(_) | Error::DuplicateEmail => {
                tracing::warn!("Conflict or constraint error: {}", self);
            }
            Error::InvalidToken | Error::Unauthenticated | Error::InvalidCredentials | Error::AccessDenied { .. } => {
                tracing::info!("Authorization error: {}", self);
            }
            Error::Validation { .. } | Error::BadRequest { .. } | Error::NotFound { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();
        let body = ErrorBody {
            message: self.user_message(),
            code: self.code(),
            status: status.as_u16(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, axum::response::Json(body)).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping_is_exhaustive_for_auth_errors() {
        assert_eq!(Error::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::Unauthenticated.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::Unauthenticated.user_message(), "Authentication required");
        assert_eq!(Error::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            Error::AccessDenied {
                resource: "post".to_string()
            }
            .status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_unique_violation_on_email_maps_to_duplicate_email() {
        let err = Error::Database(DbError::UniqueViolation {
            constraint: Some("users_email_key".to_string()),
            table: Some("users".to_string()),
            message: "duplicate key value".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.code(), "DUPLICATE_EMAIL");
        assert_eq!(err.user_message(), "An account with this email address already exists");
    }

    #[test]
    fn test_internal_details_are_not_leaked() {
        let err = Error::Internal {
            operation: "connect to secret backend".to_string(),
        };
        assert_eq!(err.user_message(), "Internal server error");
        assert_eq!(err.code(), "INTERNAL_SERVER_ERROR");
    }

    #[test]
    fn test_invalid_credentials_message_is_uniform() {
        // The same variant serves both unknown-email and wrong-password paths,
        // so the message can never differ between them.
        assert_eq!(Error::InvalidCredentials.user_message(), "Invalid email or password");
        assert_eq!(Error::InvalidCredentials.code(), "INVALID_CREDENTIALS");
    }
}
