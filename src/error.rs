//! Error Types
//!
//! Centralized error handling for authentication, signup and review
//! operations.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Message shared by every credential failure so callers cannot tell an
/// unknown username from a wrong password.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "username or password is not matched";

/// Failures reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("{code}: {message}")]
    Rejected { code: String, message: String },

    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Failure of the token-signing subsystem
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("token signing failed: {0}")]
pub struct SigningError(pub String);

impl From<jsonwebtoken::errors::Error> for SigningError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        tracing::error!("JWT signing error: {:?}", err);
        SigningError(err.to_string())
    }
}

/// Crate-wide errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    #[error("{}", INVALID_CREDENTIALS_MESSAGE)]
    InvalidCredentials,

    #[error("{0}")]
    Unauthorized(String),

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error")]
    Internal,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            AuthError::InvalidCredentials | AuthError::Unauthorized(_) => {
                (StatusCode::UNAUTHORIZED, "unauthorized", self.to_string())
            }
            AuthError::InvalidToken => {
                (StatusCode::UNAUTHORIZED, "invalid_token", self.to_string())
            }
            AuthError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            AuthError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            AuthError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", msg.clone())
            }
            AuthError::Provider(ProviderError::Rejected { code, message }) => {
                (StatusCode::BAD_REQUEST, code.as_str(), message.clone())
            }
            AuthError::Provider(ProviderError::Unavailable(_)) => (
                StatusCode::BAD_GATEWAY,
                "provider_unavailable",
                "Identity provider is unavailable".to_string(),
            ),
            AuthError::Config(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "configuration_error",
                msg.clone(),
            ),
            AuthError::Signing(_) | AuthError::Database(_) | AuthError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An internal error occurred".to_string(),
            ),
        };

        (
            status,
            Json(serde_json::json!({
                "error": error_code,
                "message": message
            })),
        )
            .into_response()
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        AuthError::Database(err.to_string())
    }
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(err: argon2::password_hash::Error) -> Self {
        tracing::error!("Password hashing error: {:?}", err);
        AuthError::Internal
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        tracing::debug!("JWT error: {:?}", err);
        AuthError::InvalidToken
    }
}
