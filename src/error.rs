//! Domain-specific error types for persona-books

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Main error type for the persona-books service
#[derive(Error, Debug)]
pub enum PersonaError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Book catalog error: {message}")]
    Catalog { message: String },

    #[error("Timeout error: {operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Email already registered")]
    DuplicateAccount,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PersonaError {
    pub fn validation(message: impl Into<String>) -> Self {
        PersonaError::Validation {
            message: message.into(),
        }
    }

    /// HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            PersonaError::Validation { .. } | PersonaError::DuplicateAccount => {
                StatusCode::BAD_REQUEST
            }
            PersonaError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            PersonaError::Catalog { .. } => StatusCode::BAD_GATEWAY,
            PersonaError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            PersonaError::Config { .. }
            | PersonaError::Database { .. }
            | PersonaError::Serialization { .. }
            | PersonaError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for PersonaError {
    fn from(err: anyhow::Error) -> Self {
        PersonaError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for PersonaError {
    fn from(err: serde_json::Error) -> Self {
        PersonaError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for PersonaError {
    fn from(err: toml::de::Error) -> Self {
        PersonaError::Config {
            message: err.to_string(),
        }
    }
}

impl From<rusqlite::Error> for PersonaError {
    fn from(err: rusqlite::Error) -> Self {
        PersonaError::Database {
            message: err.to_string(),
        }
    }
}

impl From<argon2::password_hash::Error> for PersonaError {
    fn from(err: argon2::password_hash::Error) -> Self {
        PersonaError::Internal {
            message: format!("Password hashing failed: {}", err),
        }
    }
}

impl From<tokio::task::JoinError> for PersonaError {
    fn from(err: tokio::task::JoinError) -> Self {
        PersonaError::Internal {
            message: format!("Blocking task failed: {}", err),
        }
    }
}

impl From<reqwest::Error> for PersonaError {
    fn from(err: reqwest::Error) -> Self {
        PersonaError::Catalog {
            message: format!("HTTP request failed: {}", err),
        }
    }
}

/// Convert PersonaError to a JSON HTTP response
impl IntoResponse for PersonaError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            // Catalog failures keep the payload shape clients already parse
            PersonaError::Catalog { message } => {
                json!({ "error": "failed to fetch", "details": message })
            }
            PersonaError::Timeout { .. } => {
                json!({ "error": "failed to fetch", "details": self.to_string() })
            }
            PersonaError::Validation { message } => json!({ "detail": message }),
            PersonaError::DuplicateAccount | PersonaError::InvalidCredentials => {
                json!({ "detail": self.to_string() })
            }
            _ => {
                tracing::error!("Request failed: {}", self);
                json!({ "detail": self.to_string() })
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for persona-books operations
pub type Result<T> = std::result::Result<T, PersonaError>;
