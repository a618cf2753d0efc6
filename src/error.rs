//!
//! # Custom Error Handling
//!
//! This module defines the error type `AppError` returned by every service in the
//! application. Services produce one of its variants and never choose HTTP status
//! codes themselves; the mapping to responses lives in the `ResponseError`
//! implementation below and is only exercised by the route layer.
//!
//! Authentication failures are deliberately a single unit variant, so a missing
//! user, a wrong password and a bad token all produce the very same value.

use actix_web::{
    http::{header, StatusCode},
    HttpResponse, ResponseError,
};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

use crate::repository::RepositoryError;

/// Convenience alias used by services and handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Represents all possible errors that can occur within the application.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Malformed or out-of-range input (HTTP 422).
    #[error("Validation error: {0}")]
    Validation(String),
    /// The requested entity does not exist (HTTP 404).
    #[error("Not found: {0}")]
    NotFound(String),
    /// A uniqueness constraint was violated on create or update (HTTP 409).
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    /// The caller is authenticated but does not own the resource (HTTP 403).
    #[error("Forbidden: {0}")]
    AccessForbidden(String),
    /// Bad credentials, or an invalid, expired or orphaned token (HTTP 401).
    #[error("Could not validate credentials")]
    Unauthorized,
    /// Storage or signing failure. The message is logged, never sent (HTTP 500).
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Message placed in the JSON body of the response.
    fn public_message(&self) -> String {
        match self {
            AppError::Validation(msg)
            | AppError::NotFound(msg)
            | AppError::AlreadyExists(msg)
            | AppError::AccessForbidden(msg) => msg.clone(),
            AppError::Unauthorized => self.to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

/// Converts `AppError` variants into `HttpResponse` objects.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AlreadyExists(_) => StatusCode::CONFLICT,
            AppError::AccessForbidden(_) => StatusCode::FORBIDDEN,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Internal(msg) = self {
            log::error!("Internal error: {}", msg);
        }

        let mut builder = HttpResponse::build(self.status_code());
        if matches!(self, AppError::Unauthorized) {
            builder.insert_header((header::WWW_AUTHENTICATE, "Bearer"));
        }
        builder.json(json!({ "error": self.public_message() }))
    }
}

/// Converts `validator::ValidationErrors` into `AppError::Validation`.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::Validation(error.to_string())
    }
}

/// Storage errors never reach callers raw; they are folded into the taxonomy here.
impl From<RepositoryError> for AppError {
    fn from(error: RepositoryError) -> AppError {
        match error {
            RepositoryError::NotFound => {
                AppError::NotFound("The requested resource was not found".into())
            }
            RepositoryError::AlreadyExists => AppError::AlreadyExists(
                "A resource with the same unique identifier already exists".into(),
            ),
            RepositoryError::Storage(msg) => AppError::Internal(msg),
        }
    }
}
