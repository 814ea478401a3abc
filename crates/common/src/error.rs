//! Common error types and handling for Chatline

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Message returned for infrastructure failures that were not mapped to an
/// operation-specific message.
const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong!";

/// Common result type
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Chatline application
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Database(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Database(_) => "DATABASE_ERROR",
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show to API clients.
    ///
    /// Infrastructure errors never leak their details; those are logged instead.
    pub fn public_message(&self) -> String {
        match self {
            Error::Validation(msg)
            | Error::PayloadTooLarge(msg)
            | Error::NotFound(msg)
            | Error::Internal(msg) => msg.clone(),
            Error::Database(_) => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }

    /// Collapse an infrastructure failure into a generic internal error.
    ///
    /// Client-facing errors (validation, not found) pass through untouched.
    /// Anything else is logged here with its full context and replaced by
    /// `Error::Internal(message)`.
    pub fn into_internal(self, message: &str) -> Error {
        match self {
            Error::Validation(_) | Error::PayloadTooLarge(_) | Error::NotFound(_) => self,
            other => {
                tracing::error!(error = %other, "{}", message);
                Error::Internal(message.to_string())
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        // Internal errors already mapped via `into_internal` were logged there
        if status == StatusCode::INTERNAL_SERVER_ERROR && !matches!(self, Error::Internal(_)) {
            tracing::error!(error = %self, "Internal server error");
        }

        let body = Json(json!({
            "error": self.public_message(),
            "code": error_code,
        }));

        (status, body).into_response()
    }
}
