//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Field name to validation messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Application-wide error type.
///
/// Each variant maps to a specific HTTP status code and error code.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Webhook `mac` is missing or does not match the payload.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Invalid signature")]
    InvalidSignature,

    /// No signed-in user on an endpoint that needs one.
    #[error("Authentication required")]
    Unauthenticated,

    /// Signed-in user may not act on this resource.
    #[error("Forbidden")]
    Forbidden,

    #[error("Payment not found")]
    PaymentNotFound,

    #[error("Application not found")]
    ApplicationNotFound,

    #[error("Timeline event not found")]
    TimelineEventNotFound,

    #[error("Startup not found")]
    StartupNotFound,

    /// Unknown page, unknown chapter section or disabled feature.
    #[error("Not found")]
    NotFound,

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("Invalid request")]
    InvalidRequest(String),

    /// Well-formed request that breaks a business rule.
    ///
    /// Returns HTTP 422 Unprocessable Entity.
    #[error("Unprocessable request")]
    Unprocessable(String),

    /// Field-level validation failed.
    #[error("Validation failed")]
    Validation(FieldErrors),

    /// The payment gateway could not be reached or rejected the call.
    ///
    /// Returns HTTP 502 Bad Gateway.
    #[error("Payment gateway error: {0}")]
    Gateway(String),

    /// Anything else that should surface as a 500.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// Validation errors add a `fields` object mapping field names to messages.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::InvalidSignature => (
                StatusCode::UNAUTHORIZED,
                "invalid_signature",
                self.to_string(),
            ),
            AppError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "unauthenticated",
                self.to_string(),
            ),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "forbidden", self.to_string()),
            AppError::PaymentNotFound => {
                (StatusCode::NOT_FOUND, "payment_not_found", self.to_string())
            }
            AppError::ApplicationNotFound => (
                StatusCode::NOT_FOUND,
                "application_not_found",
                self.to_string(),
            ),
            AppError::TimelineEventNotFound => (
                StatusCode::NOT_FOUND,
                "timeline_event_not_found",
                self.to_string(),
            ),
            AppError::StartupNotFound => {
                (StatusCode::NOT_FOUND, "startup_not_found", self.to_string())
            }
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::Unprocessable(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "unprocessable",
                msg.clone(),
            ),
            AppError::Validation(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_failed",
                self.to_string(),
            ),
            AppError::Gateway(msg) => {
                tracing::warn!("Payment gateway error: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "gateway_error",
                    "Payment gateway unavailable".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let AppError::Validation(fields) = self {
            error["fields"] = json!(fields);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
