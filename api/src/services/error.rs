//! Error handling utilities for route handlers

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Error returned by every handler. Renders as the JSON failure envelope.
#[derive(Debug, thiserror::Error)]
#[error("{title}: {details}")]
pub struct ApiError {
    pub status: StatusCode,
    pub title: &'static str,
    pub details: String,
    pub code: &'static str,
    pub suggestions: Vec<&'static str>,
}

impl ApiError {
    fn new(status: StatusCode, title: &'static str, code: &'static str, details: impl Into<String>) -> Self {
        Self {
            status,
            title,
            details: details.into(),
            code,
            suggestions: Vec::new(),
        }
    }

    /// Malformed request; rejected before any processing
    pub fn validation(code: &'static str, details: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Invalid Input", code, details)
    }

    pub fn not_found(code: &'static str, details: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not Found", code, details)
    }

    /// Upstream or external engine failed; the caller may retry later
    pub fn unavailable(code: &'static str, details: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable", code, details)
    }

    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Something Went Wrong",
            "INTERNAL_ERROR",
            details,
        )
    }

    pub fn with_title(mut self, title: &'static str) -> Self {
        self.title = title;
        self
    }

    pub fn with_suggestions(mut self, suggestions: &[&'static str]) -> Self {
        self.suggestions = suggestions.to_vec();
        self
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: &'static str,
    details: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    suggestions: Vec<&'static str>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            error: self.title,
            details: self.details,
            code: self.code,
            suggestions: self.suggestions,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation("INVALID_BODY", rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation("INVALID_QUERY", rejection.body_text())
    }
}

/// Extension trait for logging errors and converting to ApiError
pub trait LogErr<T> {
    /// Log error with context and return a 500
    fn log_internal(self, context: &str) -> Result<T, ApiError>;

    /// Log error with context and return a 503 with the given code
    fn log_unavailable(self, context: &str, code: &'static str) -> Result<T, ApiError>;
}

impl<T, E: std::fmt::Display> LogErr<T> for Result<T, E> {
    fn log_internal(self, context: &str) -> Result<T, ApiError> {
        self.map_err(|e| {
            tracing::error!(error = %e, "{}", context);
            ApiError::internal(context.to_string())
        })
    }

    fn log_unavailable(self, context: &str, code: &'static str) -> Result<T, ApiError> {
        self.map_err(|e| {
            tracing::warn!(error = %e, "{}", context);
            ApiError::unavailable(code, format!("{}: {}", context, e))
        })
    }
}
