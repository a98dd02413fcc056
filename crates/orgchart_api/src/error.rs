//! HTTP error mapping.
//!
//! # Invariants
//! - Every engine error kind maps to exactly one status code.
//! - Bodies are `{"message": <stable text>, "details": <error text>}`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{error, warn};
use orgchart_core::{ErrorKind, ServiceError};
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Error returned by request handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
    details: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    details: &'a str,
}

impl ApiError {
    /// Malformed path id or request body.
    pub fn bad_request(details: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: "malformed request",
            details: details.into(),
        }
    }

    /// Failure outside the engine taxonomy, such as a lost worker task.
    pub fn internal(details: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "internal server error",
            details: details.into(),
        }
    }

    /// The request deadline passed before the engine call finished.
    pub fn timeout(details: impl Into<String>) -> Self {
        Self {
            status: StatusCode::REQUEST_TIMEOUT,
            message: "request timed out",
            details: details.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &'static str {
        self.message
    }

    pub fn details(&self) -> &str {
        &self.details
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.status.as_u16(), self.message, self.details)
    }
}

impl std::error::Error for ApiError {}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        let (status, message) = match value.kind() {
            ErrorKind::Invalid => (StatusCode::BAD_REQUEST, "invalid input"),
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, "resource not found"),
            ErrorKind::Conflict => (StatusCode::CONFLICT, "identifier already registered"),
            ErrorKind::BusinessRule => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "operation violates an organization rule",
            ),
            ErrorKind::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "internal server error"),
        };
        Self {
            status,
            message,
            details: value.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::bad_request(value.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(
                "event=http_error module=api status=error http_status={} error={}",
                self.status.as_u16(),
                self.details
            );
        } else {
            warn!(
                "event=http_error module=api status=rejected http_status={} message={}",
                self.status.as_u16(),
                self.message
            );
        }

        let body = ErrorBody {
            message: self.message,
            details: &self.details,
        };
        (self.status, Json(body)).into_response()
    }
}
