//! Error types for CampaignHub services
//!
//! Provides a comprehensive error handling system with:
//! - Distinct error types for the campaign workflow failure modes
//! - HTTP status code mapping
//! - The `{ok: false, error: {...}}` response envelope
//! - Error codes for client handling

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{DbErr, SqlErr};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use validator::ValidationErrors;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Unauthorized,
    ValidationFailed,
    Forbidden,
    NotFound,
    Conflict,
    DuplicateRole,
    FetchFailed,
    RateLimited,
    Unknown,
}

impl ErrorCode {
    /// Wire name, as serialized in the envelope
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::DuplicateRole => "DUPLICATE_ROLE",
            ErrorCode::FetchFailed => "FETCH_FAILED",
            ErrorCode::RateLimited => "RATE_LIMITED",
            ErrorCode::Unknown => "UNKNOWN",
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("{message}")]
    Validation {
        message: String,
        details: Option<serde_json::Value>,
    },

    // Authentication errors
    #[error("{message}")]
    Unauthorized { message: String },

    // Authorization errors
    #[error("{message}")]
    Forbidden { message: String },

    /// Campaign endpoints report ownership/role failures as 403 `FETCH_FAILED`.
    #[error("{message}")]
    CampaignAccessDenied { message: String },

    #[error("{message}")]
    DuplicateRole { message: String },

    // Resource errors
    #[error("{resource_type} not found: {id}")]
    NotFound { resource_type: String, id: String },

    // Conflict errors
    #[error("{message}")]
    Conflict { message: String },

    // Rate limiting
    #[error("Rate limit exceeded")]
    RateLimited,

    // Backend read failure with a client-facing message
    #[error("{message}")]
    Fetch { message: String },

    // Database errors
    #[error("Database error: {0}")]
    Database(DbErr),

    #[error("Database connection error: {message}")]
    DatabaseConnection { message: String },

    // External service errors
    #[error("Auth provider error: {message}")]
    AuthProvider { message: String },

    // Internal errors
    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            details: None,
        }
    }

    pub fn unauthorized() -> Self {
        AppError::Unauthorized {
            message: "Login is required".to_string(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        AppError::Forbidden {
            message: message.into(),
        }
    }

    pub fn not_found(resource_type: &str, id: impl ToString) -> Self {
        AppError::NotFound {
            resource_type: resource_type.to_string(),
            id: id.to_string(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        AppError::Conflict {
            message: message.into(),
        }
    }

    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationFailed,
            AppError::Unauthorized { .. } => ErrorCode::Unauthorized,
            AppError::Forbidden { .. } => ErrorCode::Forbidden,
            AppError::CampaignAccessDenied { .. } => ErrorCode::FetchFailed,
            AppError::DuplicateRole { .. } => ErrorCode::DuplicateRole,
            AppError::NotFound { .. } => ErrorCode::NotFound,
            AppError::Conflict { .. } => ErrorCode::Conflict,
            AppError::RateLimited => ErrorCode::RateLimited,
            AppError::Fetch { .. } => ErrorCode::FetchFailed,
            AppError::Database(_)
            | AppError::DatabaseConnection { .. }
            | AppError::AuthProvider { .. }
            | AppError::Internal { .. }
            | AppError::Configuration { .. }
            | AppError::Serialization(_)
            | AppError::Other(_) => ErrorCode::Unknown,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,

            // 401 Unauthorized
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            AppError::Forbidden { .. } | AppError::CampaignAccessDenied { .. } => {
                StatusCode::FORBIDDEN
            }

            // 404 Not Found
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,

            // 409 Conflict
            AppError::Conflict { .. } | AppError::DuplicateRole { .. } => StatusCode::CONFLICT,

            // 429 Too Many Requests
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,

            // 500 Internal Server Error
            AppError::Fetch { .. }
            | AppError::Database(_)
            | AppError::DatabaseConnection { .. }
            | AppError::Internal { .. }
            | AppError::Configuration { .. }
            | AppError::Serialization(_)
            | AppError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,

            // 502 Bad Gateway
            AppError::AuthProvider { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Check if this error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Message safe to show to clients. Backend failures never leak their cause.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Database(_)
            | AppError::DatabaseConnection { .. }
            | AppError::AuthProvider { .. }
            | AppError::Internal { .. }
            | AppError::Configuration { .. }
            | AppError::Serialization(_)
            | AppError::Other(_) => "An unexpected error occurred".to_string(),
            other => other.to_string(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::Validation { details, .. } => details.clone(),
            _ => None,
        }
    }
}

/// Structured error response for API
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: ErrorDetails,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        // Log based on severity
        if self.is_server_error() {
            tracing::error!(
                error = %self,
                code = code.as_str(),
                status = status.as_u16(),
                "Server error"
            );
        } else if self.is_client_error() {
            tracing::warn!(
                error = %self,
                code = code.as_str(),
                status = status.as_u16(),
                "Client error"
            );
        }

        crate::metrics::record_rejection(code);

        let body = ErrorResponse {
            ok: false,
            error: ErrorDetails {
                code,
                message: self.public_message(),
                details: self.details(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                tracing::debug!(detail = %detail, "Unique constraint violated");
                AppError::conflict("Resource already exists")
            }
            _ => AppError::Database(err),
        }
    }
}

/// `benefit_desc` -> `benefitDesc`, matching the JSON field names
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut form = Vec::new();

        for (field, field_errors) in errors.field_errors() {
            let messages: Vec<String> = field_errors
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();

            // Struct-level checks are reported under `__all__`
            if field == "__all__" {
                form.extend(messages);
            } else {
                fields.insert(camel_case(&field), messages);
            }
        }

        AppError::Validation {
            message: "Input is invalid".to_string(),
            details: Some(serde_json::json!({ "formErrors": form, "fieldErrors": fields })),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation {
            message: "Input is invalid".to_string(),
            details: Some(serde_json::json!({ "body": rejection.body_text() })),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation {
            message: "Query parameters are invalid".to_string(),
            details: Some(serde_json::json!({ "query": rejection.body_text() })),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation {
            message: "Path parameters are invalid".to_string(),
            details: Some(serde_json::json!({ "path": rejection.body_text() })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_error_code_mapping() {
        let err = AppError::not_found("Campaign", "abc");
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_campaign_access_denied_keeps_fetch_failed_code() {
        let err = AppError::CampaignAccessDenied {
            message: "Not the campaign owner".into(),
        };
        assert_eq!(err.code(), ErrorCode::FetchFailed);
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert!(err.is_client_error());
    }

    #[test]
    fn test_duplicate_role_is_conflict_status() {
        let err = AppError::DuplicateRole {
            message: "Profile role is not ADVERTISER".into(),
        };
        assert_eq!(err.code(), ErrorCode::DuplicateRole);
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_server_error_hides_details() {
        let err = AppError::Internal {
            message: "pool exhausted at 10.0.0.3".into(),
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), ErrorCode::Unknown);
        assert!(err.is_server_error());
        assert!(!err.public_message().contains("10.0.0.3"));
    }

    #[test]
    fn test_error_code_wire_names() {
        let json = serde_json::to_string(&ErrorCode::ValidationFailed).unwrap();
        assert_eq!(json, "\"VALIDATION_FAILED\"");
        assert_eq!(ErrorCode::DuplicateRole.as_str(), "DUPLICATE_ROLE");
    }

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "must not be empty"))]
        title: String,
        #[validate(url)]
        review_url: String,
    }

    #[test]
    fn test_validation_errors_carry_field_details() {
        let err: AppError = Sample {
            title: String::new(),
            review_url: "nope".into(),
        }
        .validate()
        .unwrap_err()
        .into();

        assert_eq!(err.code(), ErrorCode::ValidationFailed);
        let details = err.details().unwrap();
        assert_eq!(details["fieldErrors"]["title"][0], "must not be empty");
        assert_eq!(details["fieldErrors"]["reviewUrl"][0], "url");
        assert_eq!(details["formErrors"], serde_json::json!([]));
    }
}
