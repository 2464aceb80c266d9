//! Error types shared across layers.
//!
//! - [`AppError`] - API-facing error rendered as a JSON body with an HTTP status
//! - [`StoreError`] - rule snapshot file failures

use std::path::PathBuf;

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use validator::ValidationErrors;

use crate::domain::conflict::Conflict;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Machine-readable error payload.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug)]
pub enum AppError {
    Validation { message: String, details: Value },
    NotFound { message: String, details: Value },
    Conflict { message: String, details: Value },
    Unauthorized { message: String, details: Value },
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }
    pub fn unauthorized(message: impl Into<String>, details: Value) -> Self {
        Self::Unauthorized {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// Conflict error carrying the reason and the full list of conflicting rules.
    pub fn rule_conflict(conflict: &Conflict) -> Self {
        Self::conflict(
            conflict.reason(),
            json!({ "kind": conflict.kind, "conflicts": conflict.rules }),
        )
    }

    fn parts(self) -> (StatusCode, ErrorInfo) {
        let (status, code, message, details) = match self {
            AppError::Validation { message, details } => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                message,
                details,
            ),
            AppError::NotFound { message, details } => {
                (StatusCode::NOT_FOUND, "not_found", message, details)
            }
            AppError::Conflict { message, details } => {
                (StatusCode::CONFLICT, "conflict", message, details)
            }
            AppError::Unauthorized { message, details } => {
                (StatusCode::UNAUTHORIZED, "unauthorized", message, details)
            }
            AppError::Internal { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                message,
                details,
            ),
        };

        (
            status,
            ErrorInfo {
                code,
                message,
                details,
            },
        )
    }

    /// Converts the error into its payload without the HTTP status.
    pub fn to_error_info(self) -> ErrorInfo {
        self.parts().1
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Validation { message, .. } => write!(f, "validation error: {message}"),
            AppError::NotFound { message, .. } => write!(f, "not found: {message}"),
            AppError::Conflict { message, .. } => write!(f, "conflict: {message}"),
            AppError::Unauthorized { message, .. } => write!(f, "unauthorized: {message}"),
            AppError::Internal { message, .. } => write!(f, "internal error: {message}"),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let unauthorized = matches!(self, AppError::Unauthorized { .. });
        let (status, error) = self.parts();
        let mut response = (status, Json(ErrorBody { error })).into_response();

        if unauthorized {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                header::HeaderValue::from_static("Bearer"),
            );
        }

        response
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::bad_request(
            "Validation failed",
            serde_json::to_value(&errors).unwrap_or_default(),
        )
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::internal("Rule file error", json!({ "reason": e.to_string() }))
    }
}

/// Failure reading, parsing or writing a rule snapshot file.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access rule file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed rule file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize rules: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conflict::ConflictKind;

    #[test]
    fn test_conflict_maps_to_409_with_rules() {
        let conflict = Conflict {
            kind: ConflictKind::Duplicate,
            rules: vec![],
        };

        let err = AppError::rule_conflict(&conflict);
        let info = AppError::rule_conflict(&conflict).to_error_info();

        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
        assert_eq!(info.code, "conflict");
        assert_eq!(info.message, "identical rule exists");
        assert!(info.details["conflicts"].is_array());
    }

    #[test]
    fn test_unauthorized_sets_challenge_header() {
        let response = AppError::unauthorized("Unauthorized", json!({})).into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
    }

    #[test]
    fn test_store_error_is_internal() {
        let err: AppError = StoreError::io(
            std::path::Path::new("rules.json"),
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        )
        .into();

        assert!(matches!(err, AppError::Internal { .. }));
    }
}
