use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::services::error::{PasteError, ValidationError};

/// A lightweight wrapper for general errors that keeps the message local.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        let status = match err {
            ValidationError::ValueTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };
        AppError::new(status, err.to_string())
    }
}

impl From<PasteError> for AppError {
    fn from(err: PasteError) -> Self {
        match err {
            PasteError::Validation(inner) => inner.into(),
            PasteError::NotFound => AppError::not_found("paste not found"),
            other => {
                // storage details stay in the log
                tracing::error!("paste storage failure: {}", other);
                AppError::internal("could not complete request")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_core_errors_to_statuses() {
        let too_big: AppError = PasteError::Validation(ValidationError::ValueTooLarge {
            len: 10,
            limit: 10,
        })
        .into();
        assert_eq!(too_big.status, StatusCode::PAYLOAD_TOO_LARGE);

        let empty: AppError = PasteError::Validation(ValidationError::EmptyValue).into();
        assert_eq!(empty.status, StatusCode::BAD_REQUEST);

        let missing: AppError = PasteError::NotFound.into();
        assert_eq!(missing.status, StatusCode::NOT_FOUND);

        let storage: AppError = PasteError::Sqlx(sqlx::Error::PoolTimedOut).into();
        assert_eq!(storage.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!storage.message.contains("pool"));

        let entropy: AppError =
            PasteError::Entropy(rand::Error::new("entropy source unavailable")).into();
        assert_eq!(entropy.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(entropy.message, "could not complete request");
    }
}
