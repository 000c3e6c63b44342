//! API error types and response mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rebill_billing::RebillError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Caller-facing input error, detected before the workflow runs.
    #[error("{0}")]
    Validation(String),

    /// Terminal workflow failure (failed payment / unexpected gateway
    /// status); reported to the caller as unprocessable.
    #[error("{0}")]
    Unprocessable(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<RebillError> for ApiError {
    fn from(err: RebillError) -> Self {
        match err {
            RebillError::PaymentFailed { .. } | RebillError::UnexpectedPaymentStatus { .. } => {
                Self::Unprocessable(err.to_string())
            }
            RebillError::Database(e) => Self::Database(e),
            RebillError::Gateway(e) => Self::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            Self::Database(e) => {
                tracing::error!(error = %e, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_failed_maps_to_unprocessable() {
        let err: ApiError = RebillError::PaymentFailed {
            subscription_id: "sub_1".to_string(),
            attempt: 1,
        }
        .into();

        assert!(matches!(err, ApiError::Unprocessable(_)));
        assert_eq!(
            err.to_string(),
            "Failed payment for subscription sub_1 on attempt 1"
        );
    }

    #[test]
    fn unexpected_status_maps_to_unprocessable() {
        let err: ApiError = RebillError::UnexpectedPaymentStatus {
            status: "unknown_status".to_string(),
        }
        .into();

        assert!(matches!(err, ApiError::Unprocessable(_)));
        assert_eq!(
            err.to_string(),
            "Received unexpected payment status: unknown_status"
        );
    }

    #[test]
    fn validation_responds_with_400() {
        let response = ApiError::Validation("Invalid parameters".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unprocessable_responds_with_422() {
        let response = ApiError::Unprocessable("nope".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
