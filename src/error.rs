use crate::store::StoreError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

/// Failures surfaced to the HTTP caller as machine-readable codes.
/// Every precondition failure is a typed variant; only genuine persistence
/// outages pass through as `Storage`.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("auction not found")]
    NotFound,
    #[error("auction is not active")]
    NotActive,
    #[error("auction has not started yet")]
    NotStarted,
    #[error("auction has already ended")]
    AlreadyEnded,
    #[error("bid amount must be a positive integer")]
    InvalidAmount,
    #[error("bid amount is below the minimum of {min_bid}")]
    BidTooLow { min_bid: i64 },
    #[error("auction is not pending a deposit")]
    DepositNotPending,
    #[error("concurrent bids exhausted the retry budget")]
    ConcurrencyConflict,
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl ServiceError {
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::NotFound => "NOT_FOUND",
            ServiceError::NotActive => "NOT_ACTIVE",
            ServiceError::NotStarted => "NOT_STARTED",
            ServiceError::AlreadyEnded => "ALREADY_ENDED",
            ServiceError::InvalidAmount => "INVALID_AMOUNT",
            ServiceError::BidTooLow { .. } => "BID_TOO_LOW",
            ServiceError::DepositNotPending => "NOT_PENDING_PAYMENT",
            ServiceError::ConcurrencyConflict => "CONCURRENCY_CONFLICT",
            ServiceError::Storage(_) => "STORAGE_UNAVAILABLE",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ServiceError::NotFound => StatusCode::NOT_FOUND,
            // Transient: safe for the caller to retry the whole operation.
            ServiceError::ConcurrencyConflict => StatusCode::CONFLICT,
            ServiceError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        if let ServiceError::Storage(e) = &self {
            error!("{:<12} --> storage failure: {:?}", "Error", e);
        }
        // Storage details stay in the log, not in the response body.
        let message = match &self {
            ServiceError::Storage(_) => "storage unavailable".to_string(),
            other => other.to_string(),
        };
        let mut body = serde_json::json!({
            "error": message,
            "code": self.code(),
        });
        // The caller needs the computed minimum to self-correct.
        if let ServiceError::BidTooLow { min_bid } = &self {
            body["min_bid"] = serde_json::json!(min_bid);
        }
        (self.status(), Json(body)).into_response()
    }
}
