//! API error type and the uniform JSON error envelope.
//!
//! The surface deliberately has no status-code taxonomy: every failure,
//! validation or dependency alike, becomes HTTP 500 with
//! `{"success": false, "error": <message>, "timestamp": <millis>}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use tome_chat::ChatError;
use tome_core::error::TomeError;
use tome_store::StoreError;

/// JSON error envelope body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    pub timestamp: i64,
}

/// API error carrying the message for the error envelope.
#[derive(Debug)]
pub struct ApiError(pub String);

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            error: self.0,
            timestamp: Utc::now().timestamp_millis(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

impl From<TomeError> for ApiError {
    fn from(err: TomeError) -> Self {
        ApiError(err.to_string())
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        ApiError(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError(err.to_string())
    }
}
