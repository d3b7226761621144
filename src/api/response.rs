//! Purpose: Render decode failures as JSON error envelopes for axum.
//! Exports: `ErrorResponse`, `ErrorEnvelope`, `ErrorBody`, `json_response`.
//! Role: HTTP implementation of the decoder's `ResponseEmitter` seam.
//! Invariants: Envelope shape is `{"error":{"kind":..,"message":..}}`.
//! Invariants: The last write wins; the decoder writes at most once per request.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::core::emit::ResponseEmitter;

#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ErrorResponse {
    response: Option<Response>,
}

impl ErrorResponse {
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&mut self, status: StatusCode, message: &str) {
        let body = ErrorEnvelope {
            error: ErrorBody {
                kind: kind_for_status(status).to_string(),
                message: message.to_string(),
            },
        };
        self.response = Some((status, Json(body)).into_response());
    }
}

impl ResponseEmitter for ErrorResponse {
    fn write_bad_request(&mut self, message: &str) {
        self.write(StatusCode::BAD_REQUEST, message);
    }

    fn write_error(&mut self, status: u16, message: &str) {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        self.write(status, message);
    }

    fn write_internal_error(&mut self, message: &str) {
        self.write(StatusCode::INTERNAL_SERVER_ERROR, message);
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        self.response
            .unwrap_or_else(|| StatusCode::INTERNAL_SERVER_ERROR.into_response())
    }
}

fn kind_for_status(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "BadRequest",
        StatusCode::PAYLOAD_TOO_LARGE => "PayloadTooLarge",
        _ if status.is_server_error() => "Internal",
        _ => "Error",
    }
}

pub fn json_response(payload: serde_json::Value) -> Response {
    Json(payload).into_response()
}
