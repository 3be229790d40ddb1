use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use portcullis::LockoutDecision;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GateError {
    #[error("Too many failed login attempts")]
    Locked(LockoutDecision),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        match self {
            GateError::Locked(decision) => {
                // Machine-readable kind plus the raw remaining time, with a
                // human message rounding the wait up to whole minutes
                let body = Json(json!({
                    "error": "too_many_failed_attempts",
                    "message": format!(
                        "Too many failed attempts for this account. Please try again in {} minute(s).",
                        decision.remaining_minutes()
                    ),
                    "remaining_ms": decision.remaining_ms(),
                }));
                (StatusCode::TOO_MANY_REQUESTS, body).into_response()
            }
            GateError::BadRequest(ref msg) => {
                let body = Json(json!({
                    "error": msg,
                    "code": StatusCode::BAD_REQUEST.as_u16(),
                }));
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            GateError::PayloadTooLarge => {
                let body = Json(json!({
                    "error": "Request body too large",
                    "code": StatusCode::PAYLOAD_TOO_LARGE.as_u16(),
                }));
                (StatusCode::PAYLOAD_TOO_LARGE, body).into_response()
            }
            GateError::InternalError(ref msg) => {
                let body = Json(json!({
                    "error": msg,
                    "code": StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, GateError>;
