//! JSON response envelope.
//!
//! Every API outcome, success or failure, is rendered as
//! `{"data": ..., "message": ..., "status": ...}` with the HTTP status
//! mirroring `status`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::routes::RouteError;

pub const SUCCESS_MESSAGE: &str = "Success";

/// Response envelope shared by all endpoints.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub message: String,
    pub status: u16,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 response carrying `data`.
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            message: SUCCESS_MESSAGE.to_string(),
            status: StatusCode::OK.as_u16(),
        }
    }
}

impl ApiResponse<()> {
    /// 200 response with `data: null`.
    pub fn empty() -> Self {
        Self {
            data: None,
            message: SUCCESS_MESSAGE.to_string(),
            status: StatusCode::OK.as_u16(),
        }
    }
}

impl ApiResponse<serde_json::Value> {
    /// Error envelope with an optional detail payload.
    pub fn failure(status: StatusCode, message: impl Into<String>, data: Option<serde_json::Value>) -> Self {
        Self {
            data,
            message: message.into(),
            status: status.as_u16(),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status().code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let reason = status.canonical_reason().unwrap_or("Error");

        let (message, data) = match &self {
            // Storage details stay in the logs.
            RouteError::Storage(_) => (reason.to_string(), None),
            RouteError::Validation(errors) => (
                format!("{}: {}", reason, self),
                serde_json::to_value(errors).ok(),
            ),
            _ => (format!("{}: {}", reason, self), None),
        };

        ApiResponse::<serde_json::Value>::failure(status, message, data).into_response()
    }
}
