//! Request identification.
//!
//! # Responsibilities
//! - Name the header carrying the request ID
//! - Expose the ID to tracing spans and handlers
//!
//! # Design Decisions
//! - IDs are generated by `tower_http::request_id::MakeRequestUuid`
//! - A client-supplied `x-request-id` is kept as-is
//! - The ID is echoed back on the response

use axum::http::Request;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Access to the request ID of a request.
pub trait RequestIdExt {
    fn request_id(&self) -> Option<&str>;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> Option<&str> {
        self.headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
    }
}
