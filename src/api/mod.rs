//! Route management HTTP API.
//!
//! ```text
//! GET    /routes          list
//! POST   /routes          create
//! GET    /routes/{name}   get one
//! PUT    /routes/{name}   replace (name must match)
//! DELETE /routes/{name}   delete
//! GET    /health          liveness
//! ```

pub mod handlers;
pub mod response;

use axum::{routing::get, Router};

use self::handlers::*;
use crate::http::server::AppState;

pub use response::ApiResponse;

pub fn setup_api_router(state: AppState) -> Router {
    Router::new()
        .route("/routes", get(list_routes).post(create_route))
        .route("/routes/", get(list_routes).post(create_route))
        .route(
            "/routes/{name}",
            get(get_route).put(update_route).delete(delete_route),
        )
        .route("/health", get(health))
        .fallback(not_found)
        .with_state(state)
}
