use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::api::response::ApiResponse;
use crate::http::server::AppState;
use crate::routes::{validate_route, RouteDraft, RouteError, RouteItem};

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

type ApiResult<T> = Result<ApiResponse<T>, RouteError>;

/// Unwraps the JSON extractor. A body cut off by the size limit keeps its 413.
fn decode(payload: Result<Json<RouteDraft>, JsonRejection>) -> Result<RouteDraft, RouteError> {
    payload.map(|Json(draft)| draft).map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            RouteError::PayloadTooLarge(rejection.body_text())
        } else {
            RouteError::MalformedBody(rejection.body_text())
        }
    })
}

pub async fn health() -> ApiResponse<HealthStatus> {
    ApiResponse::success(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn list_routes(State(state): State<AppState>) -> ApiResult<Vec<RouteItem>> {
    let routes = state.routes.get_all().await?;
    Ok(ApiResponse::success(routes))
}

pub async fn create_route(
    State(state): State<AppState>,
    payload: Result<Json<RouteDraft>, JsonRejection>,
) -> ApiResult<RouteItem> {
    let route = validate_route(decode(payload)?)?;
    let created = state.routes.create(route).await?;
    Ok(ApiResponse::success(created))
}

pub async fn get_route(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<RouteItem> {
    let route = state.routes.get_one(&name).await?;
    Ok(ApiResponse::success(route))
}

pub async fn update_route(
    State(state): State<AppState>,
    Path(name): Path<String>,
    payload: Result<Json<RouteDraft>, JsonRejection>,
) -> ApiResult<RouteItem> {
    let route = validate_route(decode(payload)?)?;
    let updated = state.routes.update(&name, route).await?;
    Ok(ApiResponse::success(updated))
}

pub async fn delete_route(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<()> {
    state.routes.delete(&name).await?;
    Ok(ApiResponse::empty())
}

pub async fn not_found() -> ApiResponse<serde_json::Value> {
    ApiResponse::<serde_json::Value>::failure(StatusCode::NOT_FOUND, "Not Found", None)
}
