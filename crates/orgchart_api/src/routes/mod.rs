//! Router construction.
//!
//! All engine routes live under `/api/v1`; `/health` stays unversioned.

mod departments;
mod employees;
mod managers;

use crate::error::ApiError;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use uuid::Uuid;

/// Builds the full router; requests exceeding `request_timeout` get 408.
///
/// The same budget bounds the engine call behind each request, so a request
/// answered with 408 leaves no writes behind.
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    let api = Router::new()
        .route("/employees", post(employees::create_employee))
        .route("/employees/search", post(employees::search_employees))
        .route(
            "/employees/:id",
            get(employees::get_employee)
                .put(employees::update_employee)
                .delete(employees::delete_employee),
        )
        .route("/departments", post(departments::create_department))
        .route("/departments/search", post(departments::search_departments))
        .route(
            "/departments/:id",
            get(departments::get_department)
                .put(departments::update_department)
                .delete(departments::delete_department),
        )
        .route(
            "/managers/:id/employees",
            get(managers::list_subordinate_employees),
        );

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api)
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state.with_request_timeout(request_timeout))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": orgchart_core::core_version(),
    }))
}

/// Parses a path segment as an entity id.
fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|err| ApiError::bad_request(format!("invalid id `{raw}`: {err}")))
}
