//! Department handlers.
//!
//! POST   /departments         create
//! GET    /departments/:id     department with manager and subtree
//! PUT    /departments/:id     rename, re-parent or re-manage
//! DELETE /departments/:id     soft delete
//! POST   /departments/search  filtered page

use super::parse_id;
use crate::dto::{CreateDepartmentRequest, SearchDepartmentsRequest, UpdateDepartmentRequest};
use crate::error::ApiError;
use crate::state::{department_service, AppState};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use orgchart_core::{Department, DepartmentFilter, DepartmentTree, DepartmentUpdate, Page};

pub async fn create_department(
    State(state): State<AppState>,
    payload: Result<Json<CreateDepartmentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Department>), ApiError> {
    let Json(request) = payload?;
    let department = state
        .run(move |conn| {
            department_service(conn)?.create_department(
                &request.name,
                request.manager_id,
                request.parent_id,
            )
        })
        .await?;
    Ok((StatusCode::CREATED, Json(department)))
}

pub async fn get_department(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DepartmentTree>, ApiError> {
    let id = parse_id(&id)?;
    let tree = state
        .run(move |conn| department_service(conn)?.get_department_with_tree(id))
        .await?;
    Ok(Json(tree))
}

pub async fn update_department(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateDepartmentRequest>, JsonRejection>,
) -> Result<Json<Department>, ApiError> {
    let id = parse_id(&id)?;
    let Json(request) = payload?;
    let update = DepartmentUpdate::from(request);
    let department = state
        .run(move |conn| department_service(conn)?.update_department(id, &update))
        .await?;
    Ok(Json(department))
}

pub async fn delete_department(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state
        .run(move |conn| department_service(conn)?.delete_department(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn search_departments(
    State(state): State<AppState>,
    payload: Result<Json<SearchDepartmentsRequest>, JsonRejection>,
) -> Result<Json<Page<Department>>, ApiError> {
    let Json(request) = payload?;
    let filter = DepartmentFilter::from(request);
    let page = state
        .run(move |conn| department_service(conn)?.list_departments(&filter))
        .await?;
    Ok(Json(page))
}
