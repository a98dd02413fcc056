//! Employee handlers.
//!
//! POST   /employees         create
//! GET    /employees/:id     employee with department manager name
//! PUT    /employees/:id     partial update
//! DELETE /employees/:id     soft delete
//! POST   /employees/search  filtered page

use super::parse_id;
use crate::dto::{CreateEmployeeRequest, SearchEmployeesRequest, UpdateEmployeeRequest};
use crate::error::ApiError;
use crate::state::{employee_service, AppState};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use orgchart_core::{
    Employee, EmployeeFilter, EmployeeUpdate, EmployeeWithManager, NewEmployee, Page,
};

pub async fn create_employee(
    State(state): State<AppState>,
    payload: Result<Json<CreateEmployeeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Employee>), ApiError> {
    let Json(request) = payload?;
    let input = NewEmployee::from(request);
    let employee = state
        .run(move |conn| employee_service(conn)?.create_employee(&input))
        .await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EmployeeWithManager>, ApiError> {
    let id = parse_id(&id)?;
    let employee = state
        .run(move |conn| employee_service(conn)?.get_employee_with_manager(id))
        .await?;
    Ok(Json(employee))
}

pub async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateEmployeeRequest>, JsonRejection>,
) -> Result<Json<Employee>, ApiError> {
    let id = parse_id(&id)?;
    let Json(request) = payload?;
    let update = EmployeeUpdate::from(request);
    let employee = state
        .run(move |conn| employee_service(conn)?.update_employee(id, &update))
        .await?;
    Ok(Json(employee))
}

pub async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state
        .run(move |conn| employee_service(conn)?.delete_employee(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn search_employees(
    State(state): State<AppState>,
    payload: Result<Json<SearchEmployeesRequest>, JsonRejection>,
) -> Result<Json<Page<Employee>>, ApiError> {
    let Json(request) = payload?;
    let filter = EmployeeFilter::from(request);
    let page = state
        .run(move |conn| employee_service(conn)?.list_employees(&filter))
        .await?;
    Ok(Json(page))
}
