//! GET /managers/:id/employees: everyone below a manager's departments.

use super::parse_id;
use crate::error::ApiError;
use crate::state::{department_service, AppState};
use axum::extract::{Path, State};
use axum::Json;
use orgchart_core::Employee;

pub async fn list_subordinate_employees(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Employee>>, ApiError> {
    let id = parse_id(&id)?;
    let employees = state
        .run(move |conn| department_service(conn)?.get_subordinate_employees(id))
        .await?;
    Ok(Json(employees))
}
