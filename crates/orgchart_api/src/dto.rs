//! JSON request bodies and their conversion into engine inputs.

use orgchart_core::{
    DepartmentFilter, DepartmentId, DepartmentUpdate, EmployeeFilter, EmployeeId,
    EmployeeUpdate, NewEmployee, DEFAULT_PAGE, DEFAULT_PAGE_SIZE,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateDepartmentRequest {
    pub name: String,
    pub manager_id: EmployeeId,
    #[serde(default)]
    pub parent_id: Option<DepartmentId>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateDepartmentRequest {
    pub name: Option<String>,
    pub manager_id: Option<EmployeeId>,
    pub parent_id: Option<DepartmentId>,
}

impl From<UpdateDepartmentRequest> for DepartmentUpdate {
    fn from(value: UpdateDepartmentRequest) -> Self {
        Self {
            name: value.name,
            manager_id: value.manager_id,
            parent_id: value.parent_id,
        }
    }
}

/// Omitted `page`/`page_size` fall back to 1 and 10.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchDepartmentsRequest {
    pub name: Option<String>,
    pub manager_name: Option<String>,
    pub parent_id: Option<DepartmentId>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl From<SearchDepartmentsRequest> for DepartmentFilter {
    fn from(value: SearchDepartmentsRequest) -> Self {
        Self {
            name: value.name,
            manager_name: value.manager_name,
            parent_id: value.parent_id,
            page: value.page.unwrap_or(DEFAULT_PAGE),
            page_size: value.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateEmployeeRequest {
    pub name: String,
    pub cpf: String,
    #[serde(default)]
    pub rg: Option<String>,
    pub department_id: DepartmentId,
}

impl From<CreateEmployeeRequest> for NewEmployee {
    fn from(value: CreateEmployeeRequest) -> Self {
        Self {
            name: value.name,
            cpf: value.cpf,
            rg: value.rg,
            department_id: value.department_id,
        }
    }
}

/// `rg: ""` clears the secondary document; an omitted field keeps it.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateEmployeeRequest {
    pub name: Option<String>,
    pub cpf: Option<String>,
    pub rg: Option<String>,
    pub department_id: Option<DepartmentId>,
}

impl From<UpdateEmployeeRequest> for EmployeeUpdate {
    fn from(value: UpdateEmployeeRequest) -> Self {
        Self {
            name: value.name,
            cpf: value.cpf,
            rg: value.rg,
            department_id: value.department_id,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchEmployeesRequest {
    pub name: Option<String>,
    pub cpf: Option<String>,
    pub rg: Option<String>,
    pub department_id: Option<DepartmentId>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl From<SearchEmployeesRequest> for EmployeeFilter {
    fn from(value: SearchEmployeesRequest) -> Self {
        Self {
            name: value.name,
            cpf: value.cpf,
            rg: value.rg,
            department_id: value.department_id,
            page: value.page.unwrap_or(DEFAULT_PAGE),
            page_size: value.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }
}
