//! Employee use-case service.
//!
//! # Responsibility
//! - Validate employee input and department membership.
//! - Guard deletion of employees that still manage a department.
//!
//! # Invariants
//! - An active employee always references an active department.
//! - Identity-document uniqueness is decided by the store's unique indexes.

use crate::model::department::DepartmentId;
use crate::model::employee::{Employee, EmployeeId, EmployeeWithManager, NewEmployee};
use crate::model::validation::{non_blank, normalize_cpf, normalize_name, normalize_rg, page_window};
use crate::repo::department_repo::{DepartmentListQuery, DepartmentRepository};
use crate::repo::employee_repo::{EmployeeListQuery, EmployeeRepository};
use crate::service::error::ServiceError;
use crate::service::{Page, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
use log::info;

/// Optional field changes for one employee.
///
/// `rg: Some(blank)` clears the secondary document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeUpdate {
    pub name: Option<String>,
    pub cpf: Option<String>,
    pub rg: Option<String>,
    pub department_id: Option<DepartmentId>,
}

/// Filters and pagination for employee listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeFilter {
    pub name: Option<String>,
    pub cpf: Option<String>,
    pub rg: Option<String>,
    pub department_id: Option<DepartmentId>,
    pub page: u32,
    pub page_size: u32,
}

impl Default for EmployeeFilter {
    fn default() -> Self {
        Self {
            name: None,
            cpf: None,
            rg: None,
            department_id: None,
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Employee service facade.
pub struct EmployeeService<D: DepartmentRepository, E: EmployeeRepository> {
    departments: D,
    employees: E,
}

impl<D: DepartmentRepository, E: EmployeeRepository> EmployeeService<D, E> {
    pub fn new(departments: D, employees: E) -> Self {
        Self {
            departments,
            employees,
        }
    }

    /// Creates one employee in an active department.
    pub fn create_employee(&self, input: &NewEmployee) -> Result<Employee, ServiceError> {
        let employee = NewEmployee {
            name: normalize_name(&input.name)?,
            cpf: normalize_cpf(&input.cpf)?,
            rg: normalize_rg(input.rg.as_deref()),
            department_id: input.department_id,
        };
        self.ensure_department_exists(employee.department_id)?;

        let created = self.employees.create_employee(&employee)?;
        info!(
            "event=employee_create module=service status=ok employee_id={} department_id={}",
            created.id, created.department_id
        );
        Ok(created)
    }

    /// Loads one employee, optionally including tombstoned rows.
    pub fn get_employee(
        &self,
        id: EmployeeId,
        include_deleted: bool,
    ) -> Result<Employee, ServiceError> {
        self.employees
            .get_employee(id, include_deleted)?
            .ok_or(ServiceError::EmployeeNotFound(id))
    }

    /// Loads one employee with the name of their department's manager.
    ///
    /// The manager name is best-effort and omitted when unresolvable.
    pub fn get_employee_with_manager(
        &self,
        id: EmployeeId,
    ) -> Result<EmployeeWithManager, ServiceError> {
        let employee = self.get_employee(id, false)?;
        let manager_name = self
            .departments
            .get_department(employee.department_id, false)
            .ok()
            .flatten()
            .and_then(|department| department.manager_id)
            .and_then(|manager_id| self.employees.get_employee(manager_id, false).ok().flatten())
            .map(|manager| manager.name);

        Ok(EmployeeWithManager {
            employee,
            manager_name,
        })
    }

    /// Applies optional name, document and department changes.
    pub fn update_employee(
        &self,
        id: EmployeeId,
        update: &EmployeeUpdate,
    ) -> Result<Employee, ServiceError> {
        let mut employee = self.get_employee(id, false)?;

        if let Some(name) = update.name.as_deref() {
            employee.name = normalize_name(name)?;
        }
        if let Some(cpf) = update.cpf.as_deref() {
            employee.cpf = normalize_cpf(cpf)?;
        }
        if let Some(rg) = update.rg.as_deref() {
            employee.rg = normalize_rg(Some(rg));
        }
        if let Some(department_id) = update.department_id {
            if department_id != employee.department_id {
                self.ensure_department_exists(department_id)?;
                employee.department_id = department_id;
            }
        }

        self.employees.update_employee(&employee)?;
        info!("event=employee_update module=service status=ok employee_id={id}");
        self.get_employee(id, false)
    }

    /// Soft-deletes one employee that manages no active department.
    pub fn delete_employee(&self, id: EmployeeId) -> Result<(), ServiceError> {
        self.get_employee(id, false)?;

        self.departments
            .in_transaction(|| -> Result<(), ServiceError> {
                let managed = self
                    .departments
                    .count_departments(&DepartmentListQuery::managed_by(id))?;
                if managed > 0 {
                    return Err(ServiceError::ManagerCannotBeDeleted(id));
                }
                self.employees.soft_delete_employee(id)?;
                Ok(())
            })?;

        info!("event=employee_delete module=service status=ok employee_id={id}");
        Ok(())
    }

    /// Lists employees matching all supplied filters.
    pub fn list_employees(&self, filter: &EmployeeFilter) -> Result<Page<Employee>, ServiceError> {
        let (limit, offset) = page_window(filter.page, filter.page_size)?;
        let mut query = EmployeeListQuery {
            name: non_blank(filter.name.as_deref()),
            cpf: non_blank(filter.cpf.as_deref()).map(|cpf| digits_only(&cpf)),
            rg: non_blank(filter.rg.as_deref()),
            department_id: filter.department_id,
            ..EmployeeListQuery::default()
        };

        let total = self.employees.count_employees(&query)?;
        query.limit = Some(limit);
        query.offset = offset;
        let items = self.employees.list_employees(&query)?;

        Ok(Page {
            items,
            total,
            page: filter.page,
            page_size: filter.page_size,
        })
    }

    fn ensure_department_exists(&self, department_id: DepartmentId) -> Result<(), ServiceError> {
        self.departments
            .get_department(department_id, false)?
            .ok_or(ServiceError::DepartmentNotFound(department_id))?;
        Ok(())
    }
}

fn digits_only(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}
