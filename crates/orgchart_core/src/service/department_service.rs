//! Department hierarchy use-case service.
//!
//! # Responsibility
//! - Validate tree invariants above the department store.
//! - Keep the manager-binding relationship reconciled on create/update.
//! - Resolve every employee below a manager's departments.
//!
//! # Invariants
//! - Re-parenting never makes a department its own ancestor.
//! - A newly assigned manager is moved into the department they manage.
//! - Deletion requires zero active employees, then zero active children.

use crate::model::department::{Department, DepartmentId, DepartmentTree, NewDepartment};
use crate::model::employee::{Employee, EmployeeId};
use crate::model::validation::{non_blank, normalize_name, page_window};
use crate::repo::department_repo::{DepartmentListQuery, DepartmentRepository};
use crate::repo::employee_repo::{EmployeeListQuery, EmployeeRepository};
use crate::service::error::ServiceError;
use crate::service::{Page, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
use log::{error, info, warn};
use std::collections::HashSet;

/// Optional field changes for one department.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepartmentUpdate {
    pub name: Option<String>,
    pub manager_id: Option<EmployeeId>,
    pub parent_id: Option<DepartmentId>,
}

/// Filters and pagination for department listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentFilter {
    pub name: Option<String>,
    pub manager_name: Option<String>,
    pub parent_id: Option<DepartmentId>,
    /// 1-indexed.
    pub page: u32,
    pub page_size: u32,
}

impl Default for DepartmentFilter {
    fn default() -> Self {
        Self {
            name: None,
            manager_name: None,
            parent_id: None,
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Department hierarchy service facade.
pub struct DepartmentService<D: DepartmentRepository, E: EmployeeRepository> {
    departments: D,
    employees: E,
}

impl<D: DepartmentRepository, E: EmployeeRepository> DepartmentService<D, E> {
    /// Creates service from store implementations.
    pub fn new(departments: D, employees: E) -> Self {
        Self {
            departments,
            employees,
        }
    }

    /// Creates an unmanaged root department when the store holds none.
    ///
    /// Returns `None` without writing when any active department exists.
    /// This is the only way to create a department without a manager.
    pub fn ensure_root_department(
        &self,
        name: &str,
    ) -> Result<Option<Department>, ServiceError> {
        let name = normalize_name(name)?;
        let created = self.departments.in_transaction(
            || -> Result<Option<Department>, ServiceError> {
                if self
                    .departments
                    .count_departments(&DepartmentListQuery::default())?
                    > 0
                {
                    return Ok(None);
                }
                let root = self.departments.create_department(&NewDepartment {
                    name,
                    manager_id: None,
                    parent_id: None,
                })?;
                Ok(Some(root))
            },
        )?;

        if let Some(root) = &created {
            info!(
                "event=department_bootstrap module=service status=ok department_id={}",
                root.id
            );
        }
        Ok(created)
    }

    /// Creates one department under an optional parent.
    ///
    /// # Side effects
    /// - Moves the manager into the new department when they belong elsewhere.
    pub fn create_department(
        &self,
        name: &str,
        manager_id: EmployeeId,
        parent_id: Option<DepartmentId>,
    ) -> Result<Department, ServiceError> {
        let name = normalize_name(name)?;
        let parent_id = parent_id.filter(|id| !id.is_nil());

        self.employees
            .get_employee(manager_id, false)?
            .ok_or(ServiceError::ManagerNotFound(manager_id))?;
        if let Some(parent_id) = parent_id {
            self.ensure_parent_exists(parent_id)?;
        }

        let department = self
            .departments
            .in_transaction(|| -> Result<Department, ServiceError> {
                let created = self.departments.create_department(&NewDepartment {
                    name,
                    manager_id: Some(manager_id),
                    parent_id,
                })?;
                self.bind_manager(manager_id, created.id)?;
                Ok(created)
            })?;

        info!(
            "event=department_create module=service status=ok department_id={} manager_id={} parent_id={}",
            department.id,
            manager_id,
            display_optional(parent_id)
        );
        Ok(department)
    }

    /// Loads one department, optionally including tombstoned rows.
    pub fn get_department(
        &self,
        id: DepartmentId,
        include_deleted: bool,
    ) -> Result<Department, ServiceError> {
        self.departments
            .get_department(id, include_deleted)?
            .ok_or(ServiceError::DepartmentNotFound(id))
    }

    /// Loads one department with its manager and complete active subtree.
    ///
    /// Child manager lookups are best-effort: failures leave `manager` empty.
    pub fn get_department_with_tree(
        &self,
        id: DepartmentId,
    ) -> Result<DepartmentTree, ServiceError> {
        let root = self.get_department(id, false)?;
        let manager = match root.manager_id {
            Some(manager_id) => self.employees.get_employee(manager_id, false)?,
            None => None,
        };

        let mut visited = HashSet::from([root.id]);
        self.attach_subtree(DepartmentTree::leaf(root, manager), &mut visited)
    }

    /// Applies optional name, manager and parent changes.
    ///
    /// Order: cycle check, parent lookup, manager lookup, then all writes in
    /// one transaction. Nothing is written when any validation fails.
    ///
    /// A nil `parent_id` counts as absent, as on create, so it leaves the
    /// parent unchanged. Parents cannot be cleared through update.
    pub fn update_department(
        &self,
        id: DepartmentId,
        update: &DepartmentUpdate,
    ) -> Result<Department, ServiceError> {
        let mut department = self.get_department(id, false)?;
        let name = update.name.as_deref().map(normalize_name).transpose()?;

        let new_parent = match update.parent_id.filter(|parent_id| !parent_id.is_nil()) {
            Some(parent_id) if department.parent_id != Some(parent_id) => {
                self.ensure_no_cycle(id, parent_id)?;
                self.ensure_parent_exists(parent_id)?;
                Some(parent_id)
            }
            _ => None,
        };

        let new_manager = match update.manager_id {
            Some(manager_id) if department.manager_id != Some(manager_id) => {
                self.employees
                    .get_employee(manager_id, false)?
                    .ok_or(ServiceError::ManagerNotFound(manager_id))?;
                Some(manager_id)
            }
            _ => None,
        };

        if let Some(name) = name {
            department.name = name;
        }
        if new_parent.is_some() {
            department.parent_id = new_parent;
        }
        if new_manager.is_some() {
            department.manager_id = new_manager;
        }

        self.departments
            .in_transaction(|| -> Result<(), ServiceError> {
                if let Some(manager_id) = new_manager {
                    self.bind_manager(manager_id, id)?;
                }
                self.departments.update_department(&department)?;
                Ok(())
            })?;

        info!(
            "event=department_update module=service status=ok department_id={} reparented={} remanaged={}",
            id,
            new_parent.is_some(),
            new_manager.is_some()
        );
        self.get_department(id, false)
    }

    /// Soft-deletes one department with no active employees or children.
    pub fn delete_department(&self, id: DepartmentId) -> Result<(), ServiceError> {
        self.get_department(id, false)?;

        self.departments
            .in_transaction(|| -> Result<(), ServiceError> {
                let employee_count = self
                    .employees
                    .count_employees(&EmployeeListQuery::in_department(id))?;
                if employee_count > 0 {
                    return Err(ServiceError::HasEmployees(id));
                }
                let child_count = self
                    .departments
                    .count_departments(&DepartmentListQuery::children_of(id))?;
                if child_count > 0 {
                    return Err(ServiceError::HasSubDepartments(id));
                }
                self.departments.soft_delete_department(id)?;
                Ok(())
            })?;

        info!("event=department_delete module=service status=ok department_id={id}");
        Ok(())
    }

    /// Lists departments matching all supplied filters.
    pub fn list_departments(
        &self,
        filter: &DepartmentFilter,
    ) -> Result<Page<Department>, ServiceError> {
        let (limit, offset) = page_window(filter.page, filter.page_size)?;
        let mut query = DepartmentListQuery {
            name: non_blank(filter.name.as_deref()),
            manager_name: non_blank(filter.manager_name.as_deref()),
            parent_id: filter.parent_id,
            ..DepartmentListQuery::default()
        };

        let total = self.departments.count_departments(&query)?;
        query.limit = Some(limit);
        query.offset = offset;
        let items = self.departments.list_departments(&query)?;

        Ok(Page {
            items,
            total,
            page: filter.page,
            page_size: filter.page_size,
        })
    }

    /// Returns every active employee in the subtrees of the departments
    /// currently managed by `manager_id`. Ordering is unspecified.
    pub fn get_subordinate_employees(
        &self,
        manager_id: EmployeeId,
    ) -> Result<Vec<Employee>, ServiceError> {
        let managed = self
            .departments
            .list_departments(&DepartmentListQuery::managed_by(manager_id))?;
        if managed.is_empty() {
            return Err(ServiceError::ManagerNotFound(manager_id));
        }

        let mut seen = HashSet::new();
        let mut department_ids = Vec::new();
        for department in &managed {
            for id in self.departments.find_descendant_ids(department.id)? {
                if seen.insert(id) {
                    department_ids.push(id);
                }
            }
        }

        let employees = self.employees.list_in_departments(&department_ids)?;
        info!(
            "event=subordinates_resolve module=service status=ok manager_id={} departments={} employees={}",
            manager_id,
            department_ids.len(),
            employees.len()
        );
        Ok(employees)
    }

    fn attach_subtree(
        &self,
        mut node: DepartmentTree,
        visited: &mut HashSet<DepartmentId>,
    ) -> Result<DepartmentTree, ServiceError> {
        for child in self.departments.list_children(node.department.id)? {
            if !visited.insert(child.id) {
                warn!(
                    "event=department_tree module=service status=degraded reason=revisited_node department_id={} parent_id={}",
                    child.id, node.department.id
                );
                continue;
            }
            let manager = self.best_effort_manager(&child);
            let subtree = self.attach_subtree(DepartmentTree::leaf(child, manager), visited)?;
            node.sub_departments.push(subtree);
        }
        Ok(node)
    }

    fn best_effort_manager(&self, department: &Department) -> Option<Employee> {
        let manager_id = department.manager_id?;
        match self.employees.get_employee(manager_id, false) {
            Ok(manager) => manager,
            Err(err) => {
                warn!(
                    "event=department_tree module=service status=degraded reason=manager_lookup_failed department_id={} error={}",
                    department.id, err
                );
                None
            }
        }
    }

    fn ensure_parent_exists(&self, parent_id: DepartmentId) -> Result<(), ServiceError> {
        self.departments
            .get_department(parent_id, false)?
            .ok_or(ServiceError::ParentNotFound(parent_id))?;
        Ok(())
    }

    fn ensure_no_cycle(
        &self,
        department_id: DepartmentId,
        parent_id: DepartmentId,
    ) -> Result<(), ServiceError> {
        let cycle = parent_id == department_id
            || self
                .departments
                .find_descendant_ids(department_id)?
                .contains(&parent_id);
        if cycle {
            return Err(ServiceError::CycleDetected {
                department_id,
                parent_id,
            });
        }
        Ok(())
    }

    /// Moves the manager into `department_id` when they belong elsewhere.
    fn bind_manager(
        &self,
        manager_id: EmployeeId,
        department_id: DepartmentId,
    ) -> Result<(), ServiceError> {
        let mut manager = self
            .employees
            .get_employee(manager_id, false)?
            .ok_or(ServiceError::ManagerNotFound(manager_id))?;
        if manager.department_id == department_id {
            return Ok(());
        }

        let previous_department = manager.department_id;
        manager.department_id = department_id;
        if let Err(err) = self.employees.update_employee(&manager) {
            error!(
                "event=manager_bind module=service status=error manager_id={} department_id={} error={}",
                manager_id, department_id, err
            );
            return Err(ServiceError::Repo(err));
        }

        info!(
            "event=manager_bind module=service status=ok manager_id={} from_department_id={} department_id={}",
            manager_id, previous_department, department_id
        );
        Ok(())
    }
}

fn display_optional(id: Option<DepartmentId>) -> String {
    id.map_or_else(|| "none".to_string(), |value| value.to_string())
}
