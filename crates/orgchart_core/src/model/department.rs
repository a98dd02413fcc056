//! Department domain model.
//!
//! # Responsibility
//! - Define the stored department record and its tree read model.
//! - Carry creation input for the department store.
//!
//! # Invariants
//! - `parent_id` never equals `id`; the active parent graph is a forest.
//! - `manager_id`, when set, names an active employee.
//! - Children are derived on read and never stored.

use crate::model::employee::{Employee, EmployeeId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable department identifier.
pub type DepartmentId = Uuid;

/// Stored department record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    pub manager_id: Option<EmployeeId>,
    /// `None` means a root department.
    pub parent_id: Option<DepartmentId>,
    /// Soft delete tombstone.
    pub is_deleted: bool,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
}

/// Creation input for the department store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDepartment {
    pub name: String,
    pub manager_id: Option<EmployeeId>,
    pub parent_id: Option<DepartmentId>,
}

/// Department with its manager and full active subtree attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentTree {
    #[serde(flatten)]
    pub department: Department,
    /// Resolved manager; `None` when unset or not resolvable.
    pub manager: Option<Employee>,
    pub sub_departments: Vec<DepartmentTree>,
}

impl DepartmentTree {
    /// Creates a leaf node without children.
    pub fn leaf(department: Department, manager: Option<Employee>) -> Self {
        Self {
            department,
            manager,
            sub_departments: Vec::new(),
        }
    }
}
