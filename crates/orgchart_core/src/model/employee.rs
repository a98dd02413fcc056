//! Employee domain model.
//!
//! # Responsibility
//! - Define the stored employee record and its creation input.
//! - Name the two uniquely indexed identity documents.
//!
//! # Invariants
//! - `cpf` is stored as exactly 11 digits with valid check digits.
//! - `rg`, when present, is non-blank.
//! - `department_id` always names an active department.

use crate::model::department::DepartmentId;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable employee identifier.
pub type EmployeeId = Uuid;

/// Identity document kinds with store-level uniqueness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Mandatory 11-digit taxpayer number.
    Cpf,
    /// Optional secondary identity document.
    Rg,
}

impl Display for DocumentKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cpf => write!(f, "cpf"),
            Self::Rg => write!(f, "rg"),
        }
    }
}

/// Stored employee record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub cpf: String,
    pub rg: Option<String>,
    pub department_id: DepartmentId,
    pub is_deleted: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Creation input for the employee store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployee {
    pub name: String,
    pub cpf: String,
    pub rg: Option<String>,
    pub department_id: DepartmentId,
}

/// Employee read model enriched with the department manager's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeWithManager {
    #[serde(flatten)]
    pub employee: Employee,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_name: Option<String>,
}
