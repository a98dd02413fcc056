//! Error taxonomy of the hierarchy engine.

use crate::model::department::DepartmentId;
use crate::model::employee::{DocumentKind, EmployeeId};
use crate::model::validation::ValidationError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable classification used by callers to pick a response class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input.
    Invalid,
    /// The addressed record does not exist or is tombstoned.
    NotFound,
    /// An identity document is already taken.
    Conflict,
    /// A referenced record or a hierarchy rule rejects the operation.
    BusinessRule,
    /// Unclassified store failure.
    Internal,
}

/// Errors from department and employee service operations.
#[derive(Debug)]
pub enum ServiceError {
    Invalid(ValidationError),
    DepartmentNotFound(DepartmentId),
    EmployeeNotFound(EmployeeId),
    /// Referenced manager is not an active employee, or manages nothing.
    ManagerNotFound(EmployeeId),
    /// Referenced parent is not an active department.
    ParentNotFound(DepartmentId),
    /// Re-parenting would place a department under itself or a descendant.
    CycleDetected {
        department_id: DepartmentId,
        parent_id: DepartmentId,
    },
    HasEmployees(DepartmentId),
    HasSubDepartments(DepartmentId),
    ManagerCannotBeDeleted(EmployeeId),
    IdentifierDuplicated(DocumentKind),
    /// Store-level failure, surfaced as internal.
    Repo(RepoError),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Invalid(_) => ErrorKind::Invalid,
            Self::DepartmentNotFound(_) | Self::EmployeeNotFound(_) => ErrorKind::NotFound,
            Self::IdentifierDuplicated(_) => ErrorKind::Conflict,
            Self::ManagerNotFound(_)
            | Self::ParentNotFound(_)
            | Self::CycleDetected { .. }
            | Self::HasEmployees(_)
            | Self::HasSubDepartments(_)
            | Self::ManagerCannotBeDeleted(_) => ErrorKind::BusinessRule,
            Self::Repo(_) => ErrorKind::Internal,
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(err) => write!(f, "invalid input: {err}"),
            Self::DepartmentNotFound(id) => write!(f, "department not found: {id}"),
            Self::EmployeeNotFound(id) => write!(f, "employee not found: {id}"),
            Self::ManagerNotFound(id) => write!(f, "manager not found: {id}"),
            Self::ParentNotFound(id) => write!(f, "parent department not found: {id}"),
            Self::CycleDetected {
                department_id,
                parent_id,
            } => write!(
                f,
                "hierarchy cycle detected: department {department_id} under parent {parent_id}"
            ),
            Self::HasEmployees(id) => write!(f, "department has active employees: {id}"),
            Self::HasSubDepartments(id) => {
                write!(f, "department has active sub-departments: {id}")
            }
            Self::ManagerCannotBeDeleted(id) => {
                write!(f, "employee manages an active department: {id}")
            }
            Self::IdentifierDuplicated(kind) => write!(f, "{kind} already registered"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Invalid(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::DepartmentNotFound(id) => Self::DepartmentNotFound(id),
            RepoError::EmployeeNotFound(id) => Self::EmployeeNotFound(id),
            RepoError::DuplicateDocument(kind) => Self::IdentifierDuplicated(kind),
            other => Self::Repo(other),
        }
    }
}
