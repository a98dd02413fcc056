//! Store-level error type shared by both repositories.

use crate::db::DbError;
use crate::model::department::DepartmentId;
use crate::model::employee::{DocumentKind, EmployeeId};
use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from department and employee store operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target department does not exist or is soft-deleted.
    DepartmentNotFound(DepartmentId),
    /// Target employee does not exist or is soft-deleted.
    EmployeeNotFound(EmployeeId),
    /// An active employee already holds this identity document.
    DuplicateDocument(DocumentKind),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::DepartmentNotFound(id) => write!(f, "department not found: {id}"),
            Self::EmployeeNotFound(id) => write!(f, "employee not found: {id}"),
            Self::DuplicateDocument(kind) => write!(f, "duplicate {kind} among active employees"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        match duplicate_document_kind(&value) {
            Some(kind) => Self::DuplicateDocument(kind),
            None => Self::Db(DbError::Sqlite(value)),
        }
    }
}

/// Maps unique-index violations on `employees.cpf` / `employees.rg`.
fn duplicate_document_kind(err: &rusqlite::Error) -> Option<DocumentKind> {
    let rusqlite::Error::SqliteFailure(failure, Some(message)) = err else {
        return None;
    };
    if failure.code != ErrorCode::ConstraintViolation || !message.contains("UNIQUE") {
        return None;
    }
    if message.contains("employees.cpf") {
        Some(DocumentKind::Cpf)
    } else if message.contains("employees.rg") {
        Some(DocumentKind::Rg)
    } else {
        None
    }
}
