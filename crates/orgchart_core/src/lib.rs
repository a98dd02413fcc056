//! Organizational hierarchy engine.
//! Departments form a forest; employees belong to departments; a department
//! may be managed by one employee. This crate owns those invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_console_logging, init_logging, logging_status, LogSink};
pub use model::department::{Department, DepartmentId, DepartmentTree, NewDepartment};
pub use model::employee::{DocumentKind, Employee, EmployeeId, EmployeeWithManager, NewEmployee};
pub use model::validation::ValidationError;
pub use repo::department_repo::{
    DepartmentListQuery, DepartmentRepository, SqliteDepartmentRepository,
};
pub use repo::employee_repo::{EmployeeListQuery, EmployeeRepository, SqliteEmployeeRepository};
pub use repo::{RepoError, RepoResult};
pub use service::department_service::{DepartmentFilter, DepartmentService, DepartmentUpdate};
pub use service::employee_service::{EmployeeFilter, EmployeeService, EmployeeUpdate};
pub use service::error::{ErrorKind, ServiceError};
pub use service::{Page, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
