//! Store contracts for departments and employees, with SQLite implementations.
//!
//! # Responsibility
//! - Define the data access contracts the hierarchy engine depends on.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Default reads exclude tombstoned rows; `include_deleted` opts in.
//! - Stores never enforce business rules beyond schema constraints.
//! - Uniqueness of identity documents is left to the store's unique indexes.
//! - Name filters call `fold_case`, registered by `db::open_db*`.

pub mod department_repo;
pub mod employee_repo;
pub mod error;
mod sqlite_support;

pub use error::{RepoError, RepoResult};
