//! Domain model for the department hierarchy and its staff.
//!
//! # Responsibility
//! - Define the canonical records consumed by the hierarchy engine.
//! - Normalize and validate user-supplied fields before persistence.
//!
//! # Invariants
//! - Every record is identified by a stable UUID that is never reused.
//! - Deletion is represented by soft-delete tombstones, not hard delete.

pub mod department;
pub mod employee;
pub mod validation;
