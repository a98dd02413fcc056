//! Hierarchy engine use-case services.
//!
//! # Responsibility
//! - Enforce department tree and manager-binding invariants above the stores.
//! - Keep request layers decoupled from storage details.
//!
//! # Invariants
//! - Every multi-step mutation validates all input before the first write.
//! - Writes that span both stores run inside one store transaction.

pub mod department_service;
pub mod employee_service;
pub mod error;

use serde::Serialize;

/// One page of a filtered listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Number of matching rows across all pages.
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

/// Default page number for listings.
pub const DEFAULT_PAGE: u32 = 1;
/// Default page size for listings.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
