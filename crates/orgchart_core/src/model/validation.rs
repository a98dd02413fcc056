//! Input normalization shared by department and employee operations.
//!
//! # Invariants
//! - Names are trimmed and must not be blank.
//! - CPF is reduced to 11 digits and must pass both mod-11 check digits.
//! - Pagination is 1-indexed with a page size of at least one.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static CPF_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{3})\.?(\d{3})\.?(\d{3})-?(\d{2})$").expect("CPF pattern is a valid regex")
});

/// Rejected user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Name is blank after trim.
    BlankName,
    /// CPF is malformed or fails its check digits.
    InvalidCpf,
    /// Page number is zero.
    InvalidPage(u32),
    /// Page size is zero.
    InvalidPageSize(u32),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "name must not be blank"),
            Self::InvalidCpf => write!(f, "cpf must be 11 digits with valid check digits"),
            Self::InvalidPage(page) => write!(f, "page must be >= 1, got {page}"),
            Self::InvalidPageSize(size) => write!(f, "page size must be >= 1, got {size}"),
        }
    }
}

impl Error for ValidationError {}

/// Trims a display name and rejects blank values.
pub fn normalize_name(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankName);
    }
    Ok(trimmed.to_string())
}

/// Reduces a plain or formatted CPF to 11 digits and verifies it.
pub fn normalize_cpf(value: &str) -> Result<String, ValidationError> {
    let captures = CPF_PATTERN
        .captures(value.trim())
        .ok_or(ValidationError::InvalidCpf)?;
    let digits: String = captures
        .iter()
        .skip(1)
        .flatten()
        .map(|group| group.as_str())
        .collect();

    if !cpf_check_digits_match(&digits) {
        return Err(ValidationError::InvalidCpf);
    }
    Ok(digits)
}

/// Trims an optional secondary document; blank input means absent.
pub fn normalize_rg(value: Option<&str>) -> Option<String> {
    non_blank(value)
}

/// Trims optional free text, mapping blank input to `None`.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_string)
}

/// Converts a 1-indexed page request into `(limit, offset)`.
pub fn page_window(page: u32, page_size: u32) -> Result<(u32, u32), ValidationError> {
    if page == 0 {
        return Err(ValidationError::InvalidPage(page));
    }
    if page_size == 0 {
        return Err(ValidationError::InvalidPageSize(page_size));
    }
    let offset = (page - 1).saturating_mul(page_size);
    Ok((page_size, offset))
}

fn cpf_check_digits_match(digits: &str) -> bool {
    let values: Vec<u32> = digits.chars().filter_map(|c| c.to_digit(10)).collect();
    if values.len() != 11 || values.iter().all(|value| *value == values[0]) {
        return false;
    }
    check_digit(&values[..9]) == values[9] && check_digit(&values[..10]) == values[10]
}

fn check_digit(prefix: &[u32]) -> u32 {
    let weight_start = prefix.len() as u32 + 1;
    let sum: u32 = prefix
        .iter()
        .enumerate()
        .map(|(index, value)| value * (weight_start - index as u32))
        .sum();
    match sum % 11 {
        0 | 1 => 0,
        remainder => 11 - remainder,
    }
}
