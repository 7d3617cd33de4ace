//! Shared utilities and types for feature modules
//!
//! # Contents
//!
//! - **pagination**: Common pagination types and helpers
//! - **search**: Escaped `ILIKE` patterns for list search
//! - **validation**: Input validation utilities
//! - **error_helpers**: Database error handling utilities
//! - **test_helpers**: Test fixtures and utilities (test-only)

pub mod error_helpers;
pub mod pagination;
pub mod search;
pub mod validation;

#[cfg(test)]
pub mod test_helpers;

use serde::Deserialize;

pub use pagination::{Paginated, PaginationError, PaginationMetadata, PaginationParams};
pub use validation::{validate_email, validate_name, EmailValidationError, NameValidationError};

/// Query string of single-resource `GET` endpoints
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ShowParams {
    /// Also return the row when it is soft-deleted
    #[serde(default)]
    pub include_deleted: bool,
}
