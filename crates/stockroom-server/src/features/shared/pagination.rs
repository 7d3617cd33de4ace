//! Shared pagination utilities
//!
//! Provides common pagination types and helpers used across list queries.
//!
//! # Examples
//!
//! ```rust,ignore
//! use stockroom_server::features::shared::pagination::{PaginationParams, Paginated};
//!
//! let params = PaginationParams::new(Some(2), Some(20));
//! params.validate()?;
//! let offset = params.offset();
//!
//! // After fetching rows and the total count...
//! let page = Paginated::from_items(rows, &params, total);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default page size when the caller does not ask for one
pub const DEFAULT_PER_PAGE: i64 = 20;

/// Largest page size a caller may request
pub const MAX_PER_PAGE: i64 = 100;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaginationError {
    #[error("Page must be greater than 0")]
    InvalidPage,

    #[error("Per page must be between 1 and {MAX_PER_PAGE}")]
    InvalidPerPage,

    #[error("Page is too large for the requested page size")]
    PageOutOfRange,
}

/// Common pagination request parameters
///
/// Used in list queries to specify page and items per page.
/// Defaults to page 1 with 20 items per page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct PaginationParams {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,

    /// Items per page. Defaults to 20, allowed range 1-100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,
}

impl PaginationParams {
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self { page, per_page }
    }

    /// Get the page number (1-indexed), defaulting to 1
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Get items per page, defaulting to 20 and clamped to 1-100
    pub fn per_page(&self) -> i64 {
        self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE)
    }

    /// Calculate the offset for SQL OFFSET clause
    ///
    /// Saturates for pages past `i64::MAX` rows; `validate` rejects those.
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.per_page())
    }

    /// Reject out-of-range values instead of silently clamping them
    pub fn validate(&self) -> Result<(), PaginationError> {
        if let Some(page) = self.page {
            if page < 1 {
                return Err(PaginationError::InvalidPage);
            }
        }
        if let Some(per_page) = self.per_page {
            if !(1..=MAX_PER_PAGE).contains(&per_page) {
                return Err(PaginationError::InvalidPerPage);
            }
        }
        if (self.page() - 1).checked_mul(self.per_page()).is_none() {
            return Err(PaginationError::PageOutOfRange);
        }
        Ok(())
    }
}

/// Pagination metadata for response
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationMetadata {
    /// Current page number (1-indexed)
    pub current_page: i64,

    pub per_page: i64,

    /// Total number of matching items across all pages
    pub total: i64,

    /// Last page number; 1 when there are no items
    pub last_page: i64,
}

impl PaginationMetadata {
    pub fn new(current_page: i64, per_page: i64, total: i64) -> Self {
        let last_page = if total <= 0 {
            1
        } else {
            (total + per_page - 1) / per_page
        };

        Self {
            current_page,
            per_page,
            total,
            last_page,
        }
    }

    pub fn from_params(params: &PaginationParams, total: i64) -> Self {
        Self::new(params.page(), params.per_page(), total)
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }
}

/// Wrapper for paginated list responses
///
/// Serializes as `{ "data": [...], "meta": { ... } }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Items on the current page
    pub data: Vec<T>,

    pub meta: PaginationMetadata,
}

impl<T> Paginated<T> {
    /// Create a paginated response from items, params, and total count
    pub fn from_items(data: Vec<T>, params: &PaginationParams, total: i64) -> Self {
        Self {
            data,
            meta: PaginationMetadata::from_params(params, total),
        }
    }
}
