//! Audit error taxonomy

use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::features::shared::pagination::PaginationError;

#[derive(Debug, Error)]
pub enum AuditError {
    /// Malformed filter or pagination parameters
    #[error("{0}")]
    Validation(String),

    #[error("Audit log '{0}' not found")]
    NotFound(Uuid),

    #[error("Audit storage failed: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Audit write did not finish within {0:?}")]
    Timeout(Duration),

    /// An entity could not be captured as a field map
    #[error("Failed to snapshot entity: {0}")]
    Snapshot(String),

    /// A stored row holds a value this build does not understand
    #[error("Corrupt audit row: {0}")]
    Corrupt(String),
}

impl From<PaginationError> for AuditError {
    fn from(err: PaginationError) -> Self {
        AuditError::Validation(err.to_string())
    }
}

impl From<serde_json::Error> for AuditError {
    fn from(err: serde_json::Error) -> Self {
        AuditError::Snapshot(err.to_string())
    }
}
