//! Database error handling utilities
//!
//! Helpers for recognising constraint violations raised by Postgres.
//!
//! # Examples
//!
//! ```rust,ignore
//! use stockroom_server::features::shared::error_helpers::is_unique_violation;
//!
//! let role = sqlx::query_as::<_, Role>(INSERT_SQL)
//!     .bind(&command.name)
//!     .fetch_one(&mut *tx)
//!     .await
//!     .map_err(|e| {
//!         if is_unique_violation(&e) {
//!             CreateRoleError::DuplicateName(command.name.clone())
//!         } else {
//!             CreateRoleError::Database(e)
//!         }
//!     })?;
//! ```

use sqlx::Error as SqlxError;

/// Check if the error is a unique constraint violation
pub fn is_unique_violation(error: &SqlxError) -> bool {
    if let SqlxError::Database(db_err) = error {
        return db_err.is_unique_violation();
    }
    false
}

/// Name of the violated constraint, when Postgres reported one
pub fn violated_constraint(error: &SqlxError) -> Option<&str> {
    match error {
        SqlxError::Database(db_err) => db_err.constraint(),
        _ => None,
    }
}
