//! Create role command

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::audit::{AuditContext, AuditError, Change, ChangeInterceptor};
use crate::error::AppError;
use crate::features::roles::model::{Role, ROLE_COLUMNS, ROLE_NAME_MAX_LENGTH};
use crate::features::shared::error_helpers::is_unique_violation;
use crate::features::shared::validation::{validate_name, NameValidationError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoleCommand {
    pub name: String,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateRoleError {
    #[error(transparent)]
    Name(#[from] NameValidationError),
    #[error("Role '{0}' already exists")]
    DuplicateName(String),
    #[error(transparent)]
    Audit(#[from] AuditError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<CreateRoleError> for AppError {
    fn from(err: CreateRoleError) -> Self {
        match err {
            CreateRoleError::Name(_) => AppError::Validation(err.to_string()),
            CreateRoleError::DuplicateName(_) => AppError::Conflict(err.to_string()),
            CreateRoleError::Audit(e) => e.into(),
            CreateRoleError::Database(e) => AppError::Database(e),
        }
    }
}

impl CreateRoleCommand {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_active: None,
        }
    }

    pub fn validate(&self) -> Result<(), CreateRoleError> {
        validate_name(&self.name, ROLE_NAME_MAX_LENGTH)?;
        Ok(())
    }
}

/// Handles the create role command
///
/// # Errors
///
/// - `DuplicateName` when another role, deleted or not, holds the name
#[tracing::instrument(skip(pool, audit))]
pub async fn handle(
    pool: &PgPool,
    audit: &ChangeInterceptor,
    ctx: &AuditContext,
    command: CreateRoleCommand,
) -> Result<Role, CreateRoleError> {
    command.validate()?;

    let name = command.name.trim();
    let mut tx = pool.begin().await?;

    let role = sqlx::query_as::<_, Role>(&format!(
        "INSERT INTO roles (name, is_active) VALUES ($1, $2) RETURNING {ROLE_COLUMNS}"
    ))
    .bind(name)
    .bind(command.is_active.unwrap_or(true))
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            CreateRoleError::DuplicateName(name.to_string())
        } else {
            CreateRoleError::Database(e)
        }
    })?;

    let staged = audit.stage(&mut tx, ctx, Change::created(&role)?).await?;
    tx.commit().await?;
    audit.settle(staged).await;

    tracing::info!(role_id = %role.id, role_name = %role.name, "Role created");

    Ok(role)
}
