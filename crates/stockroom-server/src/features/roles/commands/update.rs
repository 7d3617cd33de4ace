//! Update role command

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::audit::{AuditContext, AuditError, Change, ChangeInterceptor};
use crate::error::AppError;
use crate::features::roles::model::{Role, ROLE_COLUMNS, ROLE_NAME_MAX_LENGTH};
use crate::features::shared::error_helpers::is_unique_violation;
use crate::features::shared::validation::{validate_name, NameValidationError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRoleCommand {
    #[serde(default)]
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateRoleError {
    #[error("At least one field must be provided for update")]
    NoFieldsToUpdate,
    #[error(transparent)]
    Name(#[from] NameValidationError),
    #[error("Role '{0}' already exists")]
    DuplicateName(String),
    #[error("Role '{0}' not found")]
    NotFound(Uuid),
    #[error(transparent)]
    Audit(#[from] AuditError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<UpdateRoleError> for AppError {
    fn from(err: UpdateRoleError) -> Self {
        match err {
            UpdateRoleError::NoFieldsToUpdate | UpdateRoleError::Name(_) => {
                AppError::Validation(err.to_string())
            },
            UpdateRoleError::DuplicateName(_) => AppError::Conflict(err.to_string()),
            UpdateRoleError::NotFound(_) => AppError::NotFound(err.to_string()),
            UpdateRoleError::Audit(e) => e.into(),
            UpdateRoleError::Database(e) => AppError::Database(e),
        }
    }
}

impl UpdateRoleCommand {
    pub fn validate(&self) -> Result<(), UpdateRoleError> {
        if self.name.is_none() && self.is_active.is_none() {
            return Err(UpdateRoleError::NoFieldsToUpdate);
        }
        if let Some(ref name) = self.name {
            validate_name(name, ROLE_NAME_MAX_LENGTH)?;
        }
        Ok(())
    }
}

#[tracing::instrument(skip(pool, audit))]
pub async fn handle(
    pool: &PgPool,
    audit: &ChangeInterceptor,
    ctx: &AuditContext,
    command: UpdateRoleCommand,
) -> Result<Role, UpdateRoleError> {
    command.validate()?;

    let name = command.name.as_deref().map(str::trim);
    let mut tx = pool.begin().await?;

    let before = Role::lock_active(&mut tx, command.id)
        .await?
        .ok_or(UpdateRoleError::NotFound(command.id))?;

    let after = sqlx::query_as::<_, Role>(&format!(
        r#"
        UPDATE roles
        SET name = COALESCE($2, name),
            is_active = COALESCE($3, is_active),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {ROLE_COLUMNS}
        "#
    ))
    .bind(command.id)
    .bind(name)
    .bind(command.is_active)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| match name {
        Some(name) if is_unique_violation(&e) => UpdateRoleError::DuplicateName(name.to_string()),
        _ => UpdateRoleError::Database(e),
    })?;

    let staged = audit.stage(&mut tx, ctx, Change::updated(&before, &after)?).await?;
    tx.commit().await?;
    audit.settle(staged).await;

    tracing::info!(role_id = %after.id, "Role updated");

    Ok(after)
}
