//! Restore soft-deleted role command

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::audit::{AuditContext, AuditError, Change, ChangeInterceptor};
use crate::error::AppError;
use crate::features::roles::model::{Role, ROLE_COLUMNS};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RestoreRoleCommand {
    pub id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum RestoreRoleError {
    #[error("Role '{0}' not found")]
    NotFound(Uuid),
    #[error("Role '{0}' is not deleted")]
    NotDeleted(Uuid),
    #[error(transparent)]
    Audit(#[from] AuditError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<RestoreRoleError> for AppError {
    fn from(err: RestoreRoleError) -> Self {
        match err {
            RestoreRoleError::NotFound(_) => AppError::NotFound(err.to_string()),
            RestoreRoleError::NotDeleted(_) => AppError::Conflict(err.to_string()),
            RestoreRoleError::Audit(e) => e.into(),
            RestoreRoleError::Database(e) => AppError::Database(e),
        }
    }
}

#[tracing::instrument(skip(pool, audit))]
pub async fn handle(
    pool: &PgPool,
    audit: &ChangeInterceptor,
    ctx: &AuditContext,
    command: RestoreRoleCommand,
) -> Result<Role, RestoreRoleError> {
    let mut tx = pool.begin().await?;

    let current = Role::lock(&mut tx, command.id)
        .await?
        .ok_or(RestoreRoleError::NotFound(command.id))?;
    if !current.is_deleted() {
        return Err(RestoreRoleError::NotDeleted(command.id));
    }

    let restored = sqlx::query_as::<_, Role>(&format!(
        r#"
        UPDATE roles
        SET deleted_at = NULL, deleted_by = NULL, updated_at = NOW()
        WHERE id = $1
        RETURNING {ROLE_COLUMNS}
        "#
    ))
    .bind(command.id)
    .fetch_one(&mut *tx)
    .await?;

    let staged = audit.stage(&mut tx, ctx, Change::restored(&restored)?).await?;
    tx.commit().await?;
    audit.settle(staged).await;

    tracing::info!(role_id = %restored.id, "Role restored");

    Ok(restored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditConsistency;
    use crate::features::shared::test_helpers::TestRole;
    use std::time::Duration;

    #[sqlx::test]
    async fn test_handle_active_role_conflicts(pool: PgPool) -> sqlx::Result<()> {
        let role = TestRole::new("Staff").insert(&pool).await?;
        let audit = ChangeInterceptor::with_settings(pool.clone(), AuditConsistency::Strict, Duration::from_secs(5));

        let result = handle(&pool, &audit, &AuditContext::system(), RestoreRoleCommand { id: role.id }).await;
        assert!(matches!(result, Err(RestoreRoleError::NotDeleted(_))));
        Ok(())
    }
}
