//! Soft-delete role command

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::audit::{AuditContext, AuditError, Change, ChangeInterceptor};
use crate::error::AppError;
use crate::features::roles::model::{Role, ROLE_COLUMNS};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeleteRoleCommand {
    pub id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteRoleError {
    #[error("Role '{0}' not found")]
    NotFound(Uuid),
    #[error("Role '{id}' is still assigned to {users} user(s)")]
    InUse { id: Uuid, users: i64 },
    #[error(transparent)]
    Audit(#[from] AuditError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<DeleteRoleError> for AppError {
    fn from(err: DeleteRoleError) -> Self {
        match err {
            DeleteRoleError::NotFound(_) => AppError::NotFound(err.to_string()),
            DeleteRoleError::InUse { .. } => AppError::Conflict(err.to_string()),
            DeleteRoleError::Audit(e) => e.into(),
            DeleteRoleError::Database(e) => AppError::Database(e),
        }
    }
}

/// Handles the delete role command
///
/// A role held by any user that is not itself deleted cannot be deleted.
#[tracing::instrument(skip(pool, audit))]
pub async fn handle(
    pool: &PgPool,
    audit: &ChangeInterceptor,
    ctx: &AuditContext,
    command: DeleteRoleCommand,
) -> Result<Role, DeleteRoleError> {
    let mut tx = pool.begin().await?;

    let before = Role::lock_active(&mut tx, command.id)
        .await?
        .ok_or(DeleteRoleError::NotFound(command.id))?;

    let users: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role_id = $1 AND deleted_at IS NULL")
            .bind(command.id)
            .fetch_one(&mut *tx)
            .await?;
    if users > 0 {
        return Err(DeleteRoleError::InUse {
            id: command.id,
            users,
        });
    }

    let deleted = sqlx::query_as::<_, Role>(&format!(
        r#"
        UPDATE roles
        SET deleted_at = NOW(), deleted_by = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING {ROLE_COLUMNS}
        "#
    ))
    .bind(command.id)
    .bind(ctx.actor_id)
    .fetch_one(&mut *tx)
    .await?;

    let staged = audit.stage(&mut tx, ctx, Change::deleted(&before)?).await?;
    tx.commit().await?;
    audit.settle(staged).await;

    tracing::info!(role_id = %deleted.id, "Role deleted");

    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditConsistency;
    use crate::features::shared::test_helpers::{audit_count, TestRole, TestUser};
    use std::time::Duration;

    fn interceptor(pool: &PgPool) -> ChangeInterceptor {
        ChangeInterceptor::with_settings(pool.clone(), AuditConsistency::Strict, Duration::from_secs(5))
    }

    #[sqlx::test]
    async fn test_handle_role_in_use(pool: PgPool) -> sqlx::Result<()> {
        let role = TestRole::new("Manager").insert(&pool).await?;
        TestUser::new("alice").with_role(role.id).insert(&pool).await?;

        let result = handle(&pool, &interceptor(&pool), &AuditContext::system(), DeleteRoleCommand { id: role.id }).await;

        assert!(matches!(result, Err(DeleteRoleError::InUse { users: 1, .. })));
        assert_eq!(audit_count(&pool, "roles", role.id).await?, 0);
        Ok(())
    }

    #[sqlx::test]
    async fn test_handle_ignores_deleted_users(pool: PgPool) -> Result<(), DeleteRoleError> {
        let role = TestRole::new("Manager").insert(&pool).await?;
        let user = TestUser::new("alice").with_role(role.id).insert(&pool).await?;
        sqlx::query("UPDATE users SET deleted_at = NOW() WHERE id = $1")
            .bind(user.id)
            .execute(&pool)
            .await?;

        let deleted = handle(&pool, &interceptor(&pool), &AuditContext::system(), DeleteRoleCommand { id: role.id }).await?;
        assert!(deleted.is_deleted());
        Ok(())
    }
}
