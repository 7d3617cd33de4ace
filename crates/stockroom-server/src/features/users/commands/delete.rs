//! Soft-delete user command
//!
//! A deleted user's tokens stop authenticating immediately.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::audit::{AuditContext, AuditError, Change, ChangeInterceptor};
use crate::error::AppError;
use crate::features::users::model::{User, USER_COLUMNS};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeleteUserCommand {
    pub id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteUserError {
    #[error("User '{0}' not found")]
    NotFound(Uuid),
    #[error(transparent)]
    Audit(#[from] AuditError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<DeleteUserError> for AppError {
    fn from(err: DeleteUserError) -> Self {
        match err {
            DeleteUserError::NotFound(_) => AppError::NotFound(err.to_string()),
            DeleteUserError::Audit(e) => e.into(),
            DeleteUserError::Database(e) => AppError::Database(e),
        }
    }
}

#[tracing::instrument(skip(pool, audit))]
pub async fn handle(
    pool: &PgPool,
    audit: &ChangeInterceptor,
    ctx: &AuditContext,
    command: DeleteUserCommand,
) -> Result<User, DeleteUserError> {
    let mut tx = pool.begin().await?;

    let before = User::lock_active(&mut tx, command.id)
        .await?
        .ok_or(DeleteUserError::NotFound(command.id))?;

    let deleted = sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users
        SET deleted_at = NOW(), deleted_by = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(command.id)
    .bind(ctx.actor_id)
    .fetch_one(&mut *tx)
    .await?;

    let staged = audit.stage(&mut tx, ctx, Change::deleted(&before)?).await?;
    tx.commit().await?;
    audit.settle(staged).await;

    tracing::info!(user_id = %deleted.id, "User deleted");

    Ok(deleted)
}
