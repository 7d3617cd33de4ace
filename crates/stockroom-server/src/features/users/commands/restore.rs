//! Restore soft-deleted user command

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::audit::{AuditContext, AuditError, Change, ChangeInterceptor};
use crate::error::AppError;
use crate::features::users::model::{User, USER_COLUMNS};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RestoreUserCommand {
    pub id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum RestoreUserError {
    #[error("User '{0}' not found")]
    NotFound(Uuid),
    #[error("User '{0}' is not deleted")]
    NotDeleted(Uuid),
    #[error(transparent)]
    Audit(#[from] AuditError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<RestoreUserError> for AppError {
    fn from(err: RestoreUserError) -> Self {
        match err {
            RestoreUserError::NotFound(_) => AppError::NotFound(err.to_string()),
            RestoreUserError::NotDeleted(_) => AppError::Conflict(err.to_string()),
            RestoreUserError::Audit(e) => e.into(),
            RestoreUserError::Database(e) => AppError::Database(e),
        }
    }
}

#[tracing::instrument(skip(pool, audit))]
pub async fn handle(
    pool: &PgPool,
    audit: &ChangeInterceptor,
    ctx: &AuditContext,
    command: RestoreUserCommand,
) -> Result<User, RestoreUserError> {
    let mut tx = pool.begin().await?;

    let current = User::lock(&mut tx, command.id)
        .await?
        .ok_or(RestoreUserError::NotFound(command.id))?;
    if !current.is_deleted() {
        return Err(RestoreUserError::NotDeleted(command.id));
    }

    let restored = sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users
        SET deleted_at = NULL, deleted_by = NULL, updated_at = NOW()
        WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(command.id)
    .fetch_one(&mut *tx)
    .await?;

    let staged = audit.stage(&mut tx, ctx, Change::restored(&restored)?).await?;
    tx.commit().await?;
    audit.settle(staged).await;

    tracing::info!(user_id = %restored.id, "User restored");

    Ok(restored)
}
