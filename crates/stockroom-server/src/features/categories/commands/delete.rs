//! Soft-delete category command

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::audit::{AuditContext, AuditError, Change, ChangeInterceptor};
use crate::error::AppError;
use crate::features::categories::model::{Category, CATEGORY_COLUMNS};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeleteCategoryCommand {
    pub id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteCategoryError {
    #[error("Category '{0}' not found")]
    NotFound(Uuid),
    #[error(transparent)]
    Audit(#[from] AuditError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<DeleteCategoryError> for AppError {
    fn from(err: DeleteCategoryError) -> Self {
        match err {
            DeleteCategoryError::NotFound(_) => AppError::NotFound(err.to_string()),
            DeleteCategoryError::Audit(e) => e.into(),
            DeleteCategoryError::Database(e) => AppError::Database(e),
        }
    }
}

/// Handles the delete category command
///
/// Marks the row deleted by the acting user. The row stays in the table and
/// can be brought back with the restore command. Products keep pointing at a
/// deleted category.
#[tracing::instrument(skip(pool, audit))]
pub async fn handle(
    pool: &PgPool,
    audit: &ChangeInterceptor,
    ctx: &AuditContext,
    command: DeleteCategoryCommand,
) -> Result<Category, DeleteCategoryError> {
    let mut tx = pool.begin().await?;

    let before = Category::lock_active(&mut tx, command.id)
        .await?
        .ok_or(DeleteCategoryError::NotFound(command.id))?;

    let deleted = sqlx::query_as::<_, Category>(&format!(
        r#"
        UPDATE categories
        SET deleted_at = NOW(), deleted_by = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING {CATEGORY_COLUMNS}
        "#
    ))
    .bind(command.id)
    .bind(ctx.actor_id)
    .fetch_one(&mut *tx)
    .await?;

    let staged = audit.stage(&mut tx, ctx, Change::deleted(&before)?).await?;
    tx.commit().await?;
    audit.settle(staged).await;

    tracing::info!(category_id = %deleted.id, "Category deleted");

    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{store, AuditConsistency, AuditEvent, AuditFilter};
    use crate::features::shared::pagination::PaginationParams;
    use crate::features::shared::test_helpers::{TestCategory, TestUser};
    use std::time::Duration;

    fn interceptor(pool: &PgPool) -> ChangeInterceptor {
        ChangeInterceptor::with_settings(pool.clone(), AuditConsistency::Strict, Duration::from_secs(5))
    }

    #[sqlx::test]
    async fn test_handle_marks_deleted_by_actor(pool: PgPool) -> Result<(), DeleteCategoryError> {
        let user = TestUser::new("clerk").insert(&pool).await?;
        let fixture = TestCategory::new("Electronics").insert(&pool).await?;
        let ctx = AuditContext::system().with_actor(user.id);

        let category = handle(&pool, &interceptor(&pool), &ctx, DeleteCategoryCommand { id: fixture.id }).await?;
        assert!(category.is_deleted());
        assert_eq!(category.deleted_by, Some(user.id));

        let page = store::query(
            &pool,
            &AuditFilter::for_record("categories", fixture.id),
            &PaginationParams::default(),
        )
        .await?;
        let record = &page.data[0];
        assert_eq!(record.event, AuditEvent::Delete);
        assert_eq!(record.user_id, Some(user.id));
        assert!(record.old_values.is_some());
        assert!(record.new_values.is_none());
        Ok(())
    }

    #[sqlx::test]
    async fn test_handle_twice_is_not_found(pool: PgPool) -> sqlx::Result<()> {
        let fixture = TestCategory::new("Electronics").deleted().insert(&pool).await?;

        let result = handle(
            &pool,
            &interceptor(&pool),
            &AuditContext::system(),
            DeleteCategoryCommand { id: fixture.id },
        )
        .await;
        assert!(matches!(result, Err(DeleteCategoryError::NotFound(_))));
        Ok(())
    }
}
