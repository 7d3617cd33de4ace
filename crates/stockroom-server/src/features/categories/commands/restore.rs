//! Restore soft-deleted category command

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::audit::{AuditContext, AuditError, Change, ChangeInterceptor};
use crate::error::AppError;
use crate::features::categories::model::{Category, CATEGORY_COLUMNS};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RestoreCategoryCommand {
    pub id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum RestoreCategoryError {
    #[error("Category '{0}' not found")]
    NotFound(Uuid),
    #[error("Category '{0}' is not deleted")]
    NotDeleted(Uuid),
    #[error(transparent)]
    Audit(#[from] AuditError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<RestoreCategoryError> for AppError {
    fn from(err: RestoreCategoryError) -> Self {
        match err {
            RestoreCategoryError::NotFound(_) => AppError::NotFound(err.to_string()),
            RestoreCategoryError::NotDeleted(_) => AppError::Conflict(err.to_string()),
            RestoreCategoryError::Audit(e) => e.into(),
            RestoreCategoryError::Database(e) => AppError::Database(e),
        }
    }
}

#[tracing::instrument(skip(pool, audit))]
pub async fn handle(
    pool: &PgPool,
    audit: &ChangeInterceptor,
    ctx: &AuditContext,
    command: RestoreCategoryCommand,
) -> Result<Category, RestoreCategoryError> {
    let mut tx = pool.begin().await?;

    let current = Category::lock(&mut tx, command.id)
        .await?
        .ok_or(RestoreCategoryError::NotFound(command.id))?;
    if !current.is_deleted() {
        return Err(RestoreCategoryError::NotDeleted(command.id));
    }

    let restored = sqlx::query_as::<_, Category>(&format!(
        r#"
        UPDATE categories
        SET deleted_at = NULL, deleted_by = NULL, updated_at = NOW()
        WHERE id = $1
        RETURNING {CATEGORY_COLUMNS}
        "#
    ))
    .bind(command.id)
    .fetch_one(&mut *tx)
    .await?;

    let staged = audit.stage(&mut tx, ctx, Change::restored(&restored)?).await?;
    tx.commit().await?;
    audit.settle(staged).await;

    tracing::info!(category_id = %restored.id, "Category restored");

    Ok(restored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditConsistency;
    use crate::features::shared::test_helpers::{audit_count, TestCategory};
    use std::time::Duration;

    fn interceptor(pool: &PgPool) -> ChangeInterceptor {
        ChangeInterceptor::with_settings(pool.clone(), AuditConsistency::Strict, Duration::from_secs(5))
    }

    #[sqlx::test]
    async fn test_handle_restores_deleted(pool: PgPool) -> Result<(), RestoreCategoryError> {
        let fixture = TestCategory::new("Electronics").deleted().insert(&pool).await?;

        let category = handle(
            &pool,
            &interceptor(&pool),
            &AuditContext::system(),
            RestoreCategoryCommand { id: fixture.id },
        )
        .await?;
        assert!(!category.is_deleted());
        assert!(category.deleted_by.is_none());
        assert_eq!(audit_count(&pool, "categories", fixture.id).await?, 1);
        Ok(())
    }

    #[sqlx::test]
    async fn test_handle_active_category_conflicts(pool: PgPool) -> sqlx::Result<()> {
        let fixture = TestCategory::new("Electronics").insert(&pool).await?;

        let result = handle(
            &pool,
            &interceptor(&pool),
            &AuditContext::system(),
            RestoreCategoryCommand { id: fixture.id },
        )
        .await;
        assert!(matches!(result, Err(RestoreCategoryError::NotDeleted(_))));
        assert_eq!(audit_count(&pool, "categories", fixture.id).await?, 0);
        Ok(())
    }
}
