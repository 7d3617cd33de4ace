//! Soft-delete product command

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::audit::{AuditContext, AuditError, Change, ChangeInterceptor};
use crate::error::AppError;
use crate::features::products::model::{Product, PRODUCT_COLUMNS};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeleteProductCommand {
    pub id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteProductError {
    #[error("Product '{0}' not found")]
    NotFound(Uuid),
    #[error(transparent)]
    Audit(#[from] AuditError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<DeleteProductError> for AppError {
    fn from(err: DeleteProductError) -> Self {
        match err {
            DeleteProductError::NotFound(_) => AppError::NotFound(err.to_string()),
            DeleteProductError::Audit(e) => e.into(),
            DeleteProductError::Database(e) => AppError::Database(e),
        }
    }
}

#[tracing::instrument(skip(pool, audit))]
pub async fn handle(
    pool: &PgPool,
    audit: &ChangeInterceptor,
    ctx: &AuditContext,
    command: DeleteProductCommand,
) -> Result<Product, DeleteProductError> {
    let mut tx = pool.begin().await?;

    let before = Product::lock_active(&mut tx, command.id)
        .await?
        .ok_or(DeleteProductError::NotFound(command.id))?;

    let deleted = sqlx::query_as::<_, Product>(&format!(
        r#"
        UPDATE products
        SET deleted_at = NOW(), deleted_by = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING {PRODUCT_COLUMNS}
        "#
    ))
    .bind(command.id)
    .bind(ctx.actor_id)
    .fetch_one(&mut *tx)
    .await?;

    let staged = audit.stage(&mut tx, ctx, Change::deleted(&before)?).await?;
    tx.commit().await?;
    audit.settle(staged).await;

    tracing::info!(product_id = %deleted.id, "Product deleted");

    Ok(deleted)
}
