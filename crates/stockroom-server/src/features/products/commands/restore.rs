//! Restore soft-deleted product command

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::audit::{AuditContext, AuditError, Change, ChangeInterceptor};
use crate::error::AppError;
use crate::features::products::model::{Product, PRODUCT_COLUMNS};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RestoreProductCommand {
    pub id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum RestoreProductError {
    #[error("Product '{0}' not found")]
    NotFound(Uuid),
    #[error("Product '{0}' is not deleted")]
    NotDeleted(Uuid),
    #[error(transparent)]
    Audit(#[from] AuditError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<RestoreProductError> for AppError {
    fn from(err: RestoreProductError) -> Self {
        match err {
            RestoreProductError::NotFound(_) => AppError::NotFound(err.to_string()),
            RestoreProductError::NotDeleted(_) => AppError::Conflict(err.to_string()),
            RestoreProductError::Audit(e) => e.into(),
            RestoreProductError::Database(e) => AppError::Database(e),
        }
    }
}

#[tracing::instrument(skip(pool, audit))]
pub async fn handle(
    pool: &PgPool,
    audit: &ChangeInterceptor,
    ctx: &AuditContext,
    command: RestoreProductCommand,
) -> Result<Product, RestoreProductError> {
    let mut tx = pool.begin().await?;

    let current = Product::lock(&mut tx, command.id)
        .await?
        .ok_or(RestoreProductError::NotFound(command.id))?;
    if !current.is_deleted() {
        return Err(RestoreProductError::NotDeleted(command.id));
    }

    let restored = sqlx::query_as::<_, Product>(&format!(
        r#"
        UPDATE products
        SET deleted_at = NULL, deleted_by = NULL, updated_at = NOW()
        WHERE id = $1
        RETURNING {PRODUCT_COLUMNS}
        "#
    ))
    .bind(command.id)
    .fetch_one(&mut *tx)
    .await?;

    let staged = audit.stage(&mut tx, ctx, Change::restored(&restored)?).await?;
    tx.commit().await?;
    audit.settle(staged).await;

    tracing::info!(product_id = %restored.id, "Product restored");

    Ok(restored)
}
