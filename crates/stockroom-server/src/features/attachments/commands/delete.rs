//! Delete attachment command
//!
//! Attachments are removed outright. The blob goes after the commit; a
//! failure there is logged and leaves an orphaned file rather than a row
//! pointing at nothing.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::audit::{AuditContext, AuditError, Change, ChangeInterceptor};
use crate::error::AppError;
use crate::features::attachments::model::ProductAttachment;
use crate::storage::BlobStore;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeleteAttachmentCommand {
    pub product_id: Uuid,
    pub id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteAttachmentError {
    #[error("Attachment '{id}' not found for product '{product_id}'")]
    NotFound { product_id: Uuid, id: Uuid },
    #[error(transparent)]
    Audit(#[from] AuditError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<DeleteAttachmentError> for AppError {
    fn from(err: DeleteAttachmentError) -> Self {
        match err {
            DeleteAttachmentError::NotFound { .. } => AppError::NotFound(err.to_string()),
            DeleteAttachmentError::Audit(e) => e.into(),
            DeleteAttachmentError::Database(e) => AppError::Database(e),
        }
    }
}

#[tracing::instrument(skip(pool, audit, blobs))]
pub async fn handle(
    pool: &PgPool,
    audit: &ChangeInterceptor,
    blobs: &dyn BlobStore,
    ctx: &AuditContext,
    command: DeleteAttachmentCommand,
) -> Result<ProductAttachment, DeleteAttachmentError> {
    let mut tx = pool.begin().await?;

    let before = ProductAttachment::lock_for_product(&mut tx, command.product_id, command.id)
        .await?
        .ok_or(DeleteAttachmentError::NotFound {
            product_id: command.product_id,
            id: command.id,
        })?;

    sqlx::query("DELETE FROM product_attachments WHERE id = $1")
        .bind(command.id)
        .execute(&mut *tx)
        .await?;

    let staged = audit.stage(&mut tx, ctx, Change::deleted(&before)?).await?;
    tx.commit().await?;
    audit.settle(staged).await;

    if let Err(e) = blobs.delete(&before.file_path).await {
        tracing::warn!(key = %before.file_path, error = %e, "Failed to remove attachment blob");
    }

    tracing::info!(attachment_id = %before.id, product_id = %before.product_id, "Attachment deleted");

    Ok(before)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditConsistency;
    use crate::features::attachments::commands::create::{self, CreateAttachmentCommand};
    use crate::features::shared::test_helpers::{audit_count, TestProduct};
    use crate::storage::LocalBlobStore;
    use std::time::Duration;
    use tempfile::TempDir;

    fn interceptor(pool: &PgPool) -> ChangeInterceptor {
        ChangeInterceptor::with_settings(pool.clone(), AuditConsistency::Strict, Duration::from_secs(5))
    }

    async fn upload(
        pool: &PgPool,
        blobs: &LocalBlobStore,
        product_id: Uuid,
    ) -> Result<ProductAttachment, create::CreateAttachmentError> {
        let mut content = b"%PDF-1.4\n".to_vec();
        content.resize(120 * 1024, b' ');
        create::handle(
            pool,
            &interceptor(pool),
            blobs,
            &AuditContext::system(),
            CreateAttachmentCommand {
                product_id,
                file_name: "manual.pdf".to_string(),
                content,
                is_primary: false,
            },
        )
        .await
    }

    #[sqlx::test]
    async fn test_handle_removes_row_and_blob(pool: PgPool) -> anyhow::Result<()> {
        let product = TestProduct::new("Desk lamp").insert(&pool).await?;
        let dir = TempDir::new()?;
        let blobs = LocalBlobStore::new(dir.path());
        let attachment = upload(&pool, &blobs, product.id).await?;

        let deleted = handle(
            &pool,
            &interceptor(&pool),
            &blobs,
            &AuditContext::system(),
            DeleteAttachmentCommand {
                product_id: product.id,
                id: attachment.id,
            },
        )
        .await?;

        assert_eq!(deleted.id, attachment.id);
        assert!(!dir.path().join(&attachment.file_path).exists());
        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product_attachments")
            .fetch_one(&pool)
            .await?;
        assert_eq!(remaining, 0);
        assert_eq!(audit_count(&pool, "product_attachments", attachment.id).await?, 2);
        Ok(())
    }

    #[sqlx::test]
    async fn test_handle_other_products_attachment_not_found(pool: PgPool) -> anyhow::Result<()> {
        let lamp = TestProduct::new("Desk lamp").insert(&pool).await?;
        let chair = TestProduct::new("Chair").insert(&pool).await?;
        let dir = TempDir::new()?;
        let blobs = LocalBlobStore::new(dir.path());
        let attachment = upload(&pool, &blobs, lamp.id).await?;

        let result = handle(
            &pool,
            &interceptor(&pool),
            &blobs,
            &AuditContext::system(),
            DeleteAttachmentCommand {
                product_id: chair.id,
                id: attachment.id,
            },
        )
        .await;

        assert!(matches!(result, Err(DeleteAttachmentError::NotFound { id, .. }) if id == attachment.id));
        assert!(dir.path().join(&attachment.file_path).exists());
        Ok(())
    }
}
