use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::features::attachments::model::{ProductAttachment, ATTACHMENT_COLUMNS, LIVE_PRODUCT};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GetAttachmentQuery {
    pub product_id: Uuid,
    pub id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum GetAttachmentError {
    #[error("Attachment '{id}' not found for product '{product_id}'")]
    NotFound { product_id: Uuid, id: Uuid },
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<GetAttachmentError> for AppError {
    fn from(err: GetAttachmentError) -> Self {
        match err {
            GetAttachmentError::NotFound { .. } => AppError::NotFound(err.to_string()),
            GetAttachmentError::Database(e) => AppError::Database(e),
        }
    }
}

/// Fetch an attachment through the product it belongs to
///
/// An attachment asked for under a different or soft-deleted product is
/// reported as missing.
#[tracing::instrument(skip(pool))]
pub async fn handle(pool: &PgPool, query: GetAttachmentQuery) -> Result<ProductAttachment, GetAttachmentError> {
    sqlx::query_as::<_, ProductAttachment>(&format!(
        "SELECT {ATTACHMENT_COLUMNS} FROM product_attachments \
         WHERE id = $1 AND product_id = $2 AND {LIVE_PRODUCT}"
    ))
    .bind(query.id)
    .bind(query.product_id)
    .fetch_optional(pool)
    .await?
    .ok_or(GetAttachmentError::NotFound {
        product_id: query.product_id,
        id: query.id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::TestProduct;

    #[sqlx::test]
    async fn test_attachment_of_other_product_is_not_found(pool: PgPool) -> sqlx::Result<()> {
        let lamp = TestProduct::new("Desk lamp").insert(&pool).await?;
        let chair = TestProduct::new("Chair").insert(&pool).await?;
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO product_attachments (id, product_id, file_name, file_path, file_size)
            VALUES ($1, $2, 'lamp.pdf', $3, 102400)
            "#,
        )
        .bind(id)
        .bind(lamp.id)
        .bind(ProductAttachment::blob_key(lamp.id, id))
        .execute(&pool)
        .await?;

        let found = handle(&pool, GetAttachmentQuery { product_id: lamp.id, id }).await;
        assert!(matches!(found, Ok(ref a) if a.id == id));

        let result = handle(&pool, GetAttachmentQuery { product_id: chair.id, id }).await;
        assert!(matches!(result, Err(GetAttachmentError::NotFound { product_id, .. }) if product_id == chair.id));

        sqlx::query("UPDATE products SET deleted_at = NOW() WHERE id = $1")
            .bind(lamp.id)
            .execute(&pool)
            .await?;
        let result = handle(&pool, GetAttachmentQuery { product_id: lamp.id, id }).await;
        assert!(matches!(result, Err(GetAttachmentError::NotFound { .. })));
        Ok(())
    }
}
