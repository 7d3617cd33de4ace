use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::features::attachments::model::{ProductAttachment, ATTACHMENT_COLUMNS};

/// All attachments of one product, oldest first
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ListAttachmentsQuery {
    pub product_id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum ListAttachmentsError {
    #[error("Product '{0}' not found")]
    ProductNotFound(Uuid),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<ListAttachmentsError> for AppError {
    fn from(err: ListAttachmentsError) -> Self {
        match err {
            ListAttachmentsError::ProductNotFound(_) => AppError::NotFound(err.to_string()),
            ListAttachmentsError::Database(e) => AppError::Database(e),
        }
    }
}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: &PgPool,
    query: ListAttachmentsQuery,
) -> Result<Vec<ProductAttachment>, ListAttachmentsError> {
    let live: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM products WHERE id = $1 AND deleted_at IS NULL)",
    )
    .bind(query.product_id)
    .fetch_one(pool)
    .await?;

    if !live {
        return Err(ListAttachmentsError::ProductNotFound(query.product_id));
    }

    let attachments = sqlx::query_as::<_, ProductAttachment>(&format!(
        "SELECT {ATTACHMENT_COLUMNS} FROM product_attachments \
         WHERE product_id = $1 ORDER BY created_at, id"
    ))
    .bind(query.product_id)
    .fetch_all(pool)
    .await?;

    Ok(attachments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::TestProduct;

    async fn insert_attachment(pool: &PgPool, product_id: Uuid, name: &str) -> sqlx::Result<Uuid> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO product_attachments (id, product_id, file_name, file_path, file_size)
            VALUES ($1, $2, $3, $4, 102400)
            "#,
        )
        .bind(id)
        .bind(product_id)
        .bind(name)
        .bind(ProductAttachment::blob_key(product_id, id))
        .execute(pool)
        .await?;
        Ok(id)
    }

    #[sqlx::test]
    async fn test_lists_only_that_products_attachments(pool: PgPool) -> sqlx::Result<()> {
        let lamp = TestProduct::new("Desk lamp").insert(&pool).await?;
        let chair = TestProduct::new("Chair").insert(&pool).await?;
        insert_attachment(&pool, lamp.id, "lamp.pdf").await?;
        insert_attachment(&pool, chair.id, "chair.pdf").await?;

        let attachments = handle(&pool, ListAttachmentsQuery { product_id: lamp.id })
            .await
            .unwrap();

        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].file_name, "lamp.pdf");
        assert_eq!(attachments[0].file_type, "application/pdf");
        assert!(!attachments[0].is_primary);
        Ok(())
    }

    #[sqlx::test]
    async fn test_deleted_product_is_not_found(pool: PgPool) -> sqlx::Result<()> {
        let product = TestProduct::new("Old lamp").deleted().insert(&pool).await?;

        let result = handle(&pool, ListAttachmentsQuery { product_id: product.id }).await;

        assert!(matches!(result, Err(ListAttachmentsError::ProductNotFound(id)) if id == product.id));
        Ok(())
    }
}
