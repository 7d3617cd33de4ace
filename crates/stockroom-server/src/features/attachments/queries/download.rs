use sqlx::PgPool;

use super::get::{self, GetAttachmentError, GetAttachmentQuery};
use crate::error::AppError;
use crate::storage::BlobStore;

/// An attachment's bytes with the metadata needed to serve them
#[derive(Debug, Clone)]
pub struct AttachmentFile {
    pub file_name: String,
    pub file_type: String,
    pub content: Vec<u8>,
}

impl AttachmentFile {
    /// `Content-Disposition` value offering the file under its upload name
    pub fn content_disposition(&self) -> String {
        let name: String = self
            .file_name
            .chars()
            .map(|c| match c {
                '"' | '\\' => '_',
                c if c.is_ascii_graphic() || c == ' ' => c,
                _ => '_',
            })
            .collect();
        format!("attachment; filename=\"{}\"", name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadAttachmentError {
    #[error(transparent)]
    Attachment(#[from] GetAttachmentError),
    #[error("File not found")]
    FileMissing,
    #[error("Storage error: {0}")]
    Storage(anyhow::Error),
}

impl From<DownloadAttachmentError> for AppError {
    fn from(err: DownloadAttachmentError) -> Self {
        match err {
            DownloadAttachmentError::Attachment(e) => e.into(),
            DownloadAttachmentError::FileMissing => AppError::NotFound(err.to_string()),
            DownloadAttachmentError::Storage(e) => AppError::Internal(format!("{:#}", e)),
        }
    }
}

#[tracing::instrument(skip(pool, blobs))]
pub async fn handle(
    pool: &PgPool,
    blobs: &dyn BlobStore,
    query: GetAttachmentQuery,
) -> Result<AttachmentFile, DownloadAttachmentError> {
    let attachment = get::handle(pool, query).await?;

    let content = blobs
        .get(&attachment.file_path)
        .await
        .map_err(DownloadAttachmentError::Storage)?
        .ok_or(DownloadAttachmentError::FileMissing)?;

    Ok(AttachmentFile {
        file_name: attachment.file_name,
        file_type: attachment.file_type,
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::attachments::model::ProductAttachment;
    use crate::features::shared::test_helpers::TestProduct;
    use crate::storage::LocalBlobStore;
    use tempfile::TempDir;
    use uuid::Uuid;

    #[test]
    fn test_content_disposition_quotes_name() {
        let file = AttachmentFile {
            file_name: "spec \"v2\"ñ.pdf".to_string(),
            file_type: "application/pdf".to_string(),
            content: Vec::new(),
        };
        assert_eq!(file.content_disposition(), "attachment; filename=\"spec _v2__.pdf\"");
    }

    #[sqlx::test]
    async fn test_missing_blob_is_reported(pool: PgPool) -> sqlx::Result<()> {
        let product = TestProduct::new("Desk lamp").insert(&pool).await?;
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO product_attachments (id, product_id, file_name, file_path, file_size)
            VALUES ($1, $2, 'lamp.pdf', $3, 102400)
            "#,
        )
        .bind(id)
        .bind(product.id)
        .bind(ProductAttachment::blob_key(product.id, id))
        .execute(&pool)
        .await?;
        let dir = TempDir::new().unwrap();
        let blobs = LocalBlobStore::new(dir.path());
        let query = GetAttachmentQuery { product_id: product.id, id };

        let result = handle(&pool, &blobs, query).await;
        assert!(matches!(result, Err(DownloadAttachmentError::FileMissing)));

        blobs
            .put(&ProductAttachment::blob_key(product.id, id), b"%PDF-1.4".to_vec(), "application/pdf")
            .await
            .unwrap();
        let file = handle(&pool, &blobs, query).await.unwrap();
        assert_eq!(file.file_name, "lamp.pdf");
        assert_eq!(file.content, b"%PDF-1.4");
        Ok(())
    }
}
