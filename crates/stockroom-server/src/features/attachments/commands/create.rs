//! Upload attachment command
//!
//! The blob is written before the transaction commits, so a failed write
//! leaves no row behind. If the commit itself fails the blob is removed
//! again.

use sqlx::PgPool;
use uuid::Uuid;

use crate::audit::{AuditContext, AuditError, Change, ChangeInterceptor};
use crate::error::AppError;
use crate::features::attachments::model::{
    base_file_name, is_pdf, ProductAttachment, ATTACHMENT_COLUMNS, FILE_NAME_MAX_LENGTH,
    MAX_FILE_BYTES, MIN_FILE_BYTES, PDF_CONTENT_TYPE,
};
use crate::features::products::model::Product;
use crate::storage::BlobStore;

/// Command to attach an uploaded file to a product
///
/// Built from a multipart request; `content` is the raw file.
#[derive(Clone)]
pub struct CreateAttachmentCommand {
    pub product_id: Uuid,
    pub file_name: String,
    pub content: Vec<u8>,
    pub is_primary: bool,
}

impl std::fmt::Debug for CreateAttachmentCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateAttachmentCommand")
            .field("product_id", &self.product_id)
            .field("file_name", &self.file_name)
            .field("size", &self.content.len())
            .field("is_primary", &self.is_primary)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CreateAttachmentError {
    #[error("The file field is required")]
    FileRequired,
    #[error("is_primary must be true, false, 1 or 0, got '{0}'")]
    InvalidPrimaryFlag(String),
    #[error("File name is required")]
    FileNameRequired,
    #[error("File name cannot exceed 255 characters")]
    FileNameTooLong,
    #[error("File must be a PDF document")]
    NotPdf,
    #[error("File must be between 100 and 500 kilobytes, got {0} bytes")]
    SizeOutOfRange(usize),
    #[error("Product '{0}' not found")]
    ProductNotFound(Uuid),
    #[error("Storage error: {0}")]
    Storage(anyhow::Error),
    #[error(transparent)]
    Audit(#[from] AuditError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<CreateAttachmentError> for AppError {
    fn from(err: CreateAttachmentError) -> Self {
        match err {
            CreateAttachmentError::ProductNotFound(_) => AppError::NotFound(err.to_string()),
            CreateAttachmentError::Storage(e) => AppError::Internal(format!("{:#}", e)),
            CreateAttachmentError::Audit(e) => e.into(),
            CreateAttachmentError::Database(e) => AppError::Database(e),
            _ => AppError::Validation(err.to_string()),
        }
    }
}

/// Parse a multipart boolean field
pub fn parse_flag(value: &str) -> Result<bool, CreateAttachmentError> {
    match value.trim() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        other => Err(CreateAttachmentError::InvalidPrimaryFlag(other.to_string())),
    }
}

impl CreateAttachmentCommand {
    pub fn validate(&self) -> Result<(), CreateAttachmentError> {
        let name = base_file_name(&self.file_name);
        if name.is_empty() {
            return Err(CreateAttachmentError::FileNameRequired);
        }
        if name.chars().count() > FILE_NAME_MAX_LENGTH {
            return Err(CreateAttachmentError::FileNameTooLong);
        }
        let size = self.content.len();
        if !(MIN_FILE_BYTES..=MAX_FILE_BYTES).contains(&size) {
            return Err(CreateAttachmentError::SizeOutOfRange(size));
        }
        if !is_pdf(&self.content) {
            return Err(CreateAttachmentError::NotPdf);
        }
        Ok(())
    }
}

#[tracing::instrument(skip(pool, audit, blobs))]
pub async fn handle(
    pool: &PgPool,
    audit: &ChangeInterceptor,
    blobs: &dyn BlobStore,
    ctx: &AuditContext,
    command: CreateAttachmentCommand,
) -> Result<ProductAttachment, CreateAttachmentError> {
    command.validate()?;

    let file_name = base_file_name(&command.file_name).to_string();
    let file_size = i32::try_from(command.content.len())
        .map_err(|_| CreateAttachmentError::SizeOutOfRange(command.content.len()))?;

    let mut tx = pool.begin().await?;

    if !Product::is_live(&mut tx, command.product_id).await? {
        return Err(CreateAttachmentError::ProductNotFound(command.product_id));
    }

    let id = Uuid::new_v4();
    let key = ProductAttachment::blob_key(command.product_id, id);

    let attachment = sqlx::query_as::<_, ProductAttachment>(&format!(
        r#"
        INSERT INTO product_attachments
            (id, product_id, file_name, file_path, file_size, file_type, is_primary, uploaded_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {ATTACHMENT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(command.product_id)
    .bind(&file_name)
    .bind(&key)
    .bind(file_size)
    .bind(PDF_CONTENT_TYPE)
    .bind(command.is_primary)
    .bind(ctx.actor_id)
    .fetch_one(&mut *tx)
    .await?;

    let staged = audit.stage(&mut tx, ctx, Change::created(&attachment)?).await?;

    blobs
        .put(&key, command.content, PDF_CONTENT_TYPE)
        .await
        .map_err(CreateAttachmentError::Storage)?;

    if let Err(e) = tx.commit().await {
        if let Err(cleanup) = blobs.delete(&key).await {
            tracing::warn!(key = %key, error = %cleanup, "Failed to remove blob of rolled back attachment");
        }
        return Err(e.into());
    }
    audit.settle(staged).await;

    tracing::info!(
        attachment_id = %attachment.id,
        product_id = %attachment.product_id,
        size = attachment.file_size,
        "Attachment uploaded"
    );

    Ok(attachment)
}
