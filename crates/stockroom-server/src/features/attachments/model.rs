//! Product attachment entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::audit::Tracked;

pub const FILE_NAME_MAX_LENGTH: usize = 255;

/// Smallest accepted upload (100 KiB)
pub const MIN_FILE_BYTES: usize = 100 * 1024;

/// Largest accepted upload (500 KiB)
pub const MAX_FILE_BYTES: usize = 500 * 1024;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

const PDF_MAGIC: &[u8] = b"%PDF-";

pub(crate) const ATTACHMENT_COLUMNS: &str = "id, product_id, file_name, file_path, file_size, \
     file_type, is_primary, uploaded_by, created_at, updated_at";

/// Restricts a `product_attachments` query to products that are not soft-deleted
pub(crate) const LIVE_PRODUCT: &str = "EXISTS (SELECT 1 FROM products p \
     WHERE p.id = product_attachments.product_id AND p.deleted_at IS NULL)";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductAttachment {
    pub id: Uuid,
    pub product_id: Uuid,
    /// Name the file was uploaded with
    pub file_name: String,
    /// Blob store key
    pub file_path: String,
    /// Size in bytes
    pub file_size: i32,
    pub file_type: String,
    pub is_primary: bool,
    pub uploaded_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tracked for ProductAttachment {
    const TABLE: &'static str = "product_attachments";

    fn record_id(&self) -> Uuid {
        self.id
    }
}

impl ProductAttachment {
    /// Blob store key for an attachment's file
    pub fn blob_key(product_id: Uuid, id: Uuid) -> String {
        format!("product_attachments/{}/{}.pdf", product_id, id)
    }

    /// Lock an attachment of a live product
    pub(crate) async fn lock_for_product(
        conn: &mut PgConnection,
        product_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {ATTACHMENT_COLUMNS} FROM product_attachments \
             WHERE id = $1 AND product_id = $2 AND {LIVE_PRODUCT} FOR UPDATE"
        ))
        .bind(id)
        .bind(product_id)
        .fetch_optional(conn)
        .await
    }
}

/// Whether the bytes start with the PDF header
pub fn is_pdf(data: &[u8]) -> bool {
    data.starts_with(PDF_MAGIC)
}

/// Strip any client-side directory from an uploaded file name
pub fn base_file_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name).trim()
}
