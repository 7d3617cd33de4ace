use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::features::suppliers::model::{Supplier, SUPPLIER_COLUMNS};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GetSupplierQuery {
    pub id: Uuid,
    #[serde(default)]
    pub include_deleted: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum GetSupplierError {
    #[error("Supplier '{0}' not found")]
    NotFound(Uuid),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<GetSupplierError> for AppError {
    fn from(err: GetSupplierError) -> Self {
        match err {
            GetSupplierError::NotFound(_) => AppError::NotFound(err.to_string()),
            GetSupplierError::Database(e) => AppError::Database(e),
        }
    }
}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: &PgPool, query: GetSupplierQuery) -> Result<Supplier, GetSupplierError> {
    sqlx::query_as::<_, Supplier>(&format!(
        "SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE id = $1 AND ($2::BOOLEAN OR deleted_at IS NULL)"
    ))
    .bind(query.id)
    .bind(query.include_deleted)
    .fetch_optional(pool)
    .await?
    .ok_or(GetSupplierError::NotFound(query.id))
}
