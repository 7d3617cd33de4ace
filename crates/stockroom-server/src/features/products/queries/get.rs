use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::features::products::model::{Product, PRODUCT_COLUMNS};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GetProductQuery {
    pub id: Uuid,
    #[serde(default)]
    pub include_deleted: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum GetProductError {
    #[error("Product '{0}' not found")]
    NotFound(Uuid),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<GetProductError> for AppError {
    fn from(err: GetProductError) -> Self {
        match err {
            GetProductError::NotFound(_) => AppError::NotFound(err.to_string()),
            GetProductError::Database(e) => AppError::Database(e),
        }
    }
}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: &PgPool, query: GetProductQuery) -> Result<Product, GetProductError> {
    sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 AND ($2::BOOLEAN OR deleted_at IS NULL)"
    ))
    .bind(query.id)
    .bind(query.include_deleted)
    .fetch_optional(pool)
    .await?
    .ok_or(GetProductError::NotFound(query.id))
}
