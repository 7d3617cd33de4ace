use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::features::products::model::{Product, PRODUCT_COLUMNS};
use crate::features::shared::pagination::{Paginated, PaginationError, PaginationParams};
use crate::features::shared::search::contains_pattern;

/// Product listing filters
///
/// Price bounds are inclusive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListProductsQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub include_deleted: bool,
    #[serde(default)]
    pub only_deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<BigDecimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<BigDecimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListProductsError {
    #[error(transparent)]
    Pagination(#[from] PaginationError),
    #[error("min_price cannot be greater than max_price")]
    InvertedPriceRange,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<ListProductsError> for AppError {
    fn from(err: ListProductsError) -> Self {
        match err {
            ListProductsError::Database(e) => AppError::Database(e),
            _ => AppError::Validation(err.to_string()),
        }
    }
}

impl ListProductsQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.per_page)
    }

    pub fn validate(&self) -> Result<(), ListProductsError> {
        self.pagination().validate()?;
        if let (Some(min), Some(max)) = (&self.min_price, &self.max_price) {
            if min > max {
                return Err(ListProductsError::InvertedPriceRange);
            }
        }
        Ok(())
    }
}

const FILTER_CLAUSE: &str = r#"
    WHERE ($1::BOOLEAN IS NULL OR is_active = $1)
      AND ($2::BOOLEAN OR deleted_at IS NULL)
      AND (NOT $3::BOOLEAN OR deleted_at IS NOT NULL)
      AND ($4::TEXT IS NULL OR name ILIKE $4 ESCAPE '\')
      AND ($5::UUID IS NULL OR category_id = $5)
      AND ($6::UUID IS NULL OR supplier_id = $6)
      AND ($7::NUMERIC IS NULL OR price >= $7)
      AND ($8::NUMERIC IS NULL OR price <= $8)
"#;

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: &PgPool,
    query: ListProductsQuery,
) -> Result<Paginated<Product>, ListProductsError> {
    query.validate()?;

    let pagination = query.pagination();
    let show_deleted = query.include_deleted || query.only_deleted;
    let name_pattern = contains_pattern(query.search.as_deref());

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM products {FILTER_CLAUSE}"))
        .bind(query.is_active)
        .bind(show_deleted)
        .bind(query.only_deleted)
        .bind(name_pattern.as_deref())
        .bind(query.category_id)
        .bind(query.supplier_id)
        .bind(&query.min_price)
        .bind(&query.max_price)
        .fetch_one(pool)
        .await?;

    let products = sqlx::query_as::<_, Product>(&format!(
        r#"
        SELECT {PRODUCT_COLUMNS}
        FROM products
        {FILTER_CLAUSE}
        ORDER BY created_at DESC, id
        LIMIT $9 OFFSET $10
        "#
    ))
    .bind(query.is_active)
    .bind(show_deleted)
    .bind(query.only_deleted)
    .bind(name_pattern.as_deref())
    .bind(query.category_id)
    .bind(query.supplier_id)
    .bind(&query.min_price)
    .bind(&query.max_price)
    .bind(pagination.per_page())
    .bind(pagination.offset())
    .fetch_all(pool)
    .await?;

    Ok(Paginated::from_items(products, &pagination, total))
}
