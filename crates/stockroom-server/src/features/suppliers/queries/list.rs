use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::AppError;
use crate::features::shared::pagination::{Paginated, PaginationError, PaginationParams};
use crate::features::shared::search::contains_pattern;
use crate::features::suppliers::model::{Supplier, SUPPLIER_COLUMNS};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListSuppliersQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub include_deleted: bool,
    #[serde(default)]
    pub only_deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListSuppliersError {
    #[error(transparent)]
    Pagination(#[from] PaginationError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<ListSuppliersError> for AppError {
    fn from(err: ListSuppliersError) -> Self {
        match err {
            ListSuppliersError::Pagination(e) => AppError::Validation(e.to_string()),
            ListSuppliersError::Database(e) => AppError::Database(e),
        }
    }
}

impl ListSuppliersQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.per_page)
    }

    pub fn validate(&self) -> Result<(), ListSuppliersError> {
        Ok(self.pagination().validate()?)
    }
}

const FILTER_CLAUSE: &str = r#"
    WHERE ($1::BOOLEAN IS NULL OR is_active = $1)
      AND ($2::BOOLEAN OR deleted_at IS NULL)
      AND (NOT $3::BOOLEAN OR deleted_at IS NOT NULL)
      AND ($4::TEXT IS NULL OR name ILIKE $4 ESCAPE '\')
"#;

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: &PgPool,
    query: ListSuppliersQuery,
) -> Result<Paginated<Supplier>, ListSuppliersError> {
    query.validate()?;

    let pagination = query.pagination();
    let show_deleted = query.include_deleted || query.only_deleted;
    let name_pattern = contains_pattern(query.search.as_deref());

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM suppliers {FILTER_CLAUSE}"))
        .bind(query.is_active)
        .bind(show_deleted)
        .bind(query.only_deleted)
        .bind(name_pattern.as_deref())
        .fetch_one(pool)
        .await?;

    let suppliers = sqlx::query_as::<_, Supplier>(&format!(
        r#"
        SELECT {SUPPLIER_COLUMNS}
        FROM suppliers
        {FILTER_CLAUSE}
        ORDER BY created_at DESC, id
        LIMIT $5 OFFSET $6
        "#
    ))
    .bind(query.is_active)
    .bind(show_deleted)
    .bind(query.only_deleted)
    .bind(name_pattern.as_deref())
    .bind(pagination.per_page())
    .bind(pagination.offset())
    .fetch_all(pool)
    .await?;

    Ok(Paginated::from_items(suppliers, &pagination, total))
}
