use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::features::categories::model::{Category, CATEGORY_COLUMNS};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GetCategoryQuery {
    pub id: Uuid,
    #[serde(default)]
    pub include_deleted: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum GetCategoryError {
    #[error("Category '{0}' not found")]
    NotFound(Uuid),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<GetCategoryError> for AppError {
    fn from(err: GetCategoryError) -> Self {
        match err {
            GetCategoryError::NotFound(_) => AppError::NotFound(err.to_string()),
            GetCategoryError::Database(e) => AppError::Database(e),
        }
    }
}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: &PgPool, query: GetCategoryQuery) -> Result<Category, GetCategoryError> {
    sqlx::query_as::<_, Category>(&format!(
        r#"
        SELECT {CATEGORY_COLUMNS}
        FROM categories
        WHERE id = $1 AND ($2::BOOLEAN OR deleted_at IS NULL)
        "#
    ))
    .bind(query.id)
    .bind(query.include_deleted)
    .fetch_optional(pool)
    .await?
    .ok_or(GetCategoryError::NotFound(query.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::TestCategory;

    #[sqlx::test]
    async fn test_deleted_category_needs_include_deleted(pool: PgPool) -> Result<(), GetCategoryError> {
        let fixture = TestCategory::new("Toys").deleted().insert(&pool).await?;

        let hidden = handle(
            &pool,
            GetCategoryQuery {
                id: fixture.id,
                include_deleted: false,
            },
        )
        .await;
        assert!(matches!(hidden, Err(GetCategoryError::NotFound(_))));

        let category = handle(
            &pool,
            GetCategoryQuery {
                id: fixture.id,
                include_deleted: true,
            },
        )
        .await?;
        assert_eq!(category.name, "Toys");
        assert!(category.is_deleted());
        Ok(())
    }
}
