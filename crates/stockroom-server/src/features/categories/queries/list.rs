use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::AppError;
use crate::features::categories::model::{Category, CATEGORY_COLUMNS};
use crate::features::shared::pagination::{Paginated, PaginationError, PaginationParams};
use crate::features::shared::search::contains_pattern;

/// Filters and paging for the category listing, read straight off the
/// query string
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListCategoriesQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub include_deleted: bool,
    /// Only soft-deleted rows; implies `include_deleted`
    #[serde(default)]
    pub only_deleted: bool,
    /// Case-insensitive substring of the name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListCategoriesError {
    #[error(transparent)]
    Pagination(#[from] PaginationError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<ListCategoriesError> for AppError {
    fn from(err: ListCategoriesError) -> Self {
        match err {
            ListCategoriesError::Pagination(e) => AppError::Validation(e.to_string()),
            ListCategoriesError::Database(e) => AppError::Database(e),
        }
    }
}

impl ListCategoriesQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.per_page)
    }

    pub fn validate(&self) -> Result<(), ListCategoriesError> {
        self.pagination().validate()?;
        Ok(())
    }

    fn name_pattern(&self) -> Option<String> {
        contains_pattern(self.search.as_deref())
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
    query: ListCategoriesQuery,
) -> Result<Paginated<Category>, ListCategoriesError> {
    query.validate()?;

    let pagination = query.pagination();
    let show_deleted = query.include_deleted || query.only_deleted;
    let name_pattern = query.name_pattern();

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM categories {FILTER_CLAUSE}"))
        .bind(query.is_active)
        .bind(show_deleted)
        .bind(query.only_deleted)
        .bind(name_pattern.as_deref())
        .fetch_one(pool)
        .await?;

    let categories = sqlx::query_as::<_, Category>(&format!(
        r#"
        SELECT {CATEGORY_COLUMNS}
        FROM categories
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

    Ok(Paginated::from_items(categories, &pagination, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::TestCategory;

    #[test]
    fn test_validation_rejects_bad_page() {
        let query = ListCategoriesQuery {
            page: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            query.validate(),
            Err(ListCategoriesError::Pagination(PaginationError::InvalidPage))
        ));
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let query = ListCategoriesQuery {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(query.name_pattern(), None);

        let query = ListCategoriesQuery {
            search: Some("Tool".to_string()),
            ..Default::default()
        };
        assert_eq!(query.name_pattern().as_deref(), Some("%Tool%"));
    }

    #[sqlx::test]
    async fn test_deleted_rows_hidden_by_default(pool: PgPool) -> Result<(), ListCategoriesError> {
        TestCategory::new("Electronics").insert(&pool).await?;
        TestCategory::new("Toys").deleted().insert(&pool).await?;

        let page = handle(&pool, ListCategoriesQuery::default()).await?;
        assert_eq!(page.meta.total, 1);
        assert_eq!(page.data[0].name, "Electronics");

        let everything = handle(
            &pool,
            ListCategoriesQuery {
                include_deleted: true,
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(everything.meta.total, 2);

        let trashed = handle(
            &pool,
            ListCategoriesQuery {
                only_deleted: true,
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(trashed.meta.total, 1);
        assert_eq!(trashed.data[0].name, "Toys");
        Ok(())
    }

    #[sqlx::test]
    async fn test_search_and_paging(pool: PgPool) -> Result<(), ListCategoriesError> {
        for name in ["Garden tools", "Power tools", "Hand tools", "Books"] {
            TestCategory::new(name).insert(&pool).await?;
        }

        let query = ListCategoriesQuery {
            search: Some("TOOLS".to_string()),
            per_page: Some(2),
            ..Default::default()
        };
        let first = handle(&pool, query.clone()).await?;
        let second = handle(
            &pool,
            ListCategoriesQuery {
                page: Some(2),
                ..query
            },
        )
        .await?;

        assert_eq!(first.meta.total, 3);
        assert_eq!(first.meta.last_page, 2);
        assert_eq!(first.data.len(), 2);
        assert_eq!(second.data.len(), 1);
        assert!(first.data.iter().all(|c| c.id != second.data[0].id));
        Ok(())
    }

    #[sqlx::test]
    async fn test_search_wildcards_match_literally(pool: PgPool) -> Result<(), ListCategoriesError> {
        for name in ["100% Cotton", "Tools", "snake_case"] {
            TestCategory::new(name).insert(&pool).await?;
        }

        let percent = handle(
            &pool,
            ListCategoriesQuery {
                search: Some("%".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(percent.meta.total, 1);
        assert_eq!(percent.data[0].name, "100% Cotton");

        let underscore = handle(
            &pool,
            ListCategoriesQuery {
                search: Some("_".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(underscore.meta.total, 1);
        assert_eq!(underscore.data[0].name, "snake_case");
        Ok(())
    }
}
