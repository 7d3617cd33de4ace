use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::AppError;
use crate::features::roles::model::{Role, ROLE_COLUMNS};
use crate::features::shared::pagination::{Paginated, PaginationError, PaginationParams};
use crate::features::shared::search::contains_pattern;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListRolesQuery {
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
pub enum ListRolesError {
    #[error(transparent)]
    Pagination(#[from] PaginationError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<ListRolesError> for AppError {
    fn from(err: ListRolesError) -> Self {
        match err {
            ListRolesError::Pagination(e) => AppError::Validation(e.to_string()),
            ListRolesError::Database(e) => AppError::Database(e),
        }
    }
}

impl ListRolesQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.per_page)
    }

    pub fn validate(&self) -> Result<(), ListRolesError> {
        Ok(self.pagination().validate()?)
    }
}

const FILTER_CLAUSE: &str = r#"
    WHERE ($1::BOOLEAN IS NULL OR is_active = $1)
      AND ($2::BOOLEAN OR deleted_at IS NULL)
      AND (NOT $3::BOOLEAN OR deleted_at IS NOT NULL)
      AND ($4::TEXT IS NULL OR name ILIKE $4 ESCAPE '\')
"#;

/// Roles are listed by name, unlike the other resources
#[tracing::instrument(skip(pool))]
pub async fn handle(pool: &PgPool, query: ListRolesQuery) -> Result<Paginated<Role>, ListRolesError> {
    query.validate()?;

    let pagination = query.pagination();
    let show_deleted = query.include_deleted || query.only_deleted;
    let name_pattern = contains_pattern(query.search.as_deref());

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM roles {FILTER_CLAUSE}"))
        .bind(query.is_active)
        .bind(show_deleted)
        .bind(query.only_deleted)
        .bind(name_pattern.as_deref())
        .fetch_one(pool)
        .await?;

    let roles = sqlx::query_as::<_, Role>(&format!(
        "SELECT {ROLE_COLUMNS} FROM roles {FILTER_CLAUSE} ORDER BY name LIMIT $5 OFFSET $6"
    ))
    .bind(query.is_active)
    .bind(show_deleted)
    .bind(query.only_deleted)
    .bind(name_pattern.as_deref())
    .bind(pagination.per_page())
    .bind(pagination.offset())
    .fetch_all(pool)
    .await?;

    Ok(Paginated::from_items(roles, &pagination, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::TestRole;

    #[sqlx::test]
    async fn test_roles_sorted_by_name(pool: PgPool) -> Result<(), ListRolesError> {
        for name in ["Staff", "Administrator", "Manager"] {
            TestRole::new(name).insert(&pool).await?;
        }

        let page = handle(&pool, ListRolesQuery::default()).await?;
        let names: Vec<&str> = page.data.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Administrator", "Manager", "Staff"]);
        Ok(())
    }
}
