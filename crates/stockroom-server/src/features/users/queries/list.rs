use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::features::shared::pagination::{Paginated, PaginationError, PaginationParams};
use crate::features::shared::search::contains_pattern;
use crate::features::users::model::{User, USER_COLUMNS};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListUsersQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub include_deleted: bool,
    #[serde(default)]
    pub only_deleted: bool,
    /// Matches username or email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListUsersError {
    #[error(transparent)]
    Pagination(#[from] PaginationError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<ListUsersError> for AppError {
    fn from(err: ListUsersError) -> Self {
        match err {
            ListUsersError::Pagination(e) => AppError::Validation(e.to_string()),
            ListUsersError::Database(e) => AppError::Database(e),
        }
    }
}

impl ListUsersQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.per_page)
    }

    pub fn validate(&self) -> Result<(), ListUsersError> {
        Ok(self.pagination().validate()?)
    }
}

const FILTER_CLAUSE: &str = r#"
    WHERE ($1::BOOLEAN IS NULL OR is_active = $1)
      AND ($2::BOOLEAN OR deleted_at IS NULL)
      AND (NOT $3::BOOLEAN OR deleted_at IS NOT NULL)
      AND ($4::TEXT IS NULL OR username ILIKE $4 ESCAPE '\' OR email ILIKE $4 ESCAPE '\')
      AND ($5::UUID IS NULL OR role_id = $5)
"#;

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: &PgPool, query: ListUsersQuery) -> Result<Paginated<User>, ListUsersError> {
    query.validate()?;

    let pagination = query.pagination();
    let show_deleted = query.include_deleted || query.only_deleted;
    let pattern = contains_pattern(query.search.as_deref());

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM users {FILTER_CLAUSE}"))
        .bind(query.is_active)
        .bind(show_deleted)
        .bind(query.only_deleted)
        .bind(pattern.as_deref())
        .bind(query.role_id)
        .fetch_one(pool)
        .await?;

    let users = sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT {USER_COLUMNS}
        FROM users
        {FILTER_CLAUSE}
        ORDER BY created_at DESC, id
        LIMIT $6 OFFSET $7
        "#
    ))
    .bind(query.is_active)
    .bind(show_deleted)
    .bind(query.only_deleted)
    .bind(pattern.as_deref())
    .bind(query.role_id)
    .bind(pagination.per_page())
    .bind(pagination.offset())
    .fetch_all(pool)
    .await?;

    Ok(Paginated::from_items(users, &pagination, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::{TestRole, TestUser};

    #[sqlx::test]
    async fn test_role_and_search_filters(pool: PgPool) -> Result<(), ListUsersError> {
        let manager = TestRole::new("Manager").insert(&pool).await?;
        TestUser::new("alice").with_role(manager.id).insert(&pool).await?;
        TestUser::new("bob").insert(&pool).await?;
        TestUser::new("carol").with_role(manager.id).insert(&pool).await?;

        let managers = handle(
            &pool,
            ListUsersQuery {
                role_id: Some(manager.id),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(managers.meta.total, 2);

        let found = handle(
            &pool,
            ListUsersQuery {
                search: Some("BOB@".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(found.meta.total, 1);
        assert_eq!(found.data[0].username, "bob");
        Ok(())
    }
}
