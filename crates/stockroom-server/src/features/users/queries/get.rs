use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::features::users::model::{User, USER_COLUMNS};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GetUserQuery {
    pub id: Uuid,
    #[serde(default)]
    pub include_deleted: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum GetUserError {
    #[error("User '{0}' not found")]
    NotFound(Uuid),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<GetUserError> for AppError {
    fn from(err: GetUserError) -> Self {
        match err {
            GetUserError::NotFound(_) => AppError::NotFound(err.to_string()),
            GetUserError::Database(e) => AppError::Database(e),
        }
    }
}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: &PgPool, query: GetUserQuery) -> Result<User, GetUserError> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND ($2::BOOLEAN OR deleted_at IS NULL)"
    ))
    .bind(query.id)
    .bind(query.include_deleted)
    .fetch_optional(pool)
    .await?
    .ok_or(GetUserError::NotFound(query.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::TestUser;

    #[sqlx::test]
    async fn test_get_user_serializes_without_secret(pool: PgPool) -> Result<(), GetUserError> {
        let fixture = TestUser::new("alice").insert(&pool).await?;

        let user = handle(
            &pool,
            GetUserQuery {
                id: fixture.id,
                include_deleted: false,
            },
        )
        .await?;

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["email"], "alice@example.com");
        assert!(json.get("password_hash").is_none());
        Ok(())
    }
}
