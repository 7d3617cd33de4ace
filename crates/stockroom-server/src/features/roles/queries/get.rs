use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::features::roles::model::{Role, ROLE_COLUMNS};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GetRoleQuery {
    pub id: Uuid,
    #[serde(default)]
    pub include_deleted: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum GetRoleError {
    #[error("Role '{0}' not found")]
    NotFound(Uuid),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<GetRoleError> for AppError {
    fn from(err: GetRoleError) -> Self {
        match err {
            GetRoleError::NotFound(_) => AppError::NotFound(err.to_string()),
            GetRoleError::Database(e) => AppError::Database(e),
        }
    }
}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: &PgPool, query: GetRoleQuery) -> Result<Role, GetRoleError> {
    sqlx::query_as::<_, Role>(&format!(
        "SELECT {ROLE_COLUMNS} FROM roles WHERE id = $1 AND ($2::BOOLEAN OR deleted_at IS NULL)"
    ))
    .bind(query.id)
    .bind(query.include_deleted)
    .fetch_optional(pool)
    .await?
    .ok_or(GetRoleError::NotFound(query.id))
}
