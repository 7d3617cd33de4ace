//! User entity
//!
//! The password hash column is never selected, so it cannot leak through
//! responses or audit snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::audit::Tracked;

pub const USERNAME_MAX_LENGTH: usize = 255;

pub(crate) const USER_COLUMNS: &str = "id, username, email, role_id, is_active, \
     created_at, updated_at, deleted_at, deleted_by";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<Uuid>,
}

impl Tracked for User {
    const TABLE: &'static str = "users";

    fn record_id(&self) -> Uuid {
        self.id
    }
}

impl User {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub(crate) async fn lock(conn: &mut PgConnection, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1 FOR UPDATE"))
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    pub(crate) async fn lock_active(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        Ok(Self::lock(conn, id).await?.filter(|u| !u.is_deleted()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_exclude_password_hash() {
        assert!(!USER_COLUMNS.contains("password"));
    }
}
