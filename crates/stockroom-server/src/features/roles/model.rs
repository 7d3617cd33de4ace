//! Role entity
//!
//! Roles are plain data here; what a role may do is decided elsewhere.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::audit::Tracked;

pub const ROLE_NAME_MAX_LENGTH: usize = 100;

/// Roles created at startup when missing
pub const DEFAULT_ROLES: [&str; 3] = ["Administrator", "Manager", "Staff"];

pub(crate) const ROLE_COLUMNS: &str =
    "id, name, is_active, created_at, updated_at, deleted_at, deleted_by";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<Uuid>,
}

impl Tracked for Role {
    const TABLE: &'static str = "roles";

    fn record_id(&self) -> Uuid {
        self.id
    }
}

impl Role {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub(crate) async fn lock(conn: &mut PgConnection, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!("SELECT {ROLE_COLUMNS} FROM roles WHERE id = $1 FOR UPDATE"))
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    pub(crate) async fn lock_active(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        Ok(Self::lock(conn, id).await?.filter(|r| !r.is_deleted()))
    }
}
