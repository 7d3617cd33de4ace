//! Category entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::audit::Tracked;

/// Longest category name the table accepts
pub const CATEGORY_NAME_MAX_LENGTH: usize = 255;

pub(crate) const CATEGORY_COLUMNS: &str = "id, name, description, metadata, is_active, \
     created_at, updated_at, deleted_at, deleted_by";

/// A product category as stored in `categories`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Free-form attributes
    pub metadata: Option<JsonValue>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<Uuid>,
}

impl Tracked for Category {
    const TABLE: &'static str = "categories";

    fn record_id(&self) -> Uuid {
        self.id
    }
}

impl Category {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Lock a row for the rest of the transaction, deleted or not
    pub(crate) async fn lock(conn: &mut PgConnection, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    /// Lock a row that has not been soft-deleted
    pub(crate) async fn lock_active(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        Ok(Self::lock(conn, id).await?.filter(|c| !c.is_deleted()))
    }
}
