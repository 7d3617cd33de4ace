//! Supplier entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::audit::Tracked;

pub const SUPPLIER_NAME_MAX_LENGTH: usize = 255;

pub(crate) const SUPPLIER_COLUMNS: &str = "id, name, contact_info, is_active, \
     created_at, updated_at, deleted_at, deleted_by";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    /// Phone numbers, addresses and the like, as a JSON object
    pub contact_info: JsonValue,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<Uuid>,
}

impl Tracked for Supplier {
    const TABLE: &'static str = "suppliers";

    fn record_id(&self) -> Uuid {
        self.id
    }
}

impl Supplier {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub(crate) async fn lock(conn: &mut PgConnection, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    pub(crate) async fn lock_active(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        Ok(Self::lock(conn, id).await?.filter(|s| !s.is_deleted()))
    }
}
