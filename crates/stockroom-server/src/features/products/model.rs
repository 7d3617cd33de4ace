//! Product entity

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::audit::Tracked;

pub const PRODUCT_NAME_MAX_LENGTH: usize = 255;

/// Exclusive upper bound of a price, from the `NUMERIC(12, 2)` column
pub const PRICE_LIMIT: i64 = 10_000_000_000;

pub(crate) const PRODUCT_COLUMNS: &str = "id, name, description, specifications, price, stock, \
     category_id, supplier_id, is_active, created_at, updated_at, deleted_at, deleted_by";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub specifications: Option<JsonValue>,
    /// Serialized as a decimal string
    pub price: BigDecimal,
    pub stock: i32,
    pub category_id: Uuid,
    pub supplier_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<Uuid>,
}

impl Tracked for Product {
    const TABLE: &'static str = "products";

    fn record_id(&self) -> Uuid {
        self.id
    }
}

impl Product {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub(crate) async fn lock(conn: &mut PgConnection, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    pub(crate) async fn lock_active(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        Ok(Self::lock(conn, id).await?.filter(|p| !p.is_deleted()))
    }

    /// Whether the product exists and is not soft-deleted
    ///
    /// Takes a share lock so the product cannot be deleted before the
    /// surrounding transaction commits.
    pub(crate) async fn is_live(conn: &mut PgConnection, id: Uuid) -> Result<bool, sqlx::Error> {
        let found: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM products WHERE id = $1 AND deleted_at IS NULL FOR SHARE",
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;
        Ok(found.is_some())
    }
}

/// Check a price fits the column and is not negative
pub fn price_in_range(price: &BigDecimal) -> bool {
    *price >= BigDecimal::from(0) && *price < BigDecimal::from(PRICE_LIMIT)
}

/// A category or supplier a product points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
    Category(Uuid),
    Supplier(Uuid),
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Category(id) => write!(f, "category '{}'", id),
            Self::Supplier(id) => write!(f, "supplier '{}'", id),
        }
    }
}

impl Reference {
    /// Whether the referenced row exists and is not soft-deleted
    ///
    /// Takes a share lock so the row cannot be deleted before the
    /// surrounding transaction commits.
    pub(crate) async fn is_usable(&self, conn: &mut PgConnection) -> Result<bool, sqlx::Error> {
        let (sql, id) = match self {
            Self::Category(id) => (
                "SELECT id FROM categories WHERE id = $1 AND deleted_at IS NULL FOR SHARE",
                *id,
            ),
            Self::Supplier(id) => (
                "SELECT id FROM suppliers WHERE id = $1 AND deleted_at IS NULL FOR SHARE",
                *id,
            ),
        };

        let found: Option<Uuid> = sqlx::query_scalar(sql).bind(id).fetch_optional(conn).await?;
        Ok(found.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_price_in_range() {
        assert!(price_in_range(&BigDecimal::from(0)));
        assert!(price_in_range(&BigDecimal::from_str("19.99").unwrap()));
        assert!(price_in_range(&BigDecimal::from_str("9999999999.99").unwrap()));
        assert!(!price_in_range(&BigDecimal::from_str("-0.01").unwrap()));
        assert!(!price_in_range(&BigDecimal::from(PRICE_LIMIT)));
    }

    #[test]
    fn test_reference_display() {
        let id = Uuid::nil();
        assert_eq!(
            Reference::Supplier(id).to_string(),
            "supplier '00000000-0000-0000-0000-000000000000'"
        );
    }
}
