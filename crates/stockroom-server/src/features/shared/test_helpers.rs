//! Test helpers and fixtures for database tests
//!
//! Provides utilities to reduce boilerplate in test setup.
//!
//! # Examples
//!
//! ```rust,ignore
//! use stockroom_server::features::shared::test_helpers::*;
//!
//! #[sqlx::test]
//! async fn test_something(pool: PgPool) -> sqlx::Result<()> {
//!     let user = TestUser::new("clerk").with_token("clerk-token").insert(&pool).await?;
//!     let category = TestCategory::new("Tools").insert(&pool).await?;
//!     // ... test logic ...
//!     Ok(())
//! }
//! ```

use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::middleware::auth::hash_token;

/// Builder for creating test users
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role_id: Option<Uuid>,
    pub token: Option<String>,
}

impl TestUser {
    pub fn new(username: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: format!("{}@example.com", username),
            role_id: None,
            token: None,
        }
    }

    pub fn with_role(mut self, role_id: Uuid) -> Self {
        self.role_id = Some(role_id);
        self
    }

    /// Issue a bearer token for the user
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub async fn insert(self, pool: &PgPool) -> sqlx::Result<Self> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, role_id)
            VALUES ($1, $2, $3, 'not-a-real-hash', $4)
            "#,
        )
        .bind(self.id)
        .bind(&self.username)
        .bind(&self.email)
        .bind(self.role_id)
        .execute(pool)
        .await?;

        if let Some(token) = &self.token {
            sqlx::query("INSERT INTO api_tokens (user_id, token_hash) VALUES ($1, $2)")
                .bind(self.id)
                .bind(hash_token(token))
                .execute(pool)
                .await?;
        }

        Ok(self)
    }
}

/// Builder for creating test roles
#[derive(Debug, Clone)]
pub struct TestRole {
    pub id: Uuid,
    pub name: String,
}

impl TestRole {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
        }
    }

    pub async fn insert(self, pool: &PgPool) -> sqlx::Result<Self> {
        sqlx::query("INSERT INTO roles (id, name) VALUES ($1, $2)")
            .bind(self.id)
            .bind(&self.name)
            .execute(pool)
            .await?;
        Ok(self)
    }
}

/// Builder for creating test categories
#[derive(Debug, Clone)]
pub struct TestCategory {
    pub id: Uuid,
    pub name: String,
    pub deleted: bool,
}

impl TestCategory {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            deleted: false,
        }
    }

    /// Insert the category already soft-deleted
    pub fn deleted(mut self) -> Self {
        self.deleted = true;
        self
    }

    pub async fn insert(self, pool: &PgPool) -> sqlx::Result<Self> {
        sqlx::query(
            r#"
            INSERT INTO categories (id, name, deleted_at)
            VALUES ($1, $2, CASE WHEN $3::BOOLEAN THEN NOW() END)
            "#,
        )
        .bind(self.id)
        .bind(&self.name)
        .bind(self.deleted)
        .execute(pool)
        .await?;
        Ok(self)
    }
}

/// Builder for creating test suppliers
#[derive(Debug, Clone)]
pub struct TestSupplier {
    pub id: Uuid,
    pub name: String,
    pub deleted: bool,
}

impl TestSupplier {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            deleted: false,
        }
    }

    pub fn deleted(mut self) -> Self {
        self.deleted = true;
        self
    }

    pub async fn insert(self, pool: &PgPool) -> sqlx::Result<Self> {
        sqlx::query(
            r#"
            INSERT INTO suppliers (id, name, contact_info, deleted_at)
            VALUES ($1, $2, $3, CASE WHEN $4::BOOLEAN THEN NOW() END)
            "#,
        )
        .bind(self.id)
        .bind(&self.name)
        .bind(json!({"email": "sales@example.com"}))
        .bind(self.deleted)
        .execute(pool)
        .await?;
        Ok(self)
    }
}

/// Builder for creating test products
///
/// Inserts its own category and supplier.
#[derive(Debug, Clone)]
pub struct TestProduct {
    pub id: Uuid,
    pub name: String,
    pub deleted: bool,
}

impl TestProduct {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            deleted: false,
        }
    }

    pub fn deleted(mut self) -> Self {
        self.deleted = true;
        self
    }

    pub async fn insert(self, pool: &PgPool) -> sqlx::Result<Self> {
        let category = TestCategory::new(&format!("{} category", self.name)).insert(pool).await?;
        let supplier = TestSupplier::new(&format!("{} supplier", self.name)).insert(pool).await?;

        sqlx::query(
            r#"
            INSERT INTO products (id, name, price, category_id, supplier_id, deleted_at)
            VALUES ($1, $2, 10, $3, $4, CASE WHEN $5::BOOLEAN THEN NOW() END)
            "#,
        )
        .bind(self.id)
        .bind(&self.name)
        .bind(category.id)
        .bind(supplier.id)
        .bind(self.deleted)
        .execute(pool)
        .await?;
        Ok(self)
    }
}

/// Count audit records for one entity
pub async fn audit_count(pool: &PgPool, table_name: &str, record_id: Uuid) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM audit_logs WHERE table_name = $1 AND record_id = $2")
        .bind(table_name)
        .bind(record_id)
        .fetch_one(pool)
        .await
}
