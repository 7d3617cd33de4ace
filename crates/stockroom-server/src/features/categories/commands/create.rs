//! Create category command

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use crate::audit::{AuditContext, AuditError, Change, ChangeInterceptor};
use crate::error::AppError;
use crate::features::categories::model::{Category, CATEGORY_COLUMNS, CATEGORY_NAME_MAX_LENGTH};
use crate::features::shared::validation::{validate_name, NameValidationError};

/// Command to create a new category
///
/// # Examples
///
/// ```rust,ignore
/// let command = CreateCategoryCommand {
///     name: "Electronics".to_string(),
///     description: Some("Phones, laptops and accessories".to_string()),
///     metadata: None,
///     is_active: None, // defaults to true
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategoryCommand {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub metadata: Option<JsonValue>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateCategoryError {
    #[error(transparent)]
    Name(#[from] NameValidationError),
    #[error("Metadata must be a JSON object")]
    MetadataNotObject,
    #[error(transparent)]
    Audit(#[from] AuditError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<CreateCategoryError> for AppError {
    fn from(err: CreateCategoryError) -> Self {
        match err {
            CreateCategoryError::Name(_) | CreateCategoryError::MetadataNotObject => {
                AppError::Validation(err.to_string())
            },
            CreateCategoryError::Audit(e) => e.into(),
            CreateCategoryError::Database(e) => AppError::Database(e),
        }
    }
}

impl CreateCategoryCommand {
    pub fn validate(&self) -> Result<(), CreateCategoryError> {
        validate_name(&self.name, CATEGORY_NAME_MAX_LENGTH)?;
        if matches!(self.metadata, Some(ref m) if !m.is_object()) {
            return Err(CreateCategoryError::MetadataNotObject);
        }
        Ok(())
    }
}

/// Handles the create category command
///
/// Inserts the category and records a `CREATE` audit entry holding the new
/// row.
#[tracing::instrument(skip(pool, audit))]
pub async fn handle(
    pool: &PgPool,
    audit: &ChangeInterceptor,
    ctx: &AuditContext,
    command: CreateCategoryCommand,
) -> Result<Category, CreateCategoryError> {
    command.validate()?;

    let mut tx = pool.begin().await?;

    let category = sqlx::query_as::<_, Category>(&format!(
        r#"
        INSERT INTO categories (name, description, metadata, is_active)
        VALUES ($1, $2, $3, $4)
        RETURNING {CATEGORY_COLUMNS}
        "#
    ))
    .bind(command.name.trim())
    .bind(&command.description)
    .bind(&command.metadata)
    .bind(command.is_active.unwrap_or(true))
    .fetch_one(&mut *tx)
    .await?;

    let staged = audit.stage(&mut tx, ctx, Change::created(&category)?).await?;
    tx.commit().await?;
    audit.settle(staged).await;

    tracing::info!(category_id = %category.id, "Category created");

    Ok(category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditConsistency;
    use crate::features::shared::test_helpers::audit_count;
    use serde_json::json;
    use std::time::Duration;

    fn command(name: &str) -> CreateCategoryCommand {
        CreateCategoryCommand {
            name: name.to_string(),
            description: None,
            metadata: None,
            is_active: None,
        }
    }

    fn interceptor(pool: &PgPool) -> ChangeInterceptor {
        ChangeInterceptor::with_settings(pool.clone(), AuditConsistency::Strict, Duration::from_secs(5))
    }

    #[test]
    fn test_validation_success() {
        let mut cmd = command("Electronics");
        cmd.metadata = Some(json!({"aisle": 4}));
        assert!(cmd.validate().is_ok());
    }

    #[test]
    fn test_validation_empty_name() {
        assert!(matches!(
            command("  ").validate(),
            Err(CreateCategoryError::Name(NameValidationError::Required))
        ));
    }

    #[test]
    fn test_validation_name_too_long() {
        assert!(matches!(
            command(&"x".repeat(256)).validate(),
            Err(CreateCategoryError::Name(NameValidationError::TooLong { .. }))
        ));
    }

    #[test]
    fn test_validation_metadata_must_be_object() {
        let mut cmd = command("Electronics");
        cmd.metadata = Some(json!([1, 2]));
        assert!(matches!(cmd.validate(), Err(CreateCategoryError::MetadataNotObject)));
    }

    #[sqlx::test]
    async fn test_handle_creates_category_and_audit_record(pool: PgPool) -> Result<(), CreateCategoryError> {
        let category = handle(&pool, &interceptor(&pool), &AuditContext::system(), command("Electronics")).await?;

        assert_eq!(category.name, "Electronics");
        assert!(category.is_active);
        assert!(!category.is_deleted());
        assert_eq!(audit_count(&pool, "categories", category.id).await?, 1);
        Ok(())
    }

    #[sqlx::test]
    async fn test_handle_invalid_command_writes_nothing(pool: PgPool) -> Result<(), CreateCategoryError> {
        let result = handle(&pool, &interceptor(&pool), &AuditContext::system(), command("")).await;
        assert!(result.is_err());

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_logs").fetch_one(&pool).await?;
        assert_eq!(total, 0);
        Ok(())
    }
}
