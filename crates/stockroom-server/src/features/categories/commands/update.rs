//! Update category command
//!
//! Partially updates a category that has not been soft-deleted. Only the
//! fields that are provided change; the rest keep their stored values.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

use crate::audit::{AuditContext, AuditError, Change, ChangeInterceptor};
use crate::error::AppError;
use crate::features::categories::model::{Category, CATEGORY_COLUMNS, CATEGORY_NAME_MAX_LENGTH};
use crate::features::shared::validation::{validate_name, NameValidationError};

/// Command to update an existing category
///
/// # Examples
///
/// ```rust,ignore
/// let command = UpdateCategoryCommand {
///     id,
///     name: None,
///     description: None,
///     metadata: None,
///     is_active: Some(false),
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCategoryCommand {
    #[serde(default)]
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateCategoryError {
    #[error("At least one field must be provided for update")]
    NoFieldsToUpdate,
    #[error(transparent)]
    Name(#[from] NameValidationError),
    #[error("Metadata must be a JSON object")]
    MetadataNotObject,
    #[error("Category '{0}' not found")]
    NotFound(Uuid),
    #[error(transparent)]
    Audit(#[from] AuditError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<UpdateCategoryError> for AppError {
    fn from(err: UpdateCategoryError) -> Self {
        match err {
            UpdateCategoryError::NoFieldsToUpdate
            | UpdateCategoryError::Name(_)
            | UpdateCategoryError::MetadataNotObject => AppError::Validation(err.to_string()),
            UpdateCategoryError::NotFound(_) => AppError::NotFound(err.to_string()),
            UpdateCategoryError::Audit(e) => e.into(),
            UpdateCategoryError::Database(e) => AppError::Database(e),
        }
    }
}

impl UpdateCategoryCommand {
    pub fn validate(&self) -> Result<(), UpdateCategoryError> {
        if self.name.is_none()
            && self.description.is_none()
            && self.metadata.is_none()
            && self.is_active.is_none()
        {
            return Err(UpdateCategoryError::NoFieldsToUpdate);
        }
        if let Some(ref name) = self.name {
            validate_name(name, CATEGORY_NAME_MAX_LENGTH)?;
        }
        if matches!(self.metadata, Some(ref m) if !m.is_object()) {
            return Err(UpdateCategoryError::MetadataNotObject);
        }
        Ok(())
    }
}

#[tracing::instrument(skip(pool, audit))]
pub async fn handle(
    pool: &PgPool,
    audit: &ChangeInterceptor,
    ctx: &AuditContext,
    command: UpdateCategoryCommand,
) -> Result<Category, UpdateCategoryError> {
    command.validate()?;

    let mut tx = pool.begin().await?;

    let before = Category::lock_active(&mut tx, command.id)
        .await?
        .ok_or(UpdateCategoryError::NotFound(command.id))?;

    let after = sqlx::query_as::<_, Category>(&format!(
        r#"
        UPDATE categories
        SET name = COALESCE($2, name),
            description = COALESCE($3, description),
            metadata = COALESCE($4, metadata),
            is_active = COALESCE($5, is_active),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {CATEGORY_COLUMNS}
        "#
    ))
    .bind(command.id)
    .bind(command.name.as_deref().map(str::trim))
    .bind(&command.description)
    .bind(&command.metadata)
    .bind(command.is_active)
    .fetch_one(&mut *tx)
    .await?;

    let staged = audit.stage(&mut tx, ctx, Change::updated(&before, &after)?).await?;
    tx.commit().await?;
    audit.settle(staged).await;

    tracing::info!(category_id = %after.id, "Category updated");

    Ok(after)
}
