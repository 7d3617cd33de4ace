//! Update supplier command

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

use crate::audit::{AuditContext, AuditError, Change, ChangeInterceptor};
use crate::error::AppError;
use crate::features::shared::validation::{is_json_object, validate_name, NameValidationError};
use crate::features::suppliers::model::{Supplier, SUPPLIER_COLUMNS, SUPPLIER_NAME_MAX_LENGTH};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSupplierCommand {
    #[serde(default)]
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Replaces the stored contact info as a whole
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateSupplierError {
    #[error("At least one field must be provided for update")]
    NoFieldsToUpdate,
    #[error(transparent)]
    Name(#[from] NameValidationError),
    #[error("Contact info must be a JSON object")]
    ContactInfoNotObject,
    #[error("Supplier '{0}' not found")]
    NotFound(Uuid),
    #[error(transparent)]
    Audit(#[from] AuditError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<UpdateSupplierError> for AppError {
    fn from(err: UpdateSupplierError) -> Self {
        match err {
            UpdateSupplierError::NoFieldsToUpdate
            | UpdateSupplierError::Name(_)
            | UpdateSupplierError::ContactInfoNotObject => AppError::Validation(err.to_string()),
            UpdateSupplierError::NotFound(_) => AppError::NotFound(err.to_string()),
            UpdateSupplierError::Audit(e) => e.into(),
            UpdateSupplierError::Database(e) => AppError::Database(e),
        }
    }
}

impl UpdateSupplierCommand {
    pub fn validate(&self) -> Result<(), UpdateSupplierError> {
        if self.name.is_none() && self.contact_info.is_none() && self.is_active.is_none() {
            return Err(UpdateSupplierError::NoFieldsToUpdate);
        }
        if let Some(ref name) = self.name {
            validate_name(name, SUPPLIER_NAME_MAX_LENGTH)?;
        }
        if matches!(self.contact_info, Some(ref info) if !is_json_object(info)) {
            return Err(UpdateSupplierError::ContactInfoNotObject);
        }
        Ok(())
    }
}

#[tracing::instrument(skip(pool, audit))]
pub async fn handle(
    pool: &PgPool,
    audit: &ChangeInterceptor,
    ctx: &AuditContext,
    command: UpdateSupplierCommand,
) -> Result<Supplier, UpdateSupplierError> {
    command.validate()?;

    let mut tx = pool.begin().await?;

    let before = Supplier::lock_active(&mut tx, command.id)
        .await?
        .ok_or(UpdateSupplierError::NotFound(command.id))?;

    let after = sqlx::query_as::<_, Supplier>(&format!(
        r#"
        UPDATE suppliers
        SET name = COALESCE($2, name),
            contact_info = COALESCE($3, contact_info),
            is_active = COALESCE($4, is_active),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {SUPPLIER_COLUMNS}
        "#
    ))
    .bind(command.id)
    .bind(command.name.as_deref().map(str::trim))
    .bind(&command.contact_info)
    .bind(command.is_active)
    .fetch_one(&mut *tx)
    .await?;

    let staged = audit.stage(&mut tx, ctx, Change::updated(&before, &after)?).await?;
    tx.commit().await?;
    audit.settle(staged).await;

    tracing::info!(supplier_id = %after.id, "Supplier updated");

    Ok(after)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditConsistency;
    use crate::features::shared::test_helpers::{audit_count, TestSupplier};
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_validation_requires_a_field() {
        let cmd = UpdateSupplierCommand {
            id: Uuid::new_v4(),
            name: None,
            contact_info: None,
            is_active: None,
        };
        assert!(matches!(cmd.validate(), Err(UpdateSupplierError::NoFieldsToUpdate)));
    }

    #[sqlx::test]
    async fn test_handle_replaces_contact_info(pool: PgPool) -> Result<(), UpdateSupplierError> {
        let fixture = TestSupplier::new("Acme Wholesale").insert(&pool).await?;
        let audit = ChangeInterceptor::with_settings(pool.clone(), AuditConsistency::Strict, Duration::from_secs(5));
        let cmd = UpdateSupplierCommand {
            id: fixture.id,
            name: None,
            contact_info: Some(json!({"phone": "555-0199"})),
            is_active: None,
        };

        let supplier = handle(&pool, &audit, &AuditContext::system(), cmd).await?;

        assert_eq!(supplier.contact_info, json!({"phone": "555-0199"}));
        assert_eq!(supplier.name, "Acme Wholesale");
        assert_eq!(audit_count(&pool, "suppliers", fixture.id).await?, 1);
        Ok(())
    }
}
