//! Create supplier command

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use crate::audit::{AuditContext, AuditError, Change, ChangeInterceptor};
use crate::error::AppError;
use crate::features::shared::validation::{is_json_object, validate_name, NameValidationError};
use crate::features::suppliers::model::{Supplier, SUPPLIER_COLUMNS, SUPPLIER_NAME_MAX_LENGTH};

/// Command to register a supplier
///
/// # Examples
///
/// ```rust,ignore
/// let command = CreateSupplierCommand {
///     name: "Acme Wholesale".to_string(),
///     contact_info: json!({ "email": "orders@acme.test", "phone": "+1 555 0100" }),
///     is_active: None,
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSupplierCommand {
    pub name: String,
    pub contact_info: JsonValue,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateSupplierError {
    #[error(transparent)]
    Name(#[from] NameValidationError),
    #[error("Contact info must be a JSON object")]
    ContactInfoNotObject,
    #[error(transparent)]
    Audit(#[from] AuditError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<CreateSupplierError> for AppError {
    fn from(err: CreateSupplierError) -> Self {
        match err {
            CreateSupplierError::Name(_) | CreateSupplierError::ContactInfoNotObject => {
                AppError::Validation(err.to_string())
            },
            CreateSupplierError::Audit(e) => e.into(),
            CreateSupplierError::Database(e) => AppError::Database(e),
        }
    }
}

impl CreateSupplierCommand {
    pub fn validate(&self) -> Result<(), CreateSupplierError> {
        validate_name(&self.name, SUPPLIER_NAME_MAX_LENGTH)?;
        if !is_json_object(&self.contact_info) {
            return Err(CreateSupplierError::ContactInfoNotObject);
        }
        Ok(())
    }
}

#[tracing::instrument(skip(pool, audit))]
pub async fn handle(
    pool: &PgPool,
    audit: &ChangeInterceptor,
    ctx: &AuditContext,
    command: CreateSupplierCommand,
) -> Result<Supplier, CreateSupplierError> {
    command.validate()?;

    let mut tx = pool.begin().await?;

    let supplier = sqlx::query_as::<_, Supplier>(&format!(
        r#"
        INSERT INTO suppliers (name, contact_info, is_active)
        VALUES ($1, $2, $3)
        RETURNING {SUPPLIER_COLUMNS}
        "#
    ))
    .bind(command.name.trim())
    .bind(&command.contact_info)
    .bind(command.is_active.unwrap_or(true))
    .fetch_one(&mut *tx)
    .await?;

    let staged = audit.stage(&mut tx, ctx, Change::created(&supplier)?).await?;
    tx.commit().await?;
    audit.settle(staged).await;

    tracing::info!(supplier_id = %supplier.id, "Supplier created");

    Ok(supplier)
}
