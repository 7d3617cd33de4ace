//! Update product command

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

use crate::audit::{AuditContext, AuditError, Change, ChangeInterceptor};
use crate::error::AppError;
use crate::features::products::model::{
    price_in_range, Product, Reference, PRODUCT_COLUMNS, PRODUCT_NAME_MAX_LENGTH,
};
use crate::features::shared::validation::{validate_name, NameValidationError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProductCommand {
    #[serde(default)]
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specifications: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<BigDecimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateProductError {
    #[error("At least one field must be provided for update")]
    NoFieldsToUpdate,
    #[error(transparent)]
    Name(#[from] NameValidationError),
    #[error("Price must be at least 0 and below 10000000000")]
    PriceOutOfRange,
    #[error("Stock cannot be negative")]
    NegativeStock,
    #[error("Specifications must be a JSON object")]
    SpecificationsNotObject,
    #[error("Referenced {0} does not exist or is deleted")]
    UnknownReference(Reference),
    #[error("Product '{0}' not found")]
    NotFound(Uuid),
    #[error(transparent)]
    Audit(#[from] AuditError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<UpdateProductError> for AppError {
    fn from(err: UpdateProductError) -> Self {
        match err {
            UpdateProductError::NotFound(_) => AppError::NotFound(err.to_string()),
            UpdateProductError::Audit(e) => e.into(),
            UpdateProductError::Database(e) => AppError::Database(e),
            _ => AppError::Validation(err.to_string()),
        }
    }
}

impl UpdateProductCommand {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.specifications.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.category_id.is_none()
            && self.supplier_id.is_none()
            && self.is_active.is_none()
    }

    pub fn validate(&self) -> Result<(), UpdateProductError> {
        if self.is_empty() {
            return Err(UpdateProductError::NoFieldsToUpdate);
        }
        if let Some(ref name) = self.name {
            validate_name(name, PRODUCT_NAME_MAX_LENGTH)?;
        }
        if matches!(self.price, Some(ref p) if !price_in_range(p)) {
            return Err(UpdateProductError::PriceOutOfRange);
        }
        if self.stock.is_some_and(|s| s < 0) {
            return Err(UpdateProductError::NegativeStock);
        }
        if matches!(self.specifications, Some(ref s) if !s.is_object()) {
            return Err(UpdateProductError::SpecificationsNotObject);
        }
        Ok(())
    }

    /// References the update moves the product to
    fn new_references(&self, current: &Product) -> Vec<Reference> {
        let category = self
            .category_id
            .filter(|id| *id != current.category_id)
            .map(Reference::Category);
        let supplier = self
            .supplier_id
            .filter(|id| *id != current.supplier_id)
            .map(Reference::Supplier);
        category.into_iter().chain(supplier).collect()
    }
}

/// Handles the update product command
///
/// Only references that actually change are checked, so a product whose
/// category was deleted can still be edited in other ways.
#[tracing::instrument(skip(pool, audit))]
pub async fn handle(
    pool: &PgPool,
    audit: &ChangeInterceptor,
    ctx: &AuditContext,
    command: UpdateProductCommand,
) -> Result<Product, UpdateProductError> {
    command.validate()?;

    let mut tx = pool.begin().await?;

    let before = Product::lock_active(&mut tx, command.id)
        .await?
        .ok_or(UpdateProductError::NotFound(command.id))?;

    for reference in command.new_references(&before) {
        if !reference.is_usable(&mut tx).await? {
            return Err(UpdateProductError::UnknownReference(reference));
        }
    }

    let after = sqlx::query_as::<_, Product>(&format!(
        r#"
        UPDATE products
        SET name = COALESCE($2, name),
            description = COALESCE($3, description),
            specifications = COALESCE($4, specifications),
            price = COALESCE($5, price),
            stock = COALESCE($6, stock),
            category_id = COALESCE($7, category_id),
            supplier_id = COALESCE($8, supplier_id),
            is_active = COALESCE($9, is_active),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {PRODUCT_COLUMNS}
        "#
    ))
    .bind(command.id)
    .bind(command.name.as_deref().map(str::trim))
    .bind(&command.description)
    .bind(&command.specifications)
    .bind(&command.price)
    .bind(command.stock)
    .bind(command.category_id)
    .bind(command.supplier_id)
    .bind(command.is_active)
    .fetch_one(&mut *tx)
    .await?;

    let staged = audit.stage(&mut tx, ctx, Change::updated(&before, &after)?).await?;
    tx.commit().await?;
    audit.settle(staged).await;

    tracing::info!(product_id = %after.id, "Product updated");

    Ok(after)
}
