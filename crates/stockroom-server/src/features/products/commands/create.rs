//! Create product command

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

/// Command to add a product to the catalog
///
/// # Examples
///
/// ```rust,ignore
/// let command = CreateProductCommand {
///     name: "USB-C cable".to_string(),
///     description: None,
///     specifications: Some(json!({ "length_m": 2 })),
///     price: BigDecimal::from_str("9.99")?,
///     stock: Some(40),
///     category_id,
///     supplier_id,
///     is_active: None,
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProductCommand {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub specifications: Option<JsonValue>,
    pub price: BigDecimal,
    #[serde(default)]
    pub stock: Option<i32>,
    pub category_id: Uuid,
    pub supplier_id: Uuid,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateProductError {
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
    #[error(transparent)]
    Audit(#[from] AuditError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<CreateProductError> for AppError {
    fn from(err: CreateProductError) -> Self {
        match err {
            CreateProductError::Audit(e) => e.into(),
            CreateProductError::Database(e) => AppError::Database(e),
            _ => AppError::Validation(err.to_string()),
        }
    }
}

impl CreateProductCommand {
    pub fn validate(&self) -> Result<(), CreateProductError> {
        validate_name(&self.name, PRODUCT_NAME_MAX_LENGTH)?;
        if !price_in_range(&self.price) {
            return Err(CreateProductError::PriceOutOfRange);
        }
        if self.stock.is_some_and(|s| s < 0) {
            return Err(CreateProductError::NegativeStock);
        }
        if matches!(self.specifications, Some(ref s) if !s.is_object()) {
            return Err(CreateProductError::SpecificationsNotObject);
        }
        Ok(())
    }
}

#[tracing::instrument(skip(pool, audit))]
pub async fn handle(
    pool: &PgPool,
    audit: &ChangeInterceptor,
    ctx: &AuditContext,
    command: CreateProductCommand,
) -> Result<Product, CreateProductError> {
    command.validate()?;

    let mut tx = pool.begin().await?;

    for reference in [
        Reference::Category(command.category_id),
        Reference::Supplier(command.supplier_id),
    ] {
        if !reference.is_usable(&mut tx).await? {
            return Err(CreateProductError::UnknownReference(reference));
        }
    }

    let product = sqlx::query_as::<_, Product>(&format!(
        r#"
        INSERT INTO products
            (name, description, specifications, price, stock, category_id, supplier_id, is_active)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {PRODUCT_COLUMNS}
        "#
    ))
    .bind(command.name.trim())
    .bind(&command.description)
    .bind(&command.specifications)
    .bind(&command.price)
    .bind(command.stock.unwrap_or(0))
    .bind(command.category_id)
    .bind(command.supplier_id)
    .bind(command.is_active.unwrap_or(true))
    .fetch_one(&mut *tx)
    .await?;

    let staged = audit.stage(&mut tx, ctx, Change::created(&product)?).await?;
    tx.commit().await?;
    audit.settle(staged).await;

    tracing::info!(product_id = %product.id, "Product created");

    Ok(product)
}
