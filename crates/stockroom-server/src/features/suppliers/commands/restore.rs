//! Restore soft-deleted supplier command

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::audit::{AuditContext, AuditError, Change, ChangeInterceptor};
use crate::error::AppError;
use crate::features::suppliers::model::{Supplier, SUPPLIER_COLUMNS};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RestoreSupplierCommand {
    pub id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum RestoreSupplierError {
    #[error("Supplier '{0}' not found")]
    NotFound(Uuid),
    #[error("Supplier '{0}' is not deleted")]
    NotDeleted(Uuid),
    #[error(transparent)]
    Audit(#[from] AuditError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<RestoreSupplierError> for AppError {
    fn from(err: RestoreSupplierError) -> Self {
        match err {
            RestoreSupplierError::NotFound(_) => AppError::NotFound(err.to_string()),
            RestoreSupplierError::NotDeleted(_) => AppError::Conflict(err.to_string()),
            RestoreSupplierError::Audit(e) => e.into(),
            RestoreSupplierError::Database(e) => AppError::Database(e),
        }
    }
}

#[tracing::instrument(skip(pool, audit))]
pub async fn handle(
    pool: &PgPool,
    audit: &ChangeInterceptor,
    ctx: &AuditContext,
    command: RestoreSupplierCommand,
) -> Result<Supplier, RestoreSupplierError> {
    let mut tx = pool.begin().await?;

    let current = Supplier::lock(&mut tx, command.id)
        .await?
        .ok_or(RestoreSupplierError::NotFound(command.id))?;
    if !current.is_deleted() {
        return Err(RestoreSupplierError::NotDeleted(command.id));
    }

    let restored = sqlx::query_as::<_, Supplier>(&format!(
        r#"
        UPDATE suppliers
        SET deleted_at = NULL, deleted_by = NULL, updated_at = NOW()
        WHERE id = $1
        RETURNING {SUPPLIER_COLUMNS}
        "#
    ))
    .bind(command.id)
    .fetch_one(&mut *tx)
    .await?;

    let staged = audit.stage(&mut tx, ctx, Change::restored(&restored)?).await?;
    tx.commit().await?;
    audit.settle(staged).await;

    tracing::info!(supplier_id = %restored.id, "Supplier restored");

    Ok(restored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditConsistency;
    use crate::features::shared::test_helpers::TestSupplier;
    use std::time::Duration;

    #[sqlx::test]
    async fn test_handle_unknown_supplier(pool: PgPool) {
        let audit = ChangeInterceptor::with_settings(pool.clone(), AuditConsistency::Strict, Duration::from_secs(5));
        let result = handle(
            &pool,
            &audit,
            &AuditContext::system(),
            RestoreSupplierCommand { id: Uuid::new_v4() },
        )
        .await;
        assert!(matches!(result, Err(RestoreSupplierError::NotFound(_))));
    }

    #[sqlx::test]
    async fn test_handle_restores(pool: PgPool) -> Result<(), RestoreSupplierError> {
        let fixture = TestSupplier::new("Acme Wholesale").deleted().insert(&pool).await?;
        let audit = ChangeInterceptor::with_settings(pool.clone(), AuditConsistency::Strict, Duration::from_secs(5));

        let supplier = handle(&pool, &audit, &AuditContext::system(), RestoreSupplierCommand { id: fixture.id }).await?;
        assert!(!supplier.is_deleted());
        Ok(())
    }
}
