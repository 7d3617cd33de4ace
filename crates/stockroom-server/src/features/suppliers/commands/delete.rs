//! Soft-delete supplier command

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::audit::{AuditContext, AuditError, Change, ChangeInterceptor};
use crate::error::AppError;
use crate::features::suppliers::model::{Supplier, SUPPLIER_COLUMNS};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeleteSupplierCommand {
    pub id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteSupplierError {
    #[error("Supplier '{0}' not found")]
    NotFound(Uuid),
    #[error(transparent)]
    Audit(#[from] AuditError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<DeleteSupplierError> for AppError {
    fn from(err: DeleteSupplierError) -> Self {
        match err {
            DeleteSupplierError::NotFound(_) => AppError::NotFound(err.to_string()),
            DeleteSupplierError::Audit(e) => e.into(),
            DeleteSupplierError::Database(e) => AppError::Database(e),
        }
    }
}

#[tracing::instrument(skip(pool, audit))]
pub async fn handle(
    pool: &PgPool,
    audit: &ChangeInterceptor,
    ctx: &AuditContext,
    command: DeleteSupplierCommand,
) -> Result<Supplier, DeleteSupplierError> {
    let mut tx = pool.begin().await?;

    let before = Supplier::lock_active(&mut tx, command.id)
        .await?
        .ok_or(DeleteSupplierError::NotFound(command.id))?;

    let deleted = sqlx::query_as::<_, Supplier>(&format!(
        r#"
        UPDATE suppliers
        SET deleted_at = NOW(), deleted_by = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING {SUPPLIER_COLUMNS}
        "#
    ))
    .bind(command.id)
    .bind(ctx.actor_id)
    .fetch_one(&mut *tx)
    .await?;

    let staged = audit.stage(&mut tx, ctx, Change::deleted(&before)?).await?;
    tx.commit().await?;
    audit.settle(staged).await;

    tracing::info!(supplier_id = %deleted.id, "Supplier deleted");

    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditConsistency;
    use crate::features::shared::test_helpers::{audit_count, TestSupplier};
    use std::time::Duration;

    #[sqlx::test]
    async fn test_handle_soft_deletes(pool: PgPool) -> Result<(), DeleteSupplierError> {
        let fixture = TestSupplier::new("Acme Wholesale").insert(&pool).await?;
        let audit = ChangeInterceptor::with_settings(pool.clone(), AuditConsistency::Strict, Duration::from_secs(5));

        let supplier = handle(&pool, &audit, &AuditContext::system(), DeleteSupplierCommand { id: fixture.id }).await?;
        assert!(supplier.is_deleted());
        assert_eq!(supplier.deleted_by, None);

        let still_there: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM suppliers WHERE id = $1")
            .bind(fixture.id)
            .fetch_one(&pool)
            .await?;
        assert_eq!(still_there, 1);
        assert_eq!(audit_count(&pool, "suppliers", fixture.id).await?, 1);
        Ok(())
    }
}
