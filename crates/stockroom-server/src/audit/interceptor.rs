//! Turns entity changes into audit records
//!
//! Commands call [`ChangeInterceptor::stage`] inside their transaction and
//! [`ChangeInterceptor::settle`] after commit:
//!
//! ```rust,ignore
//! let mut tx = pool.begin().await?;
//! let category = insert_category(&mut tx, &command).await?;
//! let staged = audit.stage(&mut tx, ctx, Change::created(&category)?).await?;
//! tx.commit().await?;
//! audit.settle(staged).await;
//! ```
//!
//! With [`AuditConsistency::Strict`] the record is written by `stage` on the
//! transaction connection, so an audit failure rolls the mutation back. With
//! [`AuditConsistency::BestEffort`] `stage` only prepares the record and
//! `settle` writes it once the mutation is durable; a failure there is
//! logged and swallowed.

use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, error};

use super::change::Change;
use super::context::AuditContext;
use super::error::AuditError;
use super::models::{AuditRecord, NewAuditRecord};
use super::store;
use crate::config::AuditConfig;

/// Whether an audit failure may fail the mutation that caused it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditConsistency {
    /// Write after commit; failures are logged and never reach the caller
    #[default]
    BestEffort,
    /// Write inside the mutation transaction; failures roll it back
    Strict,
}

impl AuditConsistency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BestEffort => "best_effort",
            Self::Strict => "strict",
        }
    }
}

impl std::fmt::Display for AuditConsistency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AuditConsistency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "best_effort" => Ok(Self::BestEffort),
            "strict" => Ok(Self::Strict),
            other => Err(format!(
                "Invalid audit consistency: {}. Must be one of: best_effort, strict",
                other
            )),
        }
    }
}

/// Outcome of [`ChangeInterceptor::stage`], to be passed to
/// [`ChangeInterceptor::settle`] after commit
#[derive(Debug)]
#[must_use = "a staged audit record must be settled after commit"]
pub enum StagedAudit {
    /// Already written inside the transaction
    Written(AuditRecord),
    /// Waiting for the mutation to commit
    Pending(NewAuditRecord),
}

#[derive(Debug, Clone)]
pub struct ChangeInterceptor {
    pool: PgPool,
    consistency: AuditConsistency,
    write_timeout: Duration,
}

impl ChangeInterceptor {
    pub fn new(pool: PgPool, config: &AuditConfig) -> Self {
        Self::with_settings(pool, config.consistency, config.write_timeout())
    }

    pub fn with_settings(pool: PgPool, consistency: AuditConsistency, write_timeout: Duration) -> Self {
        Self {
            pool,
            consistency,
            write_timeout,
        }
    }

    pub fn consistency(&self) -> AuditConsistency {
        self.consistency
    }

    /// Capture one change inside the mutation transaction
    ///
    /// Produces exactly one record per call. Only strict mode touches the
    /// database here.
    pub async fn stage(
        &self,
        conn: &mut PgConnection,
        ctx: &AuditContext,
        change: Change,
    ) -> Result<StagedAudit, AuditError> {
        let record = change.into_record(ctx);
        record.validate()?;

        match self.consistency {
            AuditConsistency::Strict => {
                let written = tokio::time::timeout(self.write_timeout, store::append(&mut *conn, &record))
                    .await
                    .map_err(|_| AuditError::Timeout(self.write_timeout))??;
                Ok(StagedAudit::Written(written))
            },
            AuditConsistency::BestEffort => Ok(StagedAudit::Pending(record)),
        }
    }

    /// Finish a staged record once the mutation has committed
    ///
    /// A pending write runs on its own task, so it still completes if the
    /// request that triggered it is dropped. Returns `None` when the write
    /// failed; the failure is logged.
    pub async fn settle(&self, staged: StagedAudit) -> Option<AuditRecord> {
        let record = match staged {
            StagedAudit::Written(record) => return Some(record),
            StagedAudit::Pending(record) => record,
        };

        let event = record.event;
        let table_name = record.table_name.clone();
        let record_id = record.record_id;

        let pool = self.pool.clone();
        let limit = self.write_timeout;
        let write = tokio::spawn(async move {
            tokio::time::timeout(limit, store::append(&pool, &record))
                .await
                .map_err(|_| AuditError::Timeout(limit))?
        });

        match write.await {
            Ok(Ok(stored)) => {
                debug!(audit_id = %stored.id, %event, %table_name, %record_id, "Audit record settled");
                Some(stored)
            },
            Ok(Err(e)) => {
                error!(error = %e, %event, %table_name, %record_id, "Failed to write audit record");
                None
            },
            Err(e) => {
                error!(error = %e, %event, %table_name, %record_id, "Audit write task did not complete");
                None
            },
        }
    }
}
