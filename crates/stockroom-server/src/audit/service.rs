//! Read-facing contract for history views
//!
//! The service always returns records newest first. Views that let users
//! re-sort a fetched page use [`sort_records`] and [`SortState`], which sort
//! in memory without another round trip.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::error::AuditError;
use super::models::{AuditFilter, AuditRecord};
use super::store;
use crate::features::shared::pagination::{Paginated, PaginationParams};

#[derive(Debug, Clone)]
pub struct AuditQueryService {
    pool: PgPool,
}

impl AuditQueryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self))]
    pub async fn list(
        &self,
        filter: &AuditFilter,
        pagination: &PaginationParams,
    ) -> Result<Paginated<AuditRecord>, AuditError> {
        store::query(&self.pool, filter, pagination).await
    }

    /// History feed for one entity type
    #[tracing::instrument(skip(self))]
    pub async fn list_for_entity_type(
        &self,
        table_name: &str,
        page: Option<i64>,
        per_page: Option<i64>,
    ) -> Result<Paginated<AuditRecord>, AuditError> {
        store::query(
            &self.pool,
            &AuditFilter::for_table(table_name),
            &PaginationParams::new(page, per_page),
        )
        .await
    }

    /// History of a single entity instance
    #[tracing::instrument(skip(self))]
    pub async fn list_for_record(
        &self,
        table_name: &str,
        record_id: Uuid,
        page: Option<i64>,
        per_page: Option<i64>,
    ) -> Result<Paginated<AuditRecord>, AuditError> {
        store::query(
            &self.pool,
            &AuditFilter::for_record(table_name, record_id),
            &PaginationParams::new(page, per_page),
        )
        .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<AuditRecord, AuditError> {
        store::get(&self.pool, id).await
    }
}

/// Column a history table can be re-sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    CreatedAt,
    Event,
    /// Actor username; records without a resolved actor sort as ""
    Actor,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Stable in-memory sort of a fetched page
pub fn sort_records(records: &mut [AuditRecord], key: SortKey, direction: SortDirection) {
    records.sort_by(|a, b| {
        let ordering = match key {
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            SortKey::Event => a.event.as_str().cmp(b.event.as_str()),
            SortKey::Actor => actor_name(a).cmp(actor_name(b)),
        };
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

fn actor_name(record: &AuditRecord) -> &str {
    record.user.as_ref().map(|u| u.username.as_str()).unwrap_or("")
}

/// Current sort of a history table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            key: SortKey::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl SortState {
    /// Apply a header click: the active key while ascending flips to
    /// descending, anything else sorts ascending by the clicked key
    #[must_use]
    pub fn request(self, key: SortKey) -> Self {
        let direction = if self.key == key && self.direction == SortDirection::Asc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        Self { key, direction }
    }

    pub fn apply(&self, records: &mut [AuditRecord]) {
        sort_records(records, self.key, self.direction);
    }
}
