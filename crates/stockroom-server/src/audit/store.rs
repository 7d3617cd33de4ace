//! Append-only persistence for audit records
//!
//! Writes go through [`append`], which accepts any Postgres executor so the
//! insert can share the mutation's transaction. There is no update or
//! delete path, and the table's trigger rejects both.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};
use tracing::debug;
use uuid::Uuid;

use super::error::AuditError;
use super::models::{ActorSummary, AuditFilter, AuditRecord, FieldMap, NewAuditRecord};
use crate::features::shared::pagination::{Paginated, PaginationParams};

const RECORD_COLUMNS: &str = r#"
    a.id, a.event, a.table_name, a.record_id, a.old_values, a.new_values,
    a.user_id, a.ip_address, a.user_agent, a.created_at,
    u.id AS actor_id, u.username AS actor_username
"#;

const FILTER_CLAUSE: &str = r#"
    WHERE ($1::TEXT IS NULL OR a.table_name = $1)
      AND ($2::TEXT IS NULL OR a.event = $2)
      AND ($3::UUID IS NULL OR a.user_id = $3)
      AND ($4::UUID IS NULL OR a.record_id = $4)
"#;

#[derive(Debug, sqlx::FromRow)]
struct AuditRow {
    id: Uuid,
    event: String,
    table_name: String,
    record_id: Uuid,
    old_values: Option<Json<FieldMap>>,
    new_values: Option<Json<FieldMap>>,
    user_id: Option<Uuid>,
    ip_address: Option<String>,
    user_agent: Option<String>,
    created_at: DateTime<Utc>,
    actor_id: Option<Uuid>,
    actor_username: Option<String>,
}

impl TryFrom<AuditRow> for AuditRecord {
    type Error = AuditError;

    fn try_from(row: AuditRow) -> Result<Self, Self::Error> {
        let event = row
            .event
            .parse()
            .map_err(|_| AuditError::Corrupt(format!("unknown event '{}' on {}", row.event, row.id)))?;

        let user = match (row.actor_id, row.actor_username) {
            (Some(id), Some(username)) => Some(ActorSummary { id, username }),
            _ => None,
        };

        Ok(AuditRecord {
            id: row.id,
            event,
            table_name: row.table_name,
            record_id: row.record_id,
            old_values: row.old_values.map(|Json(map)| map),
            new_values: row.new_values.map(|Json(map)| map),
            user_id: row.user_id,
            ip_address: row.ip_address,
            user_agent: row.user_agent,
            created_at: row.created_at,
            user,
        })
    }
}

/// Append one record; `id`, `created_at` and the ordering sequence are
/// assigned by the database
pub async fn append<'e, E>(executor: E, record: &NewAuditRecord) -> Result<AuditRecord, AuditError>
where
    E: PgExecutor<'e>,
{
    record.validate()?;

    let sql = format!(
        r#"
        WITH a AS (
            INSERT INTO audit_logs (
                event, table_name, record_id, old_values, new_values,
                user_id, ip_address, user_agent
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
        )
        SELECT {RECORD_COLUMNS}
        FROM a
        LEFT JOIN users u ON u.id = a.user_id
        "#
    );

    let row = sqlx::query_as::<_, AuditRow>(&sql)
        .bind(record.event.as_str())
        .bind(&record.table_name)
        .bind(record.record_id)
        .bind(record.old_values.as_ref().map(Json))
        .bind(record.new_values.as_ref().map(Json))
        .bind(record.user_id)
        .bind(&record.ip_address)
        .bind(&record.user_agent)
        .fetch_one(executor)
        .await?;

    let stored = AuditRecord::try_from(row)?;

    debug!(
        audit_id = %stored.id,
        event = %stored.event,
        table_name = %stored.table_name,
        record_id = %stored.record_id,
        "Appended audit record"
    );

    Ok(stored)
}

/// Fetch one record with its actor resolved
pub async fn get(pool: &PgPool, id: Uuid) -> Result<AuditRecord, AuditError> {
    let sql = format!(
        r#"
        SELECT {RECORD_COLUMNS}
        FROM audit_logs a
        LEFT JOIN users u ON u.id = a.user_id
        WHERE a.id = $1
        "#
    );

    let row = sqlx::query_as::<_, AuditRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AuditError::NotFound(id))?;

    AuditRecord::try_from(row)
}

/// Filtered, paginated, newest-first listing
pub async fn query(
    pool: &PgPool,
    filter: &AuditFilter,
    pagination: &PaginationParams,
) -> Result<Paginated<AuditRecord>, AuditError> {
    filter.validate()?;
    pagination.validate()?;

    let event = filter.event.map(|e| e.as_str());

    let count_sql = format!("SELECT COUNT(*) FROM audit_logs a {FILTER_CLAUSE}");
    let total: i64 = sqlx::query_scalar(&count_sql)
        .bind(filter.table_name.as_deref())
        .bind(event)
        .bind(filter.user_id)
        .bind(filter.record_id)
        .fetch_one(pool)
        .await?;

    let list_sql = format!(
        r#"
        SELECT {RECORD_COLUMNS}
        FROM audit_logs a
        LEFT JOIN users u ON u.id = a.user_id
        {FILTER_CLAUSE}
        ORDER BY a.created_at DESC, a.sequence DESC
        LIMIT $5
        OFFSET $6
        "#
    );

    let rows = sqlx::query_as::<_, AuditRow>(&list_sql)
        .bind(filter.table_name.as_deref())
        .bind(event)
        .bind(filter.user_id)
        .bind(filter.record_id)
        .bind(pagination.per_page())
        .bind(pagination.offset())
        .fetch_all(pool)
        .await?;

    let records = rows
        .into_iter()
        .map(AuditRecord::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    debug!(count = records.len(), total, "Queried audit logs");

    Ok(Paginated::from_items(records, pagination, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::models::AuditEvent;
    use crate::features::shared::test_helpers::TestUser;
    use serde_json::json;

    fn new_record(table_name: &str, record_id: Uuid, event: AuditEvent) -> NewAuditRecord {
        NewAuditRecord {
            event,
            table_name: table_name.to_string(),
            record_id,
            old_values: None,
            new_values: Some(FieldMap::from_iter([("name".to_string(), json!("Tools"))])),
            user_id: None,
            ip_address: Some("127.0.0.1".to_string()),
            user_agent: Some("Test Agent".to_string()),
        }
    }

    #[sqlx::test]
    async fn test_append_assigns_id_and_timestamp(pool: PgPool) -> Result<(), AuditError> {
        let record_id = Uuid::new_v4();
        let stored = append(&pool, &new_record("categories", record_id, AuditEvent::Create)).await?;

        assert_eq!(stored.event, AuditEvent::Create);
        assert_eq!(stored.table_name, "categories");
        assert_eq!(stored.record_id, record_id);
        assert_eq!(stored.new_values.unwrap()["name"], json!("Tools"));
        assert!(stored.old_values.is_none());
        assert!(stored.user.is_none());
        Ok(())
    }

    #[sqlx::test]
    async fn test_append_resolves_actor(pool: PgPool) -> Result<(), AuditError> {
        let user = TestUser::new("auditor").insert(&pool).await?;
        let mut record = new_record("roles", Uuid::new_v4(), AuditEvent::Update);
        record.user_id = Some(user.id);

        let stored = append(&pool, &record).await?;
        assert_eq!(
            stored.user,
            Some(ActorSummary {
                id: user.id,
                username: "auditor".to_string()
            })
        );
        Ok(())
    }

    #[sqlx::test]
    async fn test_append_rejects_empty_table_name(pool: PgPool) -> Result<(), AuditError> {
        let result = append(&pool, &new_record("", Uuid::new_v4(), AuditEvent::Create)).await;
        assert!(matches!(result, Err(AuditError::Validation(_))));
        Ok(())
    }

    #[sqlx::test]
    async fn test_records_cannot_be_modified(pool: PgPool) -> Result<(), AuditError> {
        let stored = append(&pool, &new_record("categories", Uuid::new_v4(), AuditEvent::Create)).await?;

        let update = sqlx::query("UPDATE audit_logs SET table_name = 'x' WHERE id = $1")
            .bind(stored.id)
            .execute(&pool)
            .await;
        assert!(update.is_err());

        let delete = sqlx::query("DELETE FROM audit_logs WHERE id = $1")
            .bind(stored.id)
            .execute(&pool)
            .await;
        assert!(delete.is_err());

        assert_eq!(get(&pool, stored.id).await?, stored);
        Ok(())
    }

    #[sqlx::test]
    async fn test_get_unknown_id_is_not_found(pool: PgPool) -> Result<(), AuditError> {
        let id = Uuid::new_v4();
        assert!(matches!(get(&pool, id).await, Err(AuditError::NotFound(missing)) if missing == id));
        Ok(())
    }

    #[sqlx::test]
    async fn test_query_filters_and_orders_newest_first(pool: PgPool) -> Result<(), AuditError> {
        let category = Uuid::new_v4();
        append(&pool, &new_record("categories", category, AuditEvent::Create)).await?;
        append(&pool, &new_record("suppliers", Uuid::new_v4(), AuditEvent::Create)).await?;
        append(&pool, &new_record("categories", category, AuditEvent::Update)).await?;
        append(&pool, &new_record("categories", category, AuditEvent::Delete)).await?;

        let page = query(&pool, &AuditFilter::for_table("categories"), &PaginationParams::default()).await?;

        let events: Vec<_> = page.data.iter().map(|r| r.event).collect();
        assert_eq!(events, vec![AuditEvent::Delete, AuditEvent::Update, AuditEvent::Create]);
        assert!(page.data.iter().all(|r| r.table_name == "categories"));
        assert!(page.data.windows(2).all(|w| w[0].created_at >= w[1].created_at));
        assert_eq!(page.meta.total, 3);

        let filter = AuditFilter {
            event: Some(AuditEvent::Update),
            ..AuditFilter::for_record("categories", category)
        };
        let updates = query(&pool, &filter, &PaginationParams::default()).await?;
        assert_eq!(updates.meta.total, 1);
        assert_eq!(updates.data[0].event, AuditEvent::Update);
        Ok(())
    }

    #[sqlx::test]
    async fn test_query_pages_are_disjoint(pool: PgPool) -> Result<(), AuditError> {
        for _ in 0..25 {
            append(&pool, &new_record("products", Uuid::new_v4(), AuditEvent::Create)).await?;
        }

        let filter = AuditFilter::for_table("products");
        let first = query(&pool, &filter, &PaginationParams::new(Some(1), Some(10))).await?;
        let second = query(&pool, &filter, &PaginationParams::new(Some(2), Some(10))).await?;
        let third = query(&pool, &filter, &PaginationParams::new(Some(3), Some(10))).await?;

        assert_eq!(first.data.len(), 10);
        assert_eq!(second.data.len(), 10);
        assert_eq!(third.data.len(), 5);
        assert_eq!(first.meta.last_page, 3);

        let mut ids: Vec<Uuid> = first
            .data
            .iter()
            .chain(&second.data)
            .chain(&third.data)
            .map(|r| r.id)
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 25);
        Ok(())
    }

    #[sqlx::test]
    async fn test_query_rejects_bad_pagination(pool: PgPool) -> Result<(), AuditError> {
        let result = query(&pool, &AuditFilter::default(), &PaginationParams::new(Some(1), Some(500))).await;
        assert!(matches!(result, Err(AuditError::Validation(_))));
        Ok(())
    }

    #[sqlx::test]
    async fn test_query_unknown_table_is_empty(pool: PgPool) -> Result<(), AuditError> {
        append(&pool, &new_record("categories", Uuid::new_v4(), AuditEvent::Create)).await?;
        let page = query(&pool, &AuditFilter::for_table("warehouses"), &PaginationParams::default()).await?;
        assert!(page.data.is_empty());
        assert_eq!(page.meta.total, 0);
        Ok(())
    }
}
