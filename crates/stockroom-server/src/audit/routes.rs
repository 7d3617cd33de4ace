//! Audit log API routes (read only)
//!
//! - `GET /api/v1/audit-logs` - Filtered, paginated history, newest first
//! - `GET /api/v1/audit-logs/:id` - A single audit record

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use super::models::{AuditEvent, AuditFilter};
use super::service::AuditQueryService;
use crate::api::extract::{AppPath, AppQuery};
use crate::api::response::ApiResponse;
use crate::error::AppError;
use crate::features::shared::pagination::PaginationParams;

pub fn audit_routes() -> Router<AuditQueryService> {
    Router::new()
        .route("/", get(list_audit_logs))
        .route("/:id", get(get_audit_log))
}

/// Query string accepted by the list endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListAuditLogsQuery {
    pub table_name: Option<String>,
    /// Event name, case-insensitive
    pub event: Option<String>,
    pub user_id: Option<Uuid>,
    pub record_id: Option<Uuid>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl ListAuditLogsQuery {
    pub fn into_parts(self) -> Result<(AuditFilter, PaginationParams), AppError> {
        let event = self
            .event
            .as_deref()
            .map(str::parse::<AuditEvent>)
            .transpose()?;

        let filter = AuditFilter {
            table_name: self.table_name,
            event,
            user_id: self.user_id,
            record_id: self.record_id,
        };

        Ok((filter, PaginationParams::new(self.page, self.per_page)))
    }
}

/// List audit records
///
/// # Endpoint
///
/// `GET /api/v1/audit-logs?table_name=categories&event=UPDATE&page=1&per_page=20`
///
/// # Response
///
/// - `200 OK` - `{ data: [...], meta: { current_page, per_page, total, last_page } }`
/// - `400 Bad Request` - Malformed filter or pagination parameter
#[tracing::instrument(skip(service, query))]
async fn list_audit_logs(
    State(service): State<AuditQueryService>,
    AppQuery(query): AppQuery<ListAuditLogsQuery>,
) -> Result<Response, AppError> {
    let (filter, pagination) = query.into_parts()?;

    let page = service.list(&filter, &pagination).await?;

    tracing::debug!(
        count = page.data.len(),
        total = page.meta.total,
        "Audit logs listed via API"
    );

    Ok(Json(page).into_response())
}

/// Get one audit record with its actor resolved
///
/// # Response
///
/// - `200 OK` - `{ success: true, data: {...} }`
/// - `400 Bad Request` - Id is not a UUID
/// - `404 Not Found` - No record with that id
#[tracing::instrument(skip(service))]
async fn get_audit_log(
    State(service): State<AuditQueryService>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, AppError> {
    let record = service.get(id).await?;

    Ok(ApiResponse::success(record).into_response())
}
