//! Supplier API routes
//!
//! Same shape as the category routes, under `/api/v1/suppliers`.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use sqlx::PgPool;
use uuid::Uuid;

use super::commands::{
    CreateSupplierCommand, DeleteSupplierCommand, RestoreSupplierCommand, UpdateSupplierCommand,
};
use super::queries::{GetSupplierQuery, ListSuppliersQuery};
use crate::api::extract::{AppJson, AppPath, AppQuery};
use crate::api::response::ApiResponse;
use crate::audit::{AuditContext, ChangeInterceptor};
use crate::error::AppError;
use crate::features::shared::ShowParams;
use crate::features::FeatureState;

pub fn suppliers_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", get(list_suppliers).post(create_supplier))
        .route("/:id", get(get_supplier).put(update_supplier).delete(delete_supplier))
        .route("/:id/restore", post(restore_supplier))
}

#[tracing::instrument(skip(pool, audit, command), fields(name = %command.name))]
async fn create_supplier(
    State(pool): State<PgPool>,
    State(audit): State<ChangeInterceptor>,
    ctx: AuditContext,
    AppJson(command): AppJson<CreateSupplierCommand>,
) -> Result<Response, AppError> {
    let supplier = super::commands::create::handle(&pool, &audit, &ctx, command).await?;

    Ok(ApiResponse::success(supplier).with_status(StatusCode::CREATED))
}

#[tracing::instrument(skip(pool))]
async fn list_suppliers(
    State(pool): State<PgPool>,
    AppQuery(query): AppQuery<ListSuppliersQuery>,
) -> Result<Response, AppError> {
    let page = super::queries::list::handle(&pool, query).await?;

    Ok(Json(page).into_response())
}

#[tracing::instrument(skip(pool))]
async fn get_supplier(
    State(pool): State<PgPool>,
    AppPath(id): AppPath<Uuid>,
    AppQuery(params): AppQuery<ShowParams>,
) -> Result<Response, AppError> {
    let query = GetSupplierQuery {
        id,
        include_deleted: params.include_deleted,
    };
    let supplier = super::queries::get::handle(&pool, query).await?;

    Ok(ApiResponse::success(supplier).into_response())
}

#[tracing::instrument(skip(pool, audit, command))]
async fn update_supplier(
    State(pool): State<PgPool>,
    State(audit): State<ChangeInterceptor>,
    ctx: AuditContext,
    AppPath(id): AppPath<Uuid>,
    AppJson(mut command): AppJson<UpdateSupplierCommand>,
) -> Result<Response, AppError> {
    command.id = id;
    let supplier = super::commands::update::handle(&pool, &audit, &ctx, command).await?;

    Ok(ApiResponse::success(supplier).into_response())
}

#[tracing::instrument(skip(pool, audit))]
async fn delete_supplier(
    State(pool): State<PgPool>,
    State(audit): State<ChangeInterceptor>,
    ctx: AuditContext,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, AppError> {
    let supplier =
        super::commands::delete::handle(&pool, &audit, &ctx, DeleteSupplierCommand { id }).await?;

    Ok(ApiResponse::success(supplier).into_response())
}

#[tracing::instrument(skip(pool, audit))]
async fn restore_supplier(
    State(pool): State<PgPool>,
    State(audit): State<ChangeInterceptor>,
    ctx: AuditContext,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, AppError> {
    let supplier =
        super::commands::restore::handle(&pool, &audit, &ctx, RestoreSupplierCommand { id }).await?;

    Ok(ApiResponse::success(supplier).into_response())
}
