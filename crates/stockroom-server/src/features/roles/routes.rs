//! Role API routes
//!
//! - `GET /api/v1/roles` - List roles, ordered by name
//! - `POST /api/v1/roles` - Create a role (`409` on a taken name)
//! - `GET /api/v1/roles/:id` - Get a role
//! - `PUT /api/v1/roles/:id` - Update a role
//! - `DELETE /api/v1/roles/:id` - Soft-delete a role (`409` while assigned)
//! - `POST /api/v1/roles/:id/restore` - Restore a soft-deleted role

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use sqlx::PgPool;
use uuid::Uuid;

use super::commands::{CreateRoleCommand, DeleteRoleCommand, RestoreRoleCommand, UpdateRoleCommand};
use super::queries::{GetRoleQuery, ListRolesQuery};
use crate::api::extract::{AppJson, AppPath, AppQuery};
use crate::api::response::ApiResponse;
use crate::audit::{AuditContext, ChangeInterceptor};
use crate::error::AppError;
use crate::features::shared::ShowParams;
use crate::features::FeatureState;

pub fn roles_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", get(list_roles).post(create_role))
        .route("/:id", get(get_role).put(update_role).delete(delete_role))
        .route("/:id/restore", post(restore_role))
}

#[tracing::instrument(skip(pool, audit, command), fields(name = %command.name))]
async fn create_role(
    State(pool): State<PgPool>,
    State(audit): State<ChangeInterceptor>,
    ctx: AuditContext,
    AppJson(command): AppJson<CreateRoleCommand>,
) -> Result<Response, AppError> {
    let role = super::commands::create::handle(&pool, &audit, &ctx, command).await?;

    Ok(ApiResponse::success(role).with_status(StatusCode::CREATED))
}

#[tracing::instrument(skip(pool))]
async fn list_roles(
    State(pool): State<PgPool>,
    AppQuery(query): AppQuery<ListRolesQuery>,
) -> Result<Response, AppError> {
    let page = super::queries::list::handle(&pool, query).await?;

    Ok(Json(page).into_response())
}

#[tracing::instrument(skip(pool))]
async fn get_role(
    State(pool): State<PgPool>,
    AppPath(id): AppPath<Uuid>,
    AppQuery(params): AppQuery<ShowParams>,
) -> Result<Response, AppError> {
    let query = GetRoleQuery {
        id,
        include_deleted: params.include_deleted,
    };
    let role = super::queries::get::handle(&pool, query).await?;

    Ok(ApiResponse::success(role).into_response())
}

#[tracing::instrument(skip(pool, audit, command))]
async fn update_role(
    State(pool): State<PgPool>,
    State(audit): State<ChangeInterceptor>,
    ctx: AuditContext,
    AppPath(id): AppPath<Uuid>,
    AppJson(mut command): AppJson<UpdateRoleCommand>,
) -> Result<Response, AppError> {
    command.id = id;
    let role = super::commands::update::handle(&pool, &audit, &ctx, command).await?;

    Ok(ApiResponse::success(role).into_response())
}

#[tracing::instrument(skip(pool, audit))]
async fn delete_role(
    State(pool): State<PgPool>,
    State(audit): State<ChangeInterceptor>,
    ctx: AuditContext,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, AppError> {
    let role = super::commands::delete::handle(&pool, &audit, &ctx, DeleteRoleCommand { id }).await?;

    Ok(ApiResponse::success(role).into_response())
}

#[tracing::instrument(skip(pool, audit))]
async fn restore_role(
    State(pool): State<PgPool>,
    State(audit): State<ChangeInterceptor>,
    ctx: AuditContext,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, AppError> {
    let role = super::commands::restore::handle(&pool, &audit, &ctx, RestoreRoleCommand { id }).await?;

    Ok(ApiResponse::success(role).into_response())
}
