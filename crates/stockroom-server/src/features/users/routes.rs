//! User API routes
//!
//! - `GET /api/v1/users` - List users
//! - `GET /api/v1/users/:id` - Get a user
//! - `PUT /api/v1/users/:id` - Update a user
//! - `DELETE /api/v1/users/:id` - Soft-delete a user
//! - `POST /api/v1/users/:id/restore` - Restore a soft-deleted user

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use sqlx::PgPool;
use uuid::Uuid;

use super::commands::{DeleteUserCommand, RestoreUserCommand, UpdateUserCommand};
use super::queries::{GetUserQuery, ListUsersQuery};
use crate::api::extract::{AppJson, AppPath, AppQuery};
use crate::api::response::ApiResponse;
use crate::audit::{AuditContext, ChangeInterceptor};
use crate::error::AppError;
use crate::features::shared::ShowParams;
use crate::features::FeatureState;

pub fn users_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", get(list_users))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
        .route("/:id/restore", post(restore_user))
}

#[tracing::instrument(skip(pool))]
async fn list_users(
    State(pool): State<PgPool>,
    AppQuery(query): AppQuery<ListUsersQuery>,
) -> Result<Response, AppError> {
    let page = super::queries::list::handle(&pool, query).await?;

    Ok(Json(page).into_response())
}

#[tracing::instrument(skip(pool))]
async fn get_user(
    State(pool): State<PgPool>,
    AppPath(id): AppPath<Uuid>,
    AppQuery(params): AppQuery<ShowParams>,
) -> Result<Response, AppError> {
    let query = GetUserQuery {
        id,
        include_deleted: params.include_deleted,
    };
    let user = super::queries::get::handle(&pool, query).await?;

    Ok(ApiResponse::success(user).into_response())
}

/// Update a user
///
/// # Response
///
/// - `200 OK` - User updated
/// - `400 Bad Request` - Validation error or unknown role
/// - `404 Not Found` - User missing or soft-deleted
/// - `409 Conflict` - Username or email already in use
#[tracing::instrument(skip(pool, audit, command))]
async fn update_user(
    State(pool): State<PgPool>,
    State(audit): State<ChangeInterceptor>,
    ctx: AuditContext,
    AppPath(id): AppPath<Uuid>,
    AppJson(mut command): AppJson<UpdateUserCommand>,
) -> Result<Response, AppError> {
    command.id = id;
    let user = super::commands::update::handle(&pool, &audit, &ctx, command).await?;

    Ok(ApiResponse::success(user).into_response())
}

#[tracing::instrument(skip(pool, audit))]
async fn delete_user(
    State(pool): State<PgPool>,
    State(audit): State<ChangeInterceptor>,
    ctx: AuditContext,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, AppError> {
    let user = super::commands::delete::handle(&pool, &audit, &ctx, DeleteUserCommand { id }).await?;

    Ok(ApiResponse::success(user).into_response())
}

#[tracing::instrument(skip(pool, audit))]
async fn restore_user(
    State(pool): State<PgPool>,
    State(audit): State<ChangeInterceptor>,
    ctx: AuditContext,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, AppError> {
    let user = super::commands::restore::handle(&pool, &audit, &ctx, RestoreUserCommand { id }).await?;

    Ok(ApiResponse::success(user).into_response())
}
