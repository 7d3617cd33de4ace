//! Category API routes
//!
//! - `GET /api/v1/categories` - List categories
//! - `POST /api/v1/categories` - Create a category
//! - `GET /api/v1/categories/:id` - Get a category
//! - `PUT /api/v1/categories/:id` - Update a category
//! - `DELETE /api/v1/categories/:id` - Soft-delete a category
//! - `POST /api/v1/categories/:id/restore` - Restore a soft-deleted category

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
    CreateCategoryCommand, DeleteCategoryCommand, RestoreCategoryCommand, UpdateCategoryCommand,
};
use super::queries::{GetCategoryQuery, ListCategoriesQuery};
use crate::api::extract::{AppJson, AppPath, AppQuery};
use crate::api::response::ApiResponse;
use crate::audit::{AuditContext, ChangeInterceptor};
use crate::error::AppError;
use crate::features::shared::ShowParams;
use crate::features::FeatureState;

pub fn categories_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/:id",
            get(get_category).put(update_category).delete(delete_category),
        )
        .route("/:id/restore", post(restore_category))
}

/// Create a category
///
/// # Request Body
///
/// ```json
/// { "name": "Electronics", "description": "Phones and laptops", "metadata": { "aisle": 4 } }
/// ```
///
/// # Response
///
/// - `201 Created` - Category created
/// - `400 Bad Request` - Validation error
#[tracing::instrument(skip(pool, audit, command), fields(name = %command.name))]
async fn create_category(
    State(pool): State<PgPool>,
    State(audit): State<ChangeInterceptor>,
    ctx: AuditContext,
    AppJson(command): AppJson<CreateCategoryCommand>,
) -> Result<Response, AppError> {
    let category = super::commands::create::handle(&pool, &audit, &ctx, command).await?;

    Ok(ApiResponse::success(category).with_status(StatusCode::CREATED))
}

#[tracing::instrument(skip(pool))]
async fn list_categories(
    State(pool): State<PgPool>,
    AppQuery(query): AppQuery<ListCategoriesQuery>,
) -> Result<Response, AppError> {
    let page = super::queries::list::handle(&pool, query).await?;

    Ok(Json(page).into_response())
}

#[tracing::instrument(skip(pool))]
async fn get_category(
    State(pool): State<PgPool>,
    AppPath(id): AppPath<Uuid>,
    AppQuery(params): AppQuery<ShowParams>,
) -> Result<Response, AppError> {
    let query = GetCategoryQuery {
        id,
        include_deleted: params.include_deleted,
    };
    let category = super::queries::get::handle(&pool, query).await?;

    Ok(ApiResponse::success(category).into_response())
}

/// Update a category
///
/// # Response
///
/// - `200 OK` - Category updated
/// - `400 Bad Request` - Validation error
/// - `404 Not Found` - Category missing or soft-deleted
#[tracing::instrument(skip(pool, audit, command))]
async fn update_category(
    State(pool): State<PgPool>,
    State(audit): State<ChangeInterceptor>,
    ctx: AuditContext,
    AppPath(id): AppPath<Uuid>,
    AppJson(mut command): AppJson<UpdateCategoryCommand>,
) -> Result<Response, AppError> {
    command.id = id;

    let category = super::commands::update::handle(&pool, &audit, &ctx, command).await?;

    Ok(ApiResponse::success(category).into_response())
}

#[tracing::instrument(skip(pool, audit))]
async fn delete_category(
    State(pool): State<PgPool>,
    State(audit): State<ChangeInterceptor>,
    ctx: AuditContext,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, AppError> {
    let category =
        super::commands::delete::handle(&pool, &audit, &ctx, DeleteCategoryCommand { id }).await?;

    Ok(ApiResponse::success(category).into_response())
}

/// Restore a soft-deleted category
///
/// # Response
///
/// - `200 OK` - Category restored
/// - `404 Not Found` - No category with that id
/// - `409 Conflict` - Category is not deleted
#[tracing::instrument(skip(pool, audit))]
async fn restore_category(
    State(pool): State<PgPool>,
    State(audit): State<ChangeInterceptor>,
    ctx: AuditContext,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, AppError> {
    let category =
        super::commands::restore::handle(&pool, &audit, &ctx, RestoreCategoryCommand { id }).await?;

    Ok(ApiResponse::success(category).into_response())
}
