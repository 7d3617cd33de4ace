//! Product API routes
//!
//! - `GET /api/v1/products?category_id=&supplier_id=&min_price=&max_price=` - List products
//! - `POST /api/v1/products` - Create a product
//! - `GET /api/v1/products/:id` - Get a product
//! - `PUT /api/v1/products/:id` - Update a product
//! - `DELETE /api/v1/products/:id` - Soft-delete a product
//! - `POST /api/v1/products/:id/restore` - Restore a soft-deleted product

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
    CreateProductCommand, DeleteProductCommand, RestoreProductCommand, UpdateProductCommand,
};
use super::queries::{GetProductQuery, ListProductsQuery};
use crate::api::extract::{AppJson, AppPath, AppQuery};
use crate::api::response::ApiResponse;
use crate::audit::{AuditContext, ChangeInterceptor};
use crate::error::AppError;
use crate::features::shared::ShowParams;
use crate::features::FeatureState;

pub fn products_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/:id", get(get_product).put(update_product).delete(delete_product))
        .route("/:id/restore", post(restore_product))
}

/// Create a product
///
/// # Request Body
///
/// ```json
/// {
///   "name": "Desk lamp",
///   "price": "24.50",
///   "stock": 10,
///   "category_id": "5b6f0a62-8d0e-4c55-9a39-0d6a1f7c2e10",
///   "supplier_id": "c1d2a9a4-3f3b-4f0e-a1d6-7e9b8f2c4d31"
/// }
/// ```
///
/// # Response
///
/// - `201 Created` - Product created
/// - `400 Bad Request` - Validation error, or category/supplier missing or deleted
#[tracing::instrument(skip(pool, audit, command), fields(name = %command.name))]
async fn create_product(
    State(pool): State<PgPool>,
    State(audit): State<ChangeInterceptor>,
    ctx: AuditContext,
    AppJson(command): AppJson<CreateProductCommand>,
) -> Result<Response, AppError> {
    let product = super::commands::create::handle(&pool, &audit, &ctx, command).await?;

    Ok(ApiResponse::success(product).with_status(StatusCode::CREATED))
}

#[tracing::instrument(skip(pool))]
async fn list_products(
    State(pool): State<PgPool>,
    AppQuery(query): AppQuery<ListProductsQuery>,
) -> Result<Response, AppError> {
    let page = super::queries::list::handle(&pool, query).await?;

    Ok(Json(page).into_response())
}

#[tracing::instrument(skip(pool))]
async fn get_product(
    State(pool): State<PgPool>,
    AppPath(id): AppPath<Uuid>,
    AppQuery(params): AppQuery<ShowParams>,
) -> Result<Response, AppError> {
    let query = GetProductQuery {
        id,
        include_deleted: params.include_deleted,
    };
    let product = super::queries::get::handle(&pool, query).await?;

    Ok(ApiResponse::success(product).into_response())
}

#[tracing::instrument(skip(pool, audit, command))]
async fn update_product(
    State(pool): State<PgPool>,
    State(audit): State<ChangeInterceptor>,
    ctx: AuditContext,
    AppPath(id): AppPath<Uuid>,
    AppJson(mut command): AppJson<UpdateProductCommand>,
) -> Result<Response, AppError> {
    command.id = id;
    let product = super::commands::update::handle(&pool, &audit, &ctx, command).await?;

    Ok(ApiResponse::success(product).into_response())
}

#[tracing::instrument(skip(pool, audit))]
async fn delete_product(
    State(pool): State<PgPool>,
    State(audit): State<ChangeInterceptor>,
    ctx: AuditContext,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, AppError> {
    let product =
        super::commands::delete::handle(&pool, &audit, &ctx, DeleteProductCommand { id }).await?;

    Ok(ApiResponse::success(product).into_response())
}

#[tracing::instrument(skip(pool, audit))]
async fn restore_product(
    State(pool): State<PgPool>,
    State(audit): State<ChangeInterceptor>,
    ctx: AuditContext,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, AppError> {
    let product =
        super::commands::restore::handle(&pool, &audit, &ctx, RestoreProductCommand { id }).await?;

    Ok(ApiResponse::success(product).into_response())
}
