//! Product attachment API routes
//!
//! Mounted under `/api/v1/products`:
//!
//! - `GET /:id/attachments` - List a product's attachments
//! - `POST /:id/attachments` - Upload a PDF (multipart `file`, optional `is_primary`)
//! - `GET /:id/attachments/:attachment_id` - Get attachment metadata
//! - `DELETE /:id/attachments/:attachment_id` - Delete an attachment and its file
//! - `GET /:id/attachments/:attachment_id/download` - Download the file

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use sqlx::PgPool;
use uuid::Uuid;

use super::commands::{
    create::parse_flag, CreateAttachmentCommand, CreateAttachmentError, DeleteAttachmentCommand,
};
use super::queries::{GetAttachmentQuery, ListAttachmentsQuery};
use crate::api::extract::AppPath;
use crate::api::response::ApiResponse;
use crate::audit::{AuditContext, ChangeInterceptor};
use crate::error::AppError;
use crate::features::FeatureState;
use crate::storage::SharedBlobStore;

pub fn attachments_routes() -> Router<FeatureState> {
    Router::new()
        .route("/:id/attachments", get(list_attachments).post(upload_attachment))
        .route(
            "/:id/attachments/:attachment_id",
            get(get_attachment).delete(delete_attachment),
        )
        .route("/:id/attachments/:attachment_id/download", get(download_attachment))
}

#[tracing::instrument(skip(pool))]
async fn list_attachments(
    State(pool): State<PgPool>,
    AppPath(product_id): AppPath<Uuid>,
) -> Result<Response, AppError> {
    let attachments =
        super::queries::list::handle(&pool, ListAttachmentsQuery { product_id }).await?;

    Ok(ApiResponse::success(attachments).into_response())
}

/// Upload a PDF attachment
///
/// # Request Body
///
/// `multipart/form-data` with a `file` part (PDF, 100 to 500 KB) and an
/// optional `is_primary` part (`true`, `false`, `1` or `0`).
///
/// # Response
///
/// - `201 Created` - Attachment stored
/// - `400 Bad Request` - Missing file, wrong type or size
/// - `404 Not Found` - Product missing or deleted
#[tracing::instrument(skip(pool, audit, blobs, multipart))]
async fn upload_attachment(
    State(pool): State<PgPool>,
    State(audit): State<ChangeInterceptor>,
    State(blobs): State<SharedBlobStore>,
    ctx: AuditContext,
    AppPath(product_id): AppPath<Uuid>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let mut multipart = multipart?;
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut is_primary = false;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let data = field.bytes().await?;
                file = Some((file_name, data.to_vec()));
            },
            "is_primary" => {
                is_primary = parse_flag(&field.text().await?)?;
            },
            _ => {},
        }
    }

    let (file_name, content) = file.ok_or(CreateAttachmentError::FileRequired)?;
    let command = CreateAttachmentCommand {
        product_id,
        file_name,
        content,
        is_primary,
    };

    let attachment =
        super::commands::create::handle(&pool, &audit, blobs.as_ref(), &ctx, command).await?;

    Ok(ApiResponse::success(attachment).with_status(StatusCode::CREATED))
}

#[tracing::instrument(skip(pool))]
async fn get_attachment(
    State(pool): State<PgPool>,
    AppPath((product_id, id)): AppPath<(Uuid, Uuid)>,
) -> Result<Response, AppError> {
    let attachment = super::queries::get::handle(&pool, GetAttachmentQuery { product_id, id }).await?;

    Ok(ApiResponse::success(attachment).into_response())
}

#[tracing::instrument(skip(pool, audit, blobs))]
async fn delete_attachment(
    State(pool): State<PgPool>,
    State(audit): State<ChangeInterceptor>,
    State(blobs): State<SharedBlobStore>,
    ctx: AuditContext,
    AppPath((product_id, id)): AppPath<(Uuid, Uuid)>,
) -> Result<Response, AppError> {
    let attachment = super::commands::delete::handle(
        &pool,
        &audit,
        blobs.as_ref(),
        &ctx,
        DeleteAttachmentCommand { product_id, id },
    )
    .await?;

    Ok(ApiResponse::success(attachment).into_response())
}

#[tracing::instrument(skip(pool, blobs))]
async fn download_attachment(
    State(pool): State<PgPool>,
    State(blobs): State<SharedBlobStore>,
    AppPath((product_id, id)): AppPath<(Uuid, Uuid)>,
) -> Result<Response, AppError> {
    let file = super::queries::download::handle(
        &pool,
        blobs.as_ref(),
        GetAttachmentQuery { product_id, id },
    )
    .await?;

    let disposition = file.content_disposition();
    Ok((
        [
            (header::CONTENT_TYPE, file.file_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.content,
    )
        .into_response())
}
