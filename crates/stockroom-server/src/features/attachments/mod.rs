//! PDF attachments of catalog products
//!
//! Metadata rows live in `product_attachments` and are audited like any
//! other tracked entity. The file itself goes to the [`BlobStore`](crate::storage::BlobStore)
//! under [`ProductAttachment::blob_key`]. Attachments are deleted outright,
//! not soft-deleted.

pub mod commands;
pub mod model;
pub mod queries;
pub mod routes;

pub use commands::{
    CreateAttachmentCommand, CreateAttachmentError, DeleteAttachmentCommand, DeleteAttachmentError,
};
pub use model::ProductAttachment;
pub use queries::{
    AttachmentFile, DownloadAttachmentError, GetAttachmentError, GetAttachmentQuery,
    ListAttachmentsError, ListAttachmentsQuery,
};
pub use routes::attachments_routes;
