pub mod download;
pub mod get;
pub mod list;

pub use download::{AttachmentFile, DownloadAttachmentError};
pub use get::{GetAttachmentError, GetAttachmentQuery};
pub use list::{ListAttachmentsError, ListAttachmentsQuery};
