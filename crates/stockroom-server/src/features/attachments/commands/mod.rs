pub mod create;
pub mod delete;

pub use create::{CreateAttachmentCommand, CreateAttachmentError};
pub use delete::{DeleteAttachmentCommand, DeleteAttachmentError};
