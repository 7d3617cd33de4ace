pub mod create;
pub mod delete;
pub mod restore;
pub mod update;

pub use create::{CreateProductCommand, CreateProductError};
pub use delete::{DeleteProductCommand, DeleteProductError};
pub use restore::{RestoreProductCommand, RestoreProductError};
pub use update::{UpdateProductCommand, UpdateProductError};
