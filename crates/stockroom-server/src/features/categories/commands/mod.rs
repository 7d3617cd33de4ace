pub mod create;
pub mod delete;
pub mod restore;
pub mod update;

pub use create::{CreateCategoryCommand, CreateCategoryError};
pub use delete::{DeleteCategoryCommand, DeleteCategoryError};
pub use restore::{RestoreCategoryCommand, RestoreCategoryError};
pub use update::{UpdateCategoryCommand, UpdateCategoryError};
