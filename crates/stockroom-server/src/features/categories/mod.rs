//! Product categories

pub mod commands;
pub mod model;
pub mod queries;
pub mod routes;

pub use commands::{
    CreateCategoryCommand, CreateCategoryError, DeleteCategoryCommand, DeleteCategoryError,
    RestoreCategoryCommand, RestoreCategoryError, UpdateCategoryCommand, UpdateCategoryError,
};
pub use model::Category;
pub use queries::{GetCategoryError, GetCategoryQuery, ListCategoriesError, ListCategoriesQuery};
pub use routes::categories_routes;
