pub mod get;
pub mod list;

pub use get::{GetCategoryError, GetCategoryQuery};
pub use list::{ListCategoriesError, ListCategoriesQuery};
