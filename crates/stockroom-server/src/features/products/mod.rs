//! Catalog products
//!
//! Every product belongs to one category and one supplier. Both must exist
//! and be live when a product is created or re-pointed at them.

pub mod commands;
pub mod model;
pub mod queries;
pub mod routes;

pub use commands::{
    CreateProductCommand, CreateProductError, DeleteProductCommand, DeleteProductError,
    RestoreProductCommand, RestoreProductError, UpdateProductCommand, UpdateProductError,
};
pub use model::Product;
pub use queries::{GetProductError, GetProductQuery, ListProductsError, ListProductsQuery};
pub use routes::products_routes;
