//! Suppliers of catalog products

pub mod commands;
pub mod model;
pub mod queries;
pub mod routes;

pub use commands::{
    CreateSupplierCommand, CreateSupplierError, DeleteSupplierCommand, DeleteSupplierError,
    RestoreSupplierCommand, RestoreSupplierError, UpdateSupplierCommand, UpdateSupplierError,
};
pub use model::Supplier;
pub use queries::{GetSupplierError, GetSupplierQuery, ListSuppliersError, ListSuppliersQuery};
pub use routes::suppliers_routes;
