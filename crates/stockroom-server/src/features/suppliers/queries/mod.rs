pub mod get;
pub mod list;

pub use get::{GetSupplierError, GetSupplierQuery};
pub use list::{ListSuppliersError, ListSuppliersQuery};
