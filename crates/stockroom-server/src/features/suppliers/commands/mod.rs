pub mod create;
pub mod delete;
pub mod restore;
pub mod update;

pub use create::{CreateSupplierCommand, CreateSupplierError};
pub use delete::{DeleteSupplierCommand, DeleteSupplierError};
pub use restore::{RestoreSupplierCommand, RestoreSupplierError};
pub use update::{UpdateSupplierCommand, UpdateSupplierError};
