pub mod create;
pub mod delete;
pub mod restore;
pub mod update;

pub use create::{CreateRoleCommand, CreateRoleError};
pub use delete::{DeleteRoleCommand, DeleteRoleError};
pub use restore::{RestoreRoleCommand, RestoreRoleError};
pub use update::{UpdateRoleCommand, UpdateRoleError};
