pub mod get;
pub mod list;

pub use get::{GetRoleError, GetRoleQuery};
pub use list::{ListRolesError, ListRolesQuery};
