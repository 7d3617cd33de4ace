//! User roles

pub mod commands;
pub mod model;
pub mod queries;
pub mod routes;
pub mod seed;

pub use commands::{
    CreateRoleCommand, CreateRoleError, DeleteRoleCommand, DeleteRoleError, RestoreRoleCommand,
    RestoreRoleError, UpdateRoleCommand, UpdateRoleError,
};
pub use model::{Role, DEFAULT_ROLES};
pub use queries::{GetRoleError, GetRoleQuery, ListRolesError, ListRolesQuery};
pub use routes::roles_routes;
pub use seed::seed_default_roles;
