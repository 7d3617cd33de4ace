//! User accounts
//!
//! Accounts are created by registration, which lives outside this service.
//! Here they can be listed, edited, deleted and restored.

pub mod commands;
pub mod model;
pub mod queries;
pub mod routes;

pub use commands::{
    DeleteUserCommand, DeleteUserError, RestoreUserCommand, RestoreUserError, UpdateUserCommand,
    UpdateUserError,
};
pub use model::User;
pub use queries::{GetUserError, GetUserQuery, ListUsersError, ListUsersQuery};
pub use routes::users_routes;
