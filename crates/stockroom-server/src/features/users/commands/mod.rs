pub mod delete;
pub mod restore;
pub mod update;

pub use delete::{DeleteUserCommand, DeleteUserError};
pub use restore::{RestoreUserCommand, RestoreUserError};
pub use update::{UpdateUserCommand, UpdateUserError};
