//! Startup seeding of the default roles

use sqlx::PgPool;

use super::commands::create::{self, CreateRoleCommand, CreateRoleError};
use super::model::DEFAULT_ROLES;
use crate::audit::{AuditContext, ChangeInterceptor};

/// Create each default role that does not exist yet
///
/// A role counts as existing even when soft-deleted, so seeding never
/// resurrects a role an administrator removed. Each creation is audited
/// under the system context. Returns how many roles were created.
pub async fn seed_default_roles(pool: &PgPool, audit: &ChangeInterceptor) -> Result<usize, CreateRoleError> {
    let ctx = AuditContext::system();
    let mut created = 0;

    for name in DEFAULT_ROLES {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM roles WHERE name = $1)")
            .bind(name)
            .fetch_one(pool)
            .await?;
        if exists {
            continue;
        }

        match create::handle(pool, audit, &ctx, CreateRoleCommand::new(name)).await {
            Ok(_) => created += 1,
            // Another instance seeded it first
            Err(CreateRoleError::DuplicateName(_)) => {},
            Err(e) => return Err(e),
        }
    }

    if created > 0 {
        tracing::info!(created, "Default roles seeded");
    }

    Ok(created)
}
