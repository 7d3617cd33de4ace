//! Update user command

use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::audit::{AuditContext, AuditError, Change, ChangeInterceptor};
use crate::error::AppError;
use crate::features::shared::error_helpers::{is_unique_violation, violated_constraint};
use crate::features::shared::validation::{
    validate_email, validate_name, EmailValidationError, NameValidationError,
};
use crate::features::users::model::{User, USERNAME_MAX_LENGTH, USER_COLUMNS};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserCommand {
    #[serde(default)]
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateUserError {
    #[error("At least one field must be provided for update")]
    NoFieldsToUpdate,
    #[error("Invalid username: {0}")]
    Username(#[from] NameValidationError),
    #[error(transparent)]
    Email(#[from] EmailValidationError),
    #[error("Role '{0}' does not exist or is deleted")]
    UnknownRole(Uuid),
    #[error("Username is already taken")]
    DuplicateUsername,
    #[error("Email is already registered")]
    DuplicateEmail,
    #[error("User '{0}' not found")]
    NotFound(Uuid),
    #[error(transparent)]
    Audit(#[from] AuditError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<UpdateUserError> for AppError {
    fn from(err: UpdateUserError) -> Self {
        match err {
            UpdateUserError::DuplicateUsername | UpdateUserError::DuplicateEmail => {
                AppError::Conflict(err.to_string())
            },
            UpdateUserError::NotFound(_) => AppError::NotFound(err.to_string()),
            UpdateUserError::Audit(e) => e.into(),
            UpdateUserError::Database(e) => AppError::Database(e),
            _ => AppError::Validation(err.to_string()),
        }
    }
}

impl UpdateUserCommand {
    pub fn validate(&self) -> Result<(), UpdateUserError> {
        if self.username.is_none()
            && self.email.is_none()
            && self.role_id.is_none()
            && self.is_active.is_none()
        {
            return Err(UpdateUserError::NoFieldsToUpdate);
        }
        if let Some(ref username) = self.username {
            validate_name(username, USERNAME_MAX_LENGTH)?;
        }
        if let Some(ref email) = self.email {
            validate_email(email)?;
        }
        Ok(())
    }
}

fn classify_write_error(e: sqlx::Error) -> UpdateUserError {
    if !is_unique_violation(&e) {
        return UpdateUserError::Database(e);
    }
    match violated_constraint(&e) {
        Some(c) if c.contains("email") => UpdateUserError::DuplicateEmail,
        Some(c) if c.contains("username") => UpdateUserError::DuplicateUsername,
        _ => UpdateUserError::Database(e),
    }
}

async fn role_is_usable(conn: &mut PgConnection, role_id: Uuid) -> Result<bool, sqlx::Error> {
    let found: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM roles WHERE id = $1 AND deleted_at IS NULL FOR SHARE")
            .bind(role_id)
            .fetch_optional(conn)
            .await?;
    Ok(found.is_some())
}

#[tracing::instrument(skip(pool, audit))]
pub async fn handle(
    pool: &PgPool,
    audit: &ChangeInterceptor,
    ctx: &AuditContext,
    command: UpdateUserCommand,
) -> Result<User, UpdateUserError> {
    command.validate()?;

    let mut tx = pool.begin().await?;

    let before = User::lock_active(&mut tx, command.id)
        .await?
        .ok_or(UpdateUserError::NotFound(command.id))?;

    if let Some(role_id) = command.role_id.filter(|id| before.role_id != Some(*id)) {
        if !role_is_usable(&mut tx, role_id).await? {
            return Err(UpdateUserError::UnknownRole(role_id));
        }
    }

    let after = sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users
        SET username = COALESCE($2, username),
            email = COALESCE($3, email),
            role_id = COALESCE($4, role_id),
            is_active = COALESCE($5, is_active),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(command.id)
    .bind(command.username.as_deref().map(str::trim))
    .bind(command.email.as_deref().map(str::trim))
    .bind(command.role_id)
    .bind(command.is_active)
    .fetch_one(&mut *tx)
    .await
    .map_err(classify_write_error)?;

    let staged = audit.stage(&mut tx, ctx, Change::updated(&before, &after)?).await?;
    tx.commit().await?;
    audit.settle(staged).await;

    tracing::info!(user_id = %after.id, "User updated");

    Ok(after)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{store, AuditConsistency, AuditFilter};
    use crate::features::shared::pagination::PaginationParams;
    use crate::features::shared::test_helpers::{TestRole, TestUser};
    use std::time::Duration;

    fn interceptor(pool: &PgPool) -> ChangeInterceptor {
        ChangeInterceptor::with_settings(pool.clone(), AuditConsistency::Strict, Duration::from_secs(5))
    }

    #[test]
    fn test_validation_bad_email() {
        let cmd = UpdateUserCommand {
            email: Some("not-an-email".to_string()),
            ..Default::default()
        };
        assert!(matches!(cmd.validate(), Err(UpdateUserError::Email(_))));
    }

    #[sqlx::test]
    async fn test_handle_assigns_role_without_leaking_password(pool: PgPool) -> Result<(), UpdateUserError> {
        let role = TestRole::new("Manager").insert(&pool).await?;
        let user = TestUser::new("alice").insert(&pool).await?;

        let updated = handle(
            &pool,
            &interceptor(&pool),
            &AuditContext::system(),
            UpdateUserCommand {
                id: user.id,
                role_id: Some(role.id),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.role_id, Some(role.id));

        let page = store::query(
            &pool,
            &AuditFilter::for_record("users", user.id),
            &PaginationParams::default(),
        )
        .await?;
        let record = &page.data[0];
        for snapshot in [&record.old_values, &record.new_values] {
            let snapshot = snapshot.as_ref().expect("update captures both states");
            assert!(!snapshot.contains_key("password_hash"));
            assert_eq!(snapshot["username"], "alice");
        }
        Ok(())
    }

    #[sqlx::test]
    async fn test_handle_duplicate_email(pool: PgPool) -> sqlx::Result<()> {
        TestUser::new("alice").insert(&pool).await?;
        let bob = TestUser::new("bob").insert(&pool).await?;

        let result = handle(
            &pool,
            &interceptor(&pool),
            &AuditContext::system(),
            UpdateUserCommand {
                id: bob.id,
                email: Some("alice@example.com".to_string()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(UpdateUserError::DuplicateEmail)));
        Ok(())
    }

    #[sqlx::test]
    async fn test_handle_unknown_role(pool: PgPool) -> sqlx::Result<()> {
        let user = TestUser::new("alice").insert(&pool).await?;
        let role_id = Uuid::new_v4();

        let result = handle(
            &pool,
            &interceptor(&pool),
            &AuditContext::system(),
            UpdateUserCommand {
                id: user.id,
                role_id: Some(role_id),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(UpdateUserError::UnknownRole(id)) if id == role_id));
        Ok(())
    }
}
