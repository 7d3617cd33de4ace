//! Bearer token authentication
//!
//! Tokens are issued elsewhere; this service only stores their SHA-256
//! digest in `api_tokens`. A request is authenticated when the digest of its
//! bearer token matches a token of an active, non-deleted user. The resolved
//! [`Actor`] is inserted into the request extensions, where
//! [`AuditContext`](crate::audit::AuditContext) picks it up.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

/// The authenticated user behind a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Actor {
    pub id: Uuid,
    pub username: String,
}

/// Hex-encoded SHA-256 digest of a raw token, as stored in `api_tokens`
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Pull the token out of an `Authorization: Bearer <token>` header
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, AppError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;

    match header.strip_prefix("Bearer ").map(str::trim) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(AppError::Unauthorized(
            "Invalid Authorization header format".to_string(),
        )),
    }
}

pub async fn resolve_actor(pool: &PgPool, token: &str) -> Result<Option<Actor>, sqlx::Error> {
    sqlx::query_as::<_, Actor>(
        r#"
        SELECT u.id, u.username
        FROM api_tokens t
        JOIN users u ON u.id = t.user_id
        WHERE t.token_hash = $1
          AND u.deleted_at IS NULL
          AND u.is_active
        "#,
    )
    .bind(hash_token(token))
    .fetch_optional(pool)
    .await
}

/// Middleware rejecting requests without a valid bearer token
pub async fn require_actor(
    State(pool): State<PgPool>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer(request.headers())?;

    let actor = resolve_actor(&pool, token)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".to_string()))?;

    tracing::debug!(actor_id = %actor.id, "Request authenticated");

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_hash_token_is_hex_sha256() {
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(hash_token("anything").len(), 64);
    }

    #[test]
    fn test_extract_bearer() {
        let mut headers = HeaderMap::new();
        assert!(matches!(extract_bearer(&headers), Err(AppError::Unauthorized(_))));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert!(matches!(extract_bearer(&headers), Err(AppError::Unauthorized(_))));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(matches!(extract_bearer(&headers), Err(AppError::Unauthorized(_))));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer s3cr3t"));
        assert_eq!(extract_bearer(&headers).unwrap(), "s3cr3t");
    }
}
