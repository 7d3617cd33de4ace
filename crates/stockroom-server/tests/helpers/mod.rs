//! Shared setup for the HTTP integration tests

#![allow(dead_code)]

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, Method, Request, Response},
    Router,
};
use serde_json::Value;
use sqlx::PgPool;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use stockroom_server::{
    api,
    audit::{AuditConsistency, ChangeInterceptor},
    config::Config,
    features::FeatureState,
    middleware::auth::hash_token,
    storage::LocalBlobStore,
};
use uuid::Uuid;

pub const CLIENT_ADDR: &str = "203.0.113.7:40000";
pub const CLIENT_AGENT: &str = "stockroom-tests/1.0";

/// A user with a bearer token, inserted directly into the database
pub struct SignedInUser {
    pub id: Uuid,
    pub username: String,
    pub token: String,
}

pub async fn sign_in(pool: &PgPool, username: &str) -> SignedInUser {
    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, 'x') RETURNING id",
    )
    .bind(username)
    .bind(format!("{}@example.com", username))
    .fetch_one(pool)
    .await
    .unwrap();

    let token = format!("token-{}", Uuid::new_v4());
    sqlx::query("INSERT INTO api_tokens (user_id, token_hash) VALUES ($1, $2)")
        .bind(id)
        .bind(hash_token(&token))
        .execute(pool)
        .await
        .unwrap();

    SignedInUser {
        id,
        username: username.to_string(),
        token,
    }
}

/// Full application router with a strict audit interceptor
pub fn setup_test_app(pool: PgPool) -> Router {
    setup_test_app_with(pool, AuditConsistency::Strict)
}

pub fn setup_test_app_with(pool: PgPool, consistency: AuditConsistency) -> Router {
    setup_test_app_in(pool, consistency, blob_dir())
}

/// Full application router storing attachment files under `blob_root`
pub fn setup_test_app_in(pool: PgPool, consistency: AuditConsistency, blob_root: PathBuf) -> Router {
    let audit = ChangeInterceptor::with_settings(pool.clone(), consistency, Duration::from_secs(5));
    let blobs = Arc::new(LocalBlobStore::new(blob_root));
    api::create_router(FeatureState::new(pool, audit, blobs), &Config::default())
}

/// A fresh directory for one test's attachment files
pub fn blob_dir() -> PathBuf {
    std::env::temp_dir().join(format!("stockroom-tests-{}", Uuid::new_v4()))
}

/// Build a request as a known client would send it
pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::USER_AGENT, CLIENT_AGENT);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let mut request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let addr: SocketAddr = CLIENT_ADDR.parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(addr));
    request
}

const MULTIPART_BOUNDARY: &str = "stockroom-test-boundary";

/// Build a `multipart/form-data` upload with a `file` part and optional text parts
pub fn multipart_request(
    uri: &str,
    token: Option<&str>,
    file_name: &str,
    content: &[u8],
    fields: &[(&str, &str)],
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/pdf\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());

    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::USER_AGENT, CLIENT_AGENT)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let mut request = builder.body(Body::from(body)).unwrap();
    let addr: SocketAddr = CLIENT_ADDR.parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(addr));
    request
}

/// PDF-looking bytes of the given size
pub fn pdf_bytes(size: usize) -> Vec<u8> {
    let mut data = b"%PDF-1.7\n".to_vec();
    data.resize(size, b' ');
    data
}

pub async fn body_json(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
