//! Stockroom Server Library
//!
//! Admin backend for an inventory catalog where every write leaves an audit
//! trail.
//!
//! # Overview
//!
//! - **Resources**: categories, suppliers, roles, products and users, each
//!   with create/update/soft-delete/restore commands and get/list queries
//! - **Audit**: a [`ChangeInterceptor`](audit::ChangeInterceptor) records the
//!   before/after snapshot of every command in `audit_logs`, attributed to the
//!   acting user, client IP and user agent
//! - **Attachments**: PDF files on products, metadata in Postgres and bytes in
//!   a [`BlobStore`](storage::BlobStore)
//! - **Audit queries**: filter, sort and paginate the trail via `/api/v1/audit-logs`
//!
//! # Architecture
//!
//! Writes are **commands**: they run in one transaction, lock the affected row
//! and stage the audit record before commit. Reads are **queries** and are not
//! audited.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use stockroom_server::{api, audit::ChangeInterceptor, config::Config, db, features::FeatureState};
//! use stockroom_server::storage::LocalBlobStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let pool = db::create_pool(&config.database).await?;
//!     let audit = ChangeInterceptor::new(pool.clone(), &config.audit);
//!     let blobs = Arc::new(LocalBlobStore::new(&config.storage.attachments_dir));
//!     let app = api::create_router(FeatureState::new(pool, audit, blobs), &config);
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//!     api::serve(listener, app, std::time::Duration::from_secs(5)).await
//! }
//! ```

pub mod api;
pub mod audit;
pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod middleware;
pub mod storage;

pub use error::{AppError, AppResult};
