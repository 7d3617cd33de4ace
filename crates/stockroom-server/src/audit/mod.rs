//! Audit trail for tracked entities
//!
//! Every create, update, delete and restore of a tracked entity produces
//! exactly one immutable audit record holding the before and after state
//! of the row, the acting user and the request origin.
//!
//! # Architecture
//!
//! - [`change`]: the [`Tracked`] opt-in trait and [`Change`], one captured
//!   lifecycle transition
//! - [`interceptor`]: [`ChangeInterceptor`], which turns changes into records
//!   under the configured [`AuditConsistency`]
//! - [`store`]: append-only Postgres persistence and filtered retrieval
//! - [`service`]: [`AuditQueryService`] for history views, plus in-memory
//!   re-sorting helpers
//! - [`routes`]: read-only HTTP endpoints
//!
//! # Example
//!
//! ```rust,ignore
//! use stockroom_server::audit::{AuditContext, Change, ChangeInterceptor};
//!
//! let mut tx = pool.begin().await?;
//! let before = lock_category(&mut tx, id).await?;
//! let after = apply_update(&mut tx, &before, &command).await?;
//! let staged = audit.stage(&mut tx, &ctx, Change::updated(&before, &after)?).await?;
//! tx.commit().await?;
//! audit.settle(staged).await;
//! ```

pub mod change;
pub mod context;
pub mod error;
pub mod interceptor;
pub mod models;
pub mod routes;
pub mod service;
pub mod store;

pub use change::{Change, Tracked};
pub use context::AuditContext;
pub use error::AuditError;
pub use interceptor::{AuditConsistency, ChangeInterceptor, StagedAudit};
pub use models::{ActorSummary, AuditEvent, AuditFilter, AuditRecord, FieldMap, NewAuditRecord};
pub use routes::audit_routes;
pub use service::{sort_records, AuditQueryService, SortDirection, SortKey, SortState};
