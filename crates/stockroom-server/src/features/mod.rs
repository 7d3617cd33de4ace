//! Tracked resource slices of the Stockroom API
//!
//! Each resource is a vertical slice:
//! - `model.rs` - The entity, its [`Tracked`](crate::audit::Tracked) impl and row locking
//! - `commands/` - Audited writes (create, update, delete, restore)
//! - `queries/` - Reads (get, list)
//! - `routes.rs` - HTTP route definitions
//!
//! Every command runs in one transaction, locks the row it changes, and
//! hands the before/after rows to the [`ChangeInterceptor`] before commit.
//!
//! # Resources
//!
//! - **categories**: Product categories
//! - **suppliers**: Product suppliers and their contact details
//! - **roles**: User roles, seeded with the defaults at startup
//! - **products**: Catalog items pointing at a category and a supplier
//! - **users**: Accounts (no creation; registration lives elsewhere)
//! - **attachments**: PDF files attached to a product, nested under `/products`

pub mod attachments;
pub mod categories;
pub mod products;
pub mod roles;
pub mod shared;
pub mod suppliers;
pub mod users;

use axum::{extract::FromRef, Router};
use sqlx::PgPool;

use crate::audit::{audit_routes, AuditQueryService, ChangeInterceptor};
use crate::storage::SharedBlobStore;

/// Shared state for all feature routes
///
/// Handlers extract the part they need (`State<PgPool>`,
/// `State<ChangeInterceptor>`, `State<SharedBlobStore>`) through [`FromRef`].
#[derive(Clone, FromRef)]
pub struct FeatureState {
    pub db: PgPool,
    pub audit: ChangeInterceptor,
    pub audit_queries: AuditQueryService,
    pub blobs: SharedBlobStore,
}

impl FeatureState {
    pub fn new(db: PgPool, audit: ChangeInterceptor, blobs: SharedBlobStore) -> Self {
        Self {
            audit_queries: AuditQueryService::new(db.clone()),
            db,
            audit,
            blobs,
        }
    }
}

/// Creates the `/api/v1` router with all feature routes mounted
///
/// - `/categories`
/// - `/suppliers`
/// - `/roles`
/// - `/products` - Including `/products/:id/attachments`
/// - `/users`
/// - `/audit-logs` - Read-only audit history
pub fn router(state: FeatureState) -> Router<()> {
    let audit_logs = audit_routes().with_state(state.audit_queries.clone());

    Router::new()
        .nest("/categories", categories::categories_routes())
        .nest("/suppliers", suppliers::suppliers_routes())
        .nest("/roles", roles::roles_routes())
        .nest(
            "/products",
            products::products_routes().merge(attachments::attachments_routes()),
        )
        .nest("/users", users::users_routes())
        .with_state(state)
        .nest("/audit-logs", audit_logs)
}
