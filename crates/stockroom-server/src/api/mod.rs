//! HTTP surface: router assembly, middleware stack and server lifecycle

pub mod extract;
pub mod response;

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use sqlx::PgPool;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::{net::TcpListener, signal, sync::oneshot};
use tower_http::compression::CompressionLayer;
use tracing::info;

use crate::config::Config;
use crate::db;
use crate::error::AppError;
use crate::features::{self, FeatureState};
use crate::middleware::{self as mw, require_actor};

/// Create the application router with all routes and middleware
///
/// Everything under `/api/v1` requires a bearer token; `/` and `/health`
/// are public.
pub fn create_router(state: FeatureState, config: &Config) -> Router {
    let api_v1 = features::router(state.clone())
        .route_layer(from_fn_with_state(state.db.clone(), require_actor));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .with_state(state)
        .nest("/api/v1", api_v1)
        .fallback(not_found)
        .layer(CompressionLayer::new())
        .layer(mw::tracing_layer())
        .layer(mw::cors_layer(&config.cors))
}

/// Serve until a shutdown signal arrives
///
/// Peer addresses are made available to handlers for the audit trail. Once
/// the signal fires, in-flight requests get `drain_timeout` to finish.
pub async fn serve(listener: TcpListener, app: Router, drain_timeout: Duration) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, "Server listening");

    let (signalled_tx, signalled_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = signalled_tx.send(());
        })
        .into_future();
    tokio::pin!(server);

    let drain_deadline = async move {
        if signalled_rx.await.is_ok() {
            info!("Waiting up to {} seconds for connections to close", drain_timeout.as_secs());
            tokio::time::sleep(drain_timeout).await;
        } else {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        result = &mut server => {
            result?;
            info!("Server shut down gracefully");
        },
        _ = drain_deadline => {
            tracing::warn!("Shutdown timeout elapsed, dropping open connections");
        },
    }

    Ok(())
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "Stockroom",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

async fn health(State(pool): State<PgPool>) -> Response {
    match db::health_check(&pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected"
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Database health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "database": "unreachable"
                })),
            )
                .into_response()
        },
    }
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}

/// Resolves on Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }
}
