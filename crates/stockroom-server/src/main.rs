//! Stockroom Server - Main entry point

use anyhow::Result;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use stockroom_common::logging::{init_logging, LogConfig};
use tracing::info;

use stockroom_server::{
    api,
    audit::ChangeInterceptor,
    config::Config,
    db,
    features::{roles::seed_default_roles, FeatureState},
    storage::LocalBlobStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    let log_config = LogConfig::builder()
        .log_file_prefix("stockroom-server")
        .filter_directives("stockroom_server=debug,tower_http=debug,sqlx=warn")
        .build()
        .merge_env()?;

    let _log_guard = init_logging(&log_config)?;

    info!("Starting Stockroom Server");

    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    let pool = db::create_pool(&config.database).await?;
    db::run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;

    let audit = ChangeInterceptor::new(pool.clone(), &config.audit);
    info!(consistency = audit.consistency().as_str(), "Audit interceptor ready");

    if config.server.seed_roles {
        let created = seed_default_roles(&pool, &audit).await?;
        info!(created, "Default roles seeded");
    }

    let blobs = Arc::new(LocalBlobStore::new(&config.storage.attachments_dir));

    let app = api::create_router(FeatureState::new(pool, audit, blobs), &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    api::serve(
        listener,
        app,
        Duration::from_secs(config.server.shutdown_timeout_secs),
    )
    .await
}
