/// Server setup and initialization
///
/// Wires together configuration, the snapshot database, connection rules,
/// editor sessions and HTTP routes.

use crate::{
    api::{create_api_routes, AppState},
    config::Config,
    database,
    flow::storage::SnapshotStorage,
};
use anyhow::Result;
use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Create the main Axum application with all routes
pub async fn create_app(config: Config) -> Result<Router> {
    tracing::info!("📁 Ensuring data directory exists: {}", config.database.data_dir);
    let pool = database::open_pool(&config.database).await?;

    let storage = SnapshotStorage::new(pool);
    storage
        .init_schema()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize snapshot schema: {}", e))?;

    tracing::info!("🔌 Loading connection rules");
    let rules = config.load_rules()?;

    let state = AppState::new(storage, rules);
    let app = build_router(state);

    tracing::info!("✅ Application initialized successfully");

    Ok(app)
}

/// Router over an already assembled state
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .merge(create_api_routes())
        .with_state(state)
}

/// Start the HTTP server with the given configuration
pub async fn start_server(config: Config) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .init();

    tracing::info!("Starting energyflow server...");

    let app = create_app(config.clone()).await?;

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server listening on http://{}", bind_addr);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "ok"
}
