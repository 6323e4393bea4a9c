/// energyflow server entry point
///
/// Serves:
/// - Connection rules at /api/connection-rules
/// - Saved flows at /api/sites/{site_id}/flow
/// - Editor sessions at /api/sites/{site_id}/session/*
/// - Health check at /healthz

use energyflow::{config::Config, server::start_server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Defaults to 0.0.0.0:3005 and data/energyflow.db, overridable via ENERGYFLOW_* env vars
    let config = Config::default();

    start_server(config).await?;

    Ok(())
}
