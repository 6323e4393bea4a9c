/// Saved flow snapshot endpoints
///
/// Direct access to the persisted diagram of a site, bypassing editor
/// sessions. A PUT replaces the active snapshot wholesale after validation.

use crate::{
    api::{error::ApiError, AppState},
    flow::{graph::FlowGraph, storage::FlowSnapshot},
};
use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};

pub fn create_flow_routes() -> Router<AppState> {
    Router::new()
        .route("/api/sites", get(list_sites))
        .route(
            "/api/sites/{site_id}/flow",
            get(get_flow).put(put_flow).delete(delete_flow),
        )
}

/// List sites with a saved flow
///
/// GET /api/sites
/// Returns: { "sites": [{ "site_id": "...", "node_count": 9, "edge_count": 8, "updated_at": "..." }] }
async fn list_sites(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let sites = state.storage.list_active().await?;
    Ok(Json(json!({ "sites": sites })))
}

/// Get the active snapshot of a site
///
/// GET /api/sites/:site_id/flow
async fn get_flow(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
) -> Result<Json<FlowSnapshot>, ApiError> {
    state
        .storage
        .load_active(&site_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No saved flow for site: {}", site_id)))
}

/// Replace the active snapshot of a site
///
/// PUT /api/sites/:site_id/flow
/// Body: { "nodes": [...], "edges": [...] }
async fn put_flow(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
    Json(graph): Json<FlowGraph>,
) -> Result<Json<FlowSnapshot>, ApiError> {
    if let Err(e) = graph.validate(&state.rules) {
        tracing::warn!("Rejected flow for site {}: {}", site_id, e);
        return Err(e.into());
    }

    let snapshot = state.storage.save(&site_id, &graph).await?;
    tracing::info!(
        "💾 Stored flow for site {} ({} nodes, {} edges)",
        site_id,
        snapshot.nodes.len(),
        snapshot.edges.len()
    );

    Ok(Json(snapshot))
}

/// Archive the active snapshot of a site
///
/// DELETE /api/sites/:site_id/flow
async fn delete_flow(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if state.storage.deactivate(&site_id).await? {
        tracing::info!("Archived flow for site {}", site_id);
        Ok(Json(json!({ "message": "Flow archived successfully" })))
    } else {
        Err(ApiError::NotFound(format!("No saved flow for site: {}", site_id)))
    }
}
