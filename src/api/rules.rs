/// Read-only access to the connection allow-list
///
/// Lets the palette grey out handles that cannot accept a connection.

use crate::{
    api::{error::ApiError, AppState},
    flow::{rules::ConnectionRules, types::NodeType},
};
use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ConnectionCheck {
    pub source: NodeType,
    pub target: NodeType,
    pub allowed: bool,
}

pub fn create_rules_routes() -> Router<AppState> {
    Router::new()
        .route("/api/connection-rules", get(list_rules))
        .route("/api/connection-rules/{source}/{target}", get(check_connection))
}

/// GET /api/connection-rules
async fn list_rules(State(state): State<AppState>) -> Json<ConnectionRules> {
    Json(ConnectionRules::clone(&state.rules))
}

/// GET /api/connection-rules/:source/:target
/// Returns: { "source": "inverter", "target": "grid", "allowed": true }
async fn check_connection(
    State(state): State<AppState>,
    Path((source, target)): Path<(String, String)>,
) -> Result<Json<ConnectionCheck>, ApiError> {
    let source: NodeType = source.parse()?;
    let target: NodeType = target.parse()?;

    Ok(Json(ConnectionCheck {
        source,
        target,
        allowed: state.rules.allows(source, target),
    }))
}
