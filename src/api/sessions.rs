/// Editor session endpoints
///
/// One route per editor gesture: palette drop, drag, attribute edit, connect,
/// delete, and the explicit Save. Every mutation answers with the full session
/// view so the canvas can re-render from it.

use crate::{
    api::{error::ApiError, AppState},
    flow::{
        session::SessionView,
        storage::FlowSnapshot,
        types::{Node, NodePatch, NodeStatus, NodeType, Position},
    },
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, patch, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

/// Request body for toggling edit mode
#[derive(Debug, Deserialize)]
pub struct EditModeRequest {
    pub enabled: bool,
}

/// Request body for a palette drop
#[derive(Debug, Deserialize)]
pub struct AddNodeRequest {
    /// Asset instance id; generated from the type when absent
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub position: Position,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub status: Option<NodeStatus>,
    #[serde(default)]
    pub specs: Map<String, Value>,
}

impl AddNodeRequest {
    fn into_node(self) -> Node {
        let id = self.id.unwrap_or_else(|| {
            format!("{}-{}", self.node_type.slug(), uuid::Uuid::new_v4().simple())
        });
        let label = self
            .label
            .unwrap_or_else(|| format!("New {}", self.node_type));

        let mut node = Node::new(id, self.node_type, self.position, label);
        node.status = self.status.unwrap_or_default();
        node.specs = self.specs;
        node
    }
}

/// Request body for a connect gesture
#[derive(Debug, Deserialize)]
pub struct ConnectRequest {
    pub source: String,
    pub target: String,
}

pub fn create_session_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/sites/{site_id}/session",
            post(open_session).get(get_session).delete(close_session),
        )
        .route("/api/sites/{site_id}/session/edit-mode", put(set_edit_mode))
        .route("/api/sites/{site_id}/session/nodes", post(add_node))
        .route(
            "/api/sites/{site_id}/session/nodes/{node_id}",
            patch(update_node).delete(delete_node),
        )
        .route("/api/sites/{site_id}/session/edges", post(connect))
        .route("/api/sites/{site_id}/session/edges/{edge_id}", delete(delete_edge))
        .route("/api/sites/{site_id}/session/save", post(save_session))
}

/// Open an editor session
///
/// POST /api/sites/:site_id/session
/// Starts from the saved flow, or the default template for new sites.
async fn open_session(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let session = state.sessions.open(&site_id).await?;
    Ok(Json(session.view()))
}

/// GET /api/sites/:site_id/session
async fn get_session(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let session = state.sessions.require(&site_id)?;
    Ok(Json(session.view()))
}

/// Discard a session and its unsaved changes
///
/// DELETE /api/sites/:site_id/session
async fn close_session(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if state.sessions.close(&site_id) {
        Ok(Json(json!({ "message": "Session closed" })))
    } else {
        Err(ApiError::NotFound(format!("No editor session open for site: {}", site_id)))
    }
}

/// PUT /api/sites/:site_id/session/edit-mode
/// Body: { "enabled": true }
async fn set_edit_mode(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
    Json(payload): Json<EditModeRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let session = state.sessions.require(&site_id)?;
    session.set_edit_mode(payload.enabled);
    Ok(Json(session.view()))
}

/// Drop a component from the palette
///
/// POST /api/sites/:site_id/session/nodes
/// Body: { "type": "inverter", "position": { "x": 400, "y": 75 }, "label": "...", "specs": {...} }
async fn add_node(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
    Json(payload): Json<AddNodeRequest>,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    let session = state.sessions.require(&site_id)?;
    let node = payload.into_node();
    let node_id = node.id.clone();

    session.apply(|graph| graph.add_node(node.clone()))?;
    tracing::debug!("Added node {} to site {}", node_id, site_id);

    Ok((StatusCode::CREATED, Json(session.view())))
}

/// Move and/or edit a node
///
/// PATCH /api/sites/:site_id/session/nodes/:node_id
/// Body: { "position": {...}, "label": "...", "status": "...", "specs": {...} }
async fn update_node(
    State(state): State<AppState>,
    Path((site_id, node_id)): Path<(String, String)>,
    Json(changes): Json<NodePatch>,
) -> Result<Json<SessionView>, ApiError> {
    if changes.is_empty() {
        return Err(ApiError::BadRequest("Empty node update".to_string()));
    }

    let session = state.sessions.require(&site_id)?;
    session.apply(|graph| graph.update_node(&node_id, &changes))?;
    Ok(Json(session.view()))
}

/// Delete a node and every edge attached to it
///
/// DELETE /api/sites/:site_id/session/nodes/:node_id
async fn delete_node(
    State(state): State<AppState>,
    Path((site_id, node_id)): Path<(String, String)>,
) -> Result<Json<SessionView>, ApiError> {
    let session = state.sessions.require(&site_id)?;
    session.apply(|graph| graph.delete_node(&node_id))?;
    tracing::debug!("Deleted node {} from site {}", node_id, site_id);
    Ok(Json(session.view()))
}

/// Connect two nodes
///
/// POST /api/sites/:site_id/session/edges
/// Body: { "source": "inverter-1", "target": "grid-1" }
async fn connect(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
    Json(payload): Json<ConnectRequest>,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    let session = state.sessions.require(&site_id)?;
    let rules = state.sessions.rules();

    if let Err(e) = session.apply(|graph| graph.connect(&payload.source, &payload.target, rules)) {
        tracing::warn!(
            "Rejected connection {} -> {} on site {}: {}",
            payload.source,
            payload.target,
            site_id,
            e
        );
        return Err(e.into());
    }

    Ok((StatusCode::CREATED, Json(session.view())))
}

/// DELETE /api/sites/:site_id/session/edges/:edge_id
async fn delete_edge(
    State(state): State<AppState>,
    Path((site_id, edge_id)): Path<(String, String)>,
) -> Result<Json<SessionView>, ApiError> {
    let session = state.sessions.require(&site_id)?;
    session.apply(|graph| graph.delete_edge(&edge_id))?;
    Ok(Json(session.view()))
}

/// Persist the session's diagram
///
/// POST /api/sites/:site_id/session/save
async fn save_session(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
) -> Result<Json<FlowSnapshot>, ApiError> {
    let snapshot = state.sessions.save(&site_id).await?;
    Ok(Json(snapshot))
}
