/// HTTP API Layer
///
/// REST endpoints for the flow editor:
/// - Connection rules lookup
/// - Saved snapshot access per site
/// - Editor sessions (open, edit, save, close)

pub mod error;
pub mod flows;
pub mod rules;
pub mod sessions;

use crate::flow::{rules::ConnectionRules, session::SessionRegistry, storage::SnapshotStorage};
use axum::Router;
use std::sync::Arc;

pub use error::ApiError;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Snapshot persistence
    pub storage: SnapshotStorage,
    /// Open editor sessions
    pub sessions: Arc<SessionRegistry>,
    /// Connection allow-list in effect
    pub rules: Arc<ConnectionRules>,
}

impl AppState {
    /// Wire storage and rules into a fresh session registry
    pub fn new(storage: SnapshotStorage, rules: ConnectionRules) -> Self {
        let rules = Arc::new(rules);
        let sessions = Arc::new(SessionRegistry::new(storage.clone(), Arc::clone(&rules)));
        Self {
            storage,
            sessions,
            rules,
        }
    }
}

/// All API routes, still waiting for state
pub fn create_api_routes() -> Router<AppState> {
    Router::new()
        .merge(rules::create_rules_routes())
        .merge(flows::create_flow_routes())
        .merge(sessions::create_session_routes())
}
