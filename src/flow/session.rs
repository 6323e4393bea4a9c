/// Editor sessions using ArcSwap
///
/// Each open site gets an `EditorSession` whose graph is an atomically swapped
/// pointer: readers always see a complete graph, and a mutation either lands
/// whole or not at all. The session map itself is swapped the same way when
/// sessions are opened or closed.

use crate::flow::{
    error::FlowError,
    graph::FlowGraph,
    rules::ConnectionRules,
    storage::{FlowSnapshot, SnapshotStorage},
    template::default_template,
};
use anyhow::Result;
use arc_swap::{ArcSwap, Guard};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

/// In-memory editing state for one site's diagram
#[derive(Debug)]
pub struct EditorSession {
    site_id: String,
    graph: ArcSwap<FlowGraph>,
    /// Gate for every mutation; off when a session is opened
    edit_mode: AtomicBool,
    opened_at: DateTime<Utc>,
}

/// Serializable view of a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub site_id: String,
    pub edit_mode: bool,
    pub opened_at: DateTime<Utc>,
    #[serde(flatten)]
    pub graph: FlowGraph,
}

impl EditorSession {
    pub fn new(site_id: impl Into<String>, graph: FlowGraph) -> Self {
        Self {
            site_id: site_id.into(),
            graph: ArcSwap::from_pointee(graph),
            edit_mode: AtomicBool::new(false),
            opened_at: Utc::now(),
        }
    }

    pub fn site_id(&self) -> &str {
        &self.site_id
    }

    /// Current graph (lock-free read)
    pub fn graph(&self) -> Arc<FlowGraph> {
        self.graph.load_full()
    }

    pub fn is_edit_mode(&self) -> bool {
        self.edit_mode.load(Ordering::Acquire)
    }

    pub fn set_edit_mode(&self, enabled: bool) {
        self.edit_mode.store(enabled, Ordering::Release);
        tracing::debug!("Edit mode {} for site {}", if enabled { "on" } else { "off" }, self.site_id);
    }

    /// Apply a graph mutation and swap the result in
    ///
    /// Refused while edit mode is off. If another request swapped the graph
    /// between our read and our swap, the mutation is recomputed against the
    /// newer graph.
    pub fn apply<F>(&self, op: F) -> Result<Arc<FlowGraph>, FlowError>
    where
        F: Fn(&FlowGraph) -> Result<FlowGraph, FlowError>,
    {
        if !self.is_edit_mode() {
            return Err(FlowError::EditModeDisabled);
        }

        let mut current = self.graph.load_full();
        loop {
            let next = Arc::new(op(&current)?);
            let previous = self.graph.compare_and_swap(&current, Arc::clone(&next));
            if Arc::ptr_eq(&previous, &current) {
                return Ok(next);
            }
            current = Guard::into_inner(previous);
        }
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            site_id: self.site_id.clone(),
            edit_mode: self.is_edit_mode(),
            opened_at: self.opened_at,
            graph: FlowGraph::clone(&self.graph()),
        }
    }
}

/// Lock-free registry of open editor sessions, keyed by site id
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: ArcSwap<HashMap<String, Arc<EditorSession>>>,
    storage: SnapshotStorage,
    rules: Arc<ConnectionRules>,
}

impl SessionRegistry {
    pub fn new(storage: SnapshotStorage, rules: Arc<ConnectionRules>) -> Self {
        Self {
            sessions: ArcSwap::new(Arc::new(HashMap::new())),
            storage,
            rules,
        }
    }

    pub fn rules(&self) -> &ConnectionRules {
        &self.rules
    }

    /// Open (or return the already open) session for a site
    ///
    /// A new session starts from the site's active snapshot, or from the
    /// default template when nothing was saved yet. Sessions live until
    /// `close`; there is no idle eviction.
    pub async fn open(&self, site_id: &str) -> Result<Arc<EditorSession>> {
        if let Some(existing) = self.get(site_id) {
            return Ok(existing);
        }

        let graph = match self.storage.load_active(site_id).await? {
            Some(snapshot) => {
                tracing::info!("📂 Opening site {} from snapshot {}", site_id, snapshot.id);
                snapshot.into_graph()
            }
            None => {
                tracing::info!("🆕 No saved flow for site {}, starting from template", site_id);
                default_template()
            }
        };

        let candidate = Arc::new(EditorSession::new(site_id, graph));
        self.sessions.rcu(|current| {
            let mut next = HashMap::clone(current);
            next.entry(site_id.to_string())
                .or_insert_with(|| Arc::clone(&candidate));
            next
        });

        // A concurrent open may have won; hand out whichever session is registered
        self.get(site_id)
            .ok_or_else(|| anyhow::anyhow!("Session for site {} vanished during open", site_id))
    }

    pub fn get(&self, site_id: &str) -> Option<Arc<EditorSession>> {
        self.sessions.load().get(site_id).cloned()
    }

    /// Session for a site or `SessionNotFound`
    pub fn require(&self, site_id: &str) -> Result<Arc<EditorSession>, FlowError> {
        self.get(site_id)
            .ok_or_else(|| FlowError::SessionNotFound(site_id.to_string()))
    }

    /// Drop a session without saving; returns false if none was open
    ///
    /// The only way a session leaves the registry.
    pub fn close(&self, site_id: &str) -> bool {
        let previous = self.sessions.rcu(|current| {
            let mut next = HashMap::clone(current);
            next.remove(site_id);
            next
        });

        let closed = previous.contains_key(site_id);
        if closed {
            tracing::info!("Closed editor session for site {}", site_id);
        }
        closed
    }

    pub fn open_site_ids(&self) -> Vec<String> {
        self.sessions.load().keys().cloned().collect()
    }

    /// Persist the session's current graph as the site's active snapshot
    pub async fn save(&self, site_id: &str) -> Result<FlowSnapshot> {
        let session = self.require(site_id)?;
        let graph = session.graph();
        graph.validate(&self.rules)?;

        let snapshot = self.storage.save(site_id, &graph).await?;
        tracing::info!(
            "💾 Saved flow for site {} ({} nodes, {} edges)",
            site_id,
            snapshot.nodes.len(),
            snapshot.edges.len()
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::types::{Node, NodeType, Position};

    fn session() -> EditorSession {
        EditorSession::new("site-a", default_template())
    }

    #[test]
    fn mutations_need_edit_mode() {
        let session = session();
        let before = session.graph();

        let err = session.apply(|g| g.delete_node("grid-1")).unwrap_err();

        assert_eq!(err, FlowError::EditModeDisabled);
        assert!(Arc::ptr_eq(&before, &session.graph()));
    }

    #[test]
    fn applied_mutation_becomes_current() {
        let session = session();
        session.set_edit_mode(true);

        let next = session.apply(|g| g.delete_node("grid-1")).unwrap();

        assert!(Arc::ptr_eq(&next, &session.graph()));
        assert!(session.graph().node("grid-1").is_none());
        assert_eq!(session.graph().edges_of("grid-1").count(), 0);
    }

    #[test]
    fn failed_mutation_keeps_state() {
        let session = session();
        session.set_edit_mode(true);
        let rules = ConnectionRules::builtin();
        let before = session.graph();

        let err = session
            .apply(|g| g.connect("source-solar", "consumer-residential", &rules))
            .unwrap_err();

        assert!(matches!(err, FlowError::ConnectionNotAllowed { .. }));
        assert!(Arc::ptr_eq(&before, &session.graph()));
    }

    #[test]
    fn view_flattens_graph() {
        let session = session();
        session.set_edit_mode(true);
        session
            .apply(|g| {
                g.add_node(Node::new(
                    "sensor-1",
                    NodeType::Sensor,
                    Position::new(5.0, 5.0),
                    "Irradiance sensor",
                ))
            })
            .unwrap();

        let value = serde_json::to_value(session.view()).unwrap();
        assert_eq!(value["site_id"], "site-a");
        assert_eq!(value["edit_mode"], true);
        assert_eq!(value["nodes"].as_array().unwrap().len(), 10);
    }

    #[test]
    fn concurrent_mutations_are_all_kept() {
        const WRITERS: usize = 8;
        const NODES_EACH: usize = 25;

        let session = session();
        session.set_edit_mode(true);
        let start = std::sync::Barrier::new(WRITERS);

        std::thread::scope(|scope| {
            for writer in 0..WRITERS {
                let session = &session;
                let start = &start;
                scope.spawn(move || {
                    start.wait();
                    for i in 0..NODES_EACH {
                        let id = format!("sensor-{}-{}", writer, i);
                        session
                            .apply(|g| {
                                g.add_node(Node::new(
                                    id.as_str(),
                                    NodeType::Sensor,
                                    Position::default(),
                                    "Sensor",
                                ))
                            })
                            .unwrap();
                    }
                });
            }
        });

        let graph = session.graph();
        assert_eq!(graph.nodes.len(), 9 + WRITERS * NODES_EACH);
        for writer in 0..WRITERS {
            for i in 0..NODES_EACH {
                assert!(graph.node(&format!("sensor-{}-{}", writer, i)).is_some());
            }
        }
        assert_eq!(graph.edges.len(), 8);
    }
}
