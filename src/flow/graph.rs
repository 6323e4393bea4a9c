/// Immutable-update graph state for one site's flow diagram
///
/// Every mutation borrows the current graph and returns a new one, or an error
/// with the current graph untouched. Callers swap the result in as a whole, so
/// a half-applied change is never observable.

use crate::flow::error::FlowError;
use crate::flow::rules::ConnectionRules;
use crate::flow::types::{Edge, Node, NodePatch, Position};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Nodes and edges of a flow diagram
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowGraph {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl FlowGraph {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Edges with `node_id` as source or target
    pub fn edges_of<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.touches(node_id))
    }

    /// Place a new node (palette drop)
    pub fn add_node(&self, node: Node) -> Result<FlowGraph, FlowError> {
        if self.node(&node.id).is_some() {
            return Err(FlowError::DuplicateNode(node.id));
        }

        let mut next = self.clone();
        next.nodes.push(node);
        Ok(next)
    }

    /// Reposition a node (drag)
    pub fn move_node(&self, id: &str, position: Position) -> Result<FlowGraph, FlowError> {
        self.update_node(
            id,
            &NodePatch {
                position: Some(position),
                ..NodePatch::default()
            },
        )
    }

    /// Apply an attribute edit to a node
    pub fn update_node(&self, id: &str, patch: &NodePatch) -> Result<FlowGraph, FlowError> {
        let mut next = self.clone();
        let node = next
            .nodes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| FlowError::UnknownNode(id.to_string()))?;
        patch.apply_to(node);
        Ok(next)
    }

    /// Remove a node together with every edge attached to it
    pub fn delete_node(&self, id: &str) -> Result<FlowGraph, FlowError> {
        if self.node(id).is_none() {
            return Err(FlowError::UnknownNode(id.to_string()));
        }

        let mut next = self.clone();
        next.nodes.retain(|n| n.id != id);
        next.edges.retain(|e| !e.touches(id));
        Ok(next)
    }

    /// Connect two existing nodes if the rules allow their type pair
    pub fn connect(
        &self,
        source_id: &str,
        target_id: &str,
        rules: &ConnectionRules,
    ) -> Result<FlowGraph, FlowError> {
        let source = self
            .node(source_id)
            .ok_or_else(|| FlowError::UnknownNode(source_id.to_string()))?;
        let target = self
            .node(target_id)
            .ok_or_else(|| FlowError::UnknownNode(target_id.to_string()))?;

        rules.check(source.node_type, target.node_type)?;

        let edge = Edge::between(source_id, target_id);
        if self.edge(&edge.id).is_some() {
            return Err(FlowError::DuplicateEdge(edge.id));
        }

        let mut next = self.clone();
        next.edges.push(edge);
        Ok(next)
    }

    pub fn delete_edge(&self, id: &str) -> Result<FlowGraph, FlowError> {
        if self.edge(id).is_none() {
            return Err(FlowError::UnknownEdge(id.to_string()));
        }

        let mut next = self.clone();
        next.edges.retain(|e| e.id != id);
        Ok(next)
    }

    /// Check a whole graph received from outside the editor
    ///
    /// Node ids must be unique, every edge must be named `{source}-to-{target}`,
    /// an ordered pair may be connected once, every edge must reference present
    /// nodes and every edge's type pair must be allowed.
    pub fn validate(&self, rules: &ConnectionRules) -> Result<(), FlowError> {
        let mut node_ids = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !node_ids.insert(node.id.as_str()) {
                return Err(FlowError::DuplicateNode(node.id.clone()));
            }
        }

        let mut pairs = HashSet::with_capacity(self.edges.len());
        for edge in &self.edges {
            let expected = Edge::id_for(&edge.source, &edge.target);
            if edge.id != expected {
                return Err(FlowError::EdgeIdMismatch {
                    edge: edge.id.clone(),
                    expected,
                });
            }
            if !pairs.insert((edge.source.as_str(), edge.target.as_str())) {
                return Err(FlowError::DuplicateEdge(edge.id.clone()));
            }

            let endpoint = |id: &str| {
                self.node(id).ok_or_else(|| FlowError::DanglingEdge {
                    edge: edge.id.clone(),
                    node: id.to_string(),
                })
            };
            let source = endpoint(&edge.source)?;
            let target = endpoint(&edge.target)?;
            rules.check(source.node_type, target.node_type)?;
        }

        Ok(())
    }

    /// Same nodes and edges regardless of order
    pub fn same_contents(&self, other: &FlowGraph) -> bool {
        fn sorted<T: Clone>(items: &[T], key: impl Fn(&T) -> &str) -> Vec<T> {
            let mut items = items.to_vec();
            items.sort_by(|a, b| key(a).cmp(key(b)));
            items
        }

        self.nodes.len() == other.nodes.len()
            && self.edges.len() == other.edges.len()
            && sorted(&self.nodes, |n| n.id.as_str()) == sorted(&other.nodes, |n| n.id.as_str())
            && sorted(&self.edges, |e| e.id.as_str()) == sorted(&other.edges, |e| e.id.as_str())
    }
}
