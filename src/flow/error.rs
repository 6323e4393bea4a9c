use crate::flow::types::NodeType;
use thiserror::Error;

/// Rejections raised by the flow editor before any state change
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlowError {
    #[error("Node not found: {0}")]
    UnknownNode(String),

    #[error("Edge not found: {0}")]
    UnknownEdge(String),

    #[error("Node already exists: {0}")]
    DuplicateNode(String),

    #[error("Connection already exists: {0}")]
    DuplicateEdge(String),

    #[error("Cannot connect {from} to {to}")]
    ConnectionNotAllowed { from: NodeType, to: NodeType },

    #[error("Edge {edge} should be named {expected}")]
    EdgeIdMismatch { edge: String, expected: String },

    #[error("Edge {edge} references missing node {node}")]
    DanglingEdge { edge: String, node: String },

    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    #[error("Edit mode is disabled")]
    EditModeDisabled,

    #[error("No editor session open for site: {0}")]
    SessionNotFound(String),
}
