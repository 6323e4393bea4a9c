/// Energy-flow diagram layer
///
/// Everything about a site's flow diagram lives here:
/// - Type definitions (Node, Edge, NodeType)
/// - Connection allow-list
/// - Immutable-update graph state and the default template
/// - SQLite snapshot persistence with sqlx
/// - Editor sessions swapped atomically with ArcSwap

pub mod error;
pub mod graph;
pub mod rules;
pub mod session;
pub mod storage;
pub mod template;
pub mod types;

pub use error::FlowError;
pub use graph::FlowGraph;
pub use rules::{ConnectionRule, ConnectionRules};
pub use session::{EditorSession, SessionRegistry, SessionView};
pub use storage::{FlowSnapshot, SnapshotMetadata, SnapshotStorage};
pub use template::default_template;
pub use types::{Edge, Node, NodePatch, NodeStatus, NodeType, Position};
