/// energyflow: energy-flow diagram editor backend
///
/// Holds the flow diagram of each renewable-energy site (generation, storage,
/// conversion, grid and consumer components joined by energy-flow edges),
/// enforces the connection allow-list and persists one active snapshot per site.

// Core configuration and setup
pub mod config;

// SQLite pool setup
pub mod database;

// Flow diagram layer - types, rules, graph state, storage and editor sessions
pub mod flow;

// HTTP API layer - REST endpoints for sessions, snapshots and rules
pub mod api;

// Server setup and initialization
pub mod server;

pub use flow::{ConnectionRules, Edge, FlowError, FlowGraph, Node, NodeType, SnapshotStorage};
pub use server::start_server;
