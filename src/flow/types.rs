/// Core energy-flow type definitions
///
/// Defines nodes, edges and their attributes as they are persisted in the
/// `energy_flows` table. Field names and string tags match the stored JSON so
/// snapshots written by earlier versions of the dashboard keep loading.

use crate::flow::error::FlowError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Kind of energy-system component a node represents
///
/// Closed enumeration; the connection rules are keyed on it. Serialized with
/// the lowercase, space-separated tags the editor palette uses
/// (e.g. `"solar array"`, `"scada system"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeType {
    /// Generation source: ground or roof mounted PV array
    #[serde(rename = "solar array")]
    SolarArray,
    /// Generation source: single PV panel / string
    #[serde(rename = "solar panel")]
    SolarPanel,
    /// Generation source: wind turbine or farm
    #[serde(rename = "wind turbine")]
    WindTurbine,
    /// Storage: standalone battery
    #[serde(rename = "battery")]
    Battery,
    /// Storage: battery energy storage system
    #[serde(rename = "bess")]
    Bess,
    #[serde(rename = "inverter")]
    Inverter,
    #[serde(rename = "transformer")]
    Transformer,
    /// Terminal load (residential, commercial, industrial POD)
    #[serde(rename = "consumer")]
    Consumer,
    /// Utility grid connection point
    #[serde(rename = "grid")]
    Grid,
    /// Measurement device attached to another component
    #[serde(rename = "sensor")]
    Sensor,
    /// Supervisory control system
    #[serde(rename = "scada system")]
    ScadaSystem,
}

impl NodeType {
    /// Every node type, in palette order
    pub const ALL: [NodeType; 11] = [
        NodeType::SolarArray,
        NodeType::SolarPanel,
        NodeType::WindTurbine,
        NodeType::Battery,
        NodeType::Bess,
        NodeType::Inverter,
        NodeType::Transformer,
        NodeType::Consumer,
        NodeType::Grid,
        NodeType::Sensor,
        NodeType::ScadaSystem,
    ];

    /// The stored tag for this type
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::SolarArray => "solar array",
            NodeType::SolarPanel => "solar panel",
            NodeType::WindTurbine => "wind turbine",
            NodeType::Battery => "battery",
            NodeType::Bess => "bess",
            NodeType::Inverter => "inverter",
            NodeType::Transformer => "transformer",
            NodeType::Consumer => "consumer",
            NodeType::Grid => "grid",
            NodeType::Sensor => "sensor",
            NodeType::ScadaSystem => "scada system",
        }
    }

    /// Id prefix used when the caller does not supply a node id
    pub fn slug(&self) -> String {
        self.as_str().replace(' ', "-")
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = FlowError;

    /// Accepts the stored tag as well as `-`/`_` separated forms
    /// (`solar-array`, `SCADA_SYSTEM`) so the tag can travel in a URL path.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_'], " ");
        NodeType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| FlowError::UnknownNodeType(s.to_string()))
    }
}

/// Operational status shown on a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    #[default]
    Active,
    Inactive,
    Error,
    Maintenance,
    Charging,
    Discharging,
    Standby,
    Operational,
    Fault,
}

/// Canvas coordinates of a node
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A single component in a site's flow diagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique within the diagram (asset instance id or `{type}-{suffix}`)
    pub id: String,
    /// Component kind; decides which connections are allowed
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub position: Position,
    pub label: String,
    #[serde(default)]
    pub status: NodeStatus,
    /// Type-dependent specification values (capacity, efficiency,
    /// stateOfCharge, ...). Free-form, never interpreted by the editor.
    #[serde(default)]
    pub specs: Map<String, Value>,
}

impl Node {
    pub fn new(
        id: impl Into<String>,
        node_type: NodeType,
        position: Position,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            node_type,
            position,
            label: label.into(),
            status: NodeStatus::default(),
            specs: Map::new(),
        }
    }

    pub fn with_status(mut self, status: NodeStatus) -> Self {
        self.status = status;
        self
    }

    /// Replace the spec map. Non-object values leave the map empty.
    pub fn with_specs(mut self, specs: Value) -> Self {
        if let Value::Object(map) = specs {
            self.specs = map;
        }
        self
    }
}

/// Attribute edits applied to an existing node
///
/// Absent fields are left untouched. Spec keys are merged into the existing
/// map; a `null` value removes the key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodePatch {
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub status: Option<NodeStatus>,
    #[serde(default)]
    pub specs: Option<Map<String, Value>>,
}

impl NodePatch {
    pub fn is_empty(&self) -> bool {
        self.position.is_none()
            && self.label.is_none()
            && self.status.is_none()
            && self.specs.is_none()
    }

    pub(crate) fn apply_to(&self, node: &mut Node) {
        if let Some(position) = self.position {
            node.position = position;
        }
        if let Some(label) = &self.label {
            node.label = label.clone();
        }
        if let Some(status) = self.status {
            node.status = status;
        }
        if let Some(specs) = &self.specs {
            for (key, value) in specs {
                if value.is_null() {
                    node.specs.remove(key);
                } else {
                    node.specs.insert(key.clone(), value.clone());
                }
            }
        }
    }
}

/// Label a freshly connected edge carries until live flow data arrives
pub const DEFAULT_EDGE_LABEL: &str = "0.0 kW";

/// Directed energy-flow connection between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Always `{source}-to-{target}`
    pub id: String,
    pub source: String,
    pub target: String,
    /// Instantaneous flow value as displayed on the canvas
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub style: Map<String, Value>,
}

impl Edge {
    /// Edge with the default label and style the editor assigns on connect
    pub fn between(source: &str, target: &str) -> Self {
        let mut style = Map::new();
        style.insert("strokeWidth".to_string(), Value::from(2));
        style.insert("animated".to_string(), Value::Bool(true));

        Self {
            id: Edge::id_for(source, target),
            source: source.to_string(),
            target: target.to_string(),
            label: DEFAULT_EDGE_LABEL.to_string(),
            style,
        }
    }

    pub fn id_for(source: &str, target: &str) -> String {
        format!("{}-to-{}", source, target)
    }

    /// True if either endpoint is `node_id`
    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}
