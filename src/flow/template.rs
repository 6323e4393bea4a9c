/// Starter diagram for sites that have never saved a flow
///
/// Components are laid out in columns from generation on the left to
/// consumption on the right, with the grid connection below the conversion
/// column.

use crate::flow::graph::FlowGraph;
use crate::flow::types::{Edge, Node, NodeStatus, NodeType, Position};
use serde_json::{json, Value};

pub const GENERATION_X: f64 = 0.0;
pub const CONVERSION_X: f64 = 400.0;
pub const STORAGE_X: f64 = 800.0;
pub const CONSUMPTION_X: f64 = 1200.0;
pub const GRID_X: f64 = 400.0;

/// Vertical distance between stacked components in one column
pub const ROW_SPACING: f64 = 150.0;

fn component(
    id: &str,
    node_type: NodeType,
    x: f64,
    y: f64,
    label: &str,
    status: NodeStatus,
    specs: Value,
) -> Node {
    Node::new(id, node_type, Position::new(x, y), label)
        .with_status(status)
        .with_specs(specs)
}

/// Default site layout: solar + wind through an inverter and transformer into
/// two BESS units that supply residential and industrial consumers, with the
/// grid backing both storage units.
pub fn default_template() -> FlowGraph {
    let nodes = vec![
        component(
            "source-solar",
            NodeType::SolarArray,
            GENERATION_X,
            0.0,
            "Solar Array",
            NodeStatus::Active,
            json!({ "capacity": 500, "power": 350, "efficiency": 98, "temperature": 45, "irradiance": 850, "age": 2 }),
        ),
        component(
            "source-wind",
            NodeType::WindTurbine,
            GENERATION_X,
            ROW_SPACING,
            "Wind Farm",
            NodeStatus::Active,
            json!({ "capacity": 300, "power": 250, "efficiency": 95, "windSpeed": 12, "turbineStatus": "operational", "rpm": 15 }),
        ),
        component(
            "inverter-1",
            NodeType::Inverter,
            CONVERSION_X,
            75.0,
            "Inverter",
            NodeStatus::Active,
            json!({ "inputPower": 600, "outputPower": 580, "efficiency": 96.7, "temperature": 40 }),
        ),
        component(
            "transformer-1",
            NodeType::Transformer,
            CONVERSION_X + 200.0,
            75.0,
            "Transformer",
            NodeStatus::Active,
            json!({ "inputPower": 720, "outputPower": 230, "efficiency": 98, "temperature": 55 }),
        ),
        component(
            "grid-1",
            NodeType::Grid,
            GRID_X,
            2.0 * ROW_SPACING,
            "Power Grid",
            NodeStatus::Active,
            json!({ "inputPower": 200, "outputPower": 150, "efficiency": 99.9, "temperature": 35 }),
        ),
        component(
            "bess-1",
            NodeType::Bess,
            STORAGE_X,
            0.0,
            "Battery Storage 1",
            NodeStatus::Charging,
            json!({ "maxCapacity": 1000, "currentCharge": 750, "stateOfCharge": 75, "chargingPower": 250, "temperature": 25 }),
        ),
        component(
            "bess-2",
            NodeType::Bess,
            STORAGE_X,
            ROW_SPACING,
            "Battery Storage 2",
            NodeStatus::Standby,
            json!({ "maxCapacity": 1000, "currentCharge": 850, "stateOfCharge": 85, "chargingPower": 250, "temperature": 26 }),
        ),
        component(
            "consumer-residential",
            NodeType::Consumer,
            CONSUMPTION_X,
            0.0,
            "Residential Area",
            NodeStatus::Active,
            json!({ "consumption": 150, "connectedLoad": 200, "powerFactor": 0.95, "peakDemand": 180, "dailyUsage": 3600, "connectionType": "LV Distribution" }),
        ),
        component(
            "consumer-industrial",
            NodeType::Consumer,
            CONSUMPTION_X,
            ROW_SPACING,
            "Industrial Zone",
            NodeStatus::Active,
            json!({ "consumption": 450, "connectedLoad": 600, "powerFactor": 0.92, "peakDemand": 550, "dailyUsage": 10800, "connectionType": "MV Distribution" }),
        ),
    ];

    let edges = [
        ("source-solar", "inverter-1"),
        ("source-wind", "inverter-1"),
        ("inverter-1", "transformer-1"),
        ("transformer-1", "bess-1"),
        ("bess-1", "consumer-residential"),
        ("bess-2", "consumer-industrial"),
        ("grid-1", "bess-1"),
        ("grid-1", "bess-2"),
    ]
    .into_iter()
    .map(|(source, target)| Edge::between(source, target))
    .collect();

    FlowGraph::new(nodes, edges)
}
