/// Connection allow-list for energy-flow diagrams
///
/// The table is the single source of truth for which component may feed which.
/// It is plain data: the built-in table can be replaced at startup from a JSON
/// file, and it is served read-only over the API. There is no physical
/// validation here (no cycle detection, no capacity balancing).

use crate::flow::error::FlowError;
use crate::flow::types::NodeType;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// One row of the allow-list as it appears in a rules file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRule {
    pub source: NodeType,
    pub targets: Vec<NodeType>,
}

/// Lookup table from source type to the set of allowed target types
///
/// A type with no row, or an empty row, may not have outgoing connections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ConnectionRule>", into = "Vec<ConnectionRule>")]
pub struct ConnectionRules {
    table: BTreeMap<NodeType, BTreeSet<NodeType>>,
}

impl ConnectionRules {
    /// Table shipped with the dashboard
    pub fn builtin() -> Self {
        use NodeType::*;

        const GENERATION_TARGETS: &[NodeType] = &[Inverter, Transformer];
        const STORAGE_TARGETS: &[NodeType] = &[Inverter, Transformer, Grid, Consumer];
        const MONITORING_TARGETS: &[NodeType] = &[
            SolarPanel,
            WindTurbine,
            Battery,
            Bess,
            Inverter,
            Transformer,
            Grid,
            Consumer,
        ];

        let rows: [(NodeType, &[NodeType]); 11] = [
            (SolarArray, GENERATION_TARGETS),
            (SolarPanel, GENERATION_TARGETS),
            (WindTurbine, GENERATION_TARGETS),
            (Battery, STORAGE_TARGETS),
            (Bess, STORAGE_TARGETS),
            (Inverter, &[Transformer, Grid, Consumer, Battery, Bess]),
            (Transformer, &[Grid, Consumer, Battery, Bess]),
            (Grid, &[Consumer, Battery, Bess]),
            (Consumer, &[]),
            (Sensor, MONITORING_TARGETS),
            (ScadaSystem, MONITORING_TARGETS),
        ];

        rows.into_iter()
            .map(|(source, targets)| ConnectionRule {
                source,
                targets: targets.to_vec(),
            })
            .collect::<Vec<_>>()
            .into()
    }

    /// Load a replacement table from a JSON file (`[{ "source": ..., "targets": [...] }]`)
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read connection rules '{}': {}", path.display(), e))?;
        let rules: ConnectionRules = serde_json::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("Invalid connection rules '{}': {}", path.display(), e))?;

        tracing::info!("Loaded {} connection rules from {}", rules.table.len(), path.display());
        Ok(rules)
    }

    pub fn allows(&self, source: NodeType, target: NodeType) -> bool {
        self.table
            .get(&source)
            .is_some_and(|targets| targets.contains(&target))
    }

    /// Like [`allows`](Self::allows) but produces the user-facing rejection
    pub fn check(&self, source: NodeType, target: NodeType) -> Result<(), FlowError> {
        if self.allows(source, target) {
            Ok(())
        } else {
            Err(FlowError::ConnectionNotAllowed {
                from: source,
                to: target,
            })
        }
    }

    pub fn allowed_targets(&self, source: NodeType) -> impl Iterator<Item = NodeType> + '_ {
        self.table.get(&source).into_iter().flatten().copied()
    }
}

impl Default for ConnectionRules {
    fn default() -> Self {
        Self::builtin()
    }
}

impl From<Vec<ConnectionRule>> for ConnectionRules {
    /// Rows for the same source are merged
    fn from(rows: Vec<ConnectionRule>) -> Self {
        let mut table: BTreeMap<NodeType, BTreeSet<NodeType>> = BTreeMap::new();
        for row in rows {
            table.entry(row.source).or_default().extend(row.targets);
        }
        Self { table }
    }
}

impl From<ConnectionRules> for Vec<ConnectionRule> {
    fn from(rules: ConnectionRules) -> Self {
        rules
            .table
            .into_iter()
            .map(|(source, targets)| ConnectionRule {
                source,
                targets: targets.into_iter().collect(),
            })
            .collect()
    }
}
