/// SQLite persistence layer for flow snapshots
///
/// One row per saved diagram in the `energy_flows` table. Nodes and edges are
/// stored as JSON columns; a partial unique index keeps at most one active row
/// per site. Saves are last-write-wins: there is no version check between two
/// editors of the same site.

use crate::flow::graph::FlowGraph;
use crate::flow::types::{Edge, Node};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::{
    sqlite::{SqlitePool, SqliteRow},
    Row,
};

/// Persisted diagram of one site
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowSnapshot {
    pub id: String,
    pub site_id: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

impl FlowSnapshot {
    pub fn graph(&self) -> FlowGraph {
        FlowGraph::new(self.nodes.clone(), self.edges.clone())
    }

    pub fn into_graph(self) -> FlowGraph {
        FlowGraph::new(self.nodes, self.edges)
    }
}

/// Summary row for listing saved sites
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotMetadata {
    pub site_id: String,
    pub node_count: usize,
    pub edge_count: usize,
    pub updated_at: DateTime<Utc>,
}

/// SQLite-backed snapshot storage
#[derive(Debug, Clone)]
pub struct SnapshotStorage {
    pool: SqlitePool,
}

impl SnapshotStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the `energy_flows` table and its indexes
    ///
    /// Safe to call multiple times (uses IF NOT EXISTS).
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS energy_flows (
                id TEXT PRIMARY KEY,
                site_id TEXT NOT NULL,
                nodes JSON NOT NULL,
                edges JSON NOT NULL,
                is_active BOOLEAN NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // At most one active snapshot per site
        sqlx::query(
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_energy_flows_active_site
            ON energy_flows(site_id) WHERE is_active = 1
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Active snapshot for a site, if one was ever saved
    pub async fn load_active(&self, site_id: &str) -> Result<Option<FlowSnapshot>> {
        let row = sqlx::query(
            r#"
            SELECT id, site_id, nodes, edges, is_active, updated_at
            FROM energy_flows
            WHERE site_id = ? AND is_active = 1
            "#,
        )
        .bind(site_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(snapshot_from_row).transpose()
    }

    /// Store the graph as the site's active snapshot
    ///
    /// Updates the existing active row when there is one, otherwise inserts a
    /// new row. The unique index turns a racing second insert into an error
    /// rather than a second active row.
    pub async fn save(&self, site_id: &str, graph: &FlowGraph) -> Result<FlowSnapshot> {
        let nodes_json = serde_json::to_string(&graph.nodes)?;
        let edges_json = serde_json::to_string(&graph.edges)?;
        let now = Utc::now();
        let timestamp = now.to_rfc3339();

        let existing = sqlx::query("SELECT id FROM energy_flows WHERE site_id = ? AND is_active = 1")
            .bind(site_id)
            .fetch_optional(&self.pool)
            .await?;

        let id = match existing {
            Some(row) => {
                let id: String = row.get("id");
                sqlx::query(
                    r#"
                    UPDATE energy_flows
                    SET nodes = ?, edges = ?, updated_at = ?
                    WHERE id = ?
                    "#,
                )
                .bind(&nodes_json)
                .bind(&edges_json)
                .bind(&timestamp)
                .bind(&id)
                .execute(&self.pool)
                .await?;

                tracing::debug!("Updated flow snapshot {} for site {}", id, site_id);
                id
            }
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                sqlx::query(
                    r#"
                    INSERT INTO energy_flows (id, site_id, nodes, edges, is_active, created_at, updated_at)
                    VALUES (?, ?, ?, ?, 1, ?, ?)
                    "#,
                )
                .bind(&id)
                .bind(site_id)
                .bind(&nodes_json)
                .bind(&edges_json)
                .bind(&timestamp)
                .bind(&timestamp)
                .execute(&self.pool)
                .await?;

                tracing::debug!("Inserted flow snapshot {} for site {}", id, site_id);
                id
            }
        };

        Ok(FlowSnapshot {
            id,
            site_id: site_id.to_string(),
            nodes: graph.nodes.clone(),
            edges: graph.edges.clone(),
            is_active: true,
            updated_at: now,
        })
    }

    /// All sites with an active snapshot, most recently saved first
    pub async fn list_active(&self) -> Result<Vec<SnapshotMetadata>> {
        let rows = sqlx::query(
            r#"
            SELECT site_id, nodes, edges, updated_at
            FROM energy_flows
            WHERE is_active = 1
            ORDER BY updated_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut sites = Vec::with_capacity(rows.len());
        for row in rows {
            let nodes: Vec<Value> = serde_json::from_str(row.get::<&str, _>("nodes"))?;
            let edges: Vec<Value> = serde_json::from_str(row.get::<&str, _>("edges"))?;
            sites.push(SnapshotMetadata {
                site_id: row.get("site_id"),
                node_count: nodes.len(),
                edge_count: edges.len(),
                updated_at: parse_timestamp(row.get("updated_at"))?,
            });
        }

        Ok(sites)
    }

    /// Archive the active snapshot of a site
    ///
    /// Returns false when the site had no active snapshot.
    pub async fn deactivate(&self, site_id: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE energy_flows SET is_active = 0, updated_at = ? WHERE site_id = ? AND is_active = 1",
        )
        .bind(Utc::now().to_rfc3339())
        .bind(site_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Number of rows (active or archived) stored for a site
    pub async fn count_rows(&self, site_id: &str) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM energy_flows WHERE site_id = ?")
            .bind(site_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get("total"))
    }
}

fn snapshot_from_row(row: &SqliteRow) -> Result<FlowSnapshot> {
    Ok(FlowSnapshot {
        id: row.get("id"),
        site_id: row.get("site_id"),
        nodes: serde_json::from_str(row.get::<&str, _>("nodes"))?,
        edges: serde_json::from_str(row.get::<&str, _>("edges"))?,
        is_active: row.get("is_active"),
        updated_at: parse_timestamp(row.get("updated_at"))?,
    })
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| anyhow::anyhow!("Invalid timestamp '{}': {}", raw, e))
}
