/// Configuration management for the energyflow service
///
/// Handles server binding, the snapshot database location and the optional
/// connection rules override.

use crate::flow::rules::ConnectionRules;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    /// JSON file replacing the built-in connection rules
    pub rules_path: Option<String>,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address (e.g., "0.0.0.0")
    pub host: String,
    pub port: u16,
}

/// SQLite snapshot database location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Directory holding the database file (default: "data")
    pub data_dir: String,
    /// Database file name inside `data_dir` (default: "energyflow.db")
    pub file_name: String,
}

impl DatabaseConfig {
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(&self.file_name)
    }
}

impl Default for Config {
    /// Default configuration with ENV_VAR support for container deployment
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: std::env::var("ENERGYFLOW_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("ENERGYFLOW_PORT")
                    .unwrap_or_else(|_| "3005".to_string())
                    .parse()
                    .unwrap_or(3005),
            },
            database: DatabaseConfig {
                data_dir: std::env::var("ENERGYFLOW_DATA_DIR")
                    .unwrap_or_else(|_| "data".to_string()),
                file_name: std::env::var("ENERGYFLOW_DB_FILE")
                    .unwrap_or_else(|_| "energyflow.db".to_string()),
            },
            rules_path: std::env::var("ENERGYFLOW_RULES_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty()),
        }
    }
}

impl Config {
    /// Connection rules in effect: the override file if configured, else the built-in table
    pub fn load_rules(&self) -> Result<ConnectionRules> {
        match &self.rules_path {
            Some(path) => ConnectionRules::from_json_file(path),
            None => Ok(ConnectionRules::builtin()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::types::NodeType;

    fn config(rules_path: Option<String>) -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            database: DatabaseConfig {
                data_dir: "data".to_string(),
                file_name: "energyflow.db".to_string(),
            },
            rules_path,
        }
    }

    #[test]
    fn db_path_joins_dir_and_file() {
        assert_eq!(
            config(None).database.db_path(),
            PathBuf::from("data").join("energyflow.db")
        );
    }

    #[test]
    fn builtin_rules_without_override() {
        assert_eq!(config(None).load_rules().unwrap(), ConnectionRules::builtin());
    }

    #[test]
    fn rules_override_is_read_from_file() {
        let path = std::env::temp_dir().join(format!("energyflow-rules-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, r#"[{ "source": "solar array", "targets": ["consumer"] }]"#).unwrap();

        let rules = config(Some(path.display().to_string())).load_rules().unwrap();
        std::fs::remove_file(&path).ok();

        assert!(rules.allows(NodeType::SolarArray, NodeType::Consumer));
        assert!(!rules.allows(NodeType::Inverter, NodeType::Grid));
    }

    #[test]
    fn missing_rules_file_is_an_error() {
        let result = config(Some("/nonexistent/energyflow-rules.json".to_string())).load_rules();
        assert!(result.is_err());
    }
}
