use crate::error::LoadError;
use crate::loader::read_json_file;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Knobs of the constraint engine. Every field is optional in the JSON form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverConfig {
    /// How many sections share one lecture unit.
    pub group_size: Option<usize>,
    /// Upper bound on candidates tried by the search.
    pub max_nodes: Option<u64>,
    pub time_limit_ms: Option<u64>,
    /// Where to write the per-unit domain dump, if anywhere.
    pub diagnostics_path: Option<String>,
}

impl SolverConfig {
    pub fn group_size(&self) -> usize {
        self.group_size.unwrap_or(2).max(1)
    }

    pub fn max_nodes(&self) -> Option<u64> {
        self.max_nodes
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }

    pub fn diagnostics_path(&self) -> Option<&Path> {
        self.diagnostics_path.as_deref().map(Path::new)
    }

    pub fn with_group_size(mut self, group_size: usize) -> Self {
        self.group_size = Some(group_size);
        self
    }

    pub fn with_max_nodes(mut self, max_nodes: u64) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }
}

/// Process-level configuration: where to listen and how to solve.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    #[serde(default)]
    pub solver: SolverConfig,
}

impl Config {
    pub fn bind_address(&self) -> &str {
        self.bind_address.as_deref().unwrap_or("127.0.0.1")
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(8080)
    }
}

pub fn read_config(path: &Path) -> Result<Config, LoadError> {
    read_json_file(path)
}
