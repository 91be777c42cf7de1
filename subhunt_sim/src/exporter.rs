//! JSON exporter for finished games.
//!
//! Writes one game's configuration, target layout, totals and per-agent
//! tallies as JSON for offline analysis.

use crate::world::GameReport;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use subhunt_core::{AgentSummary, GameConfig, GameStats};
use subhunt_env::Coord;
use uuid::Uuid;

/// Complete game export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameExport {
    /// Unique id of this run
    pub run_id: Uuid,

    /// Seed used (0 = entropy)
    pub seed: u64,

    pub config: GameConfig,

    /// Every placed target, as its list of cells
    pub targets: Vec<Vec<Coord>>,

    pub stats: GameStats,

    pub agents: Vec<AgentSummary>,

    /// Context time the agents ran for, in seconds
    pub elapsed_sec: f64,

    /// Bytes stored in the event log
    pub log_bytes: usize,

    /// Records dropped by a full event log
    #[serde(skip_serializing_if = "is_zero")]
    #[serde(default)]
    pub dropped_records: u64,

    /// Oracle verdict
    pub passed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}

impl GameExport {
    /// Builds an export from a finished game.
    pub fn new(config: &GameConfig, report: &GameReport) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            seed: report.seed,
            config: config.clone(),
            targets: report.placement.runs.clone(),
            stats: report.stats,
            agents: report.agents.clone(),
            elapsed_sec: report.elapsed.as_secs_f64(),
            log_bytes: report.log.len(),
            dropped_records: report.dropped_records,
            passed: false,
            failure_reason: None,
        }
    }

    /// Records the oracle's verdict.
    pub fn finalize(&mut self, passed: bool, failure_reason: Option<String>) {
        self.passed = passed;
        self.failure_reason = failure_reason;
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
