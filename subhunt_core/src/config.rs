//! Startup parameters for a game.

use crate::error::{HuntError, Result};
use crate::event_log::DEFAULT_LOG_CAPACITY;
use crate::placement::PlacementConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for one game.
///
/// Defaults reproduce the classic setup: a 10×10 board, three agents,
/// 10–15% of the cells covered by targets, one second between turns and a
/// 10 000 byte log in `game_log.txt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Board height
    pub rows: usize,

    /// Board width
    pub cols: usize,

    /// Number of concurrent attacker agents
    pub agents: usize,

    /// Target coverage bounds
    pub placement: PlacementConfig,

    /// Pause between an agent's turns, in milliseconds
    pub pause_ms: u64,

    /// Event log capacity in bytes
    pub log_capacity: usize,

    /// Event log file (`None` keeps the log in memory)
    pub log_path: Option<PathBuf>,

    /// Master seed (0 = entropy)
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: 10,
            cols: 10,
            agents: 3,
            placement: PlacementConfig::default(),
            pause_ms: 1000,
            log_capacity: DEFAULT_LOG_CAPACITY,
            log_path: Some(PathBuf::from("game_log.txt")),
            seed: 0,
        }
    }
}

impl GameConfig {
    /// Loads a config from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_err = |reason: String| HuntError::ConfigFile {
            path: path.to_path_buf(),
            reason,
        };

        let text = std::fs::read_to_string(path).map_err(|e| config_err(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| config_err(e.to_string()))
    }

    pub fn with_board(mut self, rows: usize, cols: usize) -> Self {
        self.rows = rows;
        self.cols = cols;
        self
    }

    pub fn with_agents(mut self, agents: usize) -> Self {
        self.agents = agents;
        self
    }

    pub fn with_placement(mut self, placement: PlacementConfig) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause_ms = pause.as_millis() as u64;
        self
    }

    pub fn with_log_capacity(mut self, capacity: usize) -> Self {
        self.log_capacity = capacity;
        self
    }

    pub fn with_log_path(mut self, path: Option<PathBuf>) -> Self {
        self.log_path = path;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Pause between turns.
    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }

    /// Rejects configurations that cannot start a game.
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(HuntError::invalid_config(format!(
                "board must have at least one row and column, got {}x{}",
                self.rows, self.cols
            )));
        }
        if self.agents == 0 {
            return Err(HuntError::invalid_config("at least one agent is required"));
        }
        if u32::try_from(self.agents).is_err() {
            return Err(HuntError::invalid_config(format!(
                "{} agents exceeds the agent id range",
                self.agents
            )));
        }
        if self.log_capacity == 0 {
            return Err(HuntError::invalid_config("log capacity must be positive"));
        }
        self.placement.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();

        assert_eq!((config.rows, config.cols), (10, 10));
        assert_eq!(config.agents, 3);
        assert_eq!(config.pause(), Duration::from_secs(1));
        assert_eq!(config.log_capacity, 10_000);
        assert_eq!(config.log_path.as_deref(), Some(Path::new("game_log.txt")));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_degenerate() {
        assert!(GameConfig::default().with_board(0, 10).validate().is_err());
        assert!(GameConfig::default().with_agents(0).validate().is_err());
        assert!(GameConfig::default()
            .with_agents(u32::MAX as usize)
            .validate()
            .is_ok());
        assert!(GameConfig::default().with_log_capacity(0).validate().is_err());
        assert!(GameConfig::default()
            .with_placement(PlacementConfig { min_fraction: 0.5, max_fraction: 0.2 })
            .validate()
            .is_err());
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_validate_rejects_agent_count_beyond_id_range() {
        let config = GameConfig::default().with_agents(u32::MAX as usize + 1);
        assert!(matches!(config.validate(), Err(HuntError::InvalidConfig(_))));
    }

    #[test]
    fn test_json_file_partial_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.json");
        std::fs::write(&path, r#"{ "agents": 5, "pause_ms": 10 }"#).unwrap();

        let config = GameConfig::from_json_file(&path).unwrap();

        assert_eq!(config.agents, 5);
        assert_eq!(config.pause_ms, 10);
        assert_eq!(config.rows, 10);
    }

    #[test]
    fn test_json_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            GameConfig::from_json_file(&path),
            Err(HuntError::ConfigFile { .. })
        ));
        assert!(GameConfig::from_json_file(dir.path().join("absent.json")).is_err());
    }
}
