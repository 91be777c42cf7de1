//! SubHunt Core - a concurrent, cooperative search-and-destroy game engine.
//!
//! Several attacker agents share one board seeded with hidden straight-line
//! targets and probe random cells until every target cell is destroyed.
//! The engine solves three problems:
//! 1. **Double counting**: every attack-and-recheck runs inside one critical
//!    section owned by the [`Coordinator`]
//! 2. **Termination**: the `Running → Over` transition happens exactly once,
//!    inside that same section
//! 3. **Concurrent logging**: an independent, capacity-bounded [`EventLog`]
//!    that many agents append to without interleaving

pub mod agent_runtime;
pub mod board;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod event_log;
pub mod placement;
pub mod render;

// Re-export key types for convenience
pub use agent_runtime::{AgentSummary, AttackerAgent};
pub use board::{AttackOutcome, Board, Cell};
pub use config::GameConfig;
pub use coordinator::{AttackReport, Coordinator, GameStats, GameStatus, TurnResult};
pub use error::{HuntError, Result};
pub use event_log::{EventLog, EventRecord, COMPLETION_LINE, DEFAULT_LOG_CAPACITY};
pub use placement::{
    place_random_targets, Orientation, PlacementConfig, PlacementReport, MAX_TARGET_LEN,
    MIN_TARGET_LEN,
};
pub use render::render_board;

/// RNG stream used for target placement.
pub const PLACEMENT_STREAM: u64 = 1;

/// RNG stream used for attack sampling.
pub const ATTACK_STREAM: u64 = 2;
