//! Seed runner - plays simulated games across many seeds and checks each one.

use crate::context::SimContext;
use crate::oracle::LogOracle;
use crate::world::{GameReport, HuntWorld};

use subhunt_core::GameConfig;
use tracing::{debug, info, warn};

/// Result of one simulated game.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub seed: u64,

    /// Game finished and the oracle found nothing wrong
    pub passed: bool,

    /// Total attacks until the game ended
    pub attacks: u64,

    /// Target cells placed
    pub target_cells: usize,

    pub failure_reason: Option<String>,

    /// The full report, when the game ran to completion
    pub report: Option<GameReport>,
}

/// Runs simulated games on fresh current-thread runtimes.
///
/// Each game gets its own runtime and `SimContext`, so a seed always
/// reproduces the same layout, attack sequence and log.
pub struct SeedRunner {
    /// Template config; the seed is overridden per run
    config: GameConfig,
}

impl SeedRunner {
    /// Creates a runner. Simulated games keep their log in memory.
    pub fn new(config: GameConfig) -> Self {
        Self {
            config: config.with_log_path(None),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Plays one game with the given seed.
    pub fn run(&self, seed: u64) -> RunResult {
        debug!(seed, "starting simulated game");

        let runtime = match tokio::runtime::Builder::new_current_thread().build() {
            Ok(runtime) => runtime,
            Err(e) => return RunResult::failed(seed, format!("runtime: {}", e)),
        };

        let config = self.config.clone().with_seed(seed);
        let outcome = runtime.block_on(async move {
            HuntWorld::new(config, SimContext::shared(seed))?.run().await
        });

        let report = match outcome {
            Ok(report) => report,
            Err(e) => {
                warn!(seed, error = %e, "simulated game failed");
                return RunResult::failed(seed, e.to_string());
            }
        };

        let verdict = LogOracle::verify_report(&report);
        if !verdict.passed() {
            warn!(seed, failures = ?verdict.failures, "oracle rejected game");
        }

        RunResult {
            seed,
            passed: verdict.passed(),
            attacks: report.stats.attacks,
            target_cells: report.placement.placed_cells,
            failure_reason: verdict.failure_reason(),
            report: Some(report),
        }
    }

    /// Plays `count` games on consecutive seeds starting at `base_seed`.
    pub fn run_many(&self, base_seed: u64, count: usize) -> Vec<RunResult> {
        let results: Vec<RunResult> = (0..count as u64)
            .map(|offset| self.run(base_seed.wrapping_add(offset)))
            .collect();

        let failed = results.iter().filter(|r| !r.passed).count();
        info!(runs = results.len(), failed, "seed sweep finished");
        results
    }
}

impl RunResult {
    fn failed(seed: u64, reason: String) -> Self {
        Self {
            seed,
            passed: false,
            attacks: 0,
            target_cells: 0,
            failure_reason: Some(reason),
            report: None,
        }
    }
}
