//! HuntWorld - assembles a game and runs it to completion.

use subhunt_core::{
    place_random_targets, AgentSummary, AttackerAgent, Board, Cell, Coordinator, EventLog,
    GameConfig, GameStats, HuntError, Orientation, PlacementReport, Result, ATTACK_STREAM,
    COMPLETION_LINE, MAX_TARGET_LEN, MIN_TARGET_LEN, PLACEMENT_STREAM,
};
use subhunt_env::{AgentId, Coord, EnvError, HuntContext};

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Everything known about a finished game.
#[derive(Debug, Clone)]
pub struct GameReport {
    /// Seed of the context the game ran on (0 = entropy)
    pub seed: u64,

    pub placement: PlacementReport,

    pub stats: GameStats,

    /// Per-agent tallies, in agent id order
    pub agents: Vec<AgentSummary>,

    pub final_board: Board,

    /// Event log contents at the end of the game
    pub log: String,

    /// Records the log dropped for lack of capacity
    pub dropped_records: u64,

    /// Context time elapsed while agents were running
    pub elapsed: Duration,
}

/// A game ready to run: board populated, log open, coordinator armed.
pub struct HuntWorld<Ctx>
where
    Ctx: HuntContext,
{
    /// Configuration
    pub config: GameConfig,

    /// Shared environment context
    pub context: Arc<Ctx>,

    coordinator: Arc<Coordinator>,
    log: Arc<EventLog>,
    placement: PlacementReport,
}

impl<Ctx> HuntWorld<Ctx>
where
    Ctx: HuntContext,
{
    /// Creates a world with randomly placed targets.
    ///
    /// Fails before anything runs if the config is invalid or the log
    /// storage cannot be created.
    pub fn new(config: GameConfig, context: Arc<Ctx>) -> Result<Self> {
        config.validate()?;

        let mut board = Board::new(config.rows, config.cols);
        let mut placement_rng = context.derive_rng(PLACEMENT_STREAM);
        let placement = place_random_targets(&mut board, &mut placement_rng, &config.placement)?;

        Self::assemble(config, context, board, placement)
    }

    /// Creates a world with a fixed target layout.
    ///
    /// Each run must be a straight line of in-bounds cells and runs must not
    /// overlap.
    pub fn with_targets(
        config: GameConfig,
        context: Arc<Ctx>,
        runs: Vec<Vec<Coord>>,
    ) -> Result<Self> {
        config.validate()?;

        let mut board = Board::new(config.rows, config.cols);
        let mut placed_cells = 0;
        for run in &runs {
            check_run(&board, run)?;
            board.place_target(run);
            placed_cells += run.len();
        }

        let placement = PlacementReport {
            requested_cells: placed_cells,
            placed_cells,
            runs,
        };
        Self::assemble(config, context, board, placement)
    }

    fn assemble(
        config: GameConfig,
        context: Arc<Ctx>,
        board: Board,
        placement: PlacementReport,
    ) -> Result<Self> {
        let log = match &config.log_path {
            Some(path) => EventLog::create(path, config.log_capacity)?,
            None => EventLog::in_memory(config.log_capacity),
        };
        let coordinator = Coordinator::new(board, context.derive_rng(ATTACK_STREAM));

        info!(
            rows = config.rows,
            cols = config.cols,
            targets = placement.target_count(),
            target_cells = placement.placed_cells,
            "world ready"
        );

        Ok(Self {
            config,
            context,
            coordinator: Arc::new(coordinator),
            log: Arc::new(log),
            placement,
        })
    }

    pub fn coordinator(&self) -> &Arc<Coordinator> {
        &self.coordinator
    }

    pub fn log(&self) -> &Arc<EventLog> {
        &self.log
    }

    pub fn placement(&self) -> &PlacementReport {
        &self.placement
    }

    /// Board dump with targets visible.
    pub fn render(&self) -> Result<String> {
        self.coordinator.render(true)
    }

    /// Runs the game: initial dump, agents until over, completion line and
    /// final dump, then flushes the log.
    pub async fn run(self) -> Result<GameReport> {
        self.log.append(&self.coordinator.render(true)?);

        let started = self.context.now();
        let pause = self.config.pause();

        let agent_count = u32::try_from(self.config.agents)
            .map_err(|_| HuntError::invalid_config("too many agents"))?;
        let handles: Vec<_> = (1..=agent_count)
            .map(|id| {
                let agent = AttackerAgent::new(
                    AgentId(id),
                    self.coordinator.clone(),
                    self.log.clone(),
                    self.context.clone(),
                    pause,
                );
                let name = format!("agent-{}", agent.id());
                let handle = self.context.spawn(&name, agent.run());
                (name, handle)
            })
            .collect();

        info!(agents = handles.len(), "agents released");

        // Join every agent before reporting, so none is left running detached
        let mut agents = Vec::with_capacity(handles.len());
        let mut first_error = None;
        for (name, handle) in handles {
            let joined = handle
                .await
                .map_err(|e| HuntError::from(EnvError::task_failed(name, e)))
                .and_then(|outcome| outcome);
            match joined {
                Ok(summary) => agents.push(summary),
                Err(e) => {
                    warn!(error = %e, "agent failed");
                    first_error.get_or_insert(e);
                }
            }
        }
        if let Some(e) = first_error {
            self.log.flush()?;
            return Err(e);
        }

        let elapsed = self.context.now().saturating_sub(started);

        self.log.append_line(COMPLETION_LINE);
        self.log.append(&self.coordinator.render(true)?);
        self.log.flush()?;

        let stats = self.coordinator.stats()?;
        let final_board = self.coordinator.board_snapshot()?;
        let dropped_records = self.log.dropped();
        if dropped_records > 0 {
            warn!(dropped_records, capacity = self.log.capacity(), "event log overflowed");
        }

        info!(
            attacks = stats.attacks,
            hits = stats.hits,
            misses = stats.misses,
            repeats = stats.repeats,
            "game over"
        );

        Ok(GameReport {
            seed: self.context.seed(),
            placement: self.placement,
            stats,
            agents,
            final_board,
            log: self.log.snapshot(),
            dropped_records,
            elapsed,
        })
    }
}

fn check_run(board: &Board, run: &[Coord]) -> Result<()> {
    let Some(&first) = run.first() else {
        return Err(HuntError::invalid_config("empty target run"));
    };
    if !(MIN_TARGET_LEN..=MAX_TARGET_LEN).contains(&run.len()) {
        return Err(HuntError::invalid_config(format!(
            "target starting at {} has {} cells, expected {} to {}",
            first,
            run.len(),
            MIN_TARGET_LEN,
            MAX_TARGET_LEN
        )));
    }
    for &coord in run {
        match board.cell(coord) {
            Some(Cell::Empty) => {}
            Some(_) => {
                return Err(HuntError::invalid_config(format!(
                    "targets overlap at {}",
                    coord
                )))
            }
            None => {
                return Err(HuntError::invalid_config(format!(
                    "target cell {} is off the board",
                    coord
                )))
            }
        }
    }
    // Every cell is on the board, so extending from `first` cannot overflow
    let straight = [Orientation::Horizontal, Orientation::Vertical]
        .iter()
        .any(|o| o.run(first, run.len()) == run);
    if !straight {
        return Err(HuntError::invalid_config(format!(
            "target starting at {} is not a contiguous straight line",
            first
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SimContext;
    use crate::oracle::LogOracle;
    use std::collections::HashSet;
    use subhunt_core::{EventRecord, PlacementConfig};

    fn sim_config() -> GameConfig {
        GameConfig::default()
            .with_log_path(None)
            .with_log_capacity(1_000_000)
            .with_pause(Duration::from_millis(1))
    }

    fn three_fours() -> Vec<Vec<Coord>> {
        [1, 4, 7]
            .iter()
            .map(|&row| (3..7).map(|col| Coord::new(row, col)).collect())
            .collect()
    }

    #[test]
    fn test_world_creation() {
        let world = HuntWorld::new(sim_config().with_seed(42), SimContext::shared(42)).unwrap();

        let placed = world.placement().placed_cells;
        assert!(placed >= 10 && placed < 15 + 4);
        assert!(world.render().unwrap().contains('X'));
        assert!(world.log().is_empty());
    }

    #[test]
    fn test_world_determinism() {
        let w1 = HuntWorld::new(sim_config(), SimContext::shared(42)).unwrap();
        let w2 = HuntWorld::new(sim_config(), SimContext::shared(42)).unwrap();

        assert_eq!(w1.placement(), w2.placement());
    }

    #[test]
    fn test_invalid_config_fails_setup() {
        let result = HuntWorld::new(sim_config().with_agents(0), SimContext::shared(1));
        assert!(matches!(result, Err(HuntError::InvalidConfig(_))));
    }

    #[test]
    fn test_with_targets_rejects_bad_layouts() {
        let overlapping = vec![
            vec![Coord::new(0, 0), Coord::new(0, 1)],
            vec![Coord::new(0, 1), Coord::new(1, 1)],
        ];
        assert!(HuntWorld::with_targets(sim_config(), SimContext::shared(1), overlapping).is_err());

        let off_board = vec![vec![Coord::new(9, 9), Coord::new(9, 10)]];
        assert!(HuntWorld::with_targets(sim_config(), SimContext::shared(1), off_board).is_err());

        let bent = vec![vec![Coord::new(0, 0), Coord::new(1, 1)]];
        assert!(HuntWorld::with_targets(sim_config(), SimContext::shared(1), bent).is_err());

        let gapped = vec![vec![Coord::new(0, 0), Coord::new(0, 2)]];
        assert!(HuntWorld::with_targets(sim_config(), SimContext::shared(1), gapped).is_err());

        let single = vec![vec![Coord::new(0, 0)]];
        assert!(matches!(
            HuntWorld::with_targets(sim_config(), SimContext::shared(1), single),
            Err(HuntError::InvalidConfig(_))
        ));

        let too_long = vec![(0..10).map(|col| Coord::new(0, col)).collect()];
        assert!(matches!(
            HuntWorld::with_targets(sim_config(), SimContext::shared(1), too_long),
            Err(HuntError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_with_targets_far_off_board_is_error_not_overflow() {
        let far = vec![vec![Coord::new(0, usize::MAX), Coord::new(0, usize::MAX)]];
        let result = HuntWorld::with_targets(sim_config(), SimContext::shared(1), far);
        assert!(matches!(result, Err(HuntError::InvalidConfig(_))));

        let wrapping = vec![vec![Coord::new(usize::MAX, 0), Coord::new(0, 0)]];
        let result = HuntWorld::with_targets(sim_config(), SimContext::shared(1), wrapping);
        assert!(matches!(result, Err(HuntError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_fixed_layout_three_agents() {
        let world =
            HuntWorld::with_targets(sim_config(), SimContext::shared(7), three_fours()).unwrap();
        let report = world.run().await.unwrap();

        assert_eq!(report.placement.placed_cells, 12);
        assert_eq!(report.stats.hits, 12);
        assert_eq!(report.stats.remaining, 0);
        assert_eq!(report.agents.len(), 3);
        assert_eq!(report.agents.iter().filter(|a| a.finished_game).count(), 1);

        // At least twelve Hit lines, no coordinate hit twice
        let hits: Vec<_> = report
            .log
            .lines()
            .filter_map(EventRecord::parse)
            .filter(|r| r.outcome == subhunt_core::AttackOutcome::Hit)
            .map(|r| r.coord)
            .collect();
        assert!(hits.len() >= 12);
        assert_eq!(hits.iter().collect::<HashSet<_>>().len(), hits.len());

        let verdict = LogOracle::verify_report(&report);
        assert!(verdict.passed(), "{:?}", verdict.failures);
    }

    #[tokio::test]
    async fn test_log_layout() {
        let world =
            HuntWorld::with_targets(sim_config(), SimContext::shared(3), three_fours()).unwrap();
        let report = world.run().await.unwrap();
        let lines: Vec<_> = report.log.lines().collect();

        // Initial dump (10 rows + blank), events, completion, final dump
        assert!(lines[1].contains('X'));
        assert_eq!(lines[10], "");
        let completion = lines.iter().position(|l| *l == COMPLETION_LINE).unwrap();
        assert_eq!(completion, 11 + report.stats.attacks as usize);
        assert_eq!(lines.len(), completion + 1 + 11);
        assert!(!lines[completion + 1..].iter().any(|l| l.contains('X')));
    }

    #[tokio::test]
    async fn test_same_seed_same_game() {
        let run = |seed| async move {
            HuntWorld::new(sim_config(), SimContext::shared(seed))
                .unwrap()
                .run()
                .await
                .unwrap()
        };

        let a = run(11).await;
        let b = run(11).await;

        assert_eq!(a.stats, b.stats);
        assert_eq!(a.log, b.log);
    }

    #[tokio::test]
    async fn test_low_capacity_truncates() {
        let config = sim_config().with_log_capacity(500);
        let world = HuntWorld::new(config, SimContext::shared(5)).unwrap();
        let report = world.run().await.unwrap();

        assert!(report.log.len() <= 500);
        assert!(report.dropped_records > 0);
        assert_eq!(report.stats.remaining, 0);

        let verdict = LogOracle::verify_report(&report);
        assert!(verdict.passed(), "{:?}", verdict.failures);
    }

    #[tokio::test]
    async fn test_empty_layout_ends_immediately() {
        let config = sim_config().with_placement(PlacementConfig::fixed(0.0));
        let report = HuntWorld::new(config, SimContext::shared(2))
            .unwrap()
            .run()
            .await
            .unwrap();

        assert_eq!(report.stats.attacks, 0);
        assert!(report.agents.iter().all(|a| a.turns == 0));
        assert!(report.log.contains(COMPLETION_LINE));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_agents_log_integrity() {
        let config = sim_config().with_agents(6);
        let report = HuntWorld::new(config, SimContext::shared(21))
            .unwrap()
            .run()
            .await
            .unwrap();

        let verdict = LogOracle::verify_report(&report);
        assert!(verdict.passed(), "{:?}", verdict.failures);
        assert_eq!(verdict.events as u64, report.stats.attacks);
        for summary in &report.agents {
            let logged = verdict.per_agent.get(&summary.agent).copied().unwrap_or(0);
            assert_eq!(logged as u64, summary.turns);
        }
    }

    #[tokio::test]
    async fn test_file_log_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game_log.txt");
        let config = sim_config().with_log_path(Some(path.clone()));

        let report = HuntWorld::new(config, SimContext::shared(8)).unwrap().run().await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), report.log);
    }

    #[test]
    fn test_unwritable_log_fails_setup() {
        let dir = tempfile::tempdir().unwrap();
        let config = sim_config().with_log_path(Some(dir.path().join("no").join("such.txt")));

        let result = HuntWorld::new(config, SimContext::shared(1));
        assert!(matches!(result, Err(HuntError::LogStorage { .. })));
    }

    /// Context whose first `sleep` panics, killing exactly one agent task.
    struct FaultyContext {
        inner: SimContext,
        tripped: std::sync::atomic::AtomicBool,
    }

    #[async_trait::async_trait]
    impl HuntContext for FaultyContext {
        fn now(&self) -> Duration {
            self.inner.now()
        }

        async fn sleep(&self, duration: Duration) {
            if !self.tripped.swap(true, std::sync::atomic::Ordering::SeqCst) {
                panic!("agent crashed mid-game");
            }
            self.inner.sleep(duration).await
        }

        fn spawn<F>(&self, name: &str, future: F) -> tokio::task::JoinHandle<F::Output>
        where
            F: std::future::Future + Send + 'static,
            F::Output: Send + 'static,
        {
            self.inner.spawn(name, future)
        }

        fn derive_rng(&self, stream: u64) -> rand_chacha::ChaCha8Rng {
            self.inner.derive_rng(stream)
        }

        fn seed(&self) -> u64 {
            self.inner.seed()
        }
    }

    #[tokio::test]
    async fn test_failed_agent_still_joins_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game_log.txt");
        let context = Arc::new(FaultyContext {
            inner: SimContext::new(13),
            tripped: std::sync::atomic::AtomicBool::new(false),
        });
        let world = HuntWorld::with_targets(
            sim_config().with_log_path(Some(path.clone())),
            context,
            three_fours(),
        )
        .unwrap();
        let coordinator = world.coordinator().clone();
        let log = world.log().clone();

        let result = world.run().await;

        assert!(matches!(result, Err(HuntError::Env(EnvError::TaskFailed { .. }))));
        // The surviving agents played the game out before the error surfaced
        assert!(coordinator.is_over());
        assert_eq!(coordinator.stats().unwrap().hits, 12);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), log.snapshot());
    }
}
