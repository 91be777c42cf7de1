//! SubHunt CLI
//!
//! Plays a submarine hunt on the real clock, or replays seeded games on the
//! virtual clock and checks each log with the oracle.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use subhunt_core::{render_board, GameConfig, HuntError, Result, COMPLETION_LINE};
use subhunt_env::{EnvError, HuntContext, TokioContext};
use subhunt_sim::{
    GameExport, GameReport, HuntWorld, LogOracle, RunResult, SeedRunner, SimContext,
};
use tracing::{debug, error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// SubHunt: concurrent agents hunting hidden targets on a grid
#[derive(Parser, Debug)]
#[command(name = "subhunt")]
#[command(about = "Run a concurrent submarine hunt", long_about = None)]
struct Args {
    /// Board height
    #[arg(long)]
    rows: Option<usize>,

    /// Board width
    #[arg(long)]
    cols: Option<usize>,

    /// Number of attacker agents
    #[arg(short, long)]
    agents: Option<usize>,

    /// Lower bound of the fraction of cells covered by targets
    #[arg(long)]
    min_fraction: Option<f64>,

    /// Upper bound of the fraction of cells covered by targets
    #[arg(long)]
    max_fraction: Option<f64>,

    /// Pause between an agent's turns, in milliseconds
    #[arg(long)]
    pause_ms: Option<u64>,

    /// Event log capacity in bytes
    #[arg(long)]
    log_capacity: Option<usize>,

    /// Event log file
    #[arg(long)]
    log_path: Option<PathBuf>,

    /// Master seed (0 = random)
    #[arg(short, long, default_value = "0")]
    seed: u64,

    /// Number of consecutive seeds to replay on the virtual clock
    #[arg(long, default_value = "1")]
    seeds: usize,

    /// JSON config file supplying base values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Export the finished game to a JSON file
    #[arg(long)]
    export: Option<String>,

    /// Run on the deterministic virtual clock
    #[arg(long)]
    simulate: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,
}

impl Args {
    /// Config file (or defaults) overridden by explicit flags.
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::from_json_file(path)?,
            None => GameConfig::default(),
        };

        if let Some(rows) = self.rows {
            config.rows = rows;
        }
        if let Some(cols) = self.cols {
            config.cols = cols;
        }
        if let Some(agents) = self.agents {
            config.agents = agents;
        }
        if let Some(fraction) = self.min_fraction {
            config.placement.min_fraction = fraction;
        }
        if let Some(fraction) = self.max_fraction {
            config.placement.max_fraction = fraction;
        }
        if let Some(pause_ms) = self.pause_ms {
            config.pause_ms = pause_ms;
        }
        if let Some(capacity) = self.log_capacity {
            config.log_capacity = capacity;
        }
        if self.log_path.is_some() {
            config.log_path = self.log_path.clone();
        }
        if self.seed != 0 {
            config.seed = self.seed;
        }

        config.validate()?;
        Ok(config)
    }
}

fn runtime_error(e: std::io::Error) -> HuntError {
    HuntError::from(EnvError::ContextError(format!("failed to build runtime: {}", e)))
}

/// Seed for virtual-clock runs; these always need a concrete one.
fn resolve_sim_seed(seed: u64) -> u64 {
    if seed != 0 {
        return seed;
    }
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(1)
}

/// Plays one game, printing the boards unless JSON output was requested.
fn play<Ctx: HuntContext>(
    runtime: &tokio::runtime::Runtime,
    config: &GameConfig,
    context: Arc<Ctx>,
    quiet: bool,
) -> Result<GameReport> {
    let world = HuntWorld::new(config.clone(), context)?;
    if !quiet {
        print!("{}", world.render()?);
    }

    let report = runtime.block_on(world.run())?;

    if !quiet {
        println!("{}", COMPLETION_LINE);
        print!("{}", render_board(&report.final_board, true));
    }
    Ok(report)
}

fn run_single(args: &Args, config: GameConfig) -> Result<bool> {
    let report = if args.simulate {
        let seed = resolve_sim_seed(config.seed);
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .map_err(runtime_error)?;
        info!(seed, "playing on the virtual clock");
        play(&runtime, &config, SimContext::shared(seed), args.json)?
    } else {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(runtime_error)?;
        let context = Arc::new(TokioContext::with_seed(config.seed));
        play(&runtime, &config, context, args.json)?
    };

    let verdict = LogOracle::verify_report(&report);
    let passed = verdict.passed();
    debug!(events = verdict.events, hits = verdict.hits, "log verified");

    if let Some(path) = &args.export {
        let mut export = GameExport::new(&config, &report);
        export.finalize(passed, verdict.failure_reason());
        match export.write_to_file(path) {
            Ok(()) => info!("Exported game to {}", path),
            Err(e) => error!("Failed to write export: {:?}", e),
        }
    }

    if args.json {
        let summary = serde_json::json!({
            "seed": report.seed,
            "passed": passed,
            "target_cells": report.placement.placed_cells,
            "targets": report.placement.target_count(),
            "stats": report.stats,
            "agents": report.agents,
            "elapsed_secs": report.elapsed.as_secs_f64(),
            "dropped_records": report.dropped_records,
            "failure_reason": verdict.failure_reason(),
        });
        println!("{}", serde_json::to_string_pretty(&summary).unwrap_or_default());
    } else {
        info!(
            attacks = report.stats.attacks,
            misses = report.stats.misses,
            repeats = report.stats.repeats,
            "game finished"
        );
        if !passed {
            error!(
                "✗ log check FAILED: {}",
                verdict.failure_reason().as_deref().unwrap_or("unknown")
            );
        }
    }

    Ok(passed)
}

fn run_sweep(args: &Args, config: GameConfig) -> bool {
    let base_seed = resolve_sim_seed(config.seed);
    let runner = SeedRunner::new(config);
    let mut results: Vec<RunResult> = Vec::with_capacity(args.seeds);

    for offset in 0..args.seeds {
        let result = runner.run(base_seed.wrapping_add(offset as u64));
        if !args.json {
            if result.passed {
                info!("✓ seed={} PASSED ({} attacks)", result.seed, result.attacks);
            } else {
                error!(
                    "✗ seed={} FAILED: {}",
                    result.seed,
                    result.failure_reason.as_deref().unwrap_or("unknown")
                );
            }
        }
        results.push(result);
    }

    let total = results.len();
    let failed_count = results.iter().filter(|r| !r.passed).count();

    if args.json {
        let summary = serde_json::json!({
            "total": total,
            "passed": total - failed_count,
            "failed": failed_count,
            "results": results.iter().map(|r| {
                serde_json::json!({
                    "seed": r.seed,
                    "passed": r.passed,
                    "attacks": r.attacks,
                    "target_cells": r.target_cells,
                    "failure_reason": r.failure_reason,
                })
            }).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&summary).unwrap_or_default());
    } else if failed_count == 0 {
        info!("✅ All {} seeded games passed!", total);
    } else {
        error!("❌ {}/{} seeded games failed!", failed_count, total);
        for result in results.iter().filter(|r| !r.passed) {
            error!(
                "  - seed={}: {}",
                result.seed,
                result.failure_reason.as_deref().unwrap_or("unknown")
            );
        }
    }

    failed_count == 0
}

fn main() {
    let args = Args::parse();

    // Diagnostics go to stderr; stdout carries the boards or the JSON summary
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let config = match args.game_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let passed = if args.seeds > 1 {
        run_sweep(&args, config)
    } else {
        match run_single(&args, config) {
            Ok(passed) => passed,
            Err(e) => {
                error!("{}", e);
                false
            }
        }
    };

    if !passed {
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn parse(args: &[&str]) -> Args {
        Args::parse_from(std::iter::once("subhunt").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults_without_flags() {
        let config = parse(&[]).game_config().unwrap();
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.json");
        std::fs::write(
            &path,
            r#"{ "rows": 12, "agents": 5, "pause_ms": 10,
                 "placement": { "min_fraction": 0.05, "max_fraction": 0.2 } }"#,
        )
        .unwrap();
        let path_arg = path.to_str().unwrap();

        let config = parse(&[
            "--config",
            path_arg,
            "--agents",
            "2",
            "--max-fraction",
            "0.12",
            "--log-path",
            "run.txt",
            "--seed",
            "9",
        ])
        .game_config()
        .unwrap();

        // From the file
        assert_eq!(config.rows, 12);
        assert_eq!(config.pause_ms, 10);
        assert_eq!(config.placement.min_fraction, 0.05);
        // From flags
        assert_eq!(config.agents, 2);
        assert_eq!(config.placement.max_fraction, 0.12);
        assert_eq!(config.log_path.as_deref(), Some(Path::new("run.txt")));
        assert_eq!(config.seed, 9);
        // Untouched defaults
        assert_eq!(config.cols, 10);
    }

    #[test]
    fn test_fraction_flags_alone() {
        let config = parse(&["--min-fraction", "0.2", "--max-fraction", "0.3"])
            .game_config()
            .unwrap();
        assert_eq!(config.placement.min_fraction, 0.2);
        assert_eq!(config.placement.max_fraction, 0.3);
    }

    #[test]
    fn test_invalid_config_is_setup_error() {
        assert!(matches!(
            parse(&["--agents", "0"]).game_config(),
            Err(HuntError::InvalidConfig(_))
        ));
        assert!(matches!(
            parse(&["--min-fraction", "0.5", "--max-fraction", "0.1"]).game_config(),
            Err(HuntError::InvalidConfig(_))
        ));
        assert!(matches!(
            parse(&["--config", "/nonexistent/subhunt.json"]).game_config(),
            Err(HuntError::ConfigFile { .. })
        ));
    }

    #[test]
    fn test_simulated_single_game_passes() {
        let args = parse(&["--simulate", "--seed", "5", "--pause-ms", "1", "--json"]);
        let config = args.game_config().unwrap().with_log_path(None);

        assert!(run_single(&args, config).unwrap());
    }

    #[test]
    fn test_sweep_reports_success() {
        let args = parse(&["--seeds", "3", "--seed", "40", "--pause-ms", "1", "--json"]);
        let config = args.game_config().unwrap().with_log_capacity(1_000_000);

        assert!(run_sweep(&args, config));
    }
}
