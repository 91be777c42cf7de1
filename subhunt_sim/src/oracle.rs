//! Log oracle for simulation.
//!
//! The Oracle knows the ground truth of a finished game (how many target
//! cells were placed, what the final board looks like) and checks the event
//! log against it:
//! - Every line is an event, a board dump row, or the completion line
//! - No coordinate is reported as `Hit` twice
//! - The number of `Hit` lines equals the number of placed target cells
//! - The completion line is present
//!
//! The last two checks only apply when the log dropped nothing.

use crate::world::GameReport;
use std::collections::{BTreeMap, HashSet};
use subhunt_core::{AttackOutcome, Cell, EventRecord, COMPLETION_LINE};
use subhunt_env::{AgentId, Coord};

/// Outcome of checking one game's log.
#[derive(Debug, Clone, Default)]
pub struct OracleVerdict {
    /// Parsed attack lines
    pub events: usize,

    pub hits: usize,
    pub misses: usize,
    pub repeats: usize,

    /// Attack lines per agent
    pub per_agent: BTreeMap<AgentId, usize>,

    /// Lines that are neither events, dumps nor the completion line
    pub malformed: Vec<String>,

    /// Coordinates reported as `Hit` more than once
    pub duplicate_hits: Vec<Coord>,

    /// Completion line seen
    pub completed: bool,

    /// Problems found, in the order they were detected
    pub failures: Vec<String>,
}

impl OracleVerdict {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }

    /// First failure, for one-line summaries.
    pub fn failure_reason(&self) -> Option<String> {
        self.failures.first().cloned()
    }
}

/// Ground-truth checker for game logs.
#[derive(Debug, Clone)]
pub struct LogOracle {
    /// Target cells placed at the start of the game
    placed_cells: usize,

    /// The log dropped nothing, so every attack must be present
    complete: bool,
}

impl LogOracle {
    pub fn new(placed_cells: usize, complete: bool) -> Self {
        Self {
            placed_cells,
            complete,
        }
    }

    /// Checks a raw log.
    pub fn verify(&self, log: &str) -> OracleVerdict {
        let mut verdict = OracleVerdict::default();
        let mut hit_cells = HashSet::new();

        for line in log.lines() {
            if line == COMPLETION_LINE {
                verdict.completed = true;
                continue;
            }
            if is_dump_line(line) {
                continue;
            }

            let Some(record) = EventRecord::parse(line) else {
                verdict.malformed.push(line.to_string());
                continue;
            };

            verdict.events += 1;
            *verdict.per_agent.entry(record.agent).or_insert(0) += 1;
            match record.outcome {
                AttackOutcome::Hit => {
                    verdict.hits += 1;
                    if !hit_cells.insert(record.coord) {
                        verdict.duplicate_hits.push(record.coord);
                    }
                }
                AttackOutcome::Miss => verdict.misses += 1,
                AttackOutcome::Repeat => verdict.repeats += 1,
            }
        }

        if !verdict.malformed.is_empty() {
            verdict
                .failures
                .push(format!("{} malformed log lines", verdict.malformed.len()));
        }
        if let Some(coord) = verdict.duplicate_hits.first() {
            verdict.failures.push(format!("cell {} reported hit twice", coord));
        }
        if self.complete {
            if verdict.hits != self.placed_cells {
                verdict.failures.push(format!(
                    "{} hits logged, {} target cells placed",
                    verdict.hits, self.placed_cells
                ));
            }
            if !verdict.completed {
                verdict.failures.push("completion line missing".to_string());
            }
        }

        verdict
    }

    /// Checks a finished game: its log plus its final board and counters.
    pub fn verify_report(report: &GameReport) -> OracleVerdict {
        let oracle = LogOracle::new(report.placement.placed_cells, report.dropped_records == 0);
        let mut verdict = oracle.verify(&report.log);

        let destroyed = report.final_board.count_cells(Cell::Hit);
        if destroyed != report.placement.placed_cells {
            verdict.failures.push(format!(
                "final board has {} destroyed cells, {} placed",
                destroyed, report.placement.placed_cells
            ));
        }
        if report.final_board.count_cells(Cell::Target) != 0 {
            verdict.failures.push("targets left on the final board".to_string());
        }
        if report.stats.hits as usize != report.placement.placed_cells {
            verdict.failures.push(format!(
                "coordinator counted {} hits, {} placed",
                report.stats.hits, report.placement.placed_cells
            ));
        }
        let agent_turns: u64 = report.agents.iter().map(|a| a.turns).sum();
        if agent_turns != report.stats.attacks {
            verdict.failures.push(format!(
                "agents took {} turns, coordinator saw {} attacks",
                agent_turns, report.stats.attacks
            ));
        }

        verdict
    }
}

/// Board dump rows are runs of ` c ` cells; the blank separator counts too.
fn is_dump_line(line: &str) -> bool {
    line.chars().all(|c| matches!(c, ' ' | '.' | 'X' | 'V'))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD_LOG: &str = "\
 .  X  X
 .  .  .

Agent 1: Miss at [1,0]
Agent 2: Hit at [0,1]
Agent 1: Repeat at [0,1]
Agent 3: Hit at [0,2]
Game over! All targets have been destroyed.
 .  V  V
 .  .  .

";

    #[test]
    fn test_clean_log_passes() {
        let verdict = LogOracle::new(2, true).verify(GOOD_LOG);

        assert!(verdict.passed(), "{:?}", verdict.failures);
        assert_eq!(verdict.events, 4);
        assert_eq!((verdict.hits, verdict.misses, verdict.repeats), (2, 1, 1));
        assert_eq!(verdict.per_agent[&AgentId(1)], 2);
        assert!(verdict.completed);
    }

    #[test]
    fn test_duplicate_hit_detected() {
        let log = "Agent 1: Hit at [0,1]\nAgent 2: Hit at [0,1]\n";
        let verdict = LogOracle::new(2, false).verify(log);

        assert!(!verdict.passed());
        assert_eq!(verdict.duplicate_hits, vec![Coord::new(0, 1)]);
    }

    #[test]
    fn test_missing_hits_and_completion() {
        let verdict = LogOracle::new(3, true).verify("Agent 1: Hit at [0,1]\n");

        assert!(!verdict.passed());
        assert_eq!(verdict.failures.len(), 2);
    }

    #[test]
    fn test_incomplete_log_skips_totals() {
        let verdict = LogOracle::new(3, false).verify("Agent 1: Hit at [0,1]\n");
        assert!(verdict.passed());
    }

    #[test]
    fn test_malformed_line_detected() {
        let verdict = LogOracle::new(0, false).verify("Agent 1: Hit at [0,1\n");

        assert_eq!(verdict.malformed.len(), 1);
        assert!(!verdict.passed());
    }
}
