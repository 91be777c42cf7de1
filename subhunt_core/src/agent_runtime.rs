//! Agent Runtime - the attacker loop, run against any environment context.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     AttackerAgent                        │
//! │                                                          │
//! │   is_over()? ──yes──► stop                               │
//! │       │ no                                               │
//! │       ▼                                                  │
//! │   Coordinator::attempt_attack ──GameAlreadyOver──► stop  │
//! │       │  (board lock held only inside this call)         │
//! │       ▼                                                  │
//! │   EventLog::record             (log lock only)           │
//! │       │                                                  │
//! │       ▼                                                  │
//! │   ctx.sleep(pause) ──────────────────► loop              │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The board lock and the log lock are never held at the same time.
//!
//! # Usage
//!
//! ```ignore
//! use subhunt_core::agent_runtime::AttackerAgent;
//! use subhunt_env::TokioContext;
//!
//! let ctx = TokioContext::shared();
//! let agent = AttackerAgent::new(AgentId(1), coordinator, log, ctx, pause);
//! let summary = agent.run().await?;
//! ```

use crate::board::AttackOutcome;
use crate::coordinator::{Coordinator, TurnResult};
use crate::error::Result;
use crate::event_log::{EventLog, EventRecord};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use subhunt_env::{AgentId, HuntContext};
use tracing::debug;

/// Per-agent tally returned when the agent stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSummary {
    pub agent: AgentId,
    pub turns: u64,
    pub hits: u64,
    pub misses: u64,
    pub repeats: u64,

    /// This agent destroyed the last target
    pub finished_game: bool,
}

impl AgentSummary {
    fn new(agent: AgentId) -> Self {
        Self {
            agent,
            turns: 0,
            hits: 0,
            misses: 0,
            repeats: 0,
            finished_game: false,
        }
    }
}

/// One concurrent attacker.
///
/// Generic over the context so the same loop runs on wall-clock time or on
/// the simulation's virtual clock. The agent never touches the board
/// directly; every attack goes through the [`Coordinator`].
pub struct AttackerAgent<Ctx>
where
    Ctx: HuntContext,
{
    id: AgentId,
    coordinator: Arc<Coordinator>,
    log: Arc<EventLog>,
    context: Arc<Ctx>,

    /// Pause between turns
    pause: Duration,
}

impl<Ctx> AttackerAgent<Ctx>
where
    Ctx: HuntContext,
{
    pub fn new(
        id: AgentId,
        coordinator: Arc<Coordinator>,
        log: Arc<EventLog>,
        context: Arc<Ctx>,
        pause: Duration,
    ) -> Self {
        Self {
            id,
            coordinator,
            log,
            context,
            pause,
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    /// Plays until the coordinator reports the game is over.
    pub async fn run(self) -> Result<AgentSummary> {
        let mut summary = AgentSummary::new(self.id);

        // Double-checked exit: `is_over()` is a lock-free hint that lets the
        // agent skip a turn it cannot take. It is not sufficient on its own;
        // the authoritative check is the status test inside
        // `attempt_attack`, which returns `GameAlreadyOver`.
        while !self.coordinator.is_over() {
            let report = match self.coordinator.attempt_attack(self.id)? {
                TurnResult::Attack(report) => report,
                TurnResult::GameAlreadyOver => break,
            };

            summary.turns += 1;
            match report.outcome {
                AttackOutcome::Hit => summary.hits += 1,
                AttackOutcome::Miss => summary.misses += 1,
                AttackOutcome::Repeat => summary.repeats += 1,
            }
            summary.finished_game |= report.ended_game;

            // Board lock already released; the log has its own.
            self.log
                .record(&EventRecord::new(self.id, report.outcome, report.coord));

            self.context.sleep(self.pause).await;
        }

        debug!(
            agent = %self.id,
            turns = summary.turns,
            hits = summary.hits,
            "agent stopped"
        );
        Ok(summary)
    }
}
