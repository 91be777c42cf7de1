//! Game Coordinator - the single synchronization authority over the board.
//!
//! # Critical Section
//!
//! Every read-modify-write of the board happens inside one lock held by the
//! coordinator:
//!
//! ```text
//! lock ─► status Over? ──yes──► unlock, GameAlreadyOver
//!              │ no
//!              ▼
//!         sample coord ─► Board::attack ─► is_cleared? ──yes──► status = Over
//!              │                                                    │
//!              └──────────────────────► unlock ◄────────────────────┘
//!                                          │
//!                                          ▼
//!                                 AttackReport (logged by caller)
//! ```
//!
//! Two agents therefore can never both destroy the same cell, and the
//! `Running → Over` transition happens exactly once.
//!
//! # Fast-path flag
//!
//! [`Coordinator::is_over`] reads an atomic mirror of the status without
//! taking the lock. Agents use it only to skip a turn early; it may lag the
//! real status, and correctness rests on the check repeated inside
//! [`Coordinator::attempt_attack`].

use crate::board::{AttackOutcome, Board};
use crate::error::{HuntError, Result};
use crate::render::render_board;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use subhunt_env::{AgentId, Coord};
use tracing::{debug, info};

/// Lifecycle of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Running,
    /// Terminal.
    Over,
}

/// One completed attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackReport {
    pub agent: AgentId,
    pub coord: Coord,
    pub outcome: AttackOutcome,

    /// Target cells left after this attack
    pub remaining: usize,

    /// This attack ended the game
    pub ended_game: bool,
}

/// Result of asking the coordinator for a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnResult {
    Attack(AttackReport),
    /// The game ended before this turn; the agent must stop.
    GameAlreadyOver,
}

/// Running totals over all attacks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    pub attacks: u64,
    pub hits: u64,
    pub misses: u64,
    pub repeats: u64,
    pub remaining: usize,
}

/// Everything guarded by the game state lock.
#[derive(Debug)]
pub struct GameState {
    board: Board,
    status: GameStatus,

    /// Attack sampler; lives under the lock so the global attack sequence
    /// is reproducible for a given seed.
    rng: ChaCha8Rng,

    stats: GameStats,
}

impl GameState {
    fn new(board: Board, rng: ChaCha8Rng) -> Self {
        // A board with nothing to find is over before it starts
        let status = if board.is_cleared() {
            GameStatus::Over
        } else {
            GameStatus::Running
        };
        let stats = GameStats {
            remaining: board.remaining_targets(),
            ..Default::default()
        };
        Self { board, status, rng, stats }
    }
}

/// Owns the board and the game-over status.
#[derive(Debug)]
pub struct Coordinator {
    state: Mutex<GameState>,

    /// Lock-free mirror of `status == Over`, for the agent fast path only
    over_hint: AtomicBool,
}

impl Coordinator {
    /// Takes ownership of a populated board.
    ///
    /// `rng` drives coordinate sampling for every attack.
    pub fn new(board: Board, rng: ChaCha8Rng) -> Self {
        let state = GameState::new(board, rng);
        let over = state.status == GameStatus::Over;
        Self {
            state: Mutex::new(state),
            over_hint: AtomicBool::new(over),
        }
    }

    /// Performs one attack for `agent` as a single atomic step.
    pub fn attempt_attack(&self, agent: AgentId) -> Result<TurnResult> {
        let mut guard = self.lock()?;
        let state = &mut *guard;

        if state.status == GameStatus::Over {
            return Ok(TurnResult::GameAlreadyOver);
        }

        let coord = Coord::new(
            state.rng.gen_range(0..state.board.rows()),
            state.rng.gen_range(0..state.board.cols()),
        );
        let outcome = state.board.attack(coord);

        state.stats.attacks += 1;
        match outcome {
            AttackOutcome::Hit => state.stats.hits += 1,
            AttackOutcome::Miss => state.stats.misses += 1,
            AttackOutcome::Repeat => state.stats.repeats += 1,
        }
        let remaining = state.board.remaining_targets();
        state.stats.remaining = remaining;

        let ended_game = state.board.is_cleared();
        if ended_game {
            state.status = GameStatus::Over;
            self.over_hint.store(true, Ordering::Release);
            info!(%agent, attacks = state.stats.attacks, "last target destroyed");
        }
        drop(guard);

        debug!(%agent, %coord, %outcome, remaining, "attack");

        Ok(TurnResult::Attack(AttackReport {
            agent,
            coord,
            outcome,
            remaining,
            ended_game,
        }))
    }

    /// Best-effort, lock-free game-over check.
    ///
    /// May return `false` briefly after the game ended; never returns `true`
    /// while it is still running.
    pub fn is_over(&self) -> bool {
        self.over_hint.load(Ordering::Acquire)
    }

    /// Authoritative status, read under the lock.
    pub fn status(&self) -> Result<GameStatus> {
        Ok(self.lock()?.status)
    }

    pub fn stats(&self) -> Result<GameStats> {
        Ok(self.lock()?.stats)
    }

    /// Copy of the board as of now.
    pub fn board_snapshot(&self) -> Result<Board> {
        Ok(self.lock()?.board.clone())
    }

    /// Text dump of the board.
    pub fn render(&self, reveal_targets: bool) -> Result<String> {
        let state = self.lock()?;
        Ok(render_board(&state.board, reveal_targets))
    }

    fn lock(&self) -> Result<MutexGuard<'_, GameState>> {
        self.state.lock().map_err(|_| HuntError::StatePoisoned)
    }
}
