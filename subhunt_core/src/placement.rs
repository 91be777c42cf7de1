//! Random target placement.
//!
//! Runs once, single-threaded, before any agent starts. Targets are straight
//! runs of 2–4 cells placed by rejection sampling: a candidate run is kept
//! only if every cell is in bounds and still `Empty`.
//!
//! # Termination
//!
//! The sampling loop only terminates almost surely when free space stays
//! plentiful relative to run length. Callers must pick a board that is large
//! relative to [`MAX_TARGET_LEN`] and keep `max_fraction` well below 1.

use crate::board::{Board, Cell};
use crate::error::{HuntError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use subhunt_env::Coord;
use tracing::debug;

/// Shortest target run.
pub const MIN_TARGET_LEN: usize = 2;

/// Longest target run.
pub const MAX_TARGET_LEN: usize = 4;

/// Direction a target run extends from its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    /// Returns the cells of a run of `length` starting at `origin`.
    pub fn run(&self, origin: Coord, length: usize) -> Vec<Coord> {
        (0..length)
            .map(|i| match self {
                Orientation::Horizontal => Coord::new(origin.row, origin.col + i),
                Orientation::Vertical => Coord::new(origin.row + i, origin.col),
            })
            .collect()
    }
}

/// Bounds on how much of the board is covered by targets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementConfig {
    /// Lower bound on the target-cell fraction (inclusive)
    pub min_fraction: f64,

    /// Upper bound on the target-cell fraction (inclusive)
    pub max_fraction: f64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            min_fraction: 0.10,
            max_fraction: 0.15,
        }
    }
}

impl PlacementConfig {
    /// Creates a config with both bounds set to the same fraction.
    pub fn fixed(fraction: f64) -> Self {
        Self {
            min_fraction: fraction,
            max_fraction: fraction,
        }
    }

    /// Checks `0 <= min <= max <= 1`.
    pub fn validate(&self) -> Result<()> {
        let in_unit = |f: f64| (0.0..=1.0).contains(&f);
        if !in_unit(self.min_fraction) || !in_unit(self.max_fraction) {
            return Err(HuntError::invalid_config(format!(
                "target fractions must lie in [0, 1], got {}..{}",
                self.min_fraction, self.max_fraction
            )));
        }
        if self.min_fraction > self.max_fraction {
            return Err(HuntError::invalid_config(format!(
                "min target fraction {} exceeds max {}",
                self.min_fraction, self.max_fraction
            )));
        }
        Ok(())
    }

    /// Inclusive range of target-cell counts for a board of `total_cells`.
    ///
    /// Both bounds are truncated towards zero.
    pub fn cell_bounds(&self, total_cells: usize) -> (usize, usize) {
        let low = (self.min_fraction * total_cells as f64) as usize;
        let high = (self.max_fraction * total_cells as f64) as usize;
        (low, high.max(low))
    }
}

/// What the placer put on the board.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlacementReport {
    /// Sampled target-cell count the placer aimed for
    pub requested_cells: usize,

    /// Cells actually placed (may overshoot by up to `MAX_TARGET_LEN - 1`)
    pub placed_cells: usize,

    /// Every committed run, in placement order
    pub runs: Vec<Vec<Coord>>,
}

impl PlacementReport {
    /// Number of targets placed.
    pub fn target_count(&self) -> usize {
        self.runs.len()
    }
}

/// Populates `board` with random non-overlapping targets.
///
/// Samples a target-cell count uniformly from
/// [`PlacementConfig::cell_bounds`], then keeps drawing (length, origin,
/// orientation) candidates until the placed total reaches that count.
pub fn place_random_targets<R: Rng>(
    board: &mut Board,
    rng: &mut R,
    config: &PlacementConfig,
) -> Result<PlacementReport> {
    config.validate()?;

    let (low, high) = config.cell_bounds(board.total_cells());
    let requested = rng.gen_range(low..=high);

    if requested > 0 && board.rows().max(board.cols()) < MIN_TARGET_LEN {
        return Err(HuntError::invalid_config(format!(
            "a {}x{} board cannot hold a target of length {}",
            board.rows(),
            board.cols(),
            MIN_TARGET_LEN
        )));
    }

    let mut report = PlacementReport {
        requested_cells: requested,
        ..Default::default()
    };
    let mut rejected = 0u64;

    while report.placed_cells < requested {
        let length = rng.gen_range(MIN_TARGET_LEN..=MAX_TARGET_LEN);
        let origin = Coord::new(rng.gen_range(0..board.rows()), rng.gen_range(0..board.cols()));
        let orientation = if rng.gen_bool(0.5) {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        };

        let cells = orientation.run(origin, length);
        let valid = cells
            .iter()
            .all(|&c| board.cell(c) == Some(Cell::Empty));

        if valid {
            board.place_target(&cells);
            report.placed_cells += length;
            report.runs.push(cells);
        } else {
            rejected += 1;
        }
    }

    debug!(
        requested,
        placed = report.placed_cells,
        targets = report.runs.len(),
        rejected,
        "targets placed"
    );

    Ok(report)
}
