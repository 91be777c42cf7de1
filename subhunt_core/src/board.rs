//! The shared game board.
//!
//! A fixed R×C grid of [`Cell`] states plus a live counter of cells still in
//! the `Target` state. The counter is updated in the same call as every
//! `Target → Hit` transition, so `is_cleared()` is O(1).
//!
//! The board is **not** internally synchronized. It is built single-threaded
//! before any agent starts and afterwards only touched by the
//! [`Coordinator`](crate::coordinator::Coordinator) while it holds the game
//! state lock.

use serde::{Deserialize, Serialize};
use subhunt_env::Coord;

/// State of a single board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Open water. Missed cells stay `Empty` and may be attacked again.
    Empty,
    /// An undiscovered part of a target.
    Target,
    /// A destroyed part of a target.
    Hit,
}

/// Result of attacking one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackOutcome {
    /// A `Target` cell was destroyed.
    Hit,
    /// The cell was `Empty`.
    Miss,
    /// The cell had already been hit.
    Repeat,
}

impl AttackOutcome {
    /// Label used in event log lines.
    pub fn label(&self) -> &'static str {
        match self {
            AttackOutcome::Hit => "Hit",
            AttackOutcome::Miss => "Miss",
            AttackOutcome::Repeat => "Repeat",
        }
    }
}

impl std::fmt::Display for AttackOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for AttackOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Hit" => Ok(AttackOutcome::Hit),
            "Miss" => Ok(AttackOutcome::Miss),
            "Repeat" => Ok(AttackOutcome::Repeat),
            _ => Err(format!("Unknown attack outcome: {}", s)),
        }
    }
}

/// The game board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    rows: usize,
    cols: usize,

    /// Row-major cell storage
    cells: Vec<Cell>,

    /// Number of cells currently in `Cell::Target`
    remaining: usize,
}

impl Board {
    /// Creates a board with every cell `Empty`.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![Cell::Empty; rows * cols],
            remaining: 0,
        }
    }

    /// Resets every cell to `Empty` and the live counter to zero.
    pub fn initialize(&mut self) {
        self.cells.fill(Cell::Empty);
        self.remaining = 0;
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn total_cells(&self) -> usize {
        self.rows * self.cols
    }

    pub fn in_bounds(&self, coord: Coord) -> bool {
        coord.row < self.rows && coord.col < self.cols
    }

    /// Returns the cell at `coord`, or `None` when out of bounds.
    pub fn cell(&self, coord: Coord) -> Option<Cell> {
        if self.in_bounds(coord) {
            Some(self.cells[self.index(coord)])
        } else {
            None
        }
    }

    /// Marks a pre-validated run of cells as `Target`.
    ///
    /// Trusted primitive for the placer: the caller guarantees every cell is
    /// in bounds and currently `Empty`. Only used before agents start.
    pub fn place_target(&mut self, cells: &[Coord]) {
        for &coord in cells {
            let idx = self.index(coord);
            self.cells[idx] = Cell::Target;
        }
        self.remaining += cells.len();
    }

    /// Attacks one cell.
    ///
    /// `Target` becomes `Hit` and the live counter drops by one. `Empty` and
    /// `Hit` cells are left untouched.
    pub fn attack(&mut self, coord: Coord) -> AttackOutcome {
        let idx = self.index(coord);
        match self.cells[idx] {
            Cell::Target => {
                self.cells[idx] = Cell::Hit;
                self.remaining -= 1;
                AttackOutcome::Hit
            }
            Cell::Empty => AttackOutcome::Miss,
            Cell::Hit => AttackOutcome::Repeat,
        }
    }

    /// True once no `Target` cell remains.
    pub fn is_cleared(&self) -> bool {
        self.remaining == 0
    }

    /// Live counter of undiscovered target cells.
    pub fn remaining_targets(&self) -> usize {
        self.remaining
    }

    /// Counts cells in the given state by full scan.
    pub fn count_cells(&self, state: Cell) -> usize {
        self.cells.iter().filter(|&&c| c == state).count()
    }

    /// Iterates `(coord, cell)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, Cell)> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &cell)| (Coord::new(i / cols, i % cols), cell))
    }

    fn index(&self, coord: Coord) -> usize {
        coord.row * self.cols + coord.col
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(10, 10)
    }
}
