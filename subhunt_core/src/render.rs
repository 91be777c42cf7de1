//! Plain-text board dumps.

use crate::board::{Board, Cell};

/// Character for a cell. Targets show as `X` only when revealed.
pub fn cell_glyph(cell: Cell, reveal_targets: bool) -> char {
    match cell {
        Cell::Empty => '.',
        Cell::Target if reveal_targets => 'X',
        Cell::Target => '.',
        Cell::Hit => 'V',
    }
}

/// Renders the grid, each cell padded as ` c `, rows newline-terminated,
/// followed by one blank line.
pub fn render_board(board: &Board, reveal_targets: bool) -> String {
    let mut out = String::with_capacity(board.rows() * (board.cols() * 3 + 1) + 1);
    for (coord, cell) in board.iter() {
        out.push(' ');
        out.push(cell_glyph(cell, reveal_targets));
        out.push(' ');
        if coord.col + 1 == board.cols() {
            out.push('\n');
        }
    }
    out.push('\n');
    out
}
