//! Manhattan-distance lower bound on the number of moves left.

use crate::puzzle::{Board, BLANK, WIDTH};

/// Sum over every tile of its row and column distance to its goal cell.
///
/// A move shifts exactly one tile by one cell, so the value changes by exactly
/// one per move and never overestimates the remaining moves.
pub fn manhattan(board: &Board) -> u32 {
    board
        .cells()
        .iter()
        .enumerate()
        .map(|(i, &value)| tile_distance(value, i))
        .sum()
}

/// Distance of `tile` sitting at cell `index` from its goal cell; zero for the
/// blank, which has no goal cell of its own.
pub fn tile_distance(tile: u8, index: usize) -> u32 {
    if tile == BLANK {
        return 0;
    }
    let target = tile as usize - 1;
    let (row, col) = (index / WIDTH, index % WIDTH);
    let (target_row, target_col) = (target / WIDTH, target % WIDTH);
    (row.abs_diff(target_row) + col.abs_diff(target_col)) as u32
}
