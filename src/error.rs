use thiserror::Error;

/// Reasons a sequence of cells cannot form a 4×4 board.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("expected {expected} cells, found {found}")]
    WrongCellCount { expected: usize, found: usize },

    #[error("tile {value} at cell {index} is out of range (0-15)")]
    TileOutOfRange { value: u32, index: usize },

    #[error("tile {value} appears more than once")]
    DuplicateTile { value: u8 },

    #[error("could not parse '{token}' as a tile")]
    InvalidToken { token: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    #[error("board is not solvable (permutation and blank-row parity disagree)")]
    Unsolvable,

    #[error("search space exhausted without reaching the goal")]
    NoSolution,
}
