//! Optimal solver for the 4×4 fifteen puzzle.
//!
//! - `puzzle`: the board, blank moves, goal and solvability tests.
//! - `heuristic`: Manhattan-distance estimate of the moves left.
//! - `solver`: iterative-deepening A* returning a shortest move sequence.

pub mod error;
pub mod heuristic;
pub mod puzzle;
pub mod solver;

pub use error::{BoardError, SolveError};
pub use puzzle::{Board, Move};
pub use solver::{Node, Solution, SolveStats, Solver};

/// Solves `board` with a fresh [`Solver`].
pub fn solve(board: &Board) -> Result<Solution, SolveError> {
    Solver::new().solve(board)
}

/// Whether `board` can reach the goal; check this before presenting a board.
pub fn check_solvable(board: &Board) -> bool {
    board.is_solvable()
}
