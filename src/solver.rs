//! Optimal solver: iterative-deepening A* over the blank's moves.
//!
//! The search path doubles as the recursion stack and the set of states the
//! current branch has already visited. Each node is owned by the path from the
//! moment it is explored until the search backtracks out of it, so abandoned
//! branches are freed as they are left and a successful search leaves exactly
//! the solution behind.

use log::{debug, info, trace};

use crate::error::SolveError;
use crate::heuristic::manhattan;
use crate::puzzle::{Board, Move};

/// One state in the search tree.
#[derive(Debug, Clone)]
pub struct Node {
    board: Board,
    mv: Option<Move>,
    key: u64,
}

impl Node {
    pub fn root(board: Board) -> Self {
        Self {
            key: board.key(),
            board,
            mv: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The move that produced this node from its parent; `None` for the root.
    pub fn mv(&self) -> Option<Move> {
        self.mv
    }

    pub fn key(&self) -> u64 {
        self.key
    }

    fn child(&self, mv: Move) -> Option<Self> {
        let board = self.board.apply_move(mv)?;
        Some(Self {
            key: board.key(),
            board,
            mv: Some(mv),
        })
    }

    /// Nodes reachable by one blank move, skipping the move that would undo
    /// the one that produced this node. Generated in `Left, Right, Up, Down`
    /// order.
    pub fn successors(&self) -> Vec<Node> {
        let reverse = self.mv.map(|m| m.opposite());
        Move::ALL
            .iter()
            .filter(|&&mv| Some(mv) != reverse)
            .filter_map(|&mv| self.child(mv))
            .collect()
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Node {}

/// Result of one bounded depth-first pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Found,
    /// No branch below produced a cost, so raising the bound cannot help.
    NotFound,
    /// Smallest `f` that exceeded the bound.
    NextBound(u32),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveStats {
    /// Bounded passes run, including the successful one.
    pub iterations: u32,
    /// Nodes whose successors were generated, across all passes.
    pub expanded: u64,
}

/// An optimal move sequence for the blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub depth: u32,
    pub moves: Vec<Move>,
    pub stats: SolveStats,
}

impl Solution {
    /// Boards visited while applying the moves to `start`, `start` included.
    ///
    /// `None` if some move does not fit, which only happens when `start` is
    /// not the board the solution was computed for.
    pub fn replay(&self, start: &Board) -> Option<Vec<Board>> {
        let mut boards = Vec::with_capacity(self.moves.len() + 1);
        boards.push(*start);

        let mut current = *start;
        for &mv in &self.moves {
            current = current.apply_move(mv)?;
            boards.push(current);
        }
        Some(boards)
    }
}

/// IDA* search engine.
///
/// Holds the path of the last successful solve until the next call replaces it.
#[derive(Debug, Default)]
pub struct Solver {
    path: Vec<Node>,
    stats: SolveStats,
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Solves `board` after checking it can reach the goal.
    pub fn solve(&mut self, board: &Board) -> Result<Solution, SolveError> {
        if !board.is_solvable() {
            self.clear();
            return Err(SolveError::Unsolvable);
        }
        self.ida_star(board)
    }

    /// Runs the search without the solvability check. On an unsolvable board
    /// this only returns once the tree below some bound is exhausted, which in
    /// practice means it does not return.
    pub fn ida_star(&mut self, board: &Board) -> Result<Solution, SolveError> {
        let root = Node::root(*board);
        let bound = manhattan(root.board());

        self.clear();
        self.path.push(root);
        info!("solving from heuristic estimate {}", bound);

        self.deepen(bound)
    }

    /// Repeats bounded passes from the last node of the current path, raising
    /// the bound each time, until the goal is found or the tree is exhausted.
    fn deepen(&mut self, mut bound: u32) -> Result<Solution, SolveError> {
        loop {
            self.stats.iterations += 1;
            debug!(
                "pass {} with bound {} ({} nodes expanded so far)",
                self.stats.iterations, bound, self.stats.expanded
            );

            match self.search(0, bound) {
                Outcome::Found => break,
                Outcome::NotFound => {
                    info!("search exhausted at bound {}", bound);
                    self.path.clear();
                    return Err(SolveError::NoSolution);
                }
                Outcome::NextBound(next) => bound = next,
            }
        }

        let moves: Vec<Move> = self.path.iter().filter_map(Node::mv).collect();
        info!(
            "found {}-move solution after {} passes, {} nodes expanded",
            bound, self.stats.iterations, self.stats.expanded
        );

        Ok(Solution {
            depth: bound,
            moves,
            stats: self.stats,
        })
    }

    fn search(&mut self, g: u32, bound: u32) -> Outcome {
        let node = match self.path.last() {
            Some(node) => node,
            None => return Outcome::NotFound,
        };

        let f = g + manhattan(node.board());
        if f > bound {
            return Outcome::NextBound(f);
        }
        // The heuristic is zero only on the goal.
        if f == g {
            return Outcome::Found;
        }

        let successors = node.successors();
        self.stats.expanded += 1;
        trace!("expanding at depth {} (f = {})", g, f);

        let mut min: Option<u32> = None;
        for succ in successors {
            if self.path.contains(&succ) {
                continue;
            }

            self.path.push(succ);
            match self.search(g + 1, bound) {
                Outcome::Found => return Outcome::Found,
                Outcome::NextBound(t) => min = Some(min.map_or(t, |m| m.min(t))),
                Outcome::NotFound => {}
            }
            self.path.pop();
        }

        match min {
            Some(t) => Outcome::NextBound(t),
            None => Outcome::NotFound,
        }
    }

    /// Nodes of the last solution, root first. Empty before the first
    /// successful solve and after a failed one.
    pub fn path(&self) -> &[Node] {
        &self.path
    }

    pub fn stats(&self) -> SolveStats {
        self.stats
    }

    /// Drops the retained path and resets the statistics.
    pub fn clear(&mut self) {
        self.path.clear();
        self.stats = SolveStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(s: &str) -> Board {
        s.parse().unwrap()
    }

    #[test]
    fn test_root_successors_corner() {
        let root = Node::root(Board::goal());
        let moves: Vec<Move> = root.successors().iter().filter_map(Node::mv).collect();
        assert_eq!(moves, vec![Move::Left, Move::Up]);
    }

    #[test]
    fn test_root_successors_center() {
        let root = Node::root(board("1 2 3 4 5 0 6 8 9 10 7 11 13 14 15 12"));
        let moves: Vec<Move> = root.successors().iter().filter_map(Node::mv).collect();
        assert_eq!(moves, Move::ALL.to_vec());
    }

    #[test]
    fn test_successors_skip_reversal() {
        let root = Node::root(board("1 2 3 4 5 0 6 8 9 10 7 11 13 14 15 12"));
        for child in root.successors() {
            let reverse = child.mv().map(|m| m.opposite());
            for grandchild in child.successors() {
                assert_ne!(grandchild.mv(), reverse);
            }
        }
    }

    #[test]
    fn test_successor_boards_match_apply_move() {
        let root = Node::root(board("1 2 3 4 5 0 6 8 9 10 7 11 13 14 15 12"));
        for child in root.successors() {
            let mv = child.mv().unwrap();
            assert_eq!(Some(*child.board()), root.board().apply_move(mv));
            assert_eq!(child.key(), child.board().key());
        }
    }

    #[test]
    fn test_solve_goal_is_empty() {
        let mut solver = Solver::new();
        let solution = solver.solve(&Board::goal()).unwrap();
        assert_eq!(solution.depth, 0);
        assert!(solution.moves.is_empty());
        assert_eq!(solver.path().len(), 1);
    }

    #[test]
    fn test_solve_one_move() {
        let mut solver = Solver::new();
        let solution = solver
            .solve(&board("1 2 3 4 5 6 7 8 9 10 11 12 13 14 0 15"))
            .unwrap();
        assert_eq!(solution.depth, 1);
        assert_eq!(solution.moves, vec![Move::Right]);
    }

    #[test]
    fn test_solve_undoes_blank_loop() {
        let start = board("1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 0")
            .apply_move(Move::Up)
            .and_then(|b| b.apply_move(Move::Left))
            .and_then(|b| b.apply_move(Move::Down))
            .and_then(|b| b.apply_move(Move::Right))
            .unwrap();
        let mut solver = Solver::new();
        let solution = solver.solve(&start).unwrap();
        assert_eq!(solution.depth, 4);
        assert_eq!(solution.moves.len(), 4);
        assert!(solution.stats.iterations >= 1);
        let last = solution.replay(&start).unwrap().pop().unwrap();
        assert!(last.is_goal());
    }

    #[test]
    fn test_path_round_trip() {
        let start = board("5 1 2 4 9 6 3 8 13 10 7 11 0 14 15 12");
        let mut solver = Solver::new();
        let solution = solver.solve(&start).unwrap();
        let path = solver.path();

        assert_eq!(path.len() as u32, solution.depth + 1);
        assert_eq!(path[0].board(), &start);
        assert!(path[0].mv().is_none());
        for pair in path.windows(2) {
            let mv = pair[1].mv().unwrap();
            assert_eq!(pair[0].board().apply_move(mv).as_ref(), Some(pair[1].board()));
        }
        assert!(path[path.len() - 1].board().is_goal());
    }

    #[test]
    fn test_path_has_no_repeated_states() {
        let start = board("5 1 2 4 9 6 3 8 13 10 7 11 0 14 15 12");
        let mut solver = Solver::new();
        solver.solve(&start).unwrap();
        let path = solver.path();
        for (i, a) in path.iter().enumerate() {
            assert!(!path[i + 1..].contains(a));
        }
    }

    #[test]
    fn test_unsolvable_rejected() {
        let mut solver = Solver::new();
        solver.solve(&board("1 2 3 4 5 6 7 8 9 10 11 12 13 14 0 15")).unwrap();
        assert_eq!(solver.path().len(), 2);

        let swapped = board("1 2 3 4 5 6 7 8 9 10 11 12 13 15 14 0");
        assert_eq!(solver.solve(&swapped), Err(SolveError::Unsolvable));
        assert!(solver.path().is_empty());
    }

    #[test]
    fn test_next_solve_replaces_path() {
        let mut solver = Solver::new();
        let start = board("5 1 2 4 9 6 3 8 13 10 7 11 0 14 15 12");
        solver.solve(&start).unwrap();
        assert!(solver.path().len() > 2);

        let solution = solver.solve(&Board::goal()).unwrap();
        assert_eq!(solution.depth, 0);
        assert_eq!(solver.path().len(), 1);
        assert_eq!(solver.stats().iterations, 1);
    }

    /// Path ending on a node whose blank sits in the top-left corner after a
    /// `Left` move. Its only remaining move is `Down`, and the board that move
    /// leads to is already first on the path.
    fn dead_end_path() -> Vec<Node> {
        let corner = board("0 2 3 4 5 1 6 7 8 9 10 11 12 13 14 15");
        let parent = Node::root(corner.apply_move(Move::Right).unwrap());
        let last = parent.child(Move::Left).unwrap();
        let below = Node::root(corner.apply_move(Move::Down).unwrap());

        assert_eq!(last.board(), &corner);
        assert_eq!(
            last.successors().iter().filter_map(Node::mv).collect::<Vec<_>>(),
            vec![Move::Down]
        );
        vec![below, parent, last]
    }

    #[test]
    fn test_dead_end_reports_not_found() {
        let mut solver = Solver::new();
        solver.path = dead_end_path();
        let bound = manhattan(solver.path[2].board());

        assert_eq!(solver.search(0, bound), Outcome::NotFound);
        assert_eq!(solver.path.len(), 3);
        assert_eq!(solver.stats.expanded, 1);
    }

    #[test]
    fn test_ancestor_on_path_is_never_revisited() {
        // Moving the blank down from the corner pushes tile 5 off its goal
        // cell, so visiting that child would report a next bound of h + 2.
        let mut solver = Solver::new();
        solver.path = dead_end_path();
        let last = *solver.path[2].board();
        let h = manhattan(&last);
        assert_eq!(manhattan(solver.path[0].board()), h + 1);

        let outcome = solver.search(0, h);
        assert_ne!(outcome, Outcome::NextBound(h + 2));
        assert_eq!(outcome, Outcome::NotFound);
    }

    #[test]
    fn test_exhausted_search_is_no_solution() {
        let mut solver = Solver::new();
        solver.path = dead_end_path();
        let bound = manhattan(solver.path[2].board());

        assert_eq!(solver.deepen(bound), Err(SolveError::NoSolution));
        assert!(solver.path().is_empty());
        assert_eq!(solver.stats().iterations, 1);
    }

    #[test]
    fn test_replay_on_wrong_start_is_none() {
        let mut solver = Solver::new();
        let solution = solver
            .solve(&board("1 2 3 4 5 6 7 8 9 10 11 12 13 14 0 15"))
            .unwrap();
        assert!(solution.replay(&Board::goal()).is_none());
        assert_eq!(
            solution.replay(&board("1 2 3 4 5 6 7 8 9 10 11 12 13 14 0 15")).map(|b| b.len()),
            Some(2)
        );
    }
}
