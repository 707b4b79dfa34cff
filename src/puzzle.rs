use rand::{seq::SliceRandom, Rng};
use std::fmt;
use std::str::FromStr;

use crate::error::BoardError;

/// Width (and height) of the board.
pub const WIDTH: usize = 4;
/// Number of cells on the board.
pub const CELLS: usize = WIDTH * WIDTH;
/// Value stored in the blank cell.
pub const BLANK: u8 = 0;

/// Direction the blank travels.
///
/// Moving the blank `Left` slides the tile on its left one cell to the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Left,
    Right,
    Up,
    Down,
}

impl Move {
    /// All moves, in the order successors are generated.
    pub const ALL: [Move; 4] = [Move::Left, Move::Right, Move::Up, Move::Down];

    /// Change in the blank's linear index.
    pub fn delta(&self) -> isize {
        match self {
            Move::Left => -1,
            Move::Right => 1,
            Move::Up => -(WIDTH as isize),
            Move::Down => WIDTH as isize,
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Move::Up => Move::Down,
            Move::Down => Move::Up,
            Move::Left => Move::Right,
            Move::Right => Move::Left,
        }
    }

    /// Whether the blank at `blank` may travel in this direction without
    /// leaving the board.
    pub fn fits(&self, blank: usize) -> bool {
        match self {
            Move::Left => blank % WIDTH != 0,
            Move::Right => blank % WIDTH != WIDTH - 1,
            Move::Up => blank / WIDTH != 0,
            Move::Down => blank / WIDTH != WIDTH - 1,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            Move::Up => "Up",
            Move::Left => "Left",
            Move::Down => "Down",
            Move::Right => "Right",
        };
        write!(f, "{}", s)
    }
}

/// A 4×4 fifteen-puzzle configuration.
///
/// Cells are stored row-major. A `Board` can only be built from a valid
/// permutation of `0..16`, so every value of this type holds each label in
/// `1..=15` exactly once and a single blank whose index is tracked alongside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [u8; CELLS],
    blank: usize,
}

impl Board {
    /// Builds a board after checking that `cells` is a permutation of `0..16`.
    pub fn new(cells: [u8; CELLS]) -> Result<Self, BoardError> {
        let mut seen = [false; CELLS];
        let mut blank = 0;

        for (index, &value) in cells.iter().enumerate() {
            if value as usize >= CELLS {
                return Err(BoardError::TileOutOfRange {
                    value: value as u32,
                    index,
                });
            }
            if seen[value as usize] {
                return Err(BoardError::DuplicateTile { value });
            }
            seen[value as usize] = true;
            if value == BLANK {
                blank = index;
            }
        }

        Ok(Self { cells, blank })
    }

    /// The solved layout: `1..=15` in order with the blank in the last cell.
    pub fn goal() -> Self {
        let mut cells = [BLANK; CELLS];
        for (i, cell) in cells.iter_mut().take(CELLS - 1).enumerate() {
            *cell = i as u8 + 1;
        }
        Self {
            cells,
            blank: CELLS - 1,
        }
    }

    /// A uniformly shuffled board, repaired with [`Board::make_solvable`]
    /// when the shuffle lands on the unsolvable half.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut cells = Self::goal().cells;
        cells.shuffle(rng);

        let blank = cells.iter().position(|&v| v == BLANK).unwrap_or(CELLS - 1);
        let mut board = Self { cells, blank };
        if !board.is_solvable() {
            board.make_solvable();
        }
        board
    }

    pub fn cells(&self) -> &[u8; CELLS] {
        &self.cells
    }

    pub fn blank(&self) -> usize {
        self.blank
    }

    pub fn tile_at(&self, index: usize) -> u8 {
        self.cells[index]
    }

    /// Index of `tile` on the board.
    pub fn position_of(&self, tile: u8) -> Option<usize> {
        self.cells.iter().position(|&v| v == tile)
    }

    pub fn is_goal(&self) -> bool {
        self.cells[CELLS - 1] == BLANK
            && self.cells[..CELLS - 1]
                .iter()
                .enumerate()
                .all(|(i, &v)| v as usize == i + 1)
    }

    /// Number of label pairs that appear in the wrong relative order,
    /// ignoring the blank.
    pub fn inversions(&self) -> usize {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &val)| val != BLANK)
            .map(|(i, &val)| {
                self.cells[i + 1..]
                    .iter()
                    .filter(|&&next| next != BLANK && next < val)
                    .count()
            })
            .sum()
    }

    /// Whether the goal is reachable.
    ///
    /// On an even-width board a move keeps `inversions + blank row` parity
    /// fixed, so the board is solvable iff the inversion parity differs from
    /// the parity of the blank's row.
    pub fn is_solvable(&self) -> bool {
        self.inversions() % 2 != (self.blank / WIDTH) % 2
    }

    /// Swaps tiles 14 and 15, flipping the permutation parity.
    pub fn make_solvable(&mut self) {
        let last = (CELLS - 1) as u8;
        if let (Some(a), Some(b)) = (self.position_of(last), self.position_of(last - 1)) {
            self.cells.swap(a, b);
        }
    }

    /// Whether the blank can travel in direction `mv`.
    pub fn can_move(&self, mv: Move) -> bool {
        mv.fits(self.blank)
    }

    /// Returns the board after sliding the blank in direction `mv`, or `None`
    /// when that would leave the board.
    pub fn apply_move(&self, mv: Move) -> Option<Self> {
        if !self.can_move(mv) {
            return None;
        }

        let target = (self.blank as isize + mv.delta()) as usize;
        let mut next = *self;
        next.cells.swap(self.blank, target);
        next.blank = target;
        Some(next)
    }

    /// The tile that `mv` would slide into the blank.
    pub fn tile_moved_by(&self, mv: Move) -> Option<u8> {
        self.can_move(mv)
            .then(|| self.cells[(self.blank as isize + mv.delta()) as usize])
    }

    /// Packs the sixteen 4-bit cells into one integer; equal boards have
    /// equal keys and vice versa.
    pub fn key(&self) -> u64 {
        self.cells
            .iter()
            .fold(0u64, |acc, &v| (acc << 4) | u64::from(v))
    }
}

impl TryFrom<&[u8]> for Board {
    type Error = BoardError;

    fn try_from(values: &[u8]) -> Result<Self, Self::Error> {
        let cells: [u8; CELLS] = values.try_into().map_err(|_| BoardError::WrongCellCount {
            expected: CELLS,
            found: values.len(),
        })?;
        Self::new(cells)
    }
}

impl FromStr for Board {
    type Err = BoardError;

    /// Parses sixteen numbers separated by whitespace and/or commas, row-major,
    /// with `0` marking the blank.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
            .map(|token| {
                token.parse::<u32>().map_err(|_| BoardError::InvalidToken {
                    token: token.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if values.len() != CELLS {
            return Err(BoardError::WrongCellCount {
                expected: CELLS,
                found: values.len(),
            });
        }

        let mut cells = [BLANK; CELLS];
        for (index, (&value, cell)) in values.iter().zip(cells.iter_mut()).enumerate() {
            if value as usize >= CELLS {
                return Err(BoardError::TileOutOfRange { value, index });
            }
            *cell = value as u8;
        }

        Self::new(cells)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(WIDTH) {
            for &val in row {
                if val == BLANK {
                    write!(f, "   ")?;
                } else {
                    write!(f, "{:2} ", val)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
