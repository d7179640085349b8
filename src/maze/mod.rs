pub mod cell;

use std::fmt;

pub use cell::Cell;

/// A `(row, col)` grid coordinate, 0-indexed, row-major.
pub type Coord = (u16, u16);

/// Dimensions must be positive; rejected before any allocation happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidDimensions {
    pub height: u16,
    pub width: u16,
}

impl fmt::Display for InvalidDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "maze dimensions must be positive, got {}x{}",
            self.height, self.width
        )
    }
}

impl std::error::Error for InvalidDimensions {}

/// The four axis-aligned unit directions, in the fixed iteration order used
/// by the solvers. Generation permutes this order per carved cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    East,
    South,
    West,
    North,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::East,
        Direction::South,
        Direction::West,
        Direction::North,
    ];

    /// The adjacent coordinate one step away.
    ///
    /// NOTE: This way of handling underflow/overflow is overflow-safe.
    /// Subtraction wraps to a value near `u16::MAX`, and addition saturates
    /// at `u16::MAX`; both are filtered out by the bounds check, as the
    /// largest index numerically possible is `u16::MAX - 1` while the largest
    /// dimension numerically possible is `u16::MAX`.
    pub fn one_step(self, (row, col): Coord) -> Coord {
        match self {
            Direction::East => (row, col.saturating_add(1)),
            Direction::South => (row.saturating_add(1), col),
            Direction::West => (row, col.wrapping_sub(1)),
            Direction::North => (row.wrapping_sub(1), col),
        }
    }

    /// The carving candidate two steps away, skipping over the wall cell
    /// between corridors.
    pub fn two_step(self, (row, col): Coord) -> Coord {
        match self {
            Direction::East => (row, col.saturating_add(2)),
            Direction::South => (row.saturating_add(2), col),
            Direction::West => (row, col.wrapping_sub(2)),
            Direction::North => (row.wrapping_sub(2), col),
        }
    }
}

/// A rectangular grid of [`Cell`] states, owned by value. Every regeneration
/// produces a fresh `Maze`; an adopted grid is never mutated in place by the
/// core, and a running search only reads it.
#[derive(Clone)]
pub struct Maze {
    cells: Box<[Cell]>,
    height: u16,
    width: u16,
}

impl Maze {
    /// Creates a grid of the given dimensions with every cell set to `Wall`.
    pub fn new(height: u16, width: u16) -> Result<Self, InvalidDimensions> {
        if height == 0 || width == 0 {
            return Err(InvalidDimensions { height, width });
        }
        let cells = vec![Cell::Wall; height as usize * width as usize].into_boxed_slice();
        Ok(Maze {
            cells,
            height,
            width,
        })
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    /// The fixed entry coordinate `(1, 0)`, clamped into bounds for
    /// degenerate single-row grids.
    pub fn start_coord(&self) -> Coord {
        (1.min(self.height - 1), 0)
    }

    /// The fixed goal coordinate `(height - 2, width - 1)`, clamped into
    /// bounds for degenerate grids.
    pub fn end_coord(&self) -> Coord {
        (self.height.saturating_sub(2), self.width - 1)
    }

    pub fn in_bounds(&self, (row, col): Coord) -> bool {
        row < self.height && col < self.width
    }

    fn ravel_index(&self, row: u16, col: u16) -> usize {
        // Overflow-safe since height and width are u16 (assuming usize is at least 32 bits)
        row as usize * self.width as usize + col as usize
    }

    /// Iterates over the rows of the grid, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width as usize)
    }

    /// Snapshot of the grid as ordered rows of cell-state labels, suitable
    /// for direct mapping to a visual style per state.
    pub fn labels(&self) -> Vec<Vec<&'static str>> {
        self.rows()
            .map(|row| row.iter().map(|cell| cell.label()).collect())
            .collect()
    }

    /// The in-bounds one-step neighbors of a coordinate, in the fixed
    /// `[east, south, west, north]` iteration order.
    pub fn neighbors(&self, coord: Coord) -> impl Iterator<Item = Coord> + '_ {
        Direction::ALL
            .into_iter()
            .map(move |dir| dir.one_step(coord))
            .filter(|&c| self.in_bounds(c))
    }
}

impl std::ops::Index<Coord> for Maze {
    type Output = Cell;

    fn index(&self, (row, col): Coord) -> &Self::Output {
        &self.cells[self.ravel_index(row, col)]
    }
}

impl std::ops::IndexMut<Coord> for Maze {
    fn index_mut(&mut self, (row, col): Coord) -> &mut Self::Output {
        let idx = self.ravel_index(row, col);
        &mut self.cells[idx]
    }
}
