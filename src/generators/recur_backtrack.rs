use rand::Rng;

use crate::maze::{Cell, Coord, Direction, InvalidDimensions, Maze};

/// The order in which to try carving directions from a newly entered cell.
/// An explicit seam so that generation takes its randomness as an injected
/// capability instead of ambient global state.
pub trait DirectionSource {
    fn order(&mut self) -> [Direction; 4];
}

/// Production source: a uniform Fisher-Yates permutation of the four
/// directions per carved cell.
pub struct ShuffledDirections<R: Rng> {
    rng: R,
}

impl<R: Rng> ShuffledDirections<R> {
    pub fn new(rng: R) -> Self {
        ShuffledDirections { rng }
    }
}

impl<R: Rng> DirectionSource for ShuffledDirections<R> {
    fn order(&mut self) -> [Direction; 4] {
        let mut dirs = Direction::ALL;
        for i in (1..dirs.len()).rev() {
            let j = self.rng.random_range(0..=i);
            dirs.swap(i, j);
        }
        dirs
    }
}

/// Always yields the same order. Gives fully deterministic layouts, mainly
/// for golden tests and reproducible demos.
pub struct FixedDirections(pub [Direction; 4]);

impl DirectionSource for FixedDirections {
    fn order(&mut self) -> [Direction; 4] {
        self.0
    }
}

/// Carves a maze with the randomized recursive backtracker, iteratively.
///
/// Every cell starts as a wall. From the seed cell `(1, 1)` the carver tries
/// the four directions in the order the source yields: a candidate two steps
/// away that is in bounds and still a wall gets carved along with the wall
/// cell between, and carving continues from the candidate. The explicit
/// stack replaces native recursion, so depth is bounded by heap, not the
/// call stack, on large grids.
///
/// The wall check doubles as the visited guard: a cell transitions to path
/// at most once, which is what guarantees a unique simple path between any
/// two carved cells.
pub fn carve_maze(
    height: u16,
    width: u16,
    dirs: &mut impl DirectionSource,
) -> Result<Maze, InvalidDimensions> {
    let mut maze = Maze::new(height, width)?;

    let seed_cell: Coord = (1.min(height - 1), 1.min(width - 1));
    maze[seed_cell] = Cell::Path;

    // Each frame holds the cell, its direction order (fixed on entry), and
    // the index of the next direction to try.
    let mut stack = vec![(seed_cell, dirs.order(), 0usize)];
    while let Some((cell, order, next)) = stack.last_mut() {
        if *next >= order.len() {
            stack.pop();
            continue;
        }
        let dir = order[*next];
        *next += 1;

        let candidate = dir.two_step(*cell);
        if maze.in_bounds(candidate) && maze[candidate] == Cell::Wall {
            let between = dir.one_step(*cell);
            maze[between] = Cell::Path;
            maze[candidate] = Cell::Path;
            stack.push((candidate, dirs.order(), 0));
        }
    }

    // Force-set the markers at their fixed coordinates, regardless of what
    // carving left there.
    let start = maze.start_coord();
    let end = maze.end_coord();
    maze[start] = Cell::Start;
    maze[end] = Cell::End;

    Ok(maze)
}
