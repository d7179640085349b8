use std::collections::{HashSet, VecDeque};

use crate::maze::{Cell, Coord, Direction, Maze};

/// Frontier discipline for a traversal. The neighbor-exploration and
/// termination logic are identical for both; only the removal order differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// FIFO frontier; discovers cells in non-decreasing edge distance.
    Bfs,
    /// LIFO frontier; may visit far more cells before reaching the end.
    Dfs,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Bfs => write!(f, "Breadth-First Search (BFS)"),
            Strategy::Dfs => write!(f, "Depth-First Search (DFS)"),
        }
    }
}

/// A reported observation that a coordinate has been explored. `is_end` flags
/// arrival at the end cell, which terminates the traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitEvent {
    pub coord: Coord,
    pub is_end: bool,
}

/// Result of one unit of traversal work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// Frontier still holds coordinates to expand.
    InProgress,
    /// The end cell was discovered; the traversal is finished.
    EndReached,
    /// The frontier emptied without reaching the end; no path exists.
    Exhausted,
}

/// An owned, step-wise traversal over a borrowed maze snapshot.
///
/// The traversal holds its own frontier and visited set and only reads the
/// grid, so a caller can drop it mid-run (cancellation) without leaving the
/// maze in a corrupted state. Each [`step`](Traversal::step) expands one
/// frontier coordinate synchronously; pacing between steps belongs to the
/// scheduler, not here.
pub struct Traversal<'m> {
    maze: &'m Maze,
    strategy: Strategy,
    frontier: VecDeque<Coord>,
    visited: HashSet<Coord>,
    done: Option<StepStatus>,
    steps: usize,
}

impl<'m> Traversal<'m> {
    /// Starts a traversal seeded at the maze's fixed start coordinate.
    pub fn new(maze: &'m Maze, strategy: Strategy) -> Self {
        Traversal::from_start(maze, maze.start_coord(), strategy)
    }

    /// Starts a traversal seeded at an explicit coordinate.
    pub fn from_start(maze: &'m Maze, start: Coord, strategy: Strategy) -> Self {
        debug_assert!(maze.in_bounds(start));
        let mut frontier = VecDeque::new();
        frontier.push_back(start);
        let mut visited = HashSet::new();
        visited.insert(start);
        Traversal {
            maze,
            strategy,
            frontier,
            visited,
            done: None,
            steps: 0,
        }
    }

    /// Number of steps performed so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Terminal status, if the traversal has finished.
    pub fn status(&self) -> Option<StepStatus> {
        self.done
    }

    /// Performs one step: expands a single frontier coordinate and reports
    /// every newly discovered neighbor through `on_visit`, in the fixed
    /// `[east, south, west, north]` order.
    ///
    /// Discovering the end cell terminates the whole traversal with
    /// [`StepStatus::EndReached`]; an empty frontier terminates it with
    /// [`StepStatus::Exhausted`]. Stepping a finished traversal returns the
    /// terminal status again and emits nothing.
    pub fn step(&mut self, mut on_visit: impl FnMut(VisitEvent)) -> StepStatus {
        if let Some(status) = self.done {
            return status;
        }

        let current = match self.strategy {
            Strategy::Bfs => self.frontier.pop_front(),
            Strategy::Dfs => self.frontier.pop_back(),
        };
        let Some(current) = current else {
            self.done = Some(StepStatus::Exhausted);
            return StepStatus::Exhausted;
        };
        self.steps += 1;

        for dir in Direction::ALL {
            let neighbor = dir.one_step(current);
            if !self.maze.in_bounds(neighbor) || self.visited.contains(&neighbor) {
                continue;
            }
            match self.maze[neighbor] {
                Cell::End => {
                    self.visited.insert(neighbor);
                    on_visit(VisitEvent {
                        coord: neighbor,
                        is_end: true,
                    });
                    self.done = Some(StepStatus::EndReached);
                    return StepStatus::EndReached;
                }
                Cell::Path => {
                    self.visited.insert(neighbor);
                    on_visit(VisitEvent {
                        coord: neighbor,
                        is_end: false,
                    });
                    self.frontier.push_back(neighbor);
                }
                // Walls block; start and visited cells are already in the
                // visited set when the grid is pristine.
                _ => {}
            }
        }

        StepStatus::InProgress
    }

    /// Drives the traversal to its terminal status without pacing,
    /// collecting every event. Mainly for tests and headless callers.
    pub fn run_to_end(&mut self) -> (Vec<VisitEvent>, StepStatus) {
        let mut events = Vec::new();
        loop {
            match self.step(|event| events.push(event)) {
                StepStatus::InProgress => {}
                terminal => return (events, terminal),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::{FixedDirections, carve_maze, generate_maze};

    /// Builds a maze from ASCII art: '#' wall, '.' path, 'S' start, 'E' end.
    fn maze_from_art(art: &[&str]) -> Maze {
        let height = art.len() as u16;
        let width = art[0].len() as u16;
        let mut maze = Maze::new(height, width).unwrap();
        for (row, line) in art.iter().enumerate() {
            assert_eq!(line.len() as u16, width);
            for (col, ch) in line.chars().enumerate() {
                maze[(row as u16, col as u16)] = match ch {
                    '#' => Cell::Wall,
                    '.' => Cell::Path,
                    'S' => Cell::Start,
                    'E' => Cell::End,
                    other => panic!("unexpected cell art {:?}", other),
                };
            }
        }
        maze
    }

    fn golden_maze() -> Maze {
        let mut dirs = FixedDirections(Direction::ALL);
        carve_maze(5, 5, &mut dirs).unwrap()
    }

    #[test]
    fn test_bfs_golden_visit_order() {
        let maze = golden_maze();
        let mut traversal = Traversal::new(&maze, Strategy::Bfs);
        let (events, status) = traversal.run_to_end();
        assert_eq!(status, StepStatus::EndReached);
        let coords = events.iter().map(|e| e.coord).collect::<Vec<_>>();
        assert_eq!(
            coords,
            vec![(1, 1), (1, 2), (1, 3), (2, 3), (3, 3), (3, 4)]
        );
        // Only the final event flags the end cell.
        assert!(events[..events.len() - 1].iter().all(|e| !e.is_end));
        assert!(events.last().unwrap().is_end);
    }

    #[test]
    fn test_start_cell_is_not_reported() {
        let maze = golden_maze();
        let mut traversal = Traversal::new(&maze, Strategy::Dfs);
        let (events, _) = traversal.run_to_end();
        assert!(events.iter().all(|e| e.coord != maze.start_coord()));
    }

    #[test]
    fn test_visited_at_most_once() {
        for seed in 0..4 {
            let maze = generate_maze(17, 17, Some(seed)).unwrap();
            for strategy in [Strategy::Bfs, Strategy::Dfs] {
                let mut traversal = Traversal::new(&maze, strategy);
                let (events, _) = traversal.run_to_end();
                let mut seen = HashSet::new();
                for event in &events {
                    assert!(seen.insert(event.coord), "{:?} reported twice", event.coord);
                }
            }
        }
    }

    #[test]
    fn test_generated_mazes_are_solvable() {
        // Odd dimensions give a fully carved interior, so the end marker is
        // always adjacent to a corridor and both strategies must reach it
        // within the cell-count bound.
        for seed in 0..4 {
            let maze = generate_maze(15, 21, Some(seed)).unwrap();
            let cell_count = 15 * 21;
            for strategy in [Strategy::Bfs, Strategy::Dfs] {
                let mut traversal = Traversal::new(&maze, strategy);
                let (_, status) = traversal.run_to_end();
                assert_eq!(status, StepStatus::EndReached);
                assert!(traversal.steps() <= cell_count);
            }
        }
    }

    #[test]
    fn test_bfs_beats_dfs_into_a_dead_end() {
        // The junction at (1, 2) opens east toward the end and south into a
        // long dead end. DFS pops the most recent push, so it commits to the
        // dead end first; BFS keeps both branches on the frontier.
        let maze = maze_from_art(&[
            "#######",
            "S...E##",
            "##.####",
            "##.####",
            "##.####",
            "##.####",
            "#######",
        ]);
        let mut bfs = Traversal::from_start(&maze, (1, 0), Strategy::Bfs);
        let (_, bfs_status) = bfs.run_to_end();
        let mut dfs = Traversal::from_start(&maze, (1, 0), Strategy::Dfs);
        let (_, dfs_status) = dfs.run_to_end();
        assert_eq!(bfs_status, StepStatus::EndReached);
        assert_eq!(dfs_status, StepStatus::EndReached);
        assert!(bfs.steps() < dfs.steps());
    }

    #[test]
    fn test_exhaustion_is_reported_not_silent() {
        // The end cell is sealed off behind walls.
        let maze = maze_from_art(&[
            "#####",
            "S..##",
            "#####",
            "###E#",
            "#####",
        ]);
        for strategy in [Strategy::Bfs, Strategy::Dfs] {
            let mut traversal = Traversal::from_start(&maze, (1, 0), strategy);
            let (events, status) = traversal.run_to_end();
            assert_eq!(status, StepStatus::Exhausted);
            assert_eq!(
                events.iter().map(|e| e.coord).collect::<Vec<_>>(),
                vec![(1, 1), (1, 2)]
            );
            assert!(events.iter().all(|e| !e.is_end));
        }
    }

    #[test]
    fn test_terminal_step_is_idempotent() {
        let maze = golden_maze();
        let mut traversal = Traversal::new(&maze, Strategy::Bfs);
        let (_, status) = traversal.run_to_end();
        assert_eq!(status, StepStatus::EndReached);
        let mut late_events = 0;
        assert_eq!(
            traversal.step(|_| late_events += 1),
            StepStatus::EndReached
        );
        assert_eq!(late_events, 0);
    }
}
