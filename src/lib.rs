//! Perfect-maze generation and animated graph search.
//!
//! The core is a randomized recursive-backtracker generator ([`generators`]),
//! a step-wise BFS/DFS traversal engine ([`solvers`]), and a cancellable,
//! paced scheduler driving it ([`schedule`]). The terminal front end in
//! [`app`] is plain view glue over those pieces.

pub mod app;
pub mod generators;
pub mod maze;
pub mod schedule;
pub mod solvers;

pub use maze::{Cell, Coord, Direction, InvalidDimensions, Maze};
pub use schedule::{CancelRegistry, CancelToken, SearchOutcome, run_search};
pub use solvers::{Strategy, Traversal, VisitEvent};
