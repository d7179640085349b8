mod recur_backtrack;

use rand::{SeedableRng, rngs::StdRng};

pub use recur_backtrack::{DirectionSource, FixedDirections, ShuffledDirections, carve_maze};

use crate::maze::{InvalidDimensions, Maze};

/// Get a random number generator, optionally seeded for reproducibility.
fn get_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}

/// Generates a maze of the given dimensions with the randomized recursive
/// backtracker. Deterministic for a given `seed`, randomized from OS entropy
/// otherwise. Rejects zero on either axis; any positive size is accepted,
/// though even or sub-3 dimensions produce degraded mazes.
pub fn generate_maze(height: u16, width: u16, seed: Option<u64>) -> Result<Maze, InvalidDimensions> {
    let mut dirs = ShuffledDirections::new(get_rng(seed));
    carve_maze(height, width, &mut dirs)
}
