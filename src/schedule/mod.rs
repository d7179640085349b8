use std::{
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::Duration,
};

use crate::{
    maze::Maze,
    solvers::{StepStatus, Strategy, Traversal, VisitEvent},
};

/// Delay between traversal steps; paces the visual reveal.
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(200);

/// Something that blocks until the next step may run. The traversal itself
/// never sleeps; pacing is injected so callers can drive steps off a timer,
/// a frame callback, or nothing at all.
pub trait Pacer {
    fn wait(&mut self);
}

/// Never waits. For tests and headless runs.
pub struct Immediate;

impl Pacer for Immediate {
    fn wait(&mut self) {}
}

/// A shared, adjustable inter-step delay. Cloning yields a handle onto the
/// same delay, so the control loop can speed up or slow down a search thread
/// that is already running.
#[derive(Clone)]
pub struct StepPace {
    millis: Arc<AtomicU64>,
}

impl StepPace {
    const MIN_DELAY_MS: u64 = 25;
    const MAX_DELAY_MS: u64 = 1600;

    pub fn new(delay: Duration) -> Self {
        StepPace {
            millis: Arc::new(AtomicU64::new(delay.as_millis() as u64)),
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.millis.load(Ordering::Relaxed))
    }

    /// Halves the delay, down to a floor.
    pub fn speed_up(&self) {
        let current = self.millis.load(Ordering::Relaxed);
        self.millis
            .store((current / 2).max(Self::MIN_DELAY_MS), Ordering::Relaxed);
    }

    /// Doubles the delay, up to a ceiling.
    pub fn slow_down(&self) {
        let current = self.millis.load(Ordering::Relaxed);
        self.millis
            .store((current * 2).min(Self::MAX_DELAY_MS), Ordering::Relaxed);
    }
}

impl Default for StepPace {
    fn default() -> Self {
        StepPace::new(DEFAULT_STEP_DELAY)
    }
}

impl Pacer for StepPace {
    fn wait(&mut self) {
        std::thread::sleep(self.delay());
    }
}

/// Cloneable cancellation handle for one scheduled run. Cancelling is
/// one-way and observed at the next step boundary.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Tracks every outstanding cancellation token so that adopting a new maze
/// or starting a new search can clear all pending runs in one shot.
///
/// `cancel_all` drains the whole set under a single lock hold; tokens
/// registered afterwards start fresh and are unaffected, so there is no
/// one-by-one race against a moving target.
#[derive(Default)]
pub struct CancelRegistry {
    tokens: Mutex<Vec<CancelToken>>,
}

impl CancelRegistry {
    pub fn new() -> Self {
        CancelRegistry::default()
    }

    /// Creates and tracks a fresh token for a new run.
    pub fn register(&self) -> CancelToken {
        let token = CancelToken::new();
        let mut tokens = self.tokens.lock().unwrap_or_else(PoisonError::into_inner);
        tokens.push(token.clone());
        token
    }

    /// Cancels and forgets every outstanding token.
    pub fn cancel_all(&self) {
        let mut tokens = self.tokens.lock().unwrap_or_else(PoisonError::into_inner);
        for token in tokens.drain(..) {
            token.cancel();
        }
    }
}

/// Terminal state of a scheduled search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The end cell was reached; a path exists.
    EndReached,
    /// The frontier emptied without reaching the end; no path exists.
    Exhausted,
    /// Cancelled externally before finishing. Not an error.
    Cancelled,
}

impl std::fmt::Display for SearchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchOutcome::EndReached => write!(f, "path found"),
            SearchOutcome::Exhausted => write!(f, "no path found"),
            SearchOutcome::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Runs a full search over `maze` under a cancellable, paced schedule.
///
/// Each step runs to completion synchronously and reports its events through
/// `on_visit` before the pacer is consulted; the cancel token is checked at
/// every step boundary, so a cancelled run emits no further events past the
/// step it was in.
pub fn run_search(
    maze: &Maze,
    strategy: Strategy,
    pacer: &mut impl Pacer,
    cancel: &CancelToken,
    mut on_visit: impl FnMut(VisitEvent),
) -> SearchOutcome {
    let mut traversal = Traversal::new(maze, strategy);
    tracing::debug!(%strategy, start = ?maze.start_coord(), "starting search");
    loop {
        if cancel.is_cancelled() {
            tracing::debug!(steps = traversal.steps(), "search cancelled");
            return SearchOutcome::Cancelled;
        }
        match traversal.step(&mut on_visit) {
            StepStatus::InProgress => pacer.wait(),
            StepStatus::EndReached => {
                tracing::info!(steps = traversal.steps(), "search reached the end cell");
                return SearchOutcome::EndReached;
            }
            StepStatus::Exhausted => {
                tracing::info!(steps = traversal.steps(), "search exhausted the frontier");
                return SearchOutcome::Exhausted;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::generate_maze;
    use std::sync::mpsc;

    #[test]
    fn test_cancelled_before_start_emits_nothing() {
        let maze = generate_maze(11, 11, Some(1)).unwrap();
        let token = CancelToken::new();
        token.cancel();
        let mut events = Vec::new();
        let outcome = run_search(
            &maze,
            Strategy::Bfs,
            &mut Immediate,
            &token,
            |event| events.push(event),
        );
        assert_eq!(outcome, SearchOutcome::Cancelled);
        assert!(events.is_empty());
    }

    #[test]
    fn test_uncancelled_run_reaches_end() {
        let maze = generate_maze(11, 11, Some(1)).unwrap();
        let token = CancelToken::new();
        let mut saw_end = false;
        let outcome = run_search(&maze, Strategy::Dfs, &mut Immediate, &token, |event| {
            saw_end |= event.is_end;
        });
        assert_eq!(outcome, SearchOutcome::EndReached);
        assert!(saw_end);
    }

    #[test]
    fn test_registry_cancels_every_outstanding_token() {
        let registry = CancelRegistry::new();
        let tokens = [registry.register(), registry.register(), registry.register()];
        assert!(tokens.iter().all(|t| !t.is_cancelled()));
        registry.cancel_all();
        assert!(tokens.iter().all(|t| t.is_cancelled()));
        // The set was cleared: new registrations start uncancelled.
        let fresh = registry.register();
        assert!(!fresh.is_cancelled());
    }

    #[test]
    fn test_cancel_all_stops_inflight_search_before_new_grid() {
        // The zombie-timer scenario: a paced search is in flight when the
        // registry clears everything. After joining, no sender remains, so
        // no event can ever reference the old grid again.
        let maze = generate_maze(31, 31, Some(5)).unwrap();
        let registry = CancelRegistry::new();
        let token = registry.register();
        let (tx, rx) = mpsc::channel();

        let handle = {
            let maze = maze.clone();
            let token = token.clone();
            std::thread::spawn(move || {
                let mut pace = StepPace::new(Duration::from_millis(25));
                run_search(&maze, Strategy::Bfs, &mut pace, &token, |event| {
                    tx.send(event).ok();
                })
            })
        };

        // Wait for the run to actually start, then preempt it.
        let first = rx.recv().expect("search never emitted");
        assert!(!first.is_end);
        registry.cancel_all();
        let outcome = handle.join().expect("search thread panicked");
        assert_eq!(outcome, SearchOutcome::Cancelled);

        // Drain whatever the final step emitted; the channel must then be
        // closed for good, before any new maze would be adopted.
        while let Ok(event) = rx.try_recv() {
            assert!(maze.in_bounds(event.coord));
        }
        assert!(matches!(rx.try_recv(), Err(mpsc::TryRecvError::Disconnected)));
    }

    #[test]
    fn test_step_pace_bounds() {
        let pace = StepPace::new(Duration::from_millis(100));
        pace.speed_up();
        assert_eq!(pace.delay(), Duration::from_millis(50));
        for _ in 0..10 {
            pace.speed_up();
        }
        assert_eq!(pace.delay(), Duration::from_millis(25));
        for _ in 0..10 {
            pace.slow_down();
        }
        assert_eq!(pace.delay(), Duration::from_millis(1600));
        // A clone adjusts the same shared delay.
        let other = pace.clone();
        other.speed_up();
        assert_eq!(pace.delay(), Duration::from_millis(800));
    }
}
