mod renderer;

use std::{
    io::Stdout,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::{Sender, SyncSender},
    },
    thread::JoinHandle,
    time::Duration,
};

use crossterm::{
    cursor,
    event::{self, KeyCode},
    style::Color,
    terminal::{self, ClearType},
};

use crate::{
    generators::generate_maze,
    maze::{Cell, Maze},
    schedule::{CancelRegistry, SearchOutcome, StepPace, run_search},
    solvers::Strategy,
};

use renderer::{GridEvent, Renderer};

enum UserInputEvent {
    KeyPress(event::KeyEvent),
    Resize,
}

pub struct App {
    /// Timeout for receiving input events in the control loop
    input_recv_timeout: Duration,
    /// Timeout for polling terminal events in the input thread, a.k.a.
    /// how often that thread re-checks the done flag
    input_poll_timeout: Duration,
}

impl Default for App {
    fn default() -> Self {
        Self {
            input_recv_timeout: Duration::from_millis(100),
            input_poll_timeout: Duration::from_millis(100),
        }
    }
}

impl App {
    /// Maximum number of grid events buffered between the search and render threads
    const GRID_EVENT_BUFFER: usize = 1024;

    /// Set a panic hook to restore terminal state on panic
    /// so the terminal is not left in raw mode or the alternate screen
    /// even if the panic occurs in a different thread
    fn set_panic_hook() {
        let hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = App::restore_terminal(&mut std::io::stdout()); // ignore any errors as we are already failing
            hook(panic_info);
        }));
    }

    /// Setup terminal in raw mode and enter alternate screen
    pub fn setup_terminal(stdout: &mut Stdout) -> std::io::Result<()> {
        terminal::enable_raw_mode()?;
        App::set_panic_hook();
        crossterm::execute!(
            stdout,
            terminal::EnterAlternateScreen,
            terminal::Clear(ClearType::All),
            cursor::Hide,
            cursor::MoveTo(0, 0)
        )?;
        Ok(())
    }

    /// Leave alternate screen and disable raw mode
    pub fn restore_terminal(stdout: &mut Stdout) -> std::io::Result<()> {
        crossterm::execute!(stdout, terminal::LeaveAlternateScreen, cursor::Show)?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Maze dimension that fits the given terminal extent: odd and at least 3.
    pub fn fit_maze_size(term_extent: u16, cell_extent: u16) -> u16 {
        let cells = term_extent / cell_extent.max(1);
        let odd = if cells % 2 == 0 && cells > 0 {
            cells - 1
        } else {
            cells
        };
        odd.max(3)
    }

    /// Default maze dimensions derived from the current terminal size, with
    /// rows reserved for the status and help lines.
    pub fn default_dimensions() -> (u16, u16) {
        match terminal::size() {
            Ok((term_width, term_height)) => (
                App::fit_maze_size(term_height.saturating_sub(Renderer::NUM_LOG_ROWS + 1), 1),
                App::fit_maze_size(term_width, Cell::CELL_WIDTH),
            ),
            Err(_) => (21, 21),
        }
    }

    /// Main control loop: owns the canonical maze, reacts to key presses, and
    /// fans work out to the input, render, and search threads.
    pub fn run(&self, height: u16, width: u16) -> std::io::Result<()> {
        let mut maze = generate_maze(height, width, None).map_err(std::io::Error::other)?;
        tracing::info!(height, width, "generated initial maze");

        // Set by the control loop when it is time for the input thread to exit
        let done = Arc::new(AtomicBool::new(false));

        let (input_tx, input_rx) = std::sync::mpsc::channel::<UserInputEvent>();
        let input_poll_timeout = self.input_poll_timeout;
        let done_for_input = done.clone();
        let input_thread_handle = std::thread::spawn(move || -> std::io::Result<()> {
            App::listen_to_user_input(input_tx, input_poll_timeout, &done_for_input)
        });

        let (grid_tx, grid_rx) = std::sync::mpsc::sync_channel::<GridEvent>(App::GRID_EVENT_BUFFER);
        let render_thread_handle = std::thread::spawn(move || Renderer::new().run(grid_rx));

        let registry = CancelRegistry::new();
        let pace = StepPace::default();
        let mut search: Option<JoinHandle<SearchOutcome>> = None;

        grid_tx.send(GridEvent::Reset(maze.clone())).ok();

        loop {
            let input = match input_rx.recv_timeout(self.input_recv_timeout) {
                Err(std::sync::mpsc::RecvTimeoutError::Timeout) => continue,
                Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
                Ok(input) => input,
            };
            match input {
                UserInputEvent::Resize => {
                    grid_tx.send(GridEvent::Redraw).ok();
                }
                UserInputEvent::KeyPress(key_event) => match key_event.code {
                    KeyCode::Esc | KeyCode::Char('q') => {
                        App::stop_search(&registry, &mut search);
                        break;
                    }
                    KeyCode::Char('r') => {
                        // Every pending step must be gone before the new grid
                        // is adopted, else stale visits would land on it
                        App::stop_search(&registry, &mut search);
                        maze = generate_maze(height, width, None)
                            .map_err(std::io::Error::other)?;
                        tracing::info!("regenerated maze");
                        grid_tx.send(GridEvent::Reset(maze.clone())).ok();
                    }
                    KeyCode::Char('b') => {
                        App::start_search(
                            Strategy::Bfs,
                            &maze,
                            &registry,
                            &pace,
                            &grid_tx,
                            &mut search,
                        );
                    }
                    KeyCode::Char('d') => {
                        App::start_search(
                            Strategy::Dfs,
                            &maze,
                            &registry,
                            &pace,
                            &grid_tx,
                            &mut search,
                        );
                    }
                    KeyCode::Up => pace.speed_up(),
                    KeyCode::Down => pace.slow_down(),
                    _ => {}
                },
            }
        }

        // Shut the helper threads down: flag the input thread, then drop the
        // last grid sender so the render thread drains and exits
        done.store(true, Ordering::Relaxed);
        drop(grid_tx);
        if let Some(handle) = search.take() {
            let _ = handle.join();
        }
        input_thread_handle
            .join()
            .expect("Input thread panicked")?;
        render_thread_handle
            .join()
            .expect("Render thread panicked")?;
        tracing::info!("control loop finished");
        Ok(())
    }

    /// Cancels every outstanding run and joins the in-flight search thread,
    /// so no further visit events can reference the current grid.
    fn stop_search(registry: &CancelRegistry, search: &mut Option<JoinHandle<SearchOutcome>>) {
        registry.cancel_all();
        if let Some(handle) = search.take() {
            let outcome = handle.join().expect("Search thread panicked");
            tracing::debug!(%outcome, "previous search stopped");
        }
    }

    /// Preempts any in-flight search, resets the display grid, and spawns a
    /// fresh search thread over a copy of the current maze.
    fn start_search(
        strategy: Strategy,
        maze: &Maze,
        registry: &CancelRegistry,
        pace: &StepPace,
        grid_tx: &SyncSender<GridEvent>,
        search: &mut Option<JoinHandle<SearchOutcome>>,
    ) {
        App::stop_search(registry, search);
        grid_tx.send(GridEvent::Reset(maze.clone())).ok();
        grid_tx
            .send(GridEvent::Status {
                text: format!("Running {}...", strategy),
                color: Color::Yellow,
            })
            .ok();

        let token = registry.register();
        let maze = maze.clone();
        let mut pace = pace.clone();
        let tx = grid_tx.clone();
        *search = Some(std::thread::spawn(move || {
            let outcome = run_search(&maze, strategy, &mut pace, &token, |event| {
                tx.send(GridEvent::Visit(event)).ok();
            });
            let status = match outcome {
                SearchOutcome::EndReached => Some(("Path found!".to_string(), Color::Green)),
                SearchOutcome::Exhausted => Some(("No path found.".to_string(), Color::Red)),
                // A cancelled run stays silent; the preempting action owns
                // the status line now
                SearchOutcome::Cancelled => None,
            };
            if let Some((text, color)) = status {
                tx.send(GridEvent::Status { text, color }).ok();
            }
            outcome
        }));
    }

    /// Listen for key presses and resizes on a dedicated thread. Exits when
    /// the done flag is set or the receiving side is gone.
    fn listen_to_user_input(
        input_tx: Sender<UserInputEvent>,
        poll_timeout: Duration,
        done: &AtomicBool,
    ) -> std::io::Result<()> {
        loop {
            if done.load(Ordering::Relaxed) {
                return Ok(());
            }

            // Poll with a timeout so the done flag is re-checked regularly
            if !event::poll(poll_timeout)? {
                continue;
            }

            let input = match event::read()? {
                event::Event::Key(key_event) if key_event.kind == event::KeyEventKind::Press => {
                    UserInputEvent::KeyPress(key_event)
                }
                event::Event::Resize(_, _) => UserInputEvent::Resize,
                _ => continue,
            };

            let is_quit = matches!(
                &input,
                UserInputEvent::KeyPress(event::KeyEvent {
                    code: KeyCode::Esc | KeyCode::Char('q'),
                    ..
                })
            );

            if input_tx.send(input).is_err() {
                // Receiver dropped, control loop is gone
                return Ok(());
            }
            if is_quit {
                tracing::debug!("[input] quit key pressed, exiting input thread");
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_maze_size_is_odd_and_min_3() {
        assert_eq!(App::fit_maze_size(10, 2), 5);
        assert_eq!(App::fit_maze_size(12, 2), 5);
        assert_eq!(App::fit_maze_size(2, 2), 3);
        assert_eq!(App::fit_maze_size(0, 1), 3);
        assert_eq!(App::fit_maze_size(9, 1), 9);
    }
}
