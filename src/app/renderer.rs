use std::{
    io::{Stdout, Write},
    sync::mpsc::Receiver,
};

use crossterm::{
    QueueableCommand, cursor, queue,
    style::{self, Attribute, Color, Stylize},
    terminal::{self, ClearType},
};
use unicode_truncate::UnicodeTruncateStr;

use crate::{
    maze::{Cell, Maze},
    solvers::VisitEvent,
};

/// Everything the render thread consumes. A `Reset` hands over a fresh grid
/// snapshot by value; visits from a cancelled run can never outlive it
/// because the control loop joins the search thread before sending it.
pub enum GridEvent {
    /// Adopt and fully draw a new grid.
    Reset(Maze),
    /// Mark one coordinate of the current grid as explored.
    Visit(VisitEvent),
    /// Replace the status line below the grid.
    Status { text: String, color: Color },
    /// Redraw the current grid, e.g. after a terminal resize.
    Redraw,
}

/// Owns the display copy of the grid and the stdout handle. Runs on its own
/// thread; exits when every sender is gone.
pub struct Renderer {
    stdout: Stdout,
    maze: Option<Maze>,
}

impl Renderer {
    /// Rows reserved below the grid for the status and help lines.
    pub const NUM_LOG_ROWS: u16 = 2;

    pub fn new() -> Self {
        Renderer {
            stdout: std::io::stdout(),
            maze: None,
        }
    }

    pub fn run(mut self, grid_event_rx: Receiver<GridEvent>) -> std::io::Result<()> {
        queue!(self.stdout, terminal::Clear(ClearType::All), cursor::Hide)?;
        self.stdout.flush()?;

        loop {
            match grid_event_rx.recv() {
                // All senders dropped, nothing more to draw
                Err(_) => break,
                Ok(event) => self.handle_event(event)?,
            }
        }

        // Park the cursor below the grid on the way out
        if let Some(maze) = &self.maze {
            let below = maze.height() + Self::NUM_LOG_ROWS;
            queue!(self.stdout, cursor::MoveTo(0, below), cursor::Show)?;
            self.stdout.flush()?;
        }
        tracing::debug!("[render] exiting render thread");
        Ok(())
    }

    fn handle_event(&mut self, event: GridEvent) -> std::io::Result<()> {
        match event {
            GridEvent::Reset(maze) => {
                self.maze = Some(maze);
                self.draw_grid()?;
                self.status_line(None)?;
            }
            GridEvent::Visit(visit) => self.apply_visit(visit)?,
            GridEvent::Status { text, color } => {
                self.status_line(Some((text, color)))?;
            }
            GridEvent::Redraw => self.draw_grid()?,
        }
        Ok(())
    }

    /// Marks a visited coordinate on the display grid and repaints that cell.
    /// Start and end markers are never downgraded to a visited mark.
    fn apply_visit(&mut self, visit: VisitEvent) -> std::io::Result<()> {
        let Some(maze) = &mut self.maze else {
            return Ok(());
        };
        if !maze.in_bounds(visit.coord) {
            // A stale coordinate here would mean a search survived a reset
            debug_assert!(false, "visit event out of bounds: {:?}", visit.coord);
            return Ok(());
        }
        if maze[visit.coord] == Cell::Path {
            maze[visit.coord] = Cell::Visited;
            let (row, col) = visit.coord;
            queue!(
                self.stdout,
                cursor::MoveTo(col * Cell::CELL_WIDTH, row),
                style::Print(Cell::Visited)
            )?;
            self.stdout.flush()?;
        }
        Ok(())
    }

    /// Repaints the whole grid, or a resize hint when the terminal is too
    /// small to fit it.
    fn draw_grid(&mut self) -> std::io::Result<()> {
        let Some(maze) = &self.maze else {
            return Ok(());
        };
        let (term_width, term_height) = terminal::size()?;
        let needed_rows = maze.height() + Self::NUM_LOG_ROWS;
        if term_width < maze.width() * Cell::CELL_WIDTH || term_height < needed_rows {
            let msg = format!(
                "Terminal ({}x{}) is too small for a {}x{} maze. Resize to continue.",
                term_width,
                term_height,
                maze.height(),
                maze.width()
            );
            queue!(
                self.stdout,
                terminal::Clear(ClearType::All),
                cursor::MoveTo(0, 0),
                style::PrintStyledContent(msg.with(Color::Yellow).attribute(Attribute::Bold))
            )?;
            self.stdout.flush()?;
            return Ok(());
        }

        self.stdout
            .queue(terminal::Clear(ClearType::All))?
            .queue(cursor::MoveTo(0, 0))?;
        for (row, cells) in maze.rows().enumerate() {
            self.stdout.queue(cursor::MoveTo(0, row as u16))?;
            for cell in cells {
                self.stdout.queue(style::Print(cell))?;
            }
        }
        self.stdout.flush()?;
        self.help_line()
    }

    /// Writes (or clears) the status line on the first row below the grid,
    /// truncated to the terminal width.
    fn status_line(&mut self, msg: Option<(String, Color)>) -> std::io::Result<()> {
        let row = self.maze.as_ref().map(|m| m.height()).unwrap_or(0);
        queue!(
            self.stdout,
            cursor::MoveTo(0, row),
            terminal::Clear(ClearType::CurrentLine)
        )?;
        if let Some((text, color)) = msg {
            let (term_width, _) = terminal::size()?;
            let (truncated, _) = text.unicode_truncate(term_width as usize);
            self.stdout.queue(style::PrintStyledContent(
                truncated.to_string().with(color).attribute(Attribute::Bold),
            ))?;
        }
        self.stdout.flush()?;
        Ok(())
    }

    fn help_line(&mut self) -> std::io::Result<()> {
        let row = self.maze.as_ref().map(|m| m.height()).unwrap_or(0) + 1;
        let (term_width, _) = terminal::size()?;
        let help = "r: new maze | b: breadth-first | d: depth-first | ↑/↓: speed | Esc: quit";
        let (truncated, _) = help.unicode_truncate(term_width as usize);
        queue!(
            self.stdout,
            cursor::MoveTo(0, row),
            terminal::Clear(ClearType::CurrentLine),
            style::PrintStyledContent(truncated.to_string().with(Color::Cyan))
        )?;
        self.stdout.flush()?;
        Ok(())
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Renderer::new()
    }
}
