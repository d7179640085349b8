use crossterm::style::{Color, Stylize};

use std::fmt;

/// One grid position. `Wall` is the default state of a freshly allocated
/// maze; carving turns walls into paths, and a search transiently marks
/// paths as visited.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    #[default]
    Wall,
    Path,
    /// The fixed entry cell. Exactly one per generated maze.
    Start,
    /// The fixed goal cell. Exactly one per generated maze.
    End,
    /// A path cell explored by a search. Never overwrites `Start` or `End`.
    Visited,
}

impl Cell {
    /// The width of each cell when rendered, in character widths.
    pub const CELL_WIDTH: u16 = 2;

    /// Stable lowercase label for snapshot consumers (one style per state).
    pub fn label(self) -> &'static str {
        match self {
            Cell::Wall => "wall",
            Cell::Path => "path",
            Cell::Start => "start",
            Cell::End => "end",
            Cell::Visited => "visited",
        }
    }

    /// Whether a search may move through this cell.
    pub fn is_passable(self) -> bool {
        !matches!(self, Cell::Wall)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let styled_symbol = match self {
            Cell::Wall => "⬜".with(Color::White),
            Cell::Path => "  ".with(Color::Reset),
            Cell::Start => "🟩".with(Color::Green),
            Cell::End => "🟥".with(Color::Red),
            Cell::Visited => "* ".with(Color::Blue),
        };

        #[cfg(debug_assertions)]
        {
            use unicode_width::UnicodeWidthStr;
            assert_eq!(
                styled_symbol.content().width(),
                Cell::CELL_WIDTH as usize,
                "Each cell must occupy exactly two character widths."
            );
        }

        write!(f, "{}", styled_symbol)
    }
}
