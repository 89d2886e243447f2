//! Terminal front end.

pub mod input;
pub mod renderer;

use input::Dir;
use renderer::GRID_COLS;

/// Front-end state that is not part of the game itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UiState {
    /// Index into the open (unlocked) tiles.
    pub cursor: usize,
    pub show_help: bool,
}

impl UiState {
    /// Move within the open-tile grid. Edges do not wrap.
    pub fn move_cursor(&mut self, dir: Dir, open: usize) {
        if open == 0 {
            self.cursor = 0;
            return;
        }
        let c = self.cursor.min(open - 1);
        self.cursor = match dir {
            Dir::Left if c % GRID_COLS > 0 => c - 1,
            Dir::Right if c % GRID_COLS < GRID_COLS - 1 && c + 1 < open => c + 1,
            Dir::Up if c >= GRID_COLS => c - GRID_COLS,
            Dir::Down if c + GRID_COLS < open => c + GRID_COLS,
            _ => c,
        };
    }

    /// Keep the cursor on a tile after the board shrinks.
    pub fn clamp(&mut self, open: usize) {
        self.cursor = self.cursor.min(open.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(cursor: usize) -> UiState {
        UiState { cursor, show_help: false }
    }

    #[test]
    fn moves_inside_grid() {
        let mut ui = at(5);
        ui.move_cursor(Dir::Left, 16);
        assert_eq!(ui.cursor, 4);
        ui.move_cursor(Dir::Down, 16);
        assert_eq!(ui.cursor, 8);
        ui.move_cursor(Dir::Right, 16);
        assert_eq!(ui.cursor, 9);
        ui.move_cursor(Dir::Up, 16);
        assert_eq!(ui.cursor, 5);
    }

    #[test]
    fn edges_do_not_wrap() {
        let mut ui = at(4);
        ui.move_cursor(Dir::Left, 16);
        assert_eq!(ui.cursor, 4);
        let mut ui = at(3);
        ui.move_cursor(Dir::Right, 16);
        assert_eq!(ui.cursor, 3);
        ui.move_cursor(Dir::Up, 16);
        assert_eq!(ui.cursor, 3);
    }

    #[test]
    fn down_stops_at_last_row() {
        let mut ui = at(9);
        ui.move_cursor(Dir::Down, 12);
        assert_eq!(ui.cursor, 9);
    }

    #[test]
    fn clamp_after_solve() {
        let mut ui = at(15);
        ui.clamp(12);
        assert_eq!(ui.cursor, 11);
        ui.clamp(0);
        assert_eq!(ui.cursor, 0);
    }
}
