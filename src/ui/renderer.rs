/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The renderer only reads the view model. While composing it records
/// the screen region of every tile and control so mouse clicks can be
/// resolved with `hit_test()`.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::puzzle::Tier;
use crate::sim::session::Phase;
use crate::sim::view::{GroupCard, ViewModel};
use super::UiState;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit background for every cell, so terminal defaults never
    /// show through between rows.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel used to invalidate the back buffer.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill(&mut self, rect: Rect, bg: Color) {
        for y in rect.y..rect.y + rect.h {
            for x in rect.x..rect.x + rect.w {
                self.set(x, y, Cell::new(' ', Color::White, bg));
            }
        }
    }

    /// Center `s` inside the row span of `rect`, truncating to fit.
    fn put_centered(&mut self, rect: Rect, y: usize, s: &str, fg: Color, bg: Color) {
        let text = fit(s, rect.w.saturating_sub(2));
        let len = text.chars().count();
        let x = rect.x + (rect.w.saturating_sub(len)) / 2;
        self.put_str(x, y, &text, fg, bg);
    }
}

/// Truncate to `max` chars, marking the cut with an ellipsis.
fn fit(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else if max == 0 {
        String::new()
    } else {
        let mut out: String = s.chars().take(max - 1).collect();
        out.push('…');
        out
    }
}

// ── Layout ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

impl Rect {
    fn contains(&self, col: usize, row: usize) -> bool {
        col >= self.x && col < self.x + self.w && row >= self.y && row < self.y + self.h
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Button {
    Submit,
    Shuffle,
    Deselect,
    NewGame,
    Help,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HitTarget {
    /// Index into the view model's open tiles.
    Tile(usize),
    Button(Button),
}

pub const GRID_COLS: usize = 4;
const TILE_W: usize = 16;
const TILE_H: usize = 3;
const GAP: usize = 1;
const BOARD_W: usize = GRID_COLS * TILE_W + (GRID_COLS - 1) * GAP;
const LEFT: usize = 2;

const HUD_ROW: usize = 0;
const BOARD_ROW: usize = 2;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const TILE_BG: Color = Color::Rgb { r: 239, g: 239, b: 230 };
const TILE_CURSOR_BG: Color = Color::Rgb { r: 214, g: 214, b: 200 };
const SELECTED_BG: Color = Color::Rgb { r: 90, g: 89, b: 78 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const KEY_FG: Color = Color::Rgb { r: 100, g: 200, b: 255 };

fn tier_color(tier: Tier) -> Color {
    match tier {
        Tier::Easy => Color::Rgb { r: 249, g: 223, b: 109 },
        Tier::Medium => Color::Rgb { r: 160, g: 195, b: 90 },
        Tier::Hard => Color::Rgb { r: 176, g: 196, b: 239 },
        Tier::Expert => Color::Rgb { r: 186, g: 129, b: 197 },
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    hits: Vec<(Rect, HitTarget)>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            hits: Vec::new(),
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Force the next frame to repaint every cell.
    pub fn invalidate(&mut self) {
        self.back.cells.fill(Cell::INVALID);
    }

    pub fn render(&mut self, vm: &ViewModel, ui: &UiState) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        self.front.clear();
        self.hits.clear();

        self.compose(vm, ui);
        if ui.show_help {
            self.compose_help_overlay(vm);
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    /// What was drawn at a terminal cell in the last frame.
    pub fn hit_test(&self, col: u16, row: u16) -> Option<HitTarget> {
        let (col, row) = (col as usize, row as usize);
        self.hits.iter().find(|(r, _)| r.contains(col, row)).map(|(_, t)| *t)
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose(&mut self, vm: &ViewModel, ui: &UiState) {
        let buf_w = self.front.width;

        // ── HUD row ──
        for x in 0..buf_w {
            self.front.set(x, HUD_ROW, Cell::new(' ', Color::White, HUD_BG));
        }
        let status = match vm.phase {
            Phase::InProgress => "",
            Phase::Won => "  ★ SOLVED",
            Phase::Lost => "  ✖ GAME OVER",
        };
        let hud = format!(" DUCKS CONNECTIONS  │  {}{}", vm.title_label, status);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);
        let room = buf_w.saturating_sub(hud.chars().count() + vm.mistakes_label.chars().count() + 5);
        let dots = mistake_dots(vm.mistakes, vm.max_mistakes, room);
        let right = if dots.is_empty() {
            format!("{} ", vm.mistakes_label)
        } else {
            format!("{}  {} ", vm.mistakes_label, dots)
        };
        let rx = buf_w.saturating_sub(right.chars().count());
        self.front.put_str(rx, HUD_ROW, &right, Color::White, HUD_BG);

        // ── Solved group cards, then open tiles ──
        let mut y = BOARD_ROW;
        for card in &vm.solved_groups {
            let rect = Rect { x: LEFT, y, w: BOARD_W, h: TILE_H };
            self.compose_card(card, rect);
            y += TILE_H + GAP;
        }

        for (i, tile) in vm.open_tiles().enumerate() {
            let col = i % GRID_COLS;
            let row = i / GRID_COLS;
            let rect = Rect {
                x: LEFT + col * (TILE_W + GAP),
                y: y + row * (TILE_H + GAP),
                w: TILE_W,
                h: TILE_H,
            };
            let at_cursor = i == ui.cursor && !ui.show_help;
            let (fg, bg) = match (tile.selected, at_cursor) {
                (true, _) => (Color::White, SELECTED_BG),
                (false, true) => (Color::Black, TILE_CURSOR_BG),
                (false, false) => (Color::Black, TILE_BG),
            };
            self.front.fill(rect, bg);
            self.front.put_centered(rect, rect.y + 1, &tile.label.to_uppercase(), fg, bg);
            if at_cursor {
                self.front.put_str(rect.x, rect.y + 1, "▶", Color::Red, bg);
                self.front.put_str(rect.x + rect.w - 1, rect.y + 1, "◀", Color::Red, bg);
            }
            self.hits.push((rect, HitTarget::Tile(i)));
        }
        let open_rows = vm.open_tiles().count().div_ceil(GRID_COLS);
        y += open_rows * (TILE_H + GAP);

        // ── Message bar ──
        if !vm.message.is_empty() {
            let msg = format!(" ◈ {} ", vm.message);
            let rect = Rect { x: LEFT, y, w: BOARD_W, h: 1 };
            self.front.fill(rect, MSG_BG);
            self.front.put_str(LEFT, y, &msg, Color::Black, MSG_BG);
        }
        y += 2;

        // ── Controls ──
        let controls = [
            ("Enter", vm.submit_label.as_str(), vm.controls.submit, Button::Submit),
            ("S", "Shuffle", vm.controls.shuffle, Button::Shuffle),
            ("D", "Deselect all", vm.controls.deselect, Button::Deselect),
            ("N", "New game", vm.controls.new_game, Button::NewGame),
            ("?", "Help", true, Button::Help),
        ];
        let mut x = LEFT;
        for (key, label, enabled, button) in controls {
            let text = format!("[{key}] {label}");
            let (kc, lc) = if enabled {
                (KEY_FG, Color::White)
            } else {
                (Color::DarkGrey, Color::DarkGrey)
            };
            let key_part = format!("[{key}]");
            self.front.put_str(x, y, &key_part, kc, Color::Reset);
            self.front.put_str(x + key_part.chars().count() + 1, y, label, lc, Color::Reset);
            let w = text.chars().count();
            if enabled {
                self.hits.push((Rect { x, y, w, h: 1 }, HitTarget::Button(button)));
            }
            x += w + 3;
        }
        y += 1;
        self.front.put_str(
            LEFT, y,
            "←↑→↓ Move   Space Select   Q Quit",
            Color::DarkGrey, Color::Reset,
        );
        y += 2;

        // ── Solution reveal ──
        if let Some(solution) = &vm.solution {
            self.front.put_str(LEFT, y, "SOLUTION", Color::Rgb { r: 255, g: 220, b: 50 }, Color::Reset);
            y += 1;
            for card in solution {
                let bg = tier_color(card.tier);
                let rect = Rect { x: LEFT, y, w: BOARD_W, h: 1 };
                self.front.fill(rect, bg);
                let line = format!(" {}: {}", card.name.to_uppercase(), card.items.join(", "));
                self.front.put_str(LEFT, y, &fit(&line, BOARD_W), Color::Black, bg);
                y += 1;
            }
        }
    }

    fn compose_card(&mut self, card: &GroupCard, rect: Rect) {
        let bg = tier_color(card.tier);
        self.front.fill(rect, bg);
        self.front.put_centered(rect, rect.y, &card.name.to_uppercase(), Color::Black, bg);
        let items = card.items.join(", ");
        self.front.put_centered(rect, rect.y + 1, &items, Color::Black, bg);
    }

    fn compose_help_overlay(&mut self, vm: &ViewModel) {
        let dim = Color::Rgb { r: 40, g: 40, b: 40 };
        let hdr = Color::Rgb { r: 255, g: 220, b: 50 };
        let desc_c = Color::Rgb { r: 180, g: 180, b: 180 };
        let sep_c = Color::Rgb { r: 80, g: 80, b: 80 };

        let box_w = 48_usize.min(self.front.width);
        let box_h = 16_usize.min(self.front.height);
        let box_x = LEFT + BOARD_W.saturating_sub(box_w) / 2;
        let box_y = BOARD_ROW + 1;
        self.front.fill(Rect { x: box_x, y: box_y, w: box_w, h: box_h }, dim);

        let title = Rect { x: box_x, y: box_y, w: box_w, h: 1 };
        self.front.put_centered(title, box_y + 1, "HOW TO PLAY", hdr, dim);

        let budget = format!("Find all 4 groups before {} mistakes.", vm.max_mistakes);
        let lines: [(&str, Color); 11] = [
            ("Select 4 tiles, Submit.", desc_c),
            (&budget, desc_c),
            ("────────────────────────────────────", sep_c),
            ("←↑→↓    Move cursor", KEY_FG),
            ("Space   Select / deselect tile", KEY_FG),
            ("Enter   Submit guess", KEY_FG),
            ("S       Shuffle remaining tiles", KEY_FG),
            ("D       Deselect all", KEY_FG),
            ("N       New game", KEY_FG),
            ("────────────────────────────────────", sep_c),
            ("Esc     Close help      Q  Quit", KEY_FG),
        ];
        for (i, (text, color)) in lines.iter().enumerate() {
            self.front.put_str(box_x + 3, box_y + 3 + i, text, *color, dim);
        }
    }
}

/// One dot per allowed mistake, or nothing when they do not fit in `room` columns.
fn mistake_dots(mistakes: u32, max: u32, room: usize) -> String {
    if max as usize > room { return String::new(); }
    (0..max).map(|i| if i < mistakes { '●' } else { '○' }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::session::Session;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn hud_row(max_mistakes: u32) -> String {
        let puzzle = crate::domain::puzzle::tests::numbered_puzzle();
        let session = Session::new(puzzle, &mut ChaCha8Rng::seed_from_u64(5), 4);
        let mut vm = ViewModel::from_session(&session);
        vm.max_mistakes = max_mistakes;
        vm.mistakes_label = format!("Mistakes: 0 / {max_mistakes}");

        let mut r = Renderer::new();
        r.front.resize(80, 24);
        r.compose(&vm, &UiState::default());
        (0..80).map(|x| r.front.get(x, HUD_ROW).ch).collect()
    }

    #[test]
    fn hud_shows_dots_when_they_fit() {
        let row = hud_row(4);
        assert!(row.contains("Numbers (randomized)"));
        assert!(row.contains("Mistakes: 0 / 4  ○○○○"));
    }

    #[test]
    fn wide_budget_keeps_title_visible() {
        let row = hud_row(60);
        assert!(row.contains("Numbers (randomized)"));
        assert!(row.contains("Mistakes: 0 / 60"));
        assert!(!row.contains('○'));
    }

    #[test]
    fn dots_dropped_past_room() {
        assert_eq!(mistake_dots(1, 3, 3), "●○○");
        assert_eq!(mistake_dots(0, 4, 3), "");
        assert_eq!(mistake_dots(0, u32::MAX, 80), "");
    }

    #[test]
    fn fit_truncates_with_ellipsis() {
        assert_eq!(fit("MALLARD", 10), "MALLARD");
        assert_eq!(fit("CANVASBACK", 6), "CANVA…");
        assert_eq!(fit("ANY", 0), "");
    }

    #[test]
    fn rect_contains_is_half_open() {
        let r = Rect { x: 2, y: 2, w: 16, h: 3 };
        assert!(r.contains(2, 2));
        assert!(r.contains(17, 4));
        assert!(!r.contains(18, 4));
        assert!(!r.contains(2, 5));
    }

    #[test]
    fn put_centered_places_text_mid_row() {
        let mut fb = FrameBuffer::new(20, 1);
        let rect = Rect { x: 0, y: 0, w: 20, h: 1 };
        fb.put_centered(rect, 0, "TEAL", Color::Black, TILE_BG);
        let row: String = (0..20).map(|x| fb.get(x, 0).ch).collect();
        assert_eq!(row.trim(), "TEAL");
        assert_eq!(row.find('T'), Some(8));
    }
}
