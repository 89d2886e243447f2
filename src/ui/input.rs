/// Input mapping: terminal events → game commands.
///
/// The game is turn-based, so there is no held-key tracking: each key
/// press or mouse click is one command. `wait_events()` blocks until
/// something arrives (or the timeout passes), then drains everything
/// pending so a burst of keys is handled in one redraw.
///
/// Key Repeat events count as presses for cursor movement only.
/// Release events are ignored.

use std::io;
use std::time::Duration;

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Dir {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Move(Dir),
    /// Toggle the tile under the cursor.
    Toggle,
    /// Mouse click at a terminal cell.
    Click { col: u16, row: u16 },
    Submit,
    Shuffle,
    Deselect,
    NewGame,
    Help,
    /// Close an overlay, or quit when none is open.
    Back,
    Quit,
    /// Terminal resized; redraw only.
    Redraw,
}

pub struct InputState {
    /// Commands collected during the most recent wait_events() call.
    pub commands: Vec<Command>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            commands: Vec::with_capacity(8),
        }
    }

    /// Wait up to `timeout` for input, then drain all pending events.
    pub fn wait_events(&mut self, timeout: Duration) -> io::Result<()> {
        self.commands.clear();

        if !poll(timeout)? {
            return Ok(());
        }

        loop {
            let cmd = match event::read()? {
                Event::Key(key) => map_key(key),
                Event::Mouse(m) => map_mouse(m),
                Event::Resize(..) => Some(Command::Redraw),
                _ => None,
            };
            if let Some(c) = cmd {
                self.commands.push(c);
            }
            if !poll(Duration::ZERO)? {
                break;
            }
        }
        Ok(())
    }
}

// ── Key Constants ──

const KEYS_SUBMIT: &[KeyCode] = &[KeyCode::Enter];
const KEYS_TOGGLE: &[KeyCode] = &[KeyCode::Char(' ')];
const KEYS_SHUFFLE: &[KeyCode] = &[KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_DESELECT: &[KeyCode] = &[KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_NEW: &[KeyCode] = &[KeyCode::Char('n'), KeyCode::Char('N')];
const KEYS_HELP: &[KeyCode] = &[KeyCode::F(1), KeyCode::Char('?')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];

pub fn map_key(key: KeyEvent) -> Option<Command> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
    {
        return Some(Command::Quit);
    }

    let dir = match key.code {
        KeyCode::Left => Some(Dir::Left),
        KeyCode::Right => Some(Dir::Right),
        KeyCode::Up => Some(Dir::Up),
        KeyCode::Down => Some(Dir::Down),
        _ => None,
    };
    if let Some(d) = dir {
        return Some(Command::Move(d));
    }

    // Everything else is one-shot
    if key.kind == KeyEventKind::Repeat {
        return None;
    }

    let code = key.code;
    if KEYS_SUBMIT.contains(&code) {
        Some(Command::Submit)
    } else if KEYS_TOGGLE.contains(&code) {
        Some(Command::Toggle)
    } else if KEYS_SHUFFLE.contains(&code) {
        Some(Command::Shuffle)
    } else if KEYS_DESELECT.contains(&code) {
        Some(Command::Deselect)
    } else if KEYS_NEW.contains(&code) {
        Some(Command::NewGame)
    } else if KEYS_HELP.contains(&code) {
        Some(Command::Help)
    } else if KEYS_QUIT.contains(&code) {
        Some(Command::Quit)
    } else if code == KeyCode::Esc {
        Some(Command::Back)
    } else {
        None
    }
}

pub fn map_mouse(m: MouseEvent) -> Option<Command> {
    match m.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(Command::Click { col: m.column, row: m.row }),
        _ => None,
    }
}
