/// Entry point and event loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::io;
use std::process::ExitCode;
use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use config::GameConfig;
use sim::catalog::{CatalogError, PuzzleCatalog};
use sim::event::GameEvent;
use sim::session::Session;
use sim::step;
use sim::view::ViewModel;
use ui::input::{Command, InputState};
use ui::renderer::{Button, HitTarget, Renderer};
use ui::UiState;

/// Upper bound on one blocking wait; the frame is redrawn afterwards so
/// resizes are picked up even without input.
const POLL_TIMEOUT: Duration = Duration::from_millis(250);

struct App {
    config: GameConfig,
    catalog: PuzzleCatalog,
    rng: ChaCha8Rng,
    session: Session,
    view: ViewModel,
    ui: UiState,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = GameConfig::load();
    let catalog = PuzzleCatalog::load(&config);
    log::info!("{} puzzles from {}", catalog.len(), catalog.source);
    log::debug!("titles: {:?}", catalog.titles().collect::<Vec<_>>());

    let seed = config.seed.unwrap_or_else(rand::random);
    log::info!("seed {seed}");

    let mut app = match App::new(config, catalog, ChaCha8Rng::seed_from_u64(seed)) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Cannot start game: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return ExitCode::FAILURE;
    }

    let result = game_loop(&mut app, &mut renderer);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
        return ExitCode::FAILURE;
    }

    println!();
    println!("Thanks for playing Ducks Connections!");
    println!(
        "Last puzzle: {}  Groups found: {}/4  {}",
        app.session.puzzle.title,
        app.session.found_order.len(),
        app.view.mistakes_label,
    );
    ExitCode::SUCCESS
}

fn game_loop(app: &mut App, renderer: &mut Renderer) -> io::Result<()> {
    let mut input = InputState::new();

    loop {
        renderer.render(&app.view, &app.ui)?;
        input.wait_events(POLL_TIMEOUT)?;

        for cmd in std::mem::take(&mut input.commands) {
            let cmd = match cmd {
                Command::Click { col, row } => match resolve_click(app, renderer.hit_test(col, row)) {
                    Some(c) => c,
                    None => continue,
                },
                Command::Redraw => {
                    renderer.invalidate();
                    continue;
                }
                other => other,
            };
            if app.handle(cmd) {
                return Ok(());
            }
        }
    }
}

/// Turn a click into the command the clicked element stands for.
fn resolve_click(app: &mut App, hit: Option<HitTarget>) -> Option<Command> {
    if app.ui.show_help {
        return Some(Command::Back);
    }
    match hit? {
        HitTarget::Tile(i) => {
            app.ui.cursor = i;
            Some(Command::Toggle)
        }
        HitTarget::Button(Button::Submit) => Some(Command::Submit),
        HitTarget::Button(Button::Shuffle) => Some(Command::Shuffle),
        HitTarget::Button(Button::Deselect) => Some(Command::Deselect),
        HitTarget::Button(Button::NewGame) => Some(Command::NewGame),
        HitTarget::Button(Button::Help) => Some(Command::Help),
    }
}

impl App {
    fn new(config: GameConfig, catalog: PuzzleCatalog, mut rng: ChaCha8Rng) -> Result<Self, CatalogError> {
        let session = start_session(&catalog, &mut rng, &config)?;
        let view = ViewModel::from_session(&session);
        Ok(App {
            config,
            catalog,
            rng,
            session,
            view,
            ui: UiState::default(),
        })
    }

    /// Apply one command. Returns true when the player wants to quit.
    fn handle(&mut self, cmd: Command) -> bool {
        // Help overlay blocks everything but closing it
        if self.ui.show_help {
            match cmd {
                Command::Help | Command::Back => self.ui.show_help = false,
                Command::Quit => return true,
                _ => {}
            }
            return false;
        }

        let events = match cmd {
            Command::Quit | Command::Back => return true,
            Command::Help => {
                self.ui.show_help = true;
                return false;
            }
            Command::Move(dir) => {
                self.ui.move_cursor(dir, self.view.open_tiles().count());
                return false;
            }
            Command::Toggle => match self.view.open_tiles().nth(self.ui.cursor) {
                Some(tile) => {
                    let item = tile.label.clone();
                    step::toggle_select(&mut self.session, &item)
                }
                None => vec![],
            },
            Command::Submit => step::submit(&mut self.session),
            Command::Shuffle => step::shuffle_remaining(&mut self.session, &mut self.rng),
            Command::Deselect => step::deselect_all(&mut self.session),
            Command::NewGame => {
                self.new_game();
                vec![]
            }
            Command::Click { .. } | Command::Redraw => vec![],
        };

        log_events(&events);
        self.refresh();
        false
    }

    /// Replace the whole session with a fresh puzzle.
    fn new_game(&mut self) {
        match start_session(&self.catalog, &mut self.rng, &self.config) {
            Ok(session) => {
                self.session = session;
                self.ui.cursor = 0;
            }
            Err(e) => {
                log::error!("new game failed: {e}");
                self.session.set_message(&e.to_string());
            }
        }
    }

    fn refresh(&mut self) {
        self.view = ViewModel::from_session(&self.session);
        self.ui.clamp(self.view.open_tiles().count());
    }
}

fn start_session(
    catalog: &PuzzleCatalog,
    rng: &mut ChaCha8Rng,
    config: &GameConfig,
) -> Result<Session, CatalogError> {
    let puzzle = catalog.pick_puzzle(rng)?;
    log::info!("new game: {}", puzzle.title);
    Ok(Session::new(puzzle, rng, config.max_mistakes))
}

fn log_events(events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::GameWon | GameEvent::GameLost => log::info!("{event:?}"),
            _ => log::debug!("{event:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::puzzle::tests::numbered_puzzle;
    use crate::sim::session::Phase;

    fn app() -> App {
        let catalog = PuzzleCatalog::from_puzzles(vec![numbered_puzzle()], "test");
        App::new(GameConfig::from_toml_str("", "test"), catalog, ChaCha8Rng::seed_from_u64(21))
            .expect("catalog has a puzzle")
    }

    fn click_item(app: &mut App, item: &str) {
        let idx = app
            .view
            .open_tiles()
            .position(|t| t.label == item)
            .expect("item on board");
        app.ui.cursor = idx;
        app.handle(Command::Toggle);
    }

    #[test]
    fn empty_catalog_cannot_start() {
        let catalog = PuzzleCatalog::from_puzzles(vec![], "empty");
        let result = App::new(GameConfig::from_toml_str("", "test"), catalog, ChaCha8Rng::seed_from_u64(0));
        assert!(matches!(result, Err(CatalogError::NoPuzzles)));
    }

    #[test]
    fn toggle_and_submit_through_commands() {
        let mut app = app();
        for it in ["1", "2", "3", "4"] {
            click_item(&mut app, it);
        }
        assert!(app.view.controls.submit);
        assert!(!app.handle(Command::Submit));
        assert_eq!(app.view.solved_groups.len(), 1);
        assert_eq!(app.view.open_tiles().count(), 12);
        assert_eq!(app.view.message, "Solved: A");
    }

    #[test]
    fn cursor_clamped_after_solve() {
        let mut app = app();
        for it in ["1", "2", "3", "4"] {
            click_item(&mut app, it);
        }
        app.ui.cursor = 15;
        app.handle(Command::Submit);
        assert_eq!(app.ui.cursor, 11);
    }

    #[test]
    fn help_blocks_game_input() {
        let mut app = app();
        app.handle(Command::Help);
        assert!(app.ui.show_help);
        app.handle(Command::Toggle);
        assert!(app.session.selected.is_empty());
        assert!(!app.handle(Command::Back));
        assert!(!app.ui.show_help);
        assert!(app.handle(Command::Back));
    }

    #[test]
    fn new_game_resets_state() {
        let mut app = app();
        for it in ["1", "5", "9", "13"] {
            click_item(&mut app, it);
        }
        app.handle(Command::Submit);
        assert_eq!(app.session.mistakes, 1);

        app.handle(Command::NewGame);
        assert_eq!(app.session.mistakes, 0);
        assert!(app.session.selected.is_empty());
        assert_eq!(app.session.phase, Phase::InProgress);
        assert_eq!(app.view.message, "Select 4 tiles to start.");
        assert_eq!(app.ui.cursor, 0);
    }

    #[test]
    fn click_on_help_closes_it() {
        let mut app = app();
        app.ui.show_help = true;
        assert_eq!(resolve_click(&mut app, Some(HitTarget::Tile(3))), Some(Command::Back));
        app.ui.show_help = false;
        assert_eq!(resolve_click(&mut app, Some(HitTarget::Tile(3))), Some(Command::Toggle));
        assert_eq!(app.ui.cursor, 3);
        assert_eq!(resolve_click(&mut app, None), None);
    }
}
