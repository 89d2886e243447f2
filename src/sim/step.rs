/// Session operations: every user action that mutates a game.
///
/// Each operation runs to completion synchronously and returns the
/// events it produced. Operations that do not apply in the current
/// state (game over, wrong selection size, locked tile) return no events
/// and leave the session untouched, apart from a status message where
/// the player should be told.
///
/// Submit processing order:
///   1. Guard: in progress, exactly 4 selected
///   2. Evaluate guess (domain::rules)
///   3. Match → solve group, lock items, clear selection
///      Miss  → count mistake, report closest overlap
///   4. Win / lose check

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::rules::{self, Verdict, GROUP_COUNT, GROUP_SIZE};
use super::event::GameEvent;
use super::session::{Phase, Session};

// ══════════════════════════════════════════════════════════════
// Selection
// ══════════════════════════════════════════════════════════════

pub fn toggle_select(session: &mut Session, item: &str) -> Vec<GameEvent> {
    if session.is_over() { return vec![]; }
    if session.locked.contains(item) { return vec![]; }
    if session.group_of(item).is_none() { return vec![]; }

    if session.selected.remove(item) {
        return vec![GameEvent::TileDeselected { item: item.to_string() }];
    }

    if session.selected.len() >= GROUP_SIZE {
        session.set_message("You can only select 4 tiles.");
        return vec![GameEvent::SelectionFull { item: item.to_string() }];
    }

    session.selected.insert(item.to_string());
    vec![GameEvent::TileSelected { item: item.to_string() }]
}

pub fn deselect_all(session: &mut Session) -> Vec<GameEvent> {
    if session.is_over() { return vec![]; }
    session.selected.clear();
    vec![GameEvent::SelectionCleared]
}

// ══════════════════════════════════════════════════════════════
// Guess evaluation
// ══════════════════════════════════════════════════════════════

pub fn submit(session: &mut Session) -> Vec<GameEvent> {
    if session.is_over() { return vec![]; }
    if session.selected.len() != GROUP_SIZE { return vec![]; }

    let mut events = Vec::new();

    let verdict = {
        let pick: Vec<&str> = session.selected.iter().map(String::as_str).collect();
        rules::evaluate_guess(&session.puzzle, &session.group_by_item, &session.solved, &pick)
    };

    match verdict {
        Verdict::Match { group } => {
            session.solved.insert(group);
            session.found_order.push(group);
            let picked = std::mem::take(&mut session.selected);
            session.locked.extend(picked);

            let msg = format!("Solved: {}", session.puzzle.groups[group].name);
            session.set_message(&msg);
            events.push(GameEvent::GroupSolved { group });

            if session.solved.len() == GROUP_COUNT {
                events.extend(end_game(session, true));
            }
        }
        Verdict::Miss { best, best_group } => {
            session.mistakes += 1;
            session.set_message(&format!("Not a group. Closest: {best}/4 from the same group."));
            events.push(GameEvent::Mistake { best, closest: best_group, mistakes: session.mistakes });

            if session.mistakes >= session.max_mistakes {
                events.extend(end_game(session, false));
            }
        }
    }

    events
}

// ══════════════════════════════════════════════════════════════
// Termination
// ══════════════════════════════════════════════════════════════

/// Enter a terminal phase. The solution reveal and control changes are
/// derived from the phase by the view model.
pub fn end_game(session: &mut Session, won: bool) -> Vec<GameEvent> {
    if won {
        session.phase = Phase::Won;
        session.set_message("You won. Nice work.");
        vec![GameEvent::GameWon]
    } else {
        session.phase = Phase::Lost;
        session.set_message("Out of mistakes. Better luck next time.");
        vec![GameEvent::GameLost]
    }
}

// ══════════════════════════════════════════════════════════════
// Shuffle
// ══════════════════════════════════════════════════════════════

/// Re-randomize the unsolved tiles. Locked items leave `tile_order`
/// for good; they are shown through their group cards.
pub fn shuffle_remaining<R: Rng + ?Sized>(session: &mut Session, rng: &mut R) -> Vec<GameEvent> {
    if session.is_over() { return vec![]; }

    let mut remaining: Vec<String> = session.remaining().cloned().collect();
    remaining.shuffle(rng);
    session.tile_order = remaining;

    vec![GameEvent::Shuffled]
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
