/// Session: the complete state of one game in progress.
///
/// ## Item sets
///
/// Items are identified by their label (unique within a puzzle):
///   - `tile_order`: remaining unsolved items in display order.
///     Only this sequence is ever shuffled.
///   - `selected`: current guess under construction, at most 4.
///   - `locked`: items of solved groups. Never selectable again.
///
/// Solved groups are tracked twice: `solved` for membership tests and
/// `found_order` for display in solve order.
///
/// A session is built whole on new game and replaced whole on the next.
/// It owns its puzzle, so nothing done here reaches the catalog.

use std::collections::{BTreeSet, HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::puzzle::{build_lookup, flatten_items, Puzzle};
use crate::domain::rules::{GROUP_COUNT, MAX_MISTAKES_LIMIT};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    InProgress,
    Won,
    Lost,
}

impl Phase {
    pub fn is_over(self) -> bool {
        !matches!(self, Phase::InProgress)
    }
}

#[derive(Clone, Debug)]
pub struct Session {
    pub puzzle: Puzzle,
    pub group_by_item: HashMap<String, usize>,

    // ── Board ──
    pub tile_order: Vec<String>,
    pub selected: HashSet<String>,
    pub locked: HashSet<String>,

    // ── Progress ──
    pub solved: BTreeSet<usize>,
    pub found_order: Vec<usize>,
    pub mistakes: u32,
    pub max_mistakes: u32,
    pub phase: Phase,

    // ── UI ──
    pub message: String,
}

impl Session {
    pub fn new<R: Rng + ?Sized>(puzzle: Puzzle, rng: &mut R, max_mistakes: u32) -> Self {
        let mut tile_order = flatten_items(&puzzle);
        tile_order.shuffle(rng);
        let group_by_item = build_lookup(&puzzle);

        Session {
            puzzle,
            group_by_item,
            tile_order,
            selected: HashSet::new(),
            locked: HashSet::new(),
            solved: BTreeSet::new(),
            found_order: Vec::with_capacity(GROUP_COUNT),
            mistakes: 0,
            max_mistakes: max_mistakes.clamp(1, MAX_MISTAKES_LIMIT),
            phase: Phase::InProgress,
            message: String::from("Select 4 tiles to start."),
        }
    }

    pub fn set_message(&mut self, msg: &str) {
        self.message = msg.to_string();
    }

    pub fn is_over(&self) -> bool {
        self.phase.is_over()
    }

    /// Items still on the board, in display order.
    pub fn remaining(&self) -> impl Iterator<Item = &String> {
        self.tile_order.iter().filter(|it| !self.locked.contains(*it))
    }

    pub fn group_of(&self, item: &str) -> Option<usize> {
        self.group_by_item.get(item).copied()
    }
}
