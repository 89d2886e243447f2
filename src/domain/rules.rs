/// Guess rules: truth-table driven.
///
/// Pure functions over puzzle data. These decide what a guess means
/// without touching session state.
///
/// ## Guess Truth Table
///
/// ┌─────────────────────────────────────┬──────────────┐
/// │ Condition                           │ Verdict      │
/// ├─────────────────────────────────────┼──────────────┤
/// │ all 4 items share one group         │              │
/// │   and that group is not solved      │ Match        │
/// │ any item outside that group         │ Miss         │
/// │ group already solved                │ Miss         │
/// └─────────────────────────────────────┴──────────────┘
///
/// A Miss carries the best overlap between the guess and any unsolved
/// group. Ties keep the first group in puzzle order.

use std::collections::{BTreeSet, HashMap};

use super::puzzle::Puzzle;

pub const GROUP_SIZE: usize = 4;
pub const GROUP_COUNT: usize = 4;
pub const DEFAULT_MAX_MISTAKES: u32 = 4;
pub const MAX_MISTAKES_LIMIT: u32 = 10;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Verdict {
    Match { group: usize },
    Miss { best: usize, best_group: Option<usize> },
}

/// Judge a full guess. Callers guarantee `guess.len() == GROUP_SIZE`.
pub fn evaluate_guess(
    puzzle: &Puzzle,
    lookup: &HashMap<String, usize>,
    solved: &BTreeSet<usize>,
    guess: &[&str],
) -> Verdict {
    let first = guess.first().and_then(|it| lookup.get(*it)).copied();

    if let Some(gi) = first {
        let same_group = guess.iter().all(|it| lookup.get(*it) == Some(&gi));
        if same_group && !solved.contains(&gi) {
            return Verdict::Match { group: gi };
        }
    }

    let (best, best_group) = best_overlap(puzzle, solved, guess);
    Verdict::Miss { best, best_group }
}

/// Largest intersection between the guess and any unsolved group.
pub fn best_overlap(
    puzzle: &Puzzle,
    solved: &BTreeSet<usize>,
    guess: &[&str],
) -> (usize, Option<usize>) {
    let mut best = 0;
    let mut best_group = None;

    for (gi, g) in puzzle.groups.iter().enumerate() {
        if solved.contains(&gi) { continue; }
        let overlap = guess
            .iter()
            .filter(|it| g.items.iter().any(|x| x.as_str() == **it))
            .count();
        // Strict: first group wins a tie
        if overlap > best {
            best = overlap;
            best_group = Some(gi);
        }
    }

    (best, best_group)
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
