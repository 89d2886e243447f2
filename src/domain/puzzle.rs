/// Puzzle data: groups, difficulty tiers, validation and lookups.
///
/// A puzzle is four groups of four item labels. Labels are unique across
/// the whole puzzle, so a label alone identifies its owning group.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use thiserror::Error;

use super::rules::{GROUP_COUNT, GROUP_SIZE};

/// Difficulty ordinal as stored in puzzle data (0 = easiest).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct Difficulty(pub u8);

/// Display tier derived from a difficulty ordinal.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tier {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    /// Out-of-range ordinals render as the hardest tier.
    pub fn tier(self) -> Tier {
        match self.0 {
            0 => Tier::Easy,
            1 => Tier::Medium,
            2 => Tier::Hard,
            _ => Tier::Expert,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Group {
    pub name: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub items: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Puzzle {
    pub title: String,
    #[serde(rename = "group", default)]
    pub groups: Vec<Group>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PuzzleError {
    #[error("puzzle \"{title}\" has {found} groups, expected 4")]
    GroupCount { title: String, found: usize },
    #[error("group \"{group}\" has {found} items, expected 4")]
    ItemCount { group: String, found: usize },
    #[error("item \"{item}\" appears more than once")]
    DuplicateItem { item: String },
    #[error("group \"{group}\" contains an empty item label")]
    EmptyItem { group: String },
}

impl Puzzle {
    /// Check the shape invariants the game relies on.
    pub fn validate(&self) -> Result<(), PuzzleError> {
        if self.groups.len() != GROUP_COUNT {
            return Err(PuzzleError::GroupCount {
                title: self.title.clone(),
                found: self.groups.len(),
            });
        }

        let mut seen = HashSet::with_capacity(GROUP_COUNT * GROUP_SIZE);
        for g in &self.groups {
            if g.items.len() != GROUP_SIZE {
                return Err(PuzzleError::ItemCount {
                    group: g.name.clone(),
                    found: g.items.len(),
                });
            }
            for it in &g.items {
                if it.trim().is_empty() {
                    return Err(PuzzleError::EmptyItem { group: g.name.clone() });
                }
                if !seen.insert(it.as_str()) {
                    return Err(PuzzleError::DuplicateItem { item: it.clone() });
                }
            }
        }
        Ok(())
    }
}

/// Map each item label to the index of the group that owns it.
/// Duplicate labels are rejected by `validate()`; here the last one wins.
pub fn build_lookup(puzzle: &Puzzle) -> HashMap<String, usize> {
    let mut by_item = HashMap::with_capacity(GROUP_COUNT * GROUP_SIZE);
    for (gi, g) in puzzle.groups.iter().enumerate() {
        for it in &g.items {
            by_item.insert(it.clone(), gi);
        }
    }
    by_item
}

/// All items, group by group, in puzzle order.
pub fn flatten_items(puzzle: &Puzzle) -> Vec<String> {
    puzzle.groups.iter().flat_map(|g| g.items.iter().cloned()).collect()
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn group(name: &str, difficulty: u8, items: [&str; 4]) -> Group {
        Group {
            name: name.to_string(),
            difficulty: Difficulty(difficulty),
            items: items.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Groups A{1..4} d0, B{5..8} d1, C{9..12} d2, D{13..16} d3.
    pub(crate) fn numbered_puzzle() -> Puzzle {
        Puzzle {
            title: "Numbers".to_string(),
            groups: vec![
                group("A", 0, ["1", "2", "3", "4"]),
                group("B", 1, ["5", "6", "7", "8"]),
                group("C", 2, ["9", "10", "11", "12"]),
                group("D", 3, ["13", "14", "15", "16"]),
            ],
        }
    }

    #[test]
    fn valid_puzzle_passes() {
        assert_eq!(numbered_puzzle().validate(), Ok(()));
    }

    #[test]
    fn wrong_group_count_rejected() {
        let mut p = numbered_puzzle();
        p.groups.pop();
        assert!(matches!(p.validate(), Err(PuzzleError::GroupCount { found: 3, .. })));
    }

    #[test]
    fn short_group_rejected() {
        let mut p = numbered_puzzle();
        p.groups[2].items.pop();
        assert!(matches!(p.validate(), Err(PuzzleError::ItemCount { found: 3, .. })));
    }

    #[test]
    fn duplicate_across_groups_rejected() {
        let mut p = numbered_puzzle();
        p.groups[3].items[0] = "1".to_string();
        assert_eq!(
            p.validate(),
            Err(PuzzleError::DuplicateItem { item: "1".to_string() })
        );
    }

    #[test]
    fn blank_label_rejected() {
        let mut p = numbered_puzzle();
        p.groups[1].items[2] = "  ".to_string();
        assert!(matches!(p.validate(), Err(PuzzleError::EmptyItem { .. })));
    }

    #[test]
    fn lookup_maps_items_to_group_index() {
        let p = numbered_puzzle();
        let lookup = build_lookup(&p);
        assert_eq!(lookup.len(), 16);
        assert_eq!(lookup["1"], 0);
        assert_eq!(lookup["8"], 1);
        assert_eq!(lookup["9"], 2);
        assert_eq!(lookup["16"], 3);
    }

    #[test]
    fn flatten_keeps_group_order() {
        let items = flatten_items(&numbered_puzzle());
        let expected: Vec<String> = (1..=16).map(|n| n.to_string()).collect();
        assert_eq!(items, expected);
    }

    #[test]
    fn tier_clamps_out_of_range() {
        assert_eq!(Difficulty(0).tier(), Tier::Easy);
        assert_eq!(Difficulty(2).tier(), Tier::Hard);
        assert_eq!(Difficulty(3).tier(), Tier::Expert);
        assert_eq!(Difficulty(9).tier(), Tier::Expert);
    }
}
