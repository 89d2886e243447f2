/// Puzzle catalog with file support.
///
/// ## Sources (priority order):
///   1. Puzzle file named in config (`puzzles.toml` by default)
///   2. Built-in embedded puzzles
///
/// ## Puzzle file format (TOML):
///   ```toml
///   [[puzzle]]
///   title = "Pond Life"
///
///   [[puzzle.group]]
///   name = "Ducks"
///   difficulty = 0
///   items = ["Mallard", "Teal", "Wigeon", "Pintail"]
///   ```
///
/// Every puzzle needs four groups of four items, labels unique within
/// the puzzle. Puzzles that break this are skipped with a warning.

use std::path::{Path, PathBuf};

use rand::Rng;
use serde::Deserialize;
use thiserror::Error;

use crate::config::{candidate_dirs, GameConfig};
use crate::domain::puzzle::Puzzle;

const EMBEDDED_PUZZLES: &str = include_str!("../../puzzles/builtin.toml");

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("No puzzles configured.")]
    NoPuzzles,
}

/// Entries stay raw so one malformed puzzle does not sink the file.
#[derive(Deserialize, Debug, Default)]
struct PuzzleFile {
    #[serde(rename = "puzzle", default)]
    puzzles: Vec<toml::Value>,
}

/// The canonical, read-only puzzle list.
#[derive(Clone, Debug, Default)]
pub struct PuzzleCatalog {
    puzzles: Vec<Puzzle>,
    /// Where the puzzles came from, for display.
    pub source: String,
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

impl PuzzleCatalog {
    /// Load from the configured puzzle file, falling back to built-ins.
    pub fn load(config: &GameConfig) -> Self {
        if let Some(path) = find_puzzle_file(&config.puzzles_file) {
            match std::fs::read_to_string(&path) {
                Ok(text) => {
                    let catalog = Self::from_toml(&text, &path.display().to_string());
                    if !catalog.is_empty() {
                        return catalog;
                    }
                    log::warn!("{}: no playable puzzles, using built-in set", path.display());
                }
                Err(e) => log::warn!("could not read {}: {e}", path.display()),
            }
        }
        Self::embedded()
    }

    pub fn embedded() -> Self {
        Self::from_toml(EMBEDDED_PUZZLES, "built-in")
    }

    /// Parse a puzzle file. Malformed or invalid puzzles are dropped one
    /// by one, a file-level parse error yields an empty catalog.
    pub fn from_toml(text: &str, source: &str) -> Self {
        let file = match toml::from_str::<PuzzleFile>(text) {
            Ok(f) => f,
            Err(e) => {
                log::warn!("{source}: puzzle file parse error: {e}");
                PuzzleFile::default()
            }
        };
        let puzzles = file
            .puzzles
            .into_iter()
            .enumerate()
            .filter_map(|(i, entry)| {
                let title = entry
                    .get("title")
                    .and_then(toml::Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("#{}", i + 1));
                match entry.try_into::<Puzzle>() {
                    Ok(p) => Some(p),
                    Err(e) => {
                        log::warn!("{source}: skipping \"{title}\": {e}");
                        None
                    }
                }
            })
            .collect();
        Self::from_puzzles(puzzles, source)
    }

    pub fn from_puzzles(puzzles: Vec<Puzzle>, source: &str) -> Self {
        let puzzles = puzzles
            .into_iter()
            .filter(|p| match p.validate() {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("{source}: skipping \"{}\": {e}", p.title);
                    false
                }
            })
            .collect();
        PuzzleCatalog { puzzles, source: source.to_string() }
    }

    pub fn len(&self) -> usize {
        self.puzzles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.puzzles.is_empty()
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.puzzles.iter().map(|p| p.title.as_str())
    }

    /// Pick one puzzle uniformly at random. The caller gets its own copy.
    pub fn pick_puzzle<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Puzzle, CatalogError> {
        if self.puzzles.is_empty() {
            return Err(CatalogError::NoPuzzles);
        }
        let idx = rng.random_range(0..self.puzzles.len());
        Ok(self.puzzles[idx].clone())
    }
}

// ══════════════════════════════════════════════════════════════
// File lookup
// ══════════════════════════════════════════════════════════════

fn find_puzzle_file(name: &Path) -> Option<PathBuf> {
    if name.is_absolute() {
        return name.is_file().then(|| name.to_path_buf());
    }
    candidate_dirs()
        .iter()
        .map(|d| d.join(name))
        .find(|p| p.is_file())
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::puzzle::tests::numbered_puzzle;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const ONE_PUZZLE: &str = r#"
[[puzzle]]
title = "Tiny"

[[puzzle.group]]
name = "Vowels"
difficulty = 0
items = ["A", "E", "I", "O"]

[[puzzle.group]]
name = "Greek"
difficulty = 1
items = ["Alpha", "Beta", "Gamma", "Delta"]

[[puzzle.group]]
name = "Planets"
difficulty = 2
items = ["Mars", "Venus", "Earth", "Saturn"]

[[puzzle.group]]
name = "Metals"
difficulty = 3
items = ["Iron", "Tin", "Lead", "Zinc"]
"#;

    #[test]
    fn embedded_set_is_valid_and_nonempty() {
        let cat = PuzzleCatalog::embedded();
        assert!(!cat.is_empty());
        for p in &cat.puzzles {
            assert_eq!(p.validate(), Ok(()), "{}", p.title);
        }
    }

    #[test]
    fn parses_toml_file() {
        let cat = PuzzleCatalog::from_toml(ONE_PUZZLE, "test");
        assert_eq!(cat.len(), 1);
        assert_eq!(cat.titles().collect::<Vec<_>>(), vec!["Tiny"]);
        let p = &cat.puzzles[0];
        assert_eq!(p.groups[3].name, "Metals");
        assert_eq!(p.groups[3].difficulty.0, 3);
        assert_eq!(p.groups[1].items[2], "Gamma");
    }

    #[test]
    fn garbage_yields_empty_catalog() {
        let cat = PuzzleCatalog::from_toml("[[puzzle]\ntitle =", "bad");
        assert!(cat.is_empty());
    }

    #[test]
    fn bad_field_skips_only_its_puzzle() {
        let out_of_range = ONE_PUZZLE
            .replace("title = \"Tiny\"", "title = \"Overflow\"")
            .replace("difficulty = 3", "difficulty = 300");
        let negative = ONE_PUZZLE
            .replace("title = \"Tiny\"", "title = \"Negative\"")
            .replace("difficulty = 1", "difficulty = -1");
        let text = format!("{out_of_range}\n{ONE_PUZZLE}\n{negative}");
        let cat = PuzzleCatalog::from_toml(&text, "test");
        assert_eq!(cat.titles().collect::<Vec<_>>(), vec!["Tiny"]);
    }

    #[test]
    fn invalid_puzzles_are_skipped() {
        let mut broken = numbered_puzzle();
        broken.title = "Broken".into();
        broken.groups[0].items.push("extra".into());
        let cat = PuzzleCatalog::from_puzzles(vec![broken, numbered_puzzle()], "test");
        assert_eq!(cat.titles().collect::<Vec<_>>(), vec!["Numbers"]);
    }

    #[test]
    fn empty_catalog_fails_to_pick() {
        let cat = PuzzleCatalog::from_puzzles(vec![], "empty");
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(cat.pick_puzzle(&mut rng), Err(CatalogError::NoPuzzles));
    }

    #[test]
    fn picked_puzzle_is_independent() {
        let cat = PuzzleCatalog::from_puzzles(vec![numbered_puzzle()], "test");
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut copy = cat.pick_puzzle(&mut rng).unwrap();
        copy.groups[0].items[0] = "mutated".into();
        copy.groups.clear();
        assert_eq!(cat.puzzles[0], numbered_puzzle());
    }

    #[test]
    fn pick_reaches_every_puzzle() {
        let mut second = numbered_puzzle();
        second.title = "Second".into();
        let cat = PuzzleCatalog::from_puzzles(vec![numbered_puzzle(), second], "test");
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let titles: std::collections::HashSet<String> = (0..64)
            .map(|_| cat.pick_puzzle(&mut rng).unwrap().title)
            .collect();
        assert_eq!(titles.len(), 2);
    }
}
