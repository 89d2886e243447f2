/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::rules::{DEFAULT_MAX_MISTAKES, MAX_MISTAKES_LIMIT};

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub max_mistakes: u32,
    pub puzzles_file: PathBuf,
    /// Fixed seed for reproducible games; fresh entropy when unset.
    pub seed: Option<u64>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    rules: TomlRules,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlRules {
    #[serde(default = "default_max_mistakes")]
    max_mistakes: u32,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_puzzles_file")]
    puzzles_file: String,
    #[serde(default)]
    seed: Option<u64>,
}

// ── Defaults ──

fn default_max_mistakes() -> u32 { DEFAULT_MAX_MISTAKES }
fn default_puzzles_file() -> String { "puzzles.toml".into() }

impl Default for TomlRules {
    fn default() -> Self {
        TomlRules {
            max_mistakes: default_max_mistakes(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            puzzles_file: default_puzzles_file(),
            seed: None,
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        match find_config(&candidate_dirs()) {
            Some((path, text)) => Self::from_toml_str(&text, &path.display().to_string()),
            None => Self::from_toml_str("", "defaults"),
        }
    }

    /// Parse config text. Parse errors fall back to defaults.
    pub fn from_toml_str(text: &str, origin: &str) -> Self {
        Self::from_toml_config(parse_toml(text, origin))
    }

    fn from_toml_config(cfg: TomlConfig) -> Self {
        let asked = cfg.rules.max_mistakes;
        let max_mistakes = asked.clamp(1, MAX_MISTAKES_LIMIT);
        if max_mistakes != asked {
            log::warn!("max_mistakes = {asked} is out of range, using {max_mistakes}");
        }
        GameConfig {
            max_mistakes,
            puzzles_file: PathBuf::from(cfg.general.puzzles_file),
            seed: cfg.general.seed,
        }
    }
}

/// Candidate directories to search: exe dir + CWD + data paths (deduplicated).
pub fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/duckconnections)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/duckconnections");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory
    let sys = PathBuf::from("/usr/share/duckconnections");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories and read the first one found.
fn find_config(search_dirs: &[PathBuf]) -> Option<(PathBuf, String)> {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => return Some((path, text)),
                Err(e) => log::warn!("could not read {}: {e}", path.display()),
            }
        }
    }
    None
}

fn parse_toml(text: &str, origin: &str) -> TomlConfig {
    match toml::from_str::<TomlConfig>(text) {
        Ok(cfg) => cfg,
        Err(e) => {
            log::warn!("{origin} parse error: {e}; using default settings");
            TomlConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = GameConfig::from_toml_str("", "test");
        assert_eq!(cfg.max_mistakes, 4);
        assert_eq!(cfg.puzzles_file, PathBuf::from("puzzles.toml"));
        assert_eq!(cfg.seed, None);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let cfg = GameConfig::from_toml_str("[general]\nseed = 1234\n", "test");
        assert_eq!(cfg.seed, Some(1234));
        assert_eq!(cfg.max_mistakes, 4);
    }

    #[test]
    fn overrides_are_read() {
        let cfg = GameConfig::from_toml_str(
            "[rules]\nmax_mistakes = 6\n\n[general]\npuzzles_file = \"/tmp/p.toml\"\n",
            "test",
        );
        assert_eq!(cfg.max_mistakes, 6);
        assert_eq!(cfg.puzzles_file, PathBuf::from("/tmp/p.toml"));
    }

    #[test]
    fn zero_budget_clamped() {
        assert_eq!(GameConfig::from_toml_str("[rules]\nmax_mistakes = 0\n", "test").max_mistakes, 1);
    }

    #[test]
    fn huge_budget_clamped() {
        let cfg = GameConfig::from_toml_str("[rules]\nmax_mistakes = 4000000000\n", "test");
        assert_eq!(cfg.max_mistakes, MAX_MISTAKES_LIMIT);
        let cfg = GameConfig::from_toml_str("[rules]\nmax_mistakes = 11\n", "test");
        assert_eq!(cfg.max_mistakes, 10);
        let cfg = GameConfig::from_toml_str("[rules]\nmax_mistakes = 10\n", "test");
        assert_eq!(cfg.max_mistakes, 10);
    }

    #[test]
    fn parse_error_falls_back() {
        let cfg = GameConfig::from_toml_str("[rules\nmax_mistakes = ", "test");
        assert_eq!(cfg.max_mistakes, 4);
    }
}
