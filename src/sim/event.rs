/// Events emitted by session operations.
/// The front end consumes these for logging.

#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(dead_code)]
pub enum GameEvent {
    TileSelected { item: String },
    TileDeselected { item: String },
    SelectionFull { item: String },
    SelectionCleared,
    GroupSolved { group: usize },
    Mistake { best: usize, closest: Option<usize>, mistakes: u32 },
    Shuffled,
    GameWon,
    GameLost,
}
