/// View model: everything the front end draws, derived from a session.
///
/// Pure and rebuilt after every mutation. The renderer never reads
/// `Session` directly, so any front end only has to consume this.

use crate::domain::puzzle::{Group, Tier};
use crate::domain::rules::GROUP_SIZE;
use super::session::{Phase, Session};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileView {
    pub label: String,
    pub selected: bool,
    pub locked: bool,
    /// Tint of the owning group, shown once the tile is locked.
    pub tier: Option<Tier>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupCard {
    pub name: String,
    pub tier: Tier,
    pub items: Vec<String>,
}

impl GroupCard {
    fn from_group(g: &Group) -> Self {
        GroupCard {
            name: g.name.clone(),
            tier: g.difficulty.tier(),
            items: g.items.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Controls {
    pub submit: bool,
    pub shuffle: bool,
    pub deselect: bool,
    pub new_game: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewModel {
    pub title_label: String,
    /// Locked tiles of found groups (solve order), then remaining tiles.
    pub tiles: Vec<TileView>,
    pub solved_groups: Vec<GroupCard>,
    /// Full answer sorted by difficulty, present once the game is over.
    pub solution: Option<Vec<GroupCard>>,
    pub mistakes: u32,
    pub max_mistakes: u32,
    pub mistakes_label: String,
    pub message: String,
    pub controls: Controls,
    pub submit_label: String,
    pub phase: Phase,
}

impl ViewModel {
    pub fn from_session(s: &Session) -> Self {
        let groups = &s.puzzle.groups;

        let mut tiles: Vec<TileView> = s
            .found_order
            .iter()
            .flat_map(move |&gi| {
                let tier = groups[gi].difficulty.tier();
                groups[gi].items.iter().map(move |it| TileView {
                    label: it.clone(),
                    selected: false,
                    locked: true,
                    tier: Some(tier),
                })
            })
            .collect();
        tiles.extend(s.remaining().map(|it| TileView {
            label: it.clone(),
            selected: s.selected.contains(it),
            locked: false,
            tier: None,
        }));

        let solved_groups = s
            .found_order
            .iter()
            .map(|&gi| GroupCard::from_group(&groups[gi]))
            .collect();

        let solution = s.is_over().then(|| {
            let mut sorted: Vec<&Group> = groups.iter().collect();
            sorted.sort_by_key(|g| g.difficulty);
            sorted.into_iter().map(GroupCard::from_group).collect()
        });

        let n = s.selected.len();
        let over = s.is_over();

        ViewModel {
            title_label: format!("{} (randomized)", s.puzzle.title),
            tiles,
            solved_groups,
            solution,
            mistakes: s.mistakes,
            max_mistakes: s.max_mistakes,
            mistakes_label: format!("Mistakes: {} / {}", s.mistakes, s.max_mistakes),
            message: s.message.clone(),
            controls: Controls {
                submit: n == GROUP_SIZE && !over,
                shuffle: !over,
                deselect: !over,
                new_game: true,
            },
            submit_label: format!("Submit ({n}/{GROUP_SIZE})"),
            phase: s.phase,
        }
    }

    /// Tiles the player can still interact with, in display order.
    pub fn open_tiles(&self) -> impl Iterator<Item = &TileView> {
        self.tiles.iter().filter(|t| !t.locked)
    }
}
