//! Value-like records for everything that lives on a board.
//!
//! Behaviour is keyed by the `*Kind` enums; the hooks that act on a board
//! (being hit, being blown away, triggering a trap) are in [`crate::effect`].

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Direction, Position};

/// Error returned when a kind name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {category} '{name}'")]
pub struct UnknownKind {
    pub category: &'static str,
    pub name: String,
}

/// Character species. Determines max hp and reaction to projectiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CharacterKind {
    /// The player character. Exactly one is present on an unsolved board.
    Protagonist,
    /// Reflects thrown items back along their path.
    Ushiwakamaru,
    ThiefGuard,
}

impl CharacterKind {
    pub const ALL: [CharacterKind; 3] = [
        CharacterKind::Protagonist,
        CharacterKind::Ushiwakamaru,
        CharacterKind::ThiefGuard,
    ];

    pub fn max_hp(self) -> i32 {
        match self {
            CharacterKind::Protagonist => 15,
            CharacterKind::Ushiwakamaru => 10,
            CharacterKind::ThiefGuard => 30,
        }
    }

    /// Reflective characters redirect incoming projectiles instead of
    /// suffering their effect.
    pub fn is_reflective(self) -> bool {
        matches!(self, CharacterKind::Ushiwakamaru)
    }

    pub fn name(self) -> &'static str {
        match self {
            CharacterKind::Protagonist => "protagonist",
            CharacterKind::Ushiwakamaru => "ushiwakamaru",
            CharacterKind::ThiefGuard => "thief-guard",
        }
    }

    /// Single-letter map symbol.
    pub fn symbol(self) -> char {
        match self {
            CharacterKind::Protagonist => '@',
            CharacterKind::Ushiwakamaru => 'u',
            CharacterKind::ThiefGuard => 'g',
        }
    }
}

impl FromStr for CharacterKind {
    type Err = UnknownKind;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        CharacterKind::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| UnknownKind {
                category: "character",
                name: name.to_string(),
            })
    }
}

/// Whether a character is able to act.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum MindState {
    #[default]
    Awake,
    ShallowSleep,
    DeepSleep,
    Paralyzed,
}

impl MindState {
    pub const ALL: [MindState; 4] = [
        MindState::Awake,
        MindState::ShallowSleep,
        MindState::DeepSleep,
        MindState::Paralyzed,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MindState::Awake => "awake",
            MindState::ShallowSleep => "shallow-sleep",
            MindState::DeepSleep => "deep-sleep",
            MindState::Paralyzed => "paralyzed",
        }
    }

    /// State after being struck. Sleepers wake; paralysis holds.
    pub fn after_hit(self) -> MindState {
        match self {
            MindState::ShallowSleep | MindState::DeepSleep => MindState::Awake,
            other => other,
        }
    }
}

impl FromStr for MindState {
    type Err = UnknownKind;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        MindState::ALL
            .into_iter()
            .find(|state| state.name() == name)
            .ok_or_else(|| UnknownKind {
                category: "mind state",
                name: name.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Character {
    pub kind: CharacterKind,
    pub position: Position,
    pub facing: Direction,
    pub hp: i32,
    pub mind: MindState,
}

impl Character {
    /// A fresh, awake character at full health.
    pub fn new(kind: CharacterKind, position: Position, facing: Direction) -> Self {
        Character {
            kind,
            position,
            facing,
            hp: kind.max_hp(),
            mind: MindState::Awake,
        }
    }

    #[inline]
    pub fn is_protagonist(&self) -> bool {
        self.kind == CharacterKind::Protagonist
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.hp < 1
    }
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} hp {} at {} facing {}",
            self.kind.name(),
            self.hp,
            self.position,
            self.facing
        )?;
        if self.mind != MindState::Awake {
            write!(f, " ({})", self.mind.name())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// Swaps the places of wielder and target.
    SwapWand,
    /// Pushes the target away along the bullet direction.
    KnockbackWand,
    /// Pulls the target toward the wielder.
    AttractWand,
    Weed,
}

impl ItemKind {
    pub const ALL: [ItemKind; 4] = [
        ItemKind::SwapWand,
        ItemKind::KnockbackWand,
        ItemKind::AttractWand,
        ItemKind::Weed,
    ];

    pub fn is_wand(self) -> bool {
        !matches!(self, ItemKind::Weed)
    }

    pub fn name(self) -> &'static str {
        match self {
            ItemKind::SwapWand => "swap-wand",
            ItemKind::KnockbackWand => "knockback-wand",
            ItemKind::AttractWand => "attract-wand",
            ItemKind::Weed => "weed",
        }
    }

    pub fn symbol(self) -> char {
        match self {
            ItemKind::SwapWand | ItemKind::KnockbackWand | ItemKind::AttractWand => '/',
            ItemKind::Weed => '!',
        }
    }
}

impl FromStr for ItemKind {
    type Err = UnknownKind;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        ItemKind::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| UnknownKind {
                category: "item",
                name: name.to_string(),
            })
    }
}

/// An item either held (`position == None`) or lying on the floor.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Item {
    pub kind: ItemKind,
    /// Remaining uses. `None` for items without a use count.
    pub charges: Option<u32>,
    pub position: Option<Position>,
}

impl Item {
    /// A held item.
    pub fn new(kind: ItemKind, charges: Option<u32>) -> Self {
        Item {
            kind,
            charges,
            position: None,
        }
    }

    pub fn wand(kind: ItemKind, charges: u32) -> Self {
        Item::new(kind, Some(charges))
    }

    /// The same item placed on the floor at `position`.
    pub fn at(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// The same item picked up.
    pub fn held(mut self) -> Self {
        self.position = None;
        self
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.charges {
            Some(charges) => write!(f, "{}[{}]", self.kind.name(), charges),
            None => f.write_str(self.kind.name()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TrapKind {
    /// One-shot: kills whoever steps on it and swallows items that land on it.
    Pit,
}

impl TrapKind {
    pub fn name(self) -> &'static str {
        match self {
            TrapKind::Pit => "pit",
        }
    }

    pub fn symbol(self) -> char {
        match self {
            TrapKind::Pit => '^',
        }
    }
}

impl FromStr for TrapKind {
    type Err = UnknownKind;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "pit" => Ok(TrapKind::Pit),
            _ => Err(UnknownKind {
                category: "trap",
                name: name.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Trap {
    pub kind: TrapKind,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stairs {
    pub position: Position,
}
