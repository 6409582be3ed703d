use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

use crate::{
    Direction, Position,
    bag::{Bag, element_hash},
    entity::{Character, CharacterKind, Item, Stairs, Trap},
    map::{Level, Room, Terrain},
    search::{GoalDistance, Heuristic},
};

/// Contract violations raised while resolving an action. These abort the
/// search run instead of being pruned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// Every cell of the landing table around `position` is blocked. The
    /// game's fallback (flinging the character further) is not modelled.
    #[error("no landing spot for a character dropped near {position}")]
    NoLandingSpot { position: Position },
    #[error("the protagonist is not on the board")]
    MissingProtagonist,
}

/// Win condition of a level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Goal {
    /// The protagonist stands on the stairs.
    ReachStairs,
    /// The characters (kind and position) match this set exactly.
    Formation(Bag<(CharacterKind, Position)>),
}

/// The visible occupant of a cell, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopObject<'a> {
    Character(&'a Character),
    Item(&'a Item),
    Stairs(&'a Stairs),
}

/// Offsets tried, in order, when an item falls near a cell: the cell itself,
/// then a square spiral out to distance two.
pub const ITEM_DROP_SEQUENCE: [(i32, i32); 25] = [
    (0, 0),
    (1, 0),
    (-1, 0),
    (0, -1),
    (1, -1),
    (-1, -1),
    (0, 1),
    (1, 1),
    (-1, 1),
    (2, 0),
    (-2, 0),
    (2, -1),
    (-2, -1),
    (2, 1),
    (-2, 1),
    (0, -2),
    (1, -2),
    (-1, -2),
    (2, -2),
    (-2, -2),
    (0, 2),
    (1, 2),
    (-1, 2),
    (2, 2),
    (-2, 2),
];

/// Landing offsets for a character that falls near a cell while facing
/// `facing`: the cell itself, then the first ring clockwise starting a quarter
/// turn right of the facing, then the second ring in the same order.
pub fn character_drop_offsets(facing: Direction) -> [(i32, i32); 17] {
    let mut offsets = [(0, 0); 17];
    for step in 0..8 {
        let (dx, dy) = Direction::ALL[(facing as usize + 2 + step) % 8].delta();
        offsets[1 + step] = (dx, dy);
        offsets[9 + step] = (2 * dx, 2 * dy);
    }
    offsets
}

/// One complete snapshot of puzzle state.
///
/// The terrain lives in the shared [`Level`]; everything else is owned and
/// cloned with the board. Equality and hashing ignore the level and compare
/// the entity collections as multisets.
#[derive(Clone)]
pub struct Board {
    level: Arc<Level>,
    pub inventory: Bag<Item>,
    pub floor_items: Bag<Item>,
    pub characters: Bag<Character>,
    pub stairs: Stairs,
    pub traps: Bag<Trap>,
}

impl Board {
    /// An empty board on `level` with the stairs at `stairs`.
    pub fn new(level: Arc<Level>, stairs: Position) -> Self {
        Board {
            level,
            inventory: Bag::new(),
            floor_items: Bag::new(),
            characters: Bag::new(),
            stairs: Stairs { position: stairs },
            traps: Bag::new(),
        }
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn rooms(&self) -> &[Room] {
        &self.level.rooms
    }

    #[inline]
    pub fn terrain_at(&self, position: Position) -> Terrain {
        self.level.terrain_at(position)
    }

    #[inline]
    pub fn is_wall(&self, position: Position) -> bool {
        self.terrain_at(position).is_wall()
    }

    pub fn protagonist(&self) -> Option<&Character> {
        self.characters.find_by(|c| c.is_protagonist())
    }

    pub fn protagonist_mut(&mut self) -> Option<&mut Character> {
        self.characters.find_by_mut(|c| c.is_protagonist())
    }

    /// The protagonist, or a contract violation when it is missing.
    pub fn require_protagonist(&self) -> Result<&Character, RuleError> {
        self.protagonist().ok_or(RuleError::MissingProtagonist)
    }

    pub fn character_at(&self, position: Position) -> Option<&Character> {
        self.characters.find_by(|c| c.position == position)
    }

    pub fn character_at_mut(&mut self, position: Position) -> Option<&mut Character> {
        self.characters.find_by_mut(|c| c.position == position)
    }

    /// The item lying on the floor at `position`.
    pub fn item_at(&self, position: Position) -> Option<&Item> {
        self.floor_items
            .find_by(|item| item.position == Some(position))
    }

    pub fn trap_at(&self, position: Position) -> Option<&Trap> {
        self.traps.find_by(|trap| trap.position == position)
    }

    #[inline]
    pub fn stairs_at(&self, position: Position) -> bool {
        self.stairs.position == position
    }

    /// What a viewer would see on top of a cell: character, else item, else stairs.
    pub fn top_object_at(&self, position: Position) -> Option<TopObject<'_>> {
        if let Some(character) = self.character_at(position) {
            return Some(TopObject::Character(character));
        }
        if let Some(item) = self.item_at(position) {
            return Some(TopObject::Item(item));
        }
        if self.stairs_at(position) {
            return Some(TopObject::Stairs(&self.stairs));
        }
        None
    }

    /// An item can be put down where there is no wall and no other item.
    pub fn can_drop_at(&self, position: Position) -> bool {
        !self.is_wall(position) && self.item_at(position).is_none()
    }

    /// Where an item falling at `position` comes to rest, or `None` when the
    /// whole drop sequence is blocked and the item is lost.
    pub fn item_drop_destination(&self, position: Position) -> Option<Position> {
        ITEM_DROP_SEQUENCE
            .iter()
            .map(|&offset| position + offset)
            .find(|&candidate| {
                self.level.in_bounds(candidate)
                    && !self.is_wall(candidate)
                    && self.item_at(candidate).is_none()
                    && self.trap_at(candidate).is_none()
            })
    }

    /// Where a character falling at `position` lands. The falling character
    /// must already be off the board.
    ///
    /// Fails with [`RuleError::NoLandingSpot`] when the two-ring table is
    /// exhausted.
    pub fn character_drop_destination(
        &self,
        position: Position,
        facing: Direction,
    ) -> Result<Position, RuleError> {
        character_drop_offsets(facing)
            .iter()
            .map(|&offset| position + offset)
            .find(|&candidate| {
                self.level.in_bounds(candidate)
                    && !self.terrain_at(candidate).blocks_walking()
                    && self.character_at(candidate).is_none()
            })
            .ok_or(RuleError::NoLandingSpot { position })
    }

    /// Removes `item` from wherever it is, the inventory when it is held and
    /// the floor otherwise. Returns the removed value.
    pub fn remove_item(&mut self, item: &Item) -> Option<Item> {
        if item.position.is_none() {
            self.inventory.take_by(|held| held == item)
        } else {
            self.floor_items.take_by(|lying| lying == item)
        }
    }

    /// Puts `item` down near `position` following the drop sequence. Returns
    /// the resting cell, or `None` if the item was lost.
    pub fn drop_item_near(&mut self, item: Item, position: Position) -> Option<Position> {
        let destination = self.item_drop_destination(position);
        match destination {
            Some(cell) => {
                self.floor_items.insert(item.at(cell));
            }
            None => {
                tracing::trace!("{} has nowhere to fall near {} and is lost", item, position);
            }
        }
        destination
    }

    /// Removes every dead character except the protagonist, who stays so the
    /// state can be recognised as lost.
    pub fn bury_dead(&mut self) {
        self.characters
            .retain(|c| c.is_protagonist() || !c.is_dead());
    }

    pub fn solved(&self) -> bool {
        match &self.level.goal {
            Goal::ReachStairs => self
                .protagonist()
                .is_some_and(|p| p.position == self.stairs.position),
            Goal::Formation(target) => {
                let current: Bag<(CharacterKind, Position)> = self
                    .characters
                    .iter()
                    .map(|c| (c.kind, c.position))
                    .collect();
                current == *target
            }
        }
    }

    /// Conservative dead-end test: the protagonist is gone or dead.
    pub fn unsolvable(&self) -> bool {
        self.protagonist().is_none_or(|p| p.is_dead())
    }

    /// Default search priority, lower is more promising.
    pub fn score(&self) -> i32 {
        GoalDistance::default().score(self)
    }

    /// Order-independent digest of every component.
    pub fn fingerprint(&self) -> u64 {
        self.inventory.fingerprint()
            ^ self.floor_items.fingerprint()
            ^ self.characters.fingerprint()
            ^ element_hash(&self.stairs)
            ^ self.traps.fingerprint()
    }
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.fingerprint() == other.fingerprint()
            && self.stairs == other.stairs
            && self.inventory == other.inventory
            && self.floor_items == other.floor_items
            && self.characters == other.characters
            && self.traps == other.traps
    }
}

impl Eq for Board {}

impl Hash for Board {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.fingerprint());
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("inventory", &self.inventory)
            .field("floor_items", &self.floor_items)
            .field("characters", &self.characters)
            .field("stairs", &self.stairs)
            .field("traps", &self.traps)
            .finish_non_exhaustive()
    }
}
