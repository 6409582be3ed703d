//! Behaviour hooks of entities, invoked while an action resolves.
//!
//! Hooks take the entity by value or shared reference (a snapshot) and edit
//! the board through it, finding the live copy again by position. At most
//! one character occupies a cell, so a position identifies a character.

use crate::{
    Direction, Position,
    board::{Board, RuleError},
    entity::{Character, Item, ItemKind, Trap, TrapKind},
    trajectory::{bullet_target, mover_bullet, normal_bullet, throw_path},
};

/// Cells a knocked-back character travels at most.
pub const KNOCKBACK_RANGE: usize = 10;
/// Damage taken by a knocked-back character that slams into something.
pub const COLLISION_DAMAGE: i32 = 5;
/// Reflections one projectile may go through before it drops.
pub const MAX_BOUNCES: u8 = 8;

impl Character {
    /// A thrown or blown item strikes this character, travelling in
    /// `incoming`. `actor` is whoever sent it.
    pub fn hit_by_projectile(
        &self,
        board: &mut Board,
        item: Item,
        incoming: Direction,
        actor: Position,
    ) -> Result<(), RuleError> {
        self.struck(board, item, incoming, actor, 0)
    }

    fn struck(
        &self,
        board: &mut Board,
        item: Item,
        incoming: Direction,
        actor: Position,
        bounces: u8,
    ) -> Result<(), RuleError> {
        if self.kind.is_reflective() {
            let back = incoming.opposite();
            if let Some(reflector) = board.character_at_mut(self.position) {
                reflector.facing = back;
            }
            if bounces >= MAX_BOUNCES {
                board.drop_item_near(item, self.position);
                return Ok(());
            }
            tracing::trace!("{} reflects {} back {}", self.kind.name(), item, back);
            // The reflector becomes the thrower.
            return item.fly(board, self.position, back, self.position, bounces + 1);
        }

        if let Some(target) = board.character_at_mut(self.position) {
            target.mind = target.mind.after_hit();
        }
        item.hit_effect(board, self.position, incoming, actor)
    }

    /// Pushes this character up to [`KNOCKBACK_RANGE`] cells along
    /// `direction`. Returns whether the character was on the board.
    pub fn blown_away(&self, board: &mut Board, direction: Direction) -> Result<bool, RuleError> {
        let mut landing = self.position;
        let mut collided = false;
        for _ in 0..KNOCKBACK_RANGE {
            let ahead = landing.step(direction);
            if board.is_wall(ahead) || board.character_at(ahead).is_some() {
                collided = true;
                break;
            }
            landing = ahead;
        }

        let Some(mut character) = board.characters.take_by(|c| c.position == self.position) else {
            return Ok(false);
        };
        character.position = board.character_drop_destination(landing, character.facing)?;
        character.mind = character.mind.after_hit();
        if collided {
            character.hp -= COLLISION_DAMAGE;
        }
        let destination = character.position;
        tracing::trace!("{} is blown to {}", character.kind.name(), destination);
        board.characters.insert(character);
        board.spring_trap_under(destination);
        board.bury_dead();
        Ok(true)
    }
}

impl Item {
    /// Uses this (held) item as the character at `actor`, aiming where that
    /// character faces.
    pub fn use_by(&self, board: &mut Board, actor: Position) -> Result<(), RuleError> {
        let Some(facing) = board.character_at(actor).map(|c| c.facing) else {
            return Ok(());
        };

        if !self.kind.is_wand() {
            board.inventory.delete(self);
            return Ok(());
        }
        if self.charges == Some(0) {
            tracing::trace!("{} has no charges left", self);
            return Ok(());
        }

        let path = match self.kind {
            ItemKind::SwapWand => normal_bullet(board, actor, facing),
            _ => mover_bullet(board, actor, facing),
        };
        let Some((target, direction)) = bullet_target(board, &path) else {
            tracing::trace!("{} hits nothing", self);
            return Ok(());
        };

        if self.wand_effect(board, target, direction, actor)? {
            if let Some(wand) = board.inventory.find_mut(self) {
                wand.charges = wand.charges.map(|charges| charges.saturating_sub(1));
            }
        }
        Ok(())
    }

    /// Effect of this item striking the character at `target` as a projectile.
    pub fn hit_effect(
        &self,
        board: &mut Board,
        target: Position,
        incoming: Direction,
        actor: Position,
    ) -> Result<(), RuleError> {
        self.wand_effect(board, target, incoming, actor).map(|_| ())
    }

    /// Applies this item's magic to whatever is at `target`. Returns whether
    /// the magic took hold.
    fn wand_effect(
        &self,
        board: &mut Board,
        target: Position,
        direction: Direction,
        actor: Position,
    ) -> Result<bool, RuleError> {
        match self.kind {
            ItemKind::SwapWand => Ok(swap_places(board, actor, target)),
            ItemKind::AttractWand => attract(board, target, direction),
            ItemKind::KnockbackWand => knock_back(board, target, direction, actor),
            ItemKind::Weed => Ok(false),
        }
    }

    /// Throws this item by hand from `origin`. The item must already be off
    /// the board.
    pub fn thrown(self, board: &mut Board, origin: Position, direction: Direction) -> Result<(), RuleError> {
        self.fly(board, origin, direction, origin, 0)
    }

    /// Sends this item flying from `origin` along `direction`, thrown or
    /// blown by `actor`.
    ///
    /// It strikes the first character in its path; otherwise it comes down on
    /// the last cell, falling into a trap there or settling nearby.
    fn fly(
        self,
        board: &mut Board,
        origin: Position,
        direction: Direction,
        actor: Position,
        bounces: u8,
    ) -> Result<(), RuleError> {
        let path = throw_path(board, origin, direction);
        let end = path.last().copied().unwrap_or(origin);
        if path.len() > 1 {
            if let Some(target) = board.character_at(end).cloned() {
                return target.struck(board, self.held(), direction, actor, bounces);
            }
        }
        self.held().land(board, end);
        Ok(())
    }

    /// Comes down on `cell`.
    fn land(self, board: &mut Board, cell: Position) {
        match board.trap_at(cell).copied() {
            Some(trap) => trap.land(board, &self),
            None => {
                board.drop_item_near(self, cell);
            }
        }
    }
}

impl Trap {
    /// An item fell onto this trap. The item is already gone from the board.
    pub fn land(&self, board: &mut Board, item: &Item) {
        match self.kind {
            TrapKind::Pit => {
                tracing::trace!("{} falls into the pit at {}", item, self.position);
                board.traps.delete(self);
            }
        }
    }

    /// The character at `victim` stepped or was forced onto this trap.
    pub fn step(&self, board: &mut Board, victim: Position) {
        match self.kind {
            TrapKind::Pit => {
                if let Some(character) = board.character_at_mut(victim) {
                    tracing::trace!("{} falls into the pit at {}", character.kind.name(), victim);
                    character.hp = 0;
                }
                board.traps.delete(self);
                board.bury_dead();
            }
        }
    }
}

impl Board {
    /// Fires the trap under `position`, if any, on whoever stands there.
    pub fn spring_trap_under(&mut self, position: Position) {
        if let Some(trap) = self.trap_at(position).copied() {
            trap.step(self, position);
        }
    }
}

/// Exchanges the characters at `a` and `b`. Both must be present.
fn swap_places(board: &mut Board, a: Position, b: Position) -> bool {
    if a == b || board.character_at(a).is_none() || board.character_at(b).is_none() {
        return false;
    }
    for character in board.characters.iter_mut() {
        if character.position == a {
            character.position = b;
        } else if character.position == b {
            character.position = a;
        }
    }
    tracing::trace!("characters at {} and {} swap places", a, b);
    board.spring_trap_under(b);
    board.spring_trap_under(a);
    true
}

/// Pulls whatever is at `target` back against the bullet `direction` until
/// the next cell is a wall or a character.
fn attract(board: &mut Board, target: Position, direction: Direction) -> Result<bool, RuleError> {
    let pull = direction.opposite();
    let mut landing = target;
    loop {
        let ahead = landing.step(pull);
        if board.is_wall(ahead) || board.character_at(ahead).is_some() {
            break;
        }
        landing = ahead;
    }
    if landing == target {
        return Ok(false);
    }

    if let Some(mut character) = board.characters.take_by(|c| c.position == target) {
        character.position = board.character_drop_destination(landing, character.facing)?;
        let destination = character.position;
        tracing::trace!("{} is pulled to {}", character.kind.name(), destination);
        board.characters.insert(character);
        board.spring_trap_under(destination);
    } else if let Some(item) = board.floor_items.take_by(|i| i.position == Some(target)) {
        board.drop_item_near(item.held(), landing);
    } else if board.stairs_at(target) {
        board.stairs.position = landing;
    } else {
        return Ok(false);
    }
    Ok(true)
}

/// Knockback magic: characters are pushed away, floor items are blown away,
/// stairs do not budge.
fn knock_back(
    board: &mut Board,
    target: Position,
    direction: Direction,
    actor: Position,
) -> Result<bool, RuleError> {
    if let Some(character) = board.character_at(target).cloned() {
        return character.blown_away(board, direction);
    }
    if let Some(item) = board.floor_items.take_by(|i| i.position == Some(target)) {
        item.fly(board, target, direction, actor, 0)?;
        return Ok(true);
    }
    Ok(false)
}
