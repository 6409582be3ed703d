//! The five things the protagonist can do on a turn.
//!
//! Every action is a pure transition: [`Action::execute`] clones the board,
//! resolves the action on the clone and hands it back. Actions whose
//! preconditions fail are no-ops and return a board equal to the input.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    Direction, Position,
    board::{Board, RuleError},
    entity::Item,
};

/// Represents an action the protagonist can take.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Step to a neighbouring cell, picking up what lies there when `pick_up`.
    Move { direction: Direction, pick_up: bool },
    /// Turn to `direction` and throw `item` by hand.
    Throw { direction: Direction, item: Item },
    /// Turn to `direction` and use a held `item`.
    Use { direction: Direction, item: Item },
    /// Put a held item down underfoot.
    Drop { item: Item },
    /// Pick up the item underfoot.
    Pick,
}

impl Action {
    /// Resolves this action on a copy of `board`.
    pub fn execute(&self, board: &Board) -> Result<Board, RuleError> {
        let mut next = board.clone();
        match self {
            Action::Move { direction, pick_up } => walk(&mut next, *direction, *pick_up)?,
            Action::Throw { direction, item } => throw(&mut next, *direction, item)?,
            Action::Use { direction, item } => use_item(&mut next, *direction, item)?,
            Action::Drop { item } => drop_item(&mut next, item)?,
            Action::Pick => pick_up(&mut next)?,
        }
        Ok(next)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Move {
                direction,
                pick_up: true,
            } => write!(f, "move {}", direction),
            Action::Move {
                direction,
                pick_up: false,
            } => write!(f, "move {} without picking up", direction),
            Action::Throw { direction, item } => write!(f, "throw {} {}", item, direction),
            Action::Use { direction, item } => write!(f, "use {} {}", item, direction),
            Action::Drop { item } => write!(f, "drop {}", item),
            Action::Pick => f.write_str("pick up"),
        }
    }
}

/// Whether the protagonist may step from where it stands in `direction`.
///
/// The target must be inside the floor, walkable and free of characters. A
/// diagonal step is also refused when either corner cell is a wall.
pub fn can_walk(board: &Board, direction: Direction) -> Result<bool, RuleError> {
    let from = board.require_protagonist()?.position;
    let to = from.step(direction);
    if !board.level().in_bounds(to)
        || board.terrain_at(to).blocks_walking()
        || board.character_at(to).is_some()
    {
        return Ok(false);
    }
    if direction.is_diagonal() {
        let (dx, dy) = direction.delta();
        if board.is_wall(from + (dx, 0)) || board.is_wall(from + (0, dy)) {
            return Ok(false);
        }
    }
    Ok(true)
}

fn walk(board: &mut Board, direction: Direction, pick: bool) -> Result<(), RuleError> {
    if !can_walk(board, direction)? {
        return Ok(());
    }
    let Some(protagonist) = board.protagonist_mut() else {
        return Err(RuleError::MissingProtagonist);
    };
    let destination = protagonist.position.step(direction);
    protagonist.position = destination;
    protagonist.facing = direction;

    board.spring_trap_under(destination);
    if pick && !board.unsolvable() {
        pick_up(board)?;
    }
    Ok(())
}

fn face(board: &mut Board, direction: Direction) -> Result<Position, RuleError> {
    let protagonist = board
        .protagonist_mut()
        .ok_or(RuleError::MissingProtagonist)?;
    protagonist.facing = direction;
    Ok(protagonist.position)
}

fn throw(board: &mut Board, direction: Direction, item: &Item) -> Result<(), RuleError> {
    let origin = face(board, direction)?;
    let Some(thrown) = board.remove_item(item) else {
        return Ok(());
    };
    tracing::trace!("throwing {} {} from {}", thrown, direction, origin);
    thrown.held().thrown(board, origin, direction)
}

fn use_item(board: &mut Board, direction: Direction, item: &Item) -> Result<(), RuleError> {
    let actor = face(board, direction)?;
    if !board.inventory.contains(item) {
        return Ok(());
    }
    item.use_by(board, actor)
}

fn drop_item(board: &mut Board, item: &Item) -> Result<(), RuleError> {
    let here = board.require_protagonist()?.position;
    if !board.can_drop_at(here) {
        return Ok(());
    }
    if let Some(dropped) = board.inventory.take_by(|held| held == item) {
        board.floor_items.insert(dropped.at(here));
    }
    Ok(())
}

fn pick_up(board: &mut Board) -> Result<(), RuleError> {
    let here = board.require_protagonist()?.position;
    if let Some(item) = board.floor_items.take_by(|lying| lying.position == Some(here)) {
        board.inventory.insert(item.held());
    }
    Ok(())
}

/// Applies `actions` one after another, starting from `board`.
pub fn replay<'a>(
    board: &Board,
    actions: impl IntoIterator<Item = &'a Action>,
) -> Result<Board, RuleError> {
    actions
        .into_iter()
        .try_fold(board.clone(), |current, action| action.execute(&current))
}

/// Every action worth trying on `board`.
///
/// Moves are listed only when legal, and the variant that leaves an item on
/// the floor only when there is one at the destination. Throw and use are
/// listed once per distinct held item and direction. Drop is listed when the
/// cell underfoot takes an item, pick when an item lies there.
pub fn legal_actions(board: &Board) -> Result<Vec<Action>, RuleError> {
    let here = board.require_protagonist()?.position;
    let mut actions = Vec::new();

    for direction in Direction::ALL {
        if can_walk(board, direction)? {
            actions.push(Action::Move {
                direction,
                pick_up: true,
            });
            if board.item_at(here.step(direction)).is_some() {
                actions.push(Action::Move {
                    direction,
                    pick_up: false,
                });
            }
        }
    }

    let mut held: Vec<&Item> = Vec::new();
    for item in &board.inventory {
        if !held.contains(&item) {
            held.push(item);
        }
    }
    for item in &held {
        for direction in Direction::ALL {
            actions.push(Action::Throw {
                direction,
                item: (*item).clone(),
            });
            actions.push(Action::Use {
                direction,
                item: (*item).clone(),
            });
        }
    }

    if board.can_drop_at(here) {
        actions.extend(held.iter().map(|item| Action::Drop {
            item: (*item).clone(),
        }));
    }
    if board.item_at(here).is_some() {
        actions.push(Action::Pick);
    }
    Ok(actions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        demo,
        entity::{CharacterKind, ItemKind},
        layout::parse_layout,
    };

    fn hero(board: &Board) -> Position {
        board.protagonist().unwrap().position
    }

    mod moves {
        use super::*;

        #[test]
        fn moving_into_a_wall_changes_nothing() {
            let board = demo::demo_board();
            let next = Action::Move {
                direction: Direction::South,
                pick_up: true,
            }
            .execute(&board)
            .unwrap();
            assert_eq!(next, board);
        }

        #[test]
        fn moving_onto_water_or_a_character_is_refused() {
            let board = demo::demo_board();
            assert!(!can_walk(&board, Direction::North).unwrap());

            let mut board = board;
            board.protagonist_mut().unwrap().position = Position::new(1, 4);
            assert!(!can_walk(&board, Direction::North).unwrap());
        }

        #[test]
        fn move_updates_position_and_facing() {
            let board = demo::demo_board();
            let next = Action::Move {
                direction: Direction::West,
                pick_up: true,
            }
            .execute(&board)
            .unwrap();
            let protagonist = next.protagonist().unwrap();
            assert_eq!(protagonist.position, Position::new(1, 5));
            assert_eq!(protagonist.facing, Direction::West);
            // The input board is untouched.
            assert_eq!(hero(&board), Position::new(2, 5));
        }

        #[test]
        fn diagonal_moves_cannot_cut_wall_corners() {
            let board = parse_layout(
                "
                WL WL WL WL
                WL WL FL WL
                WL PC FL WL
                WL SS FL WL
                WL WL WL WL
            ",
            )
            .unwrap();
            // (1, 1) is wall, so north-east from (1, 2) cuts a corner.
            assert!(!can_walk(&board, Direction::NorthEast).unwrap());
            assert!(can_walk(&board, Direction::SouthEast).unwrap());
        }

        #[test]
        fn diagonal_moves_may_pass_water() {
            let board = demo::demo_board();
            // Corners of the north-west step are (1, 5) floor and (2, 4) water.
            assert!(can_walk(&board, Direction::NorthWest).unwrap());
        }

        #[test]
        fn pick_up_flag_controls_collection() {
            let mut board = demo::demo_board();
            let weed = Item::new(ItemKind::Weed, None);
            board.floor_items.insert(weed.clone().at(Position::new(1, 5)));

            let kept = Action::Move {
                direction: Direction::West,
                pick_up: false,
            }
            .execute(&board)
            .unwrap();
            assert!(kept.item_at(Position::new(1, 5)).is_some());

            let taken = Action::Move {
                direction: Direction::West,
                pick_up: true,
            }
            .execute(&board)
            .unwrap();
            assert!(taken.floor_items.is_empty());
            assert!(taken.inventory.contains(&weed));
        }

        #[test]
        fn walking_onto_a_pit_is_fatal() {
            let board = parse_layout(
                "
                WL WL WL WL WL
                WL PC PT SS WL
                WL WL WL WL WL
            ",
            )
            .unwrap();
            let next = Action::Move {
                direction: Direction::East,
                pick_up: true,
            }
            .execute(&board)
            .unwrap();
            assert!(next.unsolvable());
            assert!(next.traps.is_empty());
        }
    }

    mod items {
        use super::*;

        #[test]
        fn drop_onto_an_occupied_cell_is_a_no_op() {
            let mut board = demo::demo_board();
            board
                .floor_items
                .insert(Item::new(ItemKind::Weed, None).at(Position::new(2, 5)));
            assert!(!board.can_drop_at(Position::new(2, 5)));

            let next = Action::Drop {
                item: Item::wand(ItemKind::SwapWand, 2),
            }
            .execute(&board)
            .unwrap();
            assert_eq!(next, board);
        }

        #[test]
        fn drop_then_pick_restores_the_board() {
            let board = demo::demo_board();
            let wand = Item::wand(ItemKind::AttractWand, 1);
            let dropped = Action::Drop { item: wand.clone() }.execute(&board).unwrap();
            assert_eq!(dropped.item_at(Position::new(2, 5)), Some(&wand.clone().at(Position::new(2, 5))));
            assert!(!dropped.inventory.contains(&wand));

            let picked = Action::Pick.execute(&dropped).unwrap();
            assert_eq!(picked, board);
        }

        #[test]
        fn pick_with_nothing_underfoot_is_a_no_op() {
            let board = demo::demo_board();
            assert_eq!(Action::Pick.execute(&board).unwrap(), board);
        }

        #[test]
        fn using_an_item_not_held_only_turns() {
            let board = demo::demo_board();
            let next = Action::Use {
                direction: Direction::NorthWest,
                item: Item::new(ItemKind::Weed, None),
            }
            .execute(&board)
            .unwrap();
            assert_eq!(next.protagonist().unwrap().facing, Direction::NorthWest);
            assert_eq!(next.characters.len(), 2);
            assert_eq!(next.inventory, board.inventory);
        }

        #[test]
        fn throw_removes_the_item_before_it_flies() {
            let board = demo::demo_board();
            let wand = Item::wand(ItemKind::KnockbackWand, 1);
            let next = Action::Throw {
                direction: Direction::East,
                item: wand.clone(),
            }
            .execute(&board)
            .unwrap();
            assert!(!next.inventory.contains(&wand));
            // It falls at the end of its flight, one cell east.
            assert_eq!(next.item_at(Position::new(3, 5)), Some(&wand.at(Position::new(3, 5))));
        }

        #[test]
        fn use_fires_the_wand_where_the_protagonist_faces() {
            let board = demo::demo_board();
            let next = Action::Use {
                direction: Direction::NorthWest,
                item: Item::wand(ItemKind::SwapWand, 2),
            }
            .execute(&board)
            .unwrap();
            assert_eq!(hero(&next), Position::new(1, 3));
            assert_eq!(
                next.character_at(Position::new(2, 5)).map(|c| c.kind),
                Some(CharacterKind::Ushiwakamaru)
            );
        }
    }

    mod enumeration {
        use super::*;

        #[test]
        fn demo_start_offers_moves_throws_uses_and_drops() {
            let board = demo::demo_board();
            let actions = legal_actions(&board).unwrap();

            let moves: Vec<_> = actions
                .iter()
                .filter_map(|a| match a {
                    Action::Move { direction, .. } => Some(*direction),
                    _ => None,
                })
                .collect();
            assert_eq!(
                moves,
                vec![Direction::East, Direction::West, Direction::NorthWest]
            );
            // Three distinct wands, eight directions, throw and use.
            let aimed = actions
                .iter()
                .filter(|a| matches!(a, Action::Throw { .. } | Action::Use { .. }))
                .count();
            assert_eq!(aimed, 3 * 8 * 2);
            let drops = actions
                .iter()
                .filter(|a| matches!(a, Action::Drop { .. }))
                .count();
            assert_eq!(drops, 3);
            assert!(!actions.contains(&Action::Pick));
        }

        #[test]
        fn duplicate_items_are_offered_once() {
            let mut board = demo::demo_board();
            board.inventory = crate::bag![
                Item::new(ItemKind::Weed, None),
                Item::new(ItemKind::Weed, None)
            ];
            let drops = legal_actions(&board)
                .unwrap()
                .into_iter()
                .filter(|a| matches!(a, Action::Drop { .. }))
                .count();
            assert_eq!(drops, 1);
        }

        #[test]
        fn items_underfoot_and_ahead_add_pick_variants() {
            let mut board = demo::demo_board();
            board
                .floor_items
                .insert(Item::new(ItemKind::Weed, None).at(Position::new(2, 5)));
            board
                .floor_items
                .insert(Item::new(ItemKind::Weed, None).at(Position::new(3, 5)));
            let actions = legal_actions(&board).unwrap();
            assert!(actions.contains(&Action::Pick));
            assert!(actions.contains(&Action::Move {
                direction: Direction::East,
                pick_up: false
            }));
            assert!(!actions.contains(&Action::Move {
                direction: Direction::West,
                pick_up: false
            }));
            assert!(!actions.iter().any(|a| matches!(a, Action::Drop { .. })));
        }

        #[test]
        fn missing_protagonist_is_an_error() {
            let mut board = demo::demo_board();
            board.characters.retain(|c| !c.is_protagonist());
            assert_eq!(legal_actions(&board), Err(RuleError::MissingProtagonist));
        }
    }
}
