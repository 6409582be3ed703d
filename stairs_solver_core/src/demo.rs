//! The built-in demo floor.
//!
//! Stairs sit at the top of a narrow shaft, a pit guards the only floor
//! cell beside the water channel, and Ushiwakamaru stands where the
//! protagonist needs to go.

use crate::{
    Direction,
    board::Board,
    command::Action,
    entity::{CharacterKind, Item, ItemKind},
    layout::parse_layout,
    search::{FacingBonus, GoalDistance},
};

pub const DEMO_LAYOUT: &str = "
WL WL WL WL WL
WL WL SS WL WL
WL WL FL WL WL
WL UM WA PT WL
WL FL WA WL WL
WL FL PC FL WL
WL WL WL WL WL

inventory swap-wand 2
inventory knockback-wand 1
inventory attract-wand 1
";

/// Initial board of the demo floor.
pub fn demo_board() -> Board {
    parse_layout(DEMO_LAYOUT).expect("built-in demo layout is valid")
}

/// Heuristic tuned for the demo: Ushiwakamaru facing north-west is what
/// lets a thrown wand bounce the right way.
pub fn demo_heuristic() -> GoalDistance {
    GoalDistance {
        facing_bonuses: vec![FacingBonus {
            kind: CharacterKind::Ushiwakamaru,
            facing: Direction::NorthWest,
            bonus: 5,
        }],
        ..GoalDistance::default()
    }
}

/// A known solution of the demo floor, one action per turn.
pub fn demo_script() -> Vec<Action> {
    use Direction::*;

    let walk = |direction| Action::Move {
        direction,
        pick_up: true,
    };
    let swap = |charges| Item::wand(ItemKind::SwapWand, charges);
    let knockback = |charges| Item::wand(ItemKind::KnockbackWand, charges);
    let attract = |charges| Item::wand(ItemKind::AttractWand, charges);

    vec![
        // Swap with Ushiwakamaru and leave a wand below him.
        Action::Use {
            direction: NorthWest,
            item: swap(2),
        },
        walk(South),
        Action::Drop { item: swap(1) },
        walk(North),
        // Knock the wand into Ushiwakamaru so he turns north-west.
        Action::Use {
            direction: SouthWest,
            item: knockback(1),
        },
        walk(South),
        walk(North),
        Action::Use {
            direction: SouthWest,
            item: swap(1),
        },
        walk(West),
        // Fill the pit with the spent wand.
        Action::Throw {
            direction: NorthEast,
            item: knockback(0),
        },
        walk(East),
        walk(East),
        Action::Use {
            direction: NorthWest,
            item: attract(1),
        },
        walk(West),
        walk(NorthWest),
        walk(North),
        // Bounce both empty wands off Ushiwakamaru onto the protagonist.
        Action::Throw {
            direction: East,
            item: swap(0),
        },
        Action::Throw {
            direction: West,
            item: attract(0),
        },
        walk(North),
    ]
}
