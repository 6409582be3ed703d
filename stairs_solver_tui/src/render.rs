//! Board depictions shared by the plain-text and terminal front ends.

use stairs_solver_core::{
    Position,
    board::{Board, TopObject},
    map::Terrain,
};

/// What a cell shows, topmost thing first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Protagonist,
    Character(char),
    Item(char),
    Stairs,
    Trap(char),
    Terrain(Terrain),
}

impl Glyph {
    pub fn at(board: &Board, position: Position) -> Glyph {
        match board.top_object_at(position) {
            Some(TopObject::Character(c)) if c.is_protagonist() => Glyph::Protagonist,
            Some(TopObject::Character(c)) => Glyph::Character(c.kind.symbol()),
            Some(TopObject::Item(item)) => Glyph::Item(item.kind.symbol()),
            Some(TopObject::Stairs(_)) => Glyph::Stairs,
            None => match board.trap_at(position) {
                Some(trap) => Glyph::Trap(trap.kind.symbol()),
                None => Glyph::Terrain(board.terrain_at(position)),
            },
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Glyph::Protagonist => '@',
            Glyph::Character(symbol) | Glyph::Item(symbol) | Glyph::Trap(symbol) => symbol,
            Glyph::Stairs => '>',
            Glyph::Terrain(Terrain::Floor) => '.',
            Glyph::Terrain(Terrain::Wall) => '#',
            Glyph::Terrain(Terrain::UnbreakableWall) => '%',
            Glyph::Terrain(Terrain::Water) => '~',
        }
    }
}

/// One string per map row.
pub fn map_rows(board: &Board) -> Vec<String> {
    let terrain = &board.level().terrain;
    (0..terrain.height())
        .map(|y| {
            (0..terrain.width())
                .map(|x| Glyph::at(board, Position::new(x as i32, y as i32)).symbol())
                .collect()
        })
        .collect()
}

/// Listing of held items, characters and traps.
pub fn legend(board: &Board) -> Vec<String> {
    let inventory: Vec<String> = board.inventory.iter().map(ToString::to_string).collect();
    let mut lines = vec![format!("inventory: {}", inventory.join(", "))];
    for item in &board.floor_items {
        if let Some(position) = item.position {
            lines.push(format!("item: {} at {}", item, position));
        }
    }
    lines.extend(board.characters.iter().map(|c| format!("character: {}", c)));
    lines.extend(
        board
            .traps
            .iter()
            .map(|trap| format!("trap: {} at {}", trap.kind.name(), trap.position)),
    );
    lines.extend(
        board
            .rooms()
            .iter()
            .map(|room| format!("room: {} to {}", room.top_left, room.bottom_right)),
    );
    lines
}

/// Multi-line text picture of a board.
pub fn render_text(board: &Board) -> String {
    let mut lines = map_rows(board);
    lines.extend(legend(board));
    lines.join("\n")
}
