//! Text format for floors.
//!
//! A layout is a block of whitespace-separated cell codes, one row per line,
//! followed after a blank line by directives that place what the map cannot
//! show. Lines starting with `#` are comments.
//!
//! ```text
//! WL WL WL WL WL
//! WL PC PT SS WL
//! WL WL WL WL WL
//!
//! inventory swap-wand 2
//! facing 1 1 E
//! ```
//!
//! | code | cell                          |
//! |------|-------------------------------|
//! | `FL` | floor                         |
//! | `WL` | wall                          |
//! | `BW` | unbreakable wall              |
//! | `WA` | water                         |
//! | `SS` | stairs                        |
//! | `PT` | pit trap                      |
//! | `PC` | protagonist                   |
//! | `UM` | Ushiwakamaru                  |
//! | `TG` | thief guard                   |
//!
//! Directives: `inventory <item> [charges]`, `item <x> <y> <item> [charges]`
//! (a charge count is required for wands and refused for anything else),
//! `trap <x> <y> <trap>`, `facing <x> <y> <N|NE|E|SE|S|SW|W|NW>`,
//! `mind <x> <y> <state>`, `room <x1> <y1> <x2> <y2>` and
//! `formation <x> <y> <character>`. Any `formation` line replaces the stairs
//! goal with the listed arrangement of characters.

use std::{str::FromStr, sync::Arc};

use crate::{
    Direction, Position,
    bag::Bag,
    board::{Board, Goal},
    entity::{Character, CharacterKind, Item, ItemKind, MindState, Trap, TrapKind, UnknownKind},
    map::{Grid, GridError, Level, Room, Terrain},
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("the layout has no map rows")]
    EmptyMap,
    #[error("line {line}: expected {expected} cells, found {found}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: unknown cell code '{code}'")]
    UnknownCell { line: usize, code: String },
    #[error("line {line}: unknown directive '{directive}'")]
    UnknownDirective { line: usize, directive: String },
    #[error("line {line}: '{directive}' is missing an argument")]
    MissingArgument { line: usize, directive: String },
    #[error("line {line}: '{token}' is not a valid number")]
    BadNumber { line: usize, token: String },
    #[error("line {line}: unknown direction '{label}'")]
    UnknownDirection { line: usize, label: String },
    #[error("line {line}: {source}")]
    UnknownName {
        line: usize,
        #[source]
        source: UnknownKind,
    },
    #[error("line {line}: {position} is outside the map")]
    OutsideMap { line: usize, position: Position },
    #[error("line {line}: no character stands at {position}")]
    NoCharacter { line: usize, position: Position },
    #[error("line {line}: the wand '{item}' needs a charge count")]
    MissingCharges { line: usize, item: String },
    #[error("line {line}: '{item}' is not a wand and takes no charge count")]
    UnexpectedCharges { line: usize, item: String },
    #[error("line {line}: an item cannot lie at {position}")]
    BlockedItem { line: usize, position: Position },
    #[error("the layout has no protagonist")]
    MissingProtagonist,
    #[error("the layout has more than one protagonist")]
    DuplicateProtagonist,
    #[error("the layout has no stairs")]
    MissingStairs,
    #[error("the layout has more than one stairs cell")]
    DuplicateStairs,
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Builds the initial board described by `text`.
pub fn parse_layout(text: &str) -> Result<Board, LayoutError> {
    let mut rows: Vec<(usize, Vec<&str>)> = Vec::new();
    let mut directives: Vec<(usize, &str)> = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.starts_with('#') {
            continue;
        }
        if directives.is_empty() && !line.is_empty() && !starts_directive(line) {
            rows.push((index + 1, line.split_whitespace().collect()));
        } else if !line.is_empty() {
            directives.push((index + 1, line));
        }
    }

    let width = rows.first().map(|(_, cells)| cells.len()).unwrap_or(0);
    if width == 0 {
        return Err(LayoutError::EmptyMap);
    }
    let mut terrain: Grid<Terrain> = Grid::new(width, rows.len());
    let mut draft = Draft::default();

    for (y, (line, cells)) in rows.iter().enumerate() {
        if cells.len() != width {
            return Err(LayoutError::RaggedRow {
                line: *line,
                expected: width,
                found: cells.len(),
            });
        }
        for (x, code) in cells.iter().enumerate() {
            let position = Position::new(x as i32, y as i32);
            let cell = draft.place(*line, position, code)?;
            terrain.set(position, cell)?;
        }
    }

    let mut level = Level::new(terrain);
    let mut formation = Vec::new();
    for &(line, text) in &directives {
        let mut directive = Directive::new(line, text);
        match directive.name {
            "inventory" => {
                draft.inventory.push(directive.item()?);
            }
            "item" => {
                let position = directive.position(&level)?;
                draft.floor_items.push((line, directive.item()?.at(position)));
            }
            "trap" => {
                let position = directive.position(&level)?;
                let kind: TrapKind = directive.name_arg()?;
                draft.traps.push(Trap { kind, position });
            }
            "facing" => {
                let position = directive.position(&level)?;
                let label = directive.word()?;
                let facing = Direction::from_abbreviation(label).ok_or_else(|| {
                    LayoutError::UnknownDirection {
                        line,
                        label: label.to_string(),
                    }
                })?;
                draft.character_at(line, position)?.facing = facing;
            }
            "mind" => {
                let position = directive.position(&level)?;
                let mind: MindState = directive.name_arg()?;
                draft.character_at(line, position)?.mind = mind;
            }
            "room" => {
                let top_left = directive.position(&level)?;
                let bottom_right = directive.position(&level)?;
                level.rooms.push(Room {
                    top_left,
                    bottom_right,
                });
            }
            "formation" => {
                let position = directive.position(&level)?;
                let kind: CharacterKind = directive.name_arg()?;
                formation.push((kind, position));
            }
            other => {
                return Err(LayoutError::UnknownDirective {
                    line,
                    directive: other.to_string(),
                });
            }
        }
    }
    if !formation.is_empty() {
        level.goal = Goal::Formation(Bag::from(formation));
    }

    draft.finish(level)
}

const DIRECTIVES: [&str; 7] = [
    "inventory",
    "item",
    "trap",
    "facing",
    "mind",
    "room",
    "formation",
];

fn starts_directive(line: &str) -> bool {
    line.split_whitespace()
        .next()
        .is_some_and(|word| DIRECTIVES.contains(&word) || word.chars().any(|c| c.is_ascii_lowercase()))
}

/// Entities collected while reading, before the level is complete.
#[derive(Default)]
struct Draft {
    characters: Vec<Character>,
    stairs: Option<Position>,
    traps: Vec<Trap>,
    inventory: Vec<Item>,
    floor_items: Vec<(usize, Item)>,
}

impl Draft {
    /// Records whatever `code` puts on `position` and returns the terrain
    /// underneath.
    fn place(&mut self, line: usize, position: Position, code: &str) -> Result<Terrain, LayoutError> {
        let character = |kind| Character::new(kind, position, Direction::South);
        match code {
            "FL" => {}
            "WL" => return Ok(Terrain::Wall),
            "BW" => return Ok(Terrain::UnbreakableWall),
            "WA" => return Ok(Terrain::Water),
            "SS" => {
                if self.stairs.replace(position).is_some() {
                    return Err(LayoutError::DuplicateStairs);
                }
            }
            "PT" => self.traps.push(Trap {
                kind: TrapKind::Pit,
                position,
            }),
            "PC" => {
                if self.characters.iter().any(|c| c.is_protagonist()) {
                    return Err(LayoutError::DuplicateProtagonist);
                }
                self.characters.push(character(CharacterKind::Protagonist));
            }
            "UM" => self.characters.push(character(CharacterKind::Ushiwakamaru)),
            "TG" => self.characters.push(character(CharacterKind::ThiefGuard)),
            other => {
                return Err(LayoutError::UnknownCell {
                    line,
                    code: other.to_string(),
                });
            }
        }
        Ok(Terrain::Floor)
    }

    fn character_at(&mut self, line: usize, position: Position) -> Result<&mut Character, LayoutError> {
        self.characters
            .iter_mut()
            .find(|c| c.position == position)
            .ok_or(LayoutError::NoCharacter { line, position })
    }

    fn finish(self, level: Level) -> Result<Board, LayoutError> {
        if !self.characters.iter().any(|c| c.is_protagonist()) {
            return Err(LayoutError::MissingProtagonist);
        }
        let stairs = self.stairs.ok_or(LayoutError::MissingStairs)?;

        let mut board = Board::new(Arc::new(level), stairs);
        board.characters.extend(self.characters);
        board.traps.extend(self.traps);
        board.inventory.extend(self.inventory);
        for (line, item) in self.floor_items {
            let Some(position) = item.position else {
                continue;
            };
            if !board.can_drop_at(position) {
                return Err(LayoutError::BlockedItem { line, position });
            }
            board.floor_items.insert(item);
        }
        Ok(board)
    }
}

/// Cursor over the arguments of one directive line.
struct Directive<'a> {
    line: usize,
    name: &'a str,
    args: std::str::SplitWhitespace<'a>,
}

impl<'a> Directive<'a> {
    fn new(line: usize, text: &'a str) -> Self {
        let mut args = text.split_whitespace();
        let name = args.next().unwrap_or_default();
        Directive { line, name, args }
    }

    fn word(&mut self) -> Result<&'a str, LayoutError> {
        self.args.next().ok_or_else(|| LayoutError::MissingArgument {
            line: self.line,
            directive: self.name.to_string(),
        })
    }

    fn number<T: FromStr>(&mut self) -> Result<T, LayoutError> {
        let token = self.word()?;
        token.parse().map_err(|_| LayoutError::BadNumber {
            line: self.line,
            token: token.to_string(),
        })
    }

    fn optional_number<T: FromStr>(&mut self) -> Result<Option<T>, LayoutError> {
        match self.args.next() {
            Some(token) => token.parse().map(Some).map_err(|_| LayoutError::BadNumber {
                line: self.line,
                token: token.to_string(),
            }),
            None => Ok(None),
        }
    }

    fn name_arg<T: FromStr<Err = UnknownKind>>(&mut self) -> Result<T, LayoutError> {
        let line = self.line;
        self.word()?
            .parse()
            .map_err(|source| LayoutError::UnknownName { line, source })
    }

    /// An item name followed by a charge count, which wands require and
    /// other items must not carry.
    fn item(&mut self) -> Result<Item, LayoutError> {
        let kind: ItemKind = self.name_arg()?;
        let charges = self.optional_number()?;
        match (kind.is_wand(), charges) {
            (true, None) => Err(LayoutError::MissingCharges {
                line: self.line,
                item: kind.name().to_string(),
            }),
            (false, Some(_)) => Err(LayoutError::UnexpectedCharges {
                line: self.line,
                item: kind.name().to_string(),
            }),
            _ => Ok(Item::new(kind, charges)),
        }
    }

    fn position(&mut self, level: &Level) -> Result<Position, LayoutError> {
        let x = self.number()?;
        let y = self.number()?;
        let position = Position::new(x, y);
        if !level.in_bounds(position) {
            return Err(LayoutError::OutsideMap {
                line: self.line,
                position,
            });
        }
        Ok(position)
    }
}
