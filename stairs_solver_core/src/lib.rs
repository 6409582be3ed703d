use std::{fmt, ops::Add};

use serde::{Deserialize, Serialize};

pub mod bag;
pub mod board;
pub mod command;
pub mod demo;
pub mod effect;
pub mod entity;
pub mod layout;
pub mod map;
pub mod search;
pub mod trajectory;

/// Represents a 2D coordinate. Origin is the top-left cell, `y` grows downward.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    /// The neighbouring cell one step in `direction`.
    #[inline]
    pub fn step(self, direction: Direction) -> Position {
        let (dx, dy) = direction.delta();
        Position::new(self.x + dx, self.y + dy)
    }

    /// Chebyshev (king-move) distance, the number of moves between two cells
    /// on an open 8-connected floor.
    pub fn chebyshev(self, other: Position) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

impl Add<(i32, i32)> for Position {
    type Output = Position;

    #[inline]
    fn add(self, (dx, dy): (i32, i32)) -> Position {
        Position::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The eight compass directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// All directions, clockwise from north.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Unit offset `(dx, dy)` of this direction.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::South => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, -1),
        }
    }

    /// Inverse of [`Direction::delta`]. Returns `None` for `(0, 0)` or
    /// components outside `-1..=1`.
    pub fn from_delta(dx: i32, dy: i32) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|direction| direction.delta() == (dx, dy))
    }

    pub fn opposite(self) -> Direction {
        // `ALL` is ordered clockwise, so the opposite sits half a turn away.
        Direction::ALL[(self as usize + 4) % 8]
    }

    /// Mirrors the horizontal component (bounce off a vertical wall).
    pub fn flip_x(self) -> Direction {
        let (dx, dy) = self.delta();
        Direction::from_delta(-dx, dy).unwrap_or(self)
    }

    /// Mirrors the vertical component (bounce off a horizontal wall).
    pub fn flip_y(self) -> Direction {
        let (dx, dy) = self.delta();
        Direction::from_delta(dx, -dy).unwrap_or(self)
    }

    #[inline]
    pub fn is_diagonal(self) -> bool {
        let (dx, dy) = self.delta();
        dx != 0 && dy != 0
    }

    /// Short compass label (`N`, `NE`, ...), also accepted by the layout loader.
    pub fn abbreviation(self) -> &'static str {
        match self {
            Direction::North => "N",
            Direction::NorthEast => "NE",
            Direction::East => "E",
            Direction::SouthEast => "SE",
            Direction::South => "S",
            Direction::SouthWest => "SW",
            Direction::West => "W",
            Direction::NorthWest => "NW",
        }
    }

    pub fn from_abbreviation(label: &str) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|direction| direction.abbreviation().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Direction::North => "north",
            Direction::NorthEast => "north-east",
            Direction::East => "east",
            Direction::SouthEast => "south-east",
            Direction::South => "south",
            Direction::SouthWest => "south-west",
            Direction::West => "west",
            Direction::NorthWest => "north-west",
        };
        f.write_str(label)
    }
}
