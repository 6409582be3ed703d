use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::{Position, board::Goal};

/// Represents errors that can occur within the grid operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("Coordinates {position} are out of bounds for grid size ({width}, {height})")]
    OutOfBounds {
        position: Position,
        width: usize,
        height: usize,
    },
}

/// A generic 2D grid structure.
///
/// Stores elements of type `T` in a flat vector using row-major order.
/// Cells are addressed by signed [`Position`]s so that offsets computed from
/// drop tables and trajectories can step outside the grid and simply miss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T> Grid<T> {
    /// Creates a new grid with the specified dimensions, filled with default values.
    ///
    /// # Panics
    ///
    /// Panics if `width * height` overflows `usize`.
    pub fn new(width: usize, height: usize) -> Self
    where
        T: Default + Clone,
    {
        let size = width.checked_mul(height).expect("Grid size overflow");
        Grid {
            width,
            height,
            cells: vec![T::default(); size],
        }
    }

    /// Returns the width of the grid.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the height of the grid.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Converts a position to a flat vector index.
    ///
    /// Returns `None` if the position is out of bounds.
    #[inline]
    pub fn index_of(&self, position: Position) -> Option<usize> {
        if self.contains(position) {
            Some(position.y as usize * self.width + position.x as usize)
        } else {
            None
        }
    }

    /// Checks if the given position lies within the grid boundaries.
    #[inline]
    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && (position.x as usize) < self.width
            && (position.y as usize) < self.height
    }

    /// Gets an immutable reference to the cell at the given position.
    ///
    /// Returns `None` if the position is out of bounds.
    pub fn get(&self, position: Position) -> Option<&T> {
        self.index_of(position).and_then(|index| self.cells.get(index))
    }

    /// Sets the value of the cell at the given position.
    ///
    /// Returns `Ok(())` on success, or `Err(GridError::OutOfBounds)` if the
    /// position is invalid.
    pub fn set(&mut self, position: Position, value: T) -> Result<(), GridError> {
        let index = self.index_of(position).ok_or(GridError::OutOfBounds {
            position,
            width: self.width,
            height: self.height,
        })?;
        self.cells[index] = value;
        Ok(())
    }

    /// Returns an iterator that yields `(Position, &T)` for each cell.
    pub fn enumerate(&self) -> impl Iterator<Item = (Position, &T)> {
        let width = self.width;
        self.cells.iter().enumerate().map(move |(index, cell)| {
            let position = Position::new((index % width) as i32, (index / width) as i32);
            (position, cell)
        })
    }
}

/// Indexing using Position coordinates for access
impl<T> Index<Position> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, position: Position) -> &Self::Output {
        match self.index_of(position) {
            Some(idx) => &self.cells[idx],
            None => panic!(
                "Grid index {} out of bounds for grid size ({}, {})",
                position, self.width, self.height
            ),
        }
    }
}

/// Represents the static kind of a cell on the dungeon floor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    #[default]
    Floor,
    Wall,
    UnbreakableWall,
    Water,
}

impl Terrain {
    /// Walls of either kind. These stop projectiles, magic bullets and
    /// diagonal corner-cutting.
    #[inline]
    pub fn is_wall(self) -> bool {
        matches!(self, Terrain::Wall | Terrain::UnbreakableWall)
    }

    /// Cells a character can never stand on.
    #[inline]
    pub fn blocks_walking(self) -> bool {
        self.is_wall() || self == Terrain::Water
    }
}

/// An axis-aligned room rectangle, inclusive on both corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Room {
    pub top_left: Position,
    pub bottom_right: Position,
}

impl Room {
    pub fn contains(&self, position: Position) -> bool {
        (self.top_left.x..=self.bottom_right.x).contains(&position.x)
            && (self.top_left.y..=self.bottom_right.y).contains(&position.y)
    }
}

/// The static part of a puzzle: terrain, rooms and the win condition.
///
/// A level is built once by the loader and shared read-only (behind an `Arc`)
/// by every board derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    pub terrain: Grid<Terrain>,
    pub rooms: Vec<Room>,
    pub goal: Goal,
}

impl Level {
    pub fn new(terrain: Grid<Terrain>) -> Self {
        Level {
            terrain,
            rooms: Vec::new(),
            goal: Goal::ReachStairs,
        }
    }

    /// Terrain at `position`; everything outside the grid behaves like solid wall.
    #[inline]
    pub fn terrain_at(&self, position: Position) -> Terrain {
        self.terrain
            .get(position)
            .copied()
            .unwrap_or(Terrain::UnbreakableWall)
    }

    #[inline]
    pub fn in_bounds(&self, position: Position) -> bool {
        self.terrain.contains(position)
    }
}
