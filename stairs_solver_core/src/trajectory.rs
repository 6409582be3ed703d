//! Flight paths of thrown items and magic bullets.
//!
//! Magic bullets travel in straight lines and may bounce once off a wall
//! corner. Thrown items never bounce. Each caller truncates the path at its
//! own stopping rule.

use crate::{Direction, Position, board::Board};

/// Iterator over the cells a magic bullet passes through, paired with the
/// direction it is moving in when it enters each cell.
///
/// The first element is the starting cell. The sequence ends when the bullet
/// is destroyed against a wall.
#[derive(Debug, Clone)]
pub struct BulletPath<'a> {
    board: &'a Board,
    next: Option<(Position, Direction)>,
    reflected: bool,
}

impl<'a> BulletPath<'a> {
    pub fn new(board: &'a Board, origin: Position, direction: Direction) -> Self {
        BulletPath {
            board,
            next: Some((origin, direction)),
            reflected: false,
        }
    }

    /// Where the bullet goes after `(position, direction)`, or `None` if it is
    /// destroyed.
    fn advance(&mut self, position: Position, direction: Direction) -> Option<(Position, Direction)> {
        let ahead = position.step(direction);
        if !self.board.is_wall(ahead) {
            return Some((ahead, direction));
        }
        if !direction.is_diagonal() || self.reflected {
            return None;
        }

        let (dx, dy) = direction.delta();
        let side_x = position + (dx, 0);
        let side_y = position + (0, dy);
        let bounce = match (self.board.is_wall(side_x), self.board.is_wall(side_y)) {
            // Wall along x: slide along y and mirror horizontally.
            (true, false) => (side_y, direction.flip_x()),
            // Wall along y: slide along x and mirror vertically.
            (false, true) => (side_x, direction.flip_y()),
            // Straight into an inside corner.
            (true, true) => return None,
            // Exposed corner.
            (false, false) => {
                if dx * dy > 0 {
                    (side_x, direction.flip_y())
                } else {
                    (side_y, direction.flip_x())
                }
            }
        };
        self.reflected = true;
        tracing::trace!(
            "bullet reflects at {} from {} to {} heading {}",
            position,
            direction,
            bounce.0,
            bounce.1
        );
        Some(bounce)
    }
}

impl Iterator for BulletPath<'_> {
    type Item = (Position, Direction);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.advance(current.0, current.1);
        Some(current)
    }
}

/// Path of a wand's bullet that stops at the first character, floor item or
/// stairs after the origin. Used by attract and knockback wands.
pub fn mover_bullet(board: &Board, origin: Position, direction: Direction) -> Vec<(Position, Direction)> {
    truncate_after_hit(BulletPath::new(board, origin, direction), |position| {
        board.top_object_at(position).is_some()
    })
}

/// Path of a wand's bullet that stops at the first character after the
/// origin. Used by the swap wand.
pub fn normal_bullet(board: &Board, origin: Position, direction: Direction) -> Vec<(Position, Direction)> {
    truncate_after_hit(BulletPath::new(board, origin, direction), |position| {
        board.character_at(position).is_some()
    })
}

/// Path of an item thrown by hand: straight steps until the next cell is a
/// wall or outside the floor, stopping early on the first character after
/// the origin. No reflection.
pub fn throw_path(board: &Board, origin: Position, direction: Direction) -> Vec<Position> {
    let mut path = vec![origin];
    let mut position = origin;
    loop {
        let ahead = position.step(direction);
        if !board.level().in_bounds(ahead) || board.is_wall(ahead) {
            break;
        }
        position = ahead;
        path.push(position);
        if board.character_at(position).is_some() {
            break;
        }
    }
    path
}

fn truncate_after_hit(
    path: BulletPath<'_>,
    mut stops: impl FnMut(Position) -> bool,
) -> Vec<(Position, Direction)> {
    let mut cells = Vec::new();
    for (index, (position, direction)) in path.enumerate() {
        cells.push((position, direction));
        if index != 0 && stops(position) {
            break;
        }
    }
    cells
}

/// The thing a bullet path ended on, if it ended on something.
pub fn bullet_target(board: &Board, path: &[(Position, Direction)]) -> Option<(Position, Direction)> {
    if path.len() < 2 {
        return None;
    }
    let &(position, direction) = path.last()?;
    board.top_object_at(position).map(|_| (position, direction))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{demo, layout::parse_layout};

    fn positions(path: &[(Position, Direction)]) -> Vec<Position> {
        path.iter().map(|(p, _)| *p).collect()
    }

    #[test]
    fn straight_bullet_dies_against_wall() {
        let board = parse_layout(
            "
            WL WL WL WL WL
            WL PC FL FL WL
            WL SS WL WL WL
        ",
        )
        .unwrap();
        let path: Vec<_> = BulletPath::new(&board, Position::new(1, 1), Direction::East).collect();
        assert_eq!(
            positions(&path),
            vec![Position::new(1, 1), Position::new(2, 1), Position::new(3, 1)]
        );
    }

    #[test]
    fn diagonal_bullet_slides_along_a_wall() {
        let board = demo::demo_board();
        // From the protagonist's start, north-west hits the west wall after one
        // step and slides up into Ushiwakamaru.
        let path = normal_bullet(&board, Position::new(2, 5), Direction::NorthWest);
        assert_eq!(
            path,
            vec![
                (Position::new(2, 5), Direction::NorthWest),
                (Position::new(1, 4), Direction::NorthWest),
                (Position::new(1, 3), Direction::NorthEast),
            ]
        );
    }

    #[test]
    fn exposed_corner_bounces_deterministically() {
        let board = parse_layout(
            "
            WL WL WL WL WL
            WL FL FL FL WL
            WL FL WL FL WL
            WL PC FL SS WL
            WL WL WL WL WL
        ",
        )
        .unwrap();
        // Moving north-east from (1, 3) the next cell (2, 2) is a pillar while
        // both sides are open: dx * dy < 0, so slide along y and mirror x.
        let path: Vec<_> =
            BulletPath::new(&board, Position::new(1, 3), Direction::NorthEast).collect();
        assert_eq!(path[1], (Position::new(1, 2), Direction::NorthWest));

        // Moving south-east from (1, 1), dx * dy > 0: slide along x, mirror y.
        let path: Vec<_> =
            BulletPath::new(&board, Position::new(1, 1), Direction::SouthEast).collect();
        assert_eq!(path[1], (Position::new(2, 1), Direction::NorthEast));
    }

    #[test]
    fn second_reflection_destroys_the_bullet() {
        let board = parse_layout(
            "
            WL WL WL WL WL
            WL FL FL FL WL
            WL PC FL SS WL
            WL WL WL WL WL
        ",
        )
        .unwrap();
        let path: Vec<_> =
            BulletPath::new(&board, Position::new(1, 2), Direction::NorthEast).collect();
        // (2, 1), then the top wall reflects it to (3, 1) heading south-east,
        // then (4, 2) is wall again and a second reflection is not allowed.
        assert_eq!(
            path,
            vec![
                (Position::new(1, 2), Direction::NorthEast),
                (Position::new(2, 1), Direction::NorthEast),
                (Position::new(3, 1), Direction::SouthEast),
            ]
        );
    }

    #[test]
    fn paths_are_deterministic() {
        let board = demo::demo_board();
        for direction in Direction::ALL {
            let first: Vec<_> = BulletPath::new(&board, Position::new(2, 5), direction).collect();
            let second: Vec<_> = BulletPath::new(&board, Position::new(2, 5), direction).collect();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn throw_flies_over_water_and_stops_before_walls() {
        let board = demo::demo_board();
        assert_eq!(
            throw_path(&board, Position::new(1, 5), Direction::NorthEast),
            vec![Position::new(1, 5), Position::new(2, 4), Position::new(3, 3)]
        );
        assert_eq!(
            throw_path(&board, Position::new(2, 5), Direction::South),
            vec![Position::new(2, 5)]
        );
    }

    #[test]
    fn throw_stops_at_first_character() {
        let board = demo::demo_board();
        assert_eq!(
            throw_path(&board, Position::new(1, 5), Direction::North),
            vec![Position::new(1, 5), Position::new(1, 4), Position::new(1, 3)]
        );
    }

    #[test]
    fn mover_bullet_stops_on_stairs() {
        let board = demo::demo_board();
        let path = mover_bullet(&board, Position::new(2, 5), Direction::North);
        assert_eq!(path.last(), Some(&(Position::new(2, 1), Direction::North)));
        assert_eq!(
            bullet_target(&board, &path),
            Some((Position::new(2, 1), Direction::North))
        );
        // The swap wand's bullet flies past the stairs and dies on the wall behind.
        let path = normal_bullet(&board, Position::new(2, 5), Direction::North);
        assert_eq!(path.len(), 5);
        assert!(board.character_at(Position::new(2, 1)).is_none());
    }
}
