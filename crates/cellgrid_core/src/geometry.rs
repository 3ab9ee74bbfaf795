use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// Integer cell coordinate. Used for grid, viewport and scene space alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ZERO: Position = Position { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Position) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Non-negative integer size. Negative inputs are floored to zero on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Dimension {
    pub width: i32,
    pub height: i32,
}

impl Dimension {
    pub const fn new(width: i32, height: i32) -> Self {
        Self {
            width: if width < 0 { 0 } else { width },
            height: if height < 0 { 0 } else { height },
        }
    }

    /// Same size with both axes floored to at least one.
    pub fn at_least_one(self) -> Self {
        Self {
            width: self.width.max(1),
            height: self.height.max(1),
        }
    }

    pub fn area(self) -> usize {
        self.width.max(0) as usize * self.height.max(0) as usize
    }

    pub fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Whether `(col, row)` addresses a cell of a grid this size.
    pub fn contains(self, col: i32, row: i32) -> bool {
        col >= 0 && row >= 0 && col < self.width && row < self.height
    }
}

/// Axis-aligned rectangle of cells: `origin` inclusive, `origin + size` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Area {
    pub origin: Position,
    pub size: Dimension,
}

impl Area {
    pub const fn new(origin: Position, size: Dimension) -> Self {
        Self { origin, size }
    }

    pub fn from_xywh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(Position::new(x, y), Dimension::new(width, height))
    }

    pub fn left(&self) -> i32 {
        self.origin.x
    }

    pub fn top(&self) -> i32 {
        self.origin.y
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i32 {
        self.origin.x + self.size.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i32 {
        self.origin.y + self.size.height
    }

    pub fn contains(&self, p: Position) -> bool {
        self.origin.x <= p.x && p.x < self.right() && self.origin.y <= p.y && p.y < self.bottom()
    }

    pub fn intersects(&self, other: &Area) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Row-major iteration over every cell in the area.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (self.top()..self.bottom())
            .flat_map(move |y| (self.left()..self.right()).map(move |x| Position::new(x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_contains_is_half_open() {
        let a = Area::from_xywh(2, 3, 4, 2);
        assert!(a.contains(Position::new(2, 3)));
        assert!(a.contains(Position::new(5, 4)));
        assert!(!a.contains(Position::new(6, 4)));
        assert!(!a.contains(Position::new(5, 5)));
        assert!(!a.contains(Position::new(1, 3)));
    }

    #[test]
    fn dimension_floors_negative_sizes() {
        let d = Dimension::new(-3, 5);
        assert_eq!(d.width, 0);
        assert!(d.is_empty());
        assert_eq!(d.area(), 0);
        assert_eq!(d.at_least_one(), Dimension::new(1, 5));
    }

    #[test]
    fn area_positions_row_major() {
        let a = Area::from_xywh(1, 1, 2, 2);
        let cells: Vec<Position> = a.positions().collect();
        assert_eq!(
            cells,
            vec![
                Position::new(1, 1),
                Position::new(2, 1),
                Position::new(1, 2),
                Position::new(2, 2)
            ]
        );
    }

    #[test]
    fn intersecting_areas() {
        let a = Area::from_xywh(0, 0, 4, 4);
        assert!(a.intersects(&Area::from_xywh(3, 3, 2, 2)));
        assert!(!a.intersects(&Area::from_xywh(4, 0, 2, 2)));
    }
}
