use std::fmt;

use serde::{Deserialize, Serialize};

/// An integer grid coordinate. `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Point {
    /// Where removed entities are parked so stale handles are easy to spot.
    pub const OFF_GRID: Point = Point { x: -1, y: -1 };

    /// Create a point from a column and a row.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// `true` if `other` shares an edge with this cell (rook move, distance 1).
    /// A cell is not adjacent to itself and diagonal neighbours do not count.
    pub fn adjacent(&self, other: Point) -> bool {
        (self.x == other.x && (self.y - other.y).abs() == 1)
            || (self.y == other.y && (self.x - other.x).abs() == 1)
    }

    /// Manhattan distance, the metric used for nearest-entity searches.
    pub fn manhattan(&self, other: Point) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Chebyshev (king-move) distance.
    pub fn chebyshev(&self, other: Point) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// The point shifted by `(dx, dy)`, saturating at the `i32` range.
    pub fn offset(&self, dx: i32, dy: i32) -> Point {
        Point::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
