//! The eight headings of the Moore neighbourhood
//!
//! Screen coordinates: `x` grows to the right, `y` grows downwards.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Direction8 {
    #[default]
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
    TopLeft,
}

impl Direction8 {
    /// All headings in clockwise order starting at `Top`
    pub const ALL: [Direction8; 8] = [
        Direction8::Top,
        Direction8::TopRight,
        Direction8::Right,
        Direction8::BottomRight,
        Direction8::Bottom,
        Direction8::BottomLeft,
        Direction8::Left,
        Direction8::TopLeft,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 8]
    }

    /// Offset of the neighbour in this direction
    pub fn offset(self) -> (i32, i32) {
        match self {
            Self::Top => (0, -1),
            Self::TopRight => (1, -1),
            Self::Right => (1, 0),
            Self::BottomRight => (1, 1),
            Self::Bottom => (0, 1),
            Self::BottomLeft => (-1, 1),
            Self::Left => (-1, 0),
            Self::TopLeft => (-1, -1),
        }
    }

    pub fn from_offset(dx: i32, dy: i32) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|d| d.offset() == (dx.signum(), dy.signum()) && (dx, dy) != (0, 0))
    }

    pub fn is_diagonal(self) -> bool {
        self.index() % 2 == 1
    }

    pub fn opposite(self) -> Self {
        Self::from_index(self.index() + 4)
    }

    pub fn clockwise(self, steps: usize) -> Self {
        Self::from_index(self.index() + steps % 8)
    }

    pub fn counter_clockwise(self, steps: usize) -> Self {
        Self::from_index(self.index() + 8 - steps % 8)
    }

    /// Minimal number of 45° turns between two headings (0..=4)
    pub fn turn_distance(self, other: Self) -> usize {
        let diff = (self.index() as i32 - other.index() as i32).rem_euclid(8) as usize;
        diff.min(8 - diff)
    }

    pub fn within_turn(self, other: Self, max_turns: usize) -> bool {
        self.turn_distance(other) <= max_turns
    }

    /// The two orthogonal headings a diagonal is composed of
    pub fn orthogonal_components(self) -> Option<(Self, Self)> {
        if self.is_diagonal() {
            Some((self.counter_clockwise(1), self.clockwise(1)))
        } else {
            None
        }
    }
}
