use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer (x, y) point. Scan coordinates and grid-local cells both use it;
/// y grows downwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
}

impl Coordinate {
    pub const fn new(x: i32, y: i32) -> Self {
        Coordinate { x, y }
    }

    pub fn down(self) -> Self {
        Coordinate::new(self.x, self.y + 1)
    }

    pub fn down_left(self) -> Self {
        Coordinate::new(self.x - 1, self.y + 1)
    }

    pub fn down_right(self) -> Self {
        Coordinate::new(self.x + 1, self.y + 1)
    }

    /// Shift into a space whose origin is `origin`
    pub fn relative_to(self, origin: Coordinate) -> Self {
        Coordinate::new(self.x - origin.x, self.y - origin.y)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}
