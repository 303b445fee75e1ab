//! Spatial addressing: positions, sides and part positions.

use serde::{Deserialize, Serialize};

/// One of the six faces of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    Down,
    Up,
    North,
    South,
    West,
    East,
}

impl Side {
    /// All sides, in a stable order.
    pub const ALL: [Side; 6] = [
        Side::Down,
        Side::Up,
        Side::North,
        Side::South,
        Side::West,
        Side::East,
    ];

    /// The side facing back from the neighbour.
    pub fn opposite(self) -> Side {
        match self {
            Side::Down => Side::Up,
            Side::Up => Side::Down,
            Side::North => Side::South,
            Side::South => Side::North,
            Side::West => Side::East,
            Side::East => Side::West,
        }
    }

    /// Unit offset `(dx, dy, dz)` towards the neighbour on this side.
    pub fn offset(self) -> (i32, i32, i32) {
        match self {
            Side::Down => (0, -1, 0),
            Side::Up => (0, 1, 0),
            Side::North => (0, 0, -1),
            Side::South => (0, 0, 1),
            Side::West => (-1, 0, 0),
            Side::East => (1, 0, 0),
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Down => write!(f, "down"),
            Side::Up => write!(f, "up"),
            Side::North => write!(f, "north"),
            Side::South => write!(f, "south"),
            Side::West => write!(f, "west"),
            Side::East => write!(f, "east"),
        }
    }
}

/// A stable spatial address: dimension plus block coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub dimension: i32,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    pub fn new(dimension: i32, x: i32, y: i32, z: i32) -> Self {
        Self { dimension, x, y, z }
    }

    /// Position in the default dimension.
    pub fn at(x: i32, y: i32, z: i32) -> Self {
        Self::new(0, x, y, z)
    }

    /// The adjacent position across `side`. Never leaves the dimension.
    pub fn offset(self, side: Side) -> Self {
        let (dx, dy, dz) = side.offset();
        Self {
            dimension: self.dimension,
            x: self.x.wrapping_add(dx),
            y: self.y.wrapping_add(dy),
            z: self.z.wrapping_add(dz),
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@({}, {}, {})", self.dimension, self.x, self.y, self.z)
    }
}

/// A part slot: a position plus the side the part is mounted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartPos {
    pub pos: Position,
    pub side: Side,
}

impl PartPos {
    pub fn new(pos: Position, side: Side) -> Self {
        Self { pos, side }
    }
}

impl std::fmt::Display for PartPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.pos, self.side)
    }
}
