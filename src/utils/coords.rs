use std::iter::FusedIterator;

use bitflags::bitflags;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::bitflags_with_display;

// World units per tile along X/Y. Distances used by the search heuristic
// are measured in world units, not tiles.
pub const TILE_SIZE: i32 = 32;

// Height units climbed by one sloped path tile.
pub const SLOPE_HEIGHT_STEP: i32 = 2;

// ----------------------------------------------
// Direction
// ----------------------------------------------

// Orthogonal tile direction. The discriminant is the edge bit index,
// so iteration over Direction::ALL is in ascending bit order.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display, Serialize, Deserialize, TryFromPrimitive, IntoPrimitive)]
pub enum Direction {
    SW = 0, // -X
    NW = 1, // +Y
    NE = 2, // +X
    SE = 3, // -Y
}

impl Direction {
    pub const ALL: [Direction; 4] = [Self::SW, Self::NW, Self::NE, Self::SE];

    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    #[inline]
    pub const fn from_index(index: u8) -> Self {
        match index & 3 {
            0 => Self::SW,
            1 => Self::NW,
            2 => Self::NE,
            _ => Self::SE,
        }
    }

    #[inline]
    pub const fn reverse(self) -> Self {
        Self::from_index(self.index() ^ 2)
    }

    // Next direction clockwise in index order (SW -> NW -> NE -> SE -> SW).
    #[inline]
    pub const fn next(self) -> Self {
        Self::from_index(self.index().wrapping_add(1))
    }

    #[inline]
    pub const fn prev(self) -> Self {
        Self::from_index(self.index().wrapping_add(3))
    }

    #[inline]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::SW => (-1,  0),
            Self::NW => ( 0,  1),
            Self::NE => ( 1,  0),
            Self::SE => ( 0, -1),
        }
    }

    #[inline]
    pub const fn edge(self) -> EdgeMask {
        EdgeMask::from_bits_truncate(1 << self.index())
    }
}

// ----------------------------------------------
// EdgeMask
// ----------------------------------------------

bitflags_with_display! {
    // Set of tile edges, one bit per Direction.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct EdgeMask: u8 {
        const SW = 1 << 0;
        const NW = 1 << 1;
        const NE = 1 << 2;
        const SE = 1 << 3;
    }
}

impl EdgeMask {
    #[inline]
    pub fn has(self, direction: Direction) -> bool {
        self.contains(direction.edge())
    }

    #[inline]
    pub fn with(self, direction: Direction) -> Self {
        self | direction.edge()
    }

    #[inline]
    pub fn without(self, direction: Direction) -> Self {
        self - direction.edge()
    }

    #[inline]
    pub fn count(self) -> u32 {
        self.bits().count_ones()
    }

    // Lowest set direction, if any.
    #[inline]
    pub fn first(self) -> Option<Direction> {
        self.directions().next()
    }

    #[inline]
    pub fn directions(self) -> EdgeIter {
        EdgeIter { remaining: self }
    }
}

// Iterates the directions in a mask in ascending bit order.
#[derive(Copy, Clone)]
pub struct EdgeIter {
    remaining: EdgeMask,
}

impl Iterator for EdgeIter {
    type Item = Direction;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let direction = Direction::ALL.into_iter().find(|dir| self.remaining.has(*dir))?;
        self.remaining = self.remaining.without(direction);
        Some(direction)
    }
}

impl FusedIterator for EdgeIter {}

// ----------------------------------------------
// TileLocation
// ----------------------------------------------

// Tile X,Y plus height Z in height units.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileLocation {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl TileLocation {
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    // Neighbor tile at the same height.
    #[inline]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self { x: self.x + dx, y: self.y + dy, z: self.z }
    }

    #[inline]
    pub const fn with_z(self, z: i32) -> Self {
        Self { x: self.x, y: self.y, z }
    }

    #[inline]
    pub const fn same_tile(self, other: TileLocation) -> bool {
        self.x == other.x && self.y == other.y
    }

    #[inline]
    pub const fn world_x(self) -> i32 {
        self.x * TILE_SIZE
    }

    #[inline]
    pub const fn world_y(self) -> i32 {
        self.y * TILE_SIZE
    }

    // X/Y Manhattan distance in world units (height ignored).
    #[inline]
    pub fn manhattan_distance_xy(self, other: TileLocation) -> i32 {
        (self.world_x() - other.world_x()).abs() + (self.world_y() - other.world_y()).abs()
    }
}

impl std::fmt::Display for TileLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "[{},{},{}]", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_reverse_and_rotation() {
        assert_eq!(Direction::SW.reverse(), Direction::NE);
        assert_eq!(Direction::NW.reverse(), Direction::SE);
        assert_eq!(Direction::SE.next(), Direction::SW);
        assert_eq!(Direction::SW.prev(), Direction::SE);
        for dir in Direction::ALL {
            assert_eq!(dir.reverse().reverse(), dir);
            let (dx, dy) = dir.delta();
            let (rx, ry) = dir.reverse().delta();
            assert_eq!((dx + rx, dy + ry), (0, 0));
        }
    }

    #[test]
    fn test_direction_try_from_rejects_out_of_range() {
        assert_eq!(Direction::try_from(2u8).ok(), Some(Direction::NE));
        assert!(Direction::try_from(4u8).is_err());
        let raw: u8 = Direction::SE.into();
        assert_eq!(raw, 3);
    }

    #[test]
    fn test_edge_iteration_is_ascending() {
        let mask = EdgeMask::SE | EdgeMask::SW | EdgeMask::NE;
        let dirs: Vec<Direction> = mask.directions().collect();
        assert_eq!(dirs, vec![Direction::SW, Direction::NE, Direction::SE]);
        assert_eq!(mask.first(), Some(Direction::SW));
        assert_eq!(mask.count(), 3);
        assert_eq!(EdgeMask::empty().first(), None);
        assert_eq!(mask.without(Direction::SW).first(), Some(Direction::NE));
    }

    #[test]
    fn test_edge_mask_display() {
        assert_eq!((EdgeMask::SW | EdgeMask::SE).to_string(), "SW | SE");
        assert_eq!(EdgeMask::empty().to_string(), "(empty)");
    }

    #[test]
    fn test_tile_location_step() {
        let loc = TileLocation::new(10, 10, 4);
        assert_eq!(loc.step(Direction::SW), TileLocation::new(9, 10, 4));
        assert_eq!(loc.step(Direction::NW), TileLocation::new(10, 11, 4));
        assert_eq!(loc.step(Direction::NE), TileLocation::new(11, 10, 4));
        assert_eq!(loc.step(Direction::SE), TileLocation::new(10, 9, 4));
        assert_eq!(loc.manhattan_distance_xy(TileLocation::new(12, 7, 0)), 5 * TILE_SIZE);
    }
}
