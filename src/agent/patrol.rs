use bitvec::vec::BitVec;
use serde::{Serialize, Deserialize};

// Patrol areas are stored at a resolution of 4x4 tile quads
// over a map of up to PATROL_AREA_MAP_TILES tiles per side.
pub const PATROL_QUAD_SIZE: i32 = 4;
pub const PATROL_AREA_MAP_TILES: i32 = 256;
const QUADS_PER_SIDE: i32 = PATROL_AREA_MAP_TILES / PATROL_QUAD_SIZE;

// ----------------------------------------------
// PatrolArea
// ----------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatrolArea {
    quads: BitVec,
}

impl Default for PatrolArea {
    fn default() -> Self {
        Self::new()
    }
}

impl PatrolArea {
    pub fn new() -> Self {
        Self { quads: BitVec::repeat(false, (QUADS_PER_SIDE * QUADS_PER_SIDE) as usize) }
    }

    #[inline]
    fn quad_index(x: i32, y: i32) -> Option<usize> {
        if (x < 0 || x >= PATROL_AREA_MAP_TILES) || (y < 0 || y >= PATROL_AREA_MAP_TILES) {
            return None;
        }
        let qx = x / PATROL_QUAD_SIZE;
        let qy = y / PATROL_QUAD_SIZE;
        Some((qx + (qy * QUADS_PER_SIDE)) as usize)
    }

    // Marks or clears the whole quad containing tile (x,y).
    pub fn set(&mut self, x: i32, y: i32, value: bool) {
        if let Some(index) = Self::quad_index(x, y) {
            self.quads.set(index, value);
        }
    }

    // Marks every quad touched by the tile rectangle [min, max] inclusive.
    pub fn set_rect(&mut self, min: (i32, i32), max: (i32, i32), value: bool) {
        for y in min.1..=max.1 {
            for x in min.0..=max.0 {
                self.set(x, y, value);
            }
        }
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        Self::quad_index(x, y).is_some_and(|index| self.quads[index])
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.quads.not_any()
    }
}
