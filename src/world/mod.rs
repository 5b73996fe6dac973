use bitflags::bitflags;
use serde::{Serialize, Deserialize};

use crate::{
    bitflags_with_display,
    utils::coords::{Direction, EdgeMask, TileLocation, SLOPE_HEIGHT_STEP},
};

pub mod map;
pub mod ride;
pub mod park;

pub use map::TileMap;
pub use ride::{Ride, RideRegistry, RideStatus, Station, DepartFlags};
pub use park::{ParkInfo, PeepSpawn};


pub type RideId = u16;

// ----------------------------------------------
// Element flags
// ----------------------------------------------

bitflags_with_display! {
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ElementFlags: u8 {
        // Placement preview. Invisible to navigation.
        const Ghost = 1 << 0;
    }
}

bitflags_with_display! {
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PathFlags: u8 {
        const Wide   = 1 << 0;
        const Queue  = 1 << 1;
        const Sloped = 1 << 2;
    }
}

// ----------------------------------------------
// PathElement
// ----------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathElement {
    pub edges: EdgeMask,
    pub flags: PathFlags,
    // Only meaningful when PathFlags::Sloped is set. The path rises
    // by SLOPE_HEIGHT_STEP when walked in this direction.
    pub slope_direction: Direction,
    // Ride a queue tile leads to, if any.
    pub ride: Option<RideId>,
    // Edges closed to guests by banners. Staff ignore banners.
    pub banner_blocked_edges: EdgeMask,
}

impl PathElement {
    #[inline]
    pub fn new(edges: EdgeMask) -> Self {
        Self {
            edges,
            flags: PathFlags::empty(),
            slope_direction: Direction::SW,
            ride: None,
            banner_blocked_edges: EdgeMask::empty(),
        }
    }

    #[inline]
    pub fn wide(mut self) -> Self {
        self.flags.insert(PathFlags::Wide);
        self
    }

    #[inline]
    pub fn queue(mut self, ride: Option<RideId>) -> Self {
        self.flags.insert(PathFlags::Queue);
        self.ride = ride;
        self
    }

    #[inline]
    pub fn sloped(mut self, direction: Direction) -> Self {
        self.flags.insert(PathFlags::Sloped);
        self.slope_direction = direction;
        self
    }

    #[inline]
    pub fn with_banners(mut self, blocked: EdgeMask) -> Self {
        self.banner_blocked_edges = blocked;
        self
    }

    #[inline]
    pub fn is_wide(&self) -> bool {
        self.flags.intersects(PathFlags::Wide)
    }

    #[inline]
    pub fn is_queue(&self) -> bool {
        self.flags.intersects(PathFlags::Queue)
    }

    #[inline]
    pub fn is_sloped(&self) -> bool {
        self.flags.intersects(PathFlags::Sloped)
    }

    #[inline]
    pub fn slope(&self) -> Option<Direction> {
        if self.is_sloped() { Some(self.slope_direction) } else { None }
    }

    // Height change when leaving this tile through `direction`.
    #[inline]
    pub fn height_step_towards(&self, direction: Direction) -> i32 {
        if self.slope() == Some(direction) { SLOPE_HEIGHT_STEP } else { 0 }
    }

    #[inline]
    pub fn permitted_edges(&self, ignore_banners: bool) -> EdgeMask {
        if ignore_banners {
            self.edges
        } else {
            self.edges - self.banner_blocked_edges
        }
    }

    // Can a walker at height `z` moving in `direction` step onto this
    // path element placed at `base_z`?
    pub fn is_valid_z_and_direction(&self, base_z: i32, z: i32, direction: Direction) -> bool {
        match self.slope() {
            Some(slope) if slope == direction => z == base_z,
            Some(slope) if slope.reverse() == direction => z == base_z + SLOPE_HEIGHT_STEP,
            Some(_) => false,
            None => z == base_z,
        }
    }
}

// ----------------------------------------------
// Entrances & Track
// ----------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntranceKind {
    RideEntrance,
    RideExit,
    ParkEntrance,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntranceElement {
    pub kind: EntranceKind,
    // Direction a guest walks in to go through the entrance.
    pub direction: Direction,
    pub ride: Option<RideId>,
    pub station: u8,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackElement {
    pub ride: RideId,
}

// ----------------------------------------------
// TileElement
// ----------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementKind {
    Path(PathElement),
    Entrance(EntranceElement),
    Track(TrackElement),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileElement {
    pub base_z: i32,
    pub flags: ElementFlags,
    pub kind: ElementKind,
}

impl TileElement {
    #[inline]
    pub fn path(base_z: i32, path: PathElement) -> Self {
        Self { base_z, flags: ElementFlags::empty(), kind: ElementKind::Path(path) }
    }

    #[inline]
    pub fn entrance(base_z: i32, entrance: EntranceElement) -> Self {
        Self { base_z, flags: ElementFlags::empty(), kind: ElementKind::Entrance(entrance) }
    }

    #[inline]
    pub fn track(base_z: i32, ride: RideId) -> Self {
        Self { base_z, flags: ElementFlags::empty(), kind: ElementKind::Track(TrackElement { ride }) }
    }

    #[inline]
    pub fn ghost(mut self) -> Self {
        self.flags.insert(ElementFlags::Ghost);
        self
    }

    #[inline]
    pub fn is_ghost(&self) -> bool {
        self.flags.intersects(ElementFlags::Ghost)
    }

    #[inline]
    pub fn as_path(&self) -> Option<&PathElement> {
        match &self.kind {
            ElementKind::Path(path) => Some(path),
            _ => None,
        }
    }

    #[inline]
    pub fn as_entrance(&self) -> Option<&EntranceElement> {
        match &self.kind {
            ElementKind::Entrance(entrance) => Some(entrance),
            _ => None,
        }
    }
}

// ----------------------------------------------
// Query interfaces
// ----------------------------------------------

pub trait TileQuery {
    // All elements stacked on tile (x,y). Empty outside the map.
    fn elements_at(&self, x: i32, y: i32) -> &[TileElement];

    // Is there a wall on `location`'s tile blocking its `direction` edge?
    fn is_wall_in_the_way(&self, location: TileLocation, direction: Direction) -> bool;

    fn is_surface_blocked(&self, x: i32, y: i32) -> bool;

    fn is_owned_by_park(&self, x: i32, y: i32) -> bool;
}

pub trait RideQuery {
    fn ride(&self, id: RideId) -> Option<&Ride>;
}

pub trait ParkQuery {
    fn park_entrances(&self) -> &[TileLocation];
    fn peep_spawns(&self) -> &[PeepSpawn];
}

// Non-ghost path elements on a tile whose base height is exactly `z`.
pub fn path_elements_at(tiles: &dyn TileQuery, location: TileLocation) -> impl Iterator<Item = &PathElement> {
    tiles.elements_at(location.x, location.y)
        .iter()
        .filter(move |element| !element.is_ghost() && element.base_z == location.z)
        .filter_map(TileElement::as_path)
}
