use bitflags::bitflags;
use serde::{Serialize, Deserialize};
use strum::Display;

use crate::{
    bitflags_with_display,
    pathfind::memory::AgentPathMemory,
    utils::coords::{Direction, TileLocation},
    world::{RideId, TileQuery},
};

pub mod patrol;
pub use patrol::PatrolArea;

// ----------------------------------------------
// AgentKind / AgentState
// ----------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum StaffKind {
    Handyman,
    Mechanic,
    Security,
    Entertainer,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum AgentKind {
    Guest,
    Staff(StaffKind),
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum AgentState {
    #[default]
    Walking,
    EnteringPark,
    LeavingPark,
    // Mechanic responding to a breakdown call.
    Answering,
    HeadingToInspection,
}

// ----------------------------------------------
// Flags
// ----------------------------------------------

bitflags_with_display! {
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct AgentFlags: u8 {
        const LeavingPark = 1 << 0;
    }
}

bitflags_with_display! {
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ItemFlags: u16 {
        const Map       = 1 << 0;
        const Umbrella  = 1 << 1;
        const Burger    = 1 << 2;
        const Chips     = 1 << 3;
        const IceCream  = 1 << 4;
        const Drink     = 1 << 5;
        const Popcorn   = 1 << 6;
        const Candyfloss = 1 << 7;
    }
}

impl ItemFlags {
    pub const FOOD: ItemFlags = ItemFlags::Burger
        .union(ItemFlags::Chips)
        .union(ItemFlags::IceCream)
        .union(ItemFlags::Drink)
        .union(ItemFlags::Popcorn)
        .union(ItemFlags::Candyfloss);
}

bitflags_with_display! {
    // Things that happened during the last navigation step which the owning
    // simulation reacts to (thoughts, lost counters, etc). Cleared by the caller.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct NavEvents: u8 {
        const DeadEnd = 1 << 0;
        const ReadMap = 1 << 1;
    }
}

// ----------------------------------------------
// MoveResult
// ----------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveResult {
    // The agent now walks one tile in this direction.
    Moved(Direction),
    // No path element at the agent's height. The agent does not move.
    NoPathElement,
}

impl MoveResult {
    #[inline]
    pub fn direction(self) -> Option<Direction> {
        match self {
            Self::Moved(direction) => Some(direction),
            Self::NoPathElement => None,
        }
    }
}

// ----------------------------------------------
// StaffRideTarget
// ----------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffRideTarget {
    pub ride: RideId,
    pub station: u8,
}

// ----------------------------------------------
// Agent
// ----------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Agent {
    pub kind: AgentKind,
    pub state: AgentState,
    pub flags: AgentFlags,
    pub items: ItemFlags,

    // Tile the agent is standing on (or about to reach) and the
    // direction of its last step.
    pub location: TileLocation,
    pub direction: Direction,
    pub destination: Option<TileLocation>,

    // Walking on bare terrain rather than a path.
    pub on_surface: bool,
    pub outside_park: bool,
    pub lost_countdown: u8,

    // Guests:
    pub heading_to_ride: Option<RideId>,
    pub rides_visited: u32,
    pub chosen_park_entrance: Option<usize>,

    // Staff:
    pub patrol: Option<PatrolArea>,
    pub ride_target: Option<StaffRideTarget>,

    pub memory: AgentPathMemory,
    pub nav_events: NavEvents,
}

impl Agent {
    pub fn new(kind: AgentKind, location: TileLocation, direction: Direction) -> Self {
        Self {
            kind,
            state: AgentState::Walking,
            flags: AgentFlags::empty(),
            items: ItemFlags::empty(),
            location,
            direction,
            destination: None,
            on_surface: false,
            outside_park: false,
            lost_countdown: u8::MAX,
            heading_to_ride: None,
            rides_visited: 0,
            chosen_park_entrance: None,
            patrol: None,
            ride_target: None,
            memory: AgentPathMemory::default(),
            nav_events: NavEvents::empty(),
        }
    }

    #[inline]
    pub fn guest(location: TileLocation, direction: Direction) -> Self {
        Self::new(AgentKind::Guest, location, direction)
    }

    #[inline]
    pub fn staff(staff_kind: StaffKind, location: TileLocation, direction: Direction) -> Self {
        Self::new(AgentKind::Staff(staff_kind), location, direction)
    }

    #[inline]
    pub fn is_staff(&self) -> bool {
        matches!(self.kind, AgentKind::Staff(_))
    }

    #[inline]
    pub fn is_mechanic(&self) -> bool {
        self.kind == AgentKind::Staff(StaffKind::Mechanic)
    }

    #[inline]
    pub fn is_leaving_park(&self) -> bool {
        self.flags.intersects(AgentFlags::LeavingPark)
    }

    #[inline]
    pub fn has_map(&self) -> bool {
        self.items.intersects(ItemFlags::Map)
    }

    #[inline]
    pub fn has_food(&self) -> bool {
        self.items.intersects(ItemFlags::FOOD)
    }

    #[inline]
    pub fn is_heading_to_ride_or_park_exit(&self) -> bool {
        self.is_leaving_park() || self.heading_to_ride.is_some()
    }

    // Mechanic on its way to a ride that called for it.
    #[inline]
    pub fn is_heading_to_ride_station(&self) -> bool {
        matches!(self.state, AgentState::Answering | AgentState::HeadingToInspection)
    }

    // A location is inside this staff member's patrol when the park owns
    // it and, if the staff member has a patrol area, the area covers it.
    pub fn is_in_patrol(&self, tiles: &dyn TileQuery, x: i32, y: i32) -> bool {
        if !tiles.is_owned_by_park(x, y) {
            return false;
        }
        match &self.patrol {
            Some(area) => area.contains(x, y),
            None => true,
        }
    }

    // Faces `direction` and targets the neighboring tile.
    pub fn move_one_tile(&mut self, direction: Direction) -> MoveResult {
        self.direction = direction;
        self.destination = Some(self.location.step(direction));
        MoveResult::Moved(direction)
    }

    // Advances to the current destination, as the simulation would
    // once the agent has walked there.
    pub fn arrive(&mut self) {
        if let Some(destination) = self.destination.take() {
            self.location = destination;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::TileMap;

    #[test]
    fn test_move_one_tile() {
        let mut agent = Agent::guest(TileLocation::new(3, 3, 2), Direction::SW);
        assert_eq!(agent.move_one_tile(Direction::NW), MoveResult::Moved(Direction::NW));
        assert_eq!(agent.direction, Direction::NW);
        assert_eq!(agent.destination, Some(TileLocation::new(3, 4, 2)));

        agent.arrive();
        assert_eq!(agent.location, TileLocation::new(3, 4, 2));
        assert_eq!(agent.destination, None);
    }

    #[test]
    fn test_item_food() {
        let mut agent = Agent::guest(TileLocation::default(), Direction::SW);
        agent.items = ItemFlags::Map | ItemFlags::Umbrella;
        assert!(!agent.has_food());
        assert!(agent.has_map());
        agent.items |= ItemFlags::Drink;
        assert!(agent.has_food());
    }

    #[test]
    fn test_patrol_membership() {
        let mut map = TileMap::new(16, 16);
        map.set_owned_by_park(15, 15, false);

        let mut staff = Agent::staff(StaffKind::Mechanic, TileLocation::default(), Direction::SW);
        assert!(staff.is_in_patrol(&map, 10, 10));
        assert!(!staff.is_in_patrol(&map, 15, 15));

        let mut area = PatrolArea::new();
        area.set_rect((0, 0), (3, 3), true);
        staff.patrol = Some(area);
        assert!(staff.is_in_patrol(&map, 2, 2));
        assert!(!staff.is_in_patrol(&map, 10, 10));
    }
}
