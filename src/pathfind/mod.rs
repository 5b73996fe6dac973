use std::cell::RefCell;

use crate::{
    config::PathfindConfigs,
    sim::ScenarioRandom,
    utils::coords::{Direction, TileLocation},
    world::{
        ElementKind,
        EntranceKind,
        ParkQuery,
        PathElement,
        RideId,
        RideQuery,
        TileQuery,
    },
};

pub mod memory;
mod junction;
mod search;
mod chooser;
mod goals;
mod dispatch;
mod staff;

pub use junction::is_thin_junction;
pub use search::{JunctionRecord, SearchResult};
pub use chooser::{choose_direction, max_junctions_for};
pub use goals::{
    surface_path_finding,
    path_find_aimless,
    path_find_entering_park,
    path_find_leaving_park,
    path_find_park_exit,
    ride_queue_end,
    ride_station_goal,
};
pub use dispatch::calculate_next_destination;
pub use staff::{staff_next_destination, staff_can_ignore_wide_flag, is_on_patrol_edge};


// Capacity of the per-search junction history. Junction caps
// loaded from config are clamped to this.
pub const MAX_JUNCTION_HISTORY: usize = 16;

// ----------------------------------------------
// Query
// ----------------------------------------------

// Everything a navigation step reads from the outside world.
// The map, rides and park are read-only for the duration of a step.
pub struct Query<'a> {
    pub tiles: &'a dyn TileQuery,
    pub rides: &'a dyn RideQuery,
    pub park: &'a dyn ParkQuery,
    pub configs: &'a PathfindConfigs,
    rng: RefCell<&'a mut dyn ScenarioRandom>,
}

impl<'a> Query<'a> {
    pub fn new(tiles: &'a dyn TileQuery,
               rides: &'a dyn RideQuery,
               park: &'a dyn ParkQuery,
               configs: &'a PathfindConfigs,
               rng: &'a mut dyn ScenarioRandom) -> Self {
        Self { tiles, rides, park, configs, rng: RefCell::new(rng) }
    }

    // Next raw draw from the scenario random source.
    #[inline]
    pub fn rand(&self) -> u32 {
        self.rng.borrow_mut().next_rand()
    }

    #[inline]
    pub fn rand_direction(&self) -> Direction {
        Direction::from_index((self.rand() & 3) as u8)
    }

    #[inline]
    pub fn rand_coin(&self) -> bool {
        (self.rand() & 1) != 0
    }
}

// ----------------------------------------------
// SearchGoal
// ----------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SearchGoal {
    pub location: TileLocation,
    // Treat queues of other rides as impassable.
    pub ignore_foreign_queues: bool,
    // Queue belonging to the target ride, never treated as foreign.
    pub queue_ride: Option<RideId>,
}

impl SearchGoal {
    #[inline]
    pub fn new(location: TileLocation, ignore_foreign_queues: bool, queue_ride: Option<RideId>) -> Self {
        Self { location, ignore_foreign_queues, queue_ride }
    }
}

// ----------------------------------------------
// PathSearchKind
// ----------------------------------------------

// What a probe or search step found on the next tile.
#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display)]
pub enum PathSearchKind {
    DeadEnd,
    Wide,
    Thin,
    Junction,
    RideQueue,
    RideEntrance,
    RideExit,
    ParkExit,
    ShopEntrance,
    LimitReached,
    Other,
    Failed,
}

impl PathSearchKind {
    #[inline]
    pub fn is_path(self) -> bool {
        matches!(self, Self::DeadEnd | Self::Wide | Self::Thin | Self::Junction)
    }
}

// ----------------------------------------------
// Heuristic score
// ----------------------------------------------

pub type Score = u16;
pub const SCORE_INFINITE: Score = 0xFFFF;

// Distance estimate in world units. The smaller horizontal delta (Y on a tie)
// is divided by 16 so that straight runs towards the goal are preferred.
// Height differences count double. Zero only at the goal itself.
pub fn heuristic_score(location: TileLocation, goal: TileLocation) -> Score {
    let mut dx = (goal.world_x() - location.world_x()).abs();
    let mut dy = (goal.world_y() - location.world_y()).abs();

    if dx < dy {
        dx >>= 4;
    } else {
        dy >>= 4;
    }

    let dz = (goal.z - location.z).abs() << 1;
    (dx + dy + dz).min(SCORE_INFINITE as i32 - 1) as Score
}

// ----------------------------------------------
// Single-tile probes
// ----------------------------------------------

// Classifies the path reached by leaving `path` (at `location`) through `direction`.
pub fn next_in_direction(tiles: &dyn TileQuery,
                         location: TileLocation,
                         path: &PathElement,
                         direction: Direction) -> PathSearchKind {
    let z = location.z + path.height_step_towards(direction);
    let next = location.step(direction);

    for element in tiles.elements_at(next.x, next.y) {
        if element.is_ghost() {
            continue;
        }
        let Some(next_path) = element.as_path() else {
            continue;
        };
        if !next_path.is_valid_z_and_direction(element.base_z, z, direction) {
            continue;
        }

        if next_path.is_wide() {
            return PathSearchKind::Wide;
        }
        if next_path.is_queue() && next_path.ride.is_some() {
            return PathSearchKind::RideQueue;
        }
        return PathSearchKind::Other;
    }

    PathSearchKind::Failed
}

// Follows single-width path from `location` through `direction` until something
// other than a plain corridor tile is found. Returns the ride for ride/shop results.
pub fn destination_in_direction(query: &Query,
                                location: TileLocation,
                                path: &PathElement,
                                direction: Direction) -> (PathSearchKind, Option<RideId>) {
    let z = location.z + path.height_step_towards(direction);
    destination_in_direction_recursive(query, location.with_z(z), direction, 0)
}

fn destination_in_direction_recursive(query: &Query,
                                      from: TileLocation,
                                      direction: Direction,
                                      depth: u16) -> (PathSearchKind, Option<RideId>) {
    if depth > query.configs.destination_probe_max_depth as u16 {
        return (PathSearchKind::LimitReached, None);
    }

    let next = from.step(direction);
    let z = from.z;

    for element in query.tiles.elements_at(next.x, next.y) {
        if element.is_ghost() {
            continue;
        }

        match &element.kind {
            ElementKind::Track(track) => {
                if z != element.base_z {
                    continue;
                }
                if query.rides.ride(track.ride).is_some_and(|ride| ride.is_shop) {
                    return (PathSearchKind::ShopEntrance, Some(track.ride));
                }
            }
            ElementKind::Entrance(entrance) => {
                if z != element.base_z {
                    continue;
                }
                match entrance.kind {
                    EntranceKind::RideEntrance if entrance.direction == direction => {
                        return (PathSearchKind::RideEntrance, entrance.ride);
                    }
                    EntranceKind::RideExit if entrance.direction == direction => {
                        return (PathSearchKind::RideExit, entrance.ride);
                    }
                    EntranceKind::ParkEntrance => {
                        return (PathSearchKind::ParkExit, None);
                    }
                    _ => {}
                }
            }
            ElementKind::Path(next_path) => {
                if !next_path.is_valid_z_and_direction(element.base_z, z, direction) {
                    continue;
                }
                if next_path.is_wide() {
                    return (PathSearchKind::Wide, None);
                }

                let edges = next_path.permitted_edges(false).without(direction.reverse());
                let mut forward = edges.directions();

                return match (forward.next(), forward.next()) {
                    (None, _) => (PathSearchKind::DeadEnd, None),
                    (Some(_), Some(_)) => (PathSearchKind::Junction, None),
                    (Some(onward), None) => {
                        let height = element.base_z + next_path.height_step_towards(onward);
                        destination_in_direction_recursive(query, next.with_z(height), onward, depth + 1)
                    }
                };
            }
        }
    }

    (PathSearchKind::Failed, None)
}
