use crate::{
    agent::{Agent, AgentState, MoveResult},
    log,
    utils::coords::{Direction, EdgeMask, TileLocation},
    world::{ParkQuery, PathElement, Ride, TileQuery},
};
use super::{Query, SearchGoal, choose_direction};

// Safety net for malformed queue layouts that loop back on themselves.
const QUEUE_WALK_MAX_TILES: usize = 1024;

// ----------------------------------------------
// Off-path recovery
// ----------------------------------------------

#[inline]
fn is_surface_direction_open(tiles: &dyn TileQuery, location: TileLocation, direction: Direction) -> bool {
    if tiles.is_wall_in_the_way(location, direction) {
        return false;
    }
    let next = location.step(direction);
    if tiles.is_wall_in_the_way(next, direction.reverse()) {
        return false;
    }
    !tiles.is_surface_blocked(next.x, next.y)
}

// Tries `initial`, then one of its side neighbors (chosen by a coin flip),
// then the other side neighbor. Only draws the coin if `initial` is closed.
pub(super) fn first_open_surface_direction(query: &Query, location: TileLocation, initial: Direction) -> Option<Direction> {
    if is_surface_direction_open(query.tiles, location, initial) {
        return Some(initial);
    }

    let side = if query.rand_coin() { initial.prev() } else { initial.next() };
    if is_surface_direction_open(query.tiles, location, side) {
        return Some(side);
    }

    let other_side = side.reverse();
    if is_surface_direction_open(query.tiles, location, other_side) {
        return Some(other_side);
    }

    None
}

// Picks a direction for an agent walking on bare terrain. When every
// candidate is walled off the agent turns around.
pub fn surface_path_finding(query: &Query, agent: &mut Agent) -> MoveResult {
    let initial = query.rand_direction();
    let direction = first_open_surface_direction(query, agent.location, initial)
        .unwrap_or(initial.reverse());
    agent.move_one_tile(direction)
}

// ----------------------------------------------
// Aimless wander
// ----------------------------------------------

pub fn path_find_aimless(query: &Query, agent: &mut Agent, edges: EdgeMask) -> MoveResult {
    if edges.is_empty() {
        // Nothing to sample from.
        return surface_path_finding(query, agent);
    }

    if query.rand_coin() && edges.has(agent.direction) {
        return agent.move_one_tile(agent.direction);
    }

    loop {
        let direction = query.rand_direction();
        if edges.has(direction) {
            return agent.move_one_tile(direction);
        }
    }
}

// ----------------------------------------------
// Park entrances & spawns
// ----------------------------------------------

// First entry wins ties.
fn nearest_index<T>(items: &[T], location: TileLocation, item_location: impl Fn(&T) -> TileLocation) -> Option<usize> {
    let mut nearest = None;
    let mut nearest_dist = i32::MAX;

    for (index, item) in items.iter().enumerate() {
        let dist = item_location(item).manhattan_distance_xy(location);
        if dist < nearest_dist {
            nearest_dist = dist;
            nearest = Some(index);
        }
    }

    nearest
}

pub fn nearest_park_entrance_index(park: &dyn ParkQuery, location: TileLocation) -> Option<usize> {
    nearest_index(park.park_entrances(), location, |entrance| *entrance)
}

pub fn nearest_peep_spawn_index(park: &dyn ParkQuery, location: TileLocation) -> Option<usize> {
    nearest_index(park.peep_spawns(), location, |spawn| spawn.location)
}

fn move_towards_or_wander(query: &Query, agent: &mut Agent, goal: &SearchGoal, edges: EdgeMask) -> MoveResult {
    match choose_direction(query, agent, goal) {
        Some(direction) => agent.move_one_tile(direction),
        None => path_find_aimless(query, agent, edges),
    }
}

// Guest outside the park walking towards the nearest park entrance.
pub fn path_find_entering_park(query: &Query, agent: &mut Agent, edges: EdgeMask) -> MoveResult {
    let Some(index) = nearest_park_entrance_index(query.park, agent.location) else {
        return path_find_aimless(query, agent, edges);
    };

    let goal = SearchGoal::new(query.park.park_entrances()[index], true, None);
    move_towards_or_wander(query, agent, &goal, edges)
}

// Guest outside the park walking off the map through the nearest spawn.
pub fn path_find_leaving_park(query: &Query, agent: &mut Agent, edges: EdgeMask) -> MoveResult {
    let Some(index) = nearest_peep_spawn_index(query.park, agent.location) else {
        return path_find_aimless(query, agent, edges);
    };

    let spawn = query.park.peep_spawns()[index];
    if spawn.location.same_tile(agent.location) {
        return agent.move_one_tile(spawn.direction);
    }

    let goal = SearchGoal::new(spawn.location, true, None);
    move_towards_or_wander(query, agent, &goal, edges)
}

// Guest inside the park heading for the way out. The chosen entrance is
// kept until it disappears so the guest does not flip between exits.
pub fn path_find_park_exit(query: &Query, agent: &mut Agent, edges: EdgeMask) -> MoveResult {
    let entrances = query.park.park_entrances();

    if agent.chosen_park_entrance.is_some_and(|index| index >= entrances.len()) {
        log::info!(log::channel!("pathfind"), "Chosen park entrance no longer exists; picking another.");
        agent.chosen_park_entrance = None;
    }

    if agent.chosen_park_entrance.is_none() {
        agent.chosen_park_entrance = nearest_park_entrance_index(query.park, agent.location);
    }

    let Some(index) = agent.chosen_park_entrance else {
        return path_find_aimless(query, agent, edges);
    };

    let goal = SearchGoal::new(entrances[index], true, None);
    move_towards_or_wander(query, agent, &goal, edges)
}

// Dispatch for guests standing outside the park.
pub(super) fn path_find_outside_park(query: &Query, agent: &mut Agent, edges: EdgeMask) -> MoveResult {
    match agent.state {
        AgentState::EnteringPark => path_find_entering_park(query, agent, edges),
        AgentState::LeavingPark => path_find_leaving_park(query, agent, edges),
        _ => path_find_aimless(query, agent, edges),
    }
}

// ----------------------------------------------
// Ride stations & queues
// ----------------------------------------------

// Entrance of the station a guest should walk to. With synchronised stations
// guests cycle through them by ride count so they try every section of the ride.
// Rides without any entrance fall back to the first station's start.
pub fn ride_station_goal(ride: &Ride, agent: &Agent) -> Option<TileLocation> {
    let mut closest_dist = i32::MAX;
    let mut closest_station = 0;
    let mut entrance_stations: u32 = 0;
    let mut num_entrance_stations: u32 = 0;

    for (index, station) in ride.stations.iter().enumerate() {
        let Some(entrance) = station.entrance else {
            continue;
        };
        num_entrance_stations += 1;
        entrance_stations |= 1 << index;

        let dist = entrance.manhattan_distance_xy(agent.location);
        if dist < closest_dist {
            closest_dist = dist;
            closest_station = index;
        }
    }

    if num_entrance_stations == 0 {
        return ride.station(0).map(|station| station.start);
    }

    if num_entrance_stations > 1 && ride.synchronises_stations() {
        let mut select = agent.rides_visited % num_entrance_stations;
        while select > 0 {
            entrance_stations &= entrance_stations - 1;
            select -= 1;
        }
        closest_station = entrance_stations.trailing_zeros() as usize;
    }

    ride.station(closest_station).and_then(|station| station.entrance)
}

// Walks the queue line connected to the ride entrance at `entrance` and
// returns its last tile, so guests join the back of the queue. At forks the
// walk goes straight, then turns to the next edge, then to the opposite one.
// Returns `entrance` unchanged when no queue is connected.
pub fn ride_queue_end(tiles: &dyn TileQuery, entrance: TileLocation) -> TileLocation {
    let Some(entrance_element) = tiles.elements_at(entrance.x, entrance.y)
        .iter()
        .filter(|element| !element.is_ghost() && element.base_z == entrance.z)
        .find_map(|element| element.as_entrance()) else {
        return entrance;
    };

    let mut direction = entrance_element.direction.reverse();
    let mut base_z = entrance.z;
    let mut current = entrance;

    // Path tile the walk is standing on (None on the entrance tile itself).
    let mut current_path: Option<(i32, PathElement)> = None;
    let mut last_path: Option<(TileLocation, PathElement)> = None;
    // First queue element stepped on. Never entered twice.
    let mut first_path: Option<(i32, i32, usize)> = None;

    for _ in 0..QUEUE_WALK_MAX_TILES {
        if let Some((path_z, path)) = current_path {
            last_path = Some((current.with_z(path_z), path));
            if path.slope() == Some(direction) {
                base_z += 2;
            }
        }

        let next = current.step(direction);
        let mut found = None;

        for (index, element) in tiles.elements_at(next.x, next.y).iter().enumerate() {
            if first_path == Some((next.x, next.y, index)) {
                continue;
            }
            let Some(path) = element.as_path() else {
                continue;
            };

            if element.base_z == base_z {
                if path.slope().is_some_and(|slope| slope != direction) {
                    break;
                }
                found = Some((index, element.base_z, *path));
                break;
            }

            if element.base_z == base_z - 2 {
                if path.slope() != Some(direction.reverse()) {
                    break;
                }
                base_z -= 2;
                found = Some((index, element.base_z, *path));
                break;
            }
        }

        let Some((index, path_z, path)) = found else {
            break;
        };
        if !path.is_queue() || !path.edges.has(direction.reverse()) {
            break;
        }
        if first_path.is_none() {
            first_path = Some((next.x, next.y, index));
        }

        current = next;
        current_path = Some((path_z, path));

        if path.edges.has(direction) {
            continue;
        }
        direction = direction.next();
        if path.edges.has(direction) {
            continue;
        }
        direction = direction.reverse();
        if path.edges.has(direction) {
            continue;
        }
        break;
    }

    match last_path {
        Some((location, path)) if path.is_queue() => location,
        _ => entrance,
    }
}
