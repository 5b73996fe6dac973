use crate::{
    agent::{Agent, MoveResult},
    log,
    utils::coords::{Direction, EdgeMask, TileLocation},
    world::{PathElement, TileQuery, path_elements_at},
};
use super::{Query, SearchGoal, choose_direction, goals::first_open_surface_direction};

// All 8 neighbors, cardinal directions first.
const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, 0), (0, 1), (1, 0), (0, -1),
    (-1, -1), (-1, 1), (1, 1), (1, -1),
];

// ----------------------------------------------
// Patrol area queries
// ----------------------------------------------

// Inside the staff member's patrol with at least one neighbor outside of it.
pub fn is_on_patrol_edge(tiles: &dyn TileQuery, agent: &Agent, x: i32, y: i32) -> bool {
    NEIGHBOR_OFFSETS.iter().any(|(dx, dy)| !agent.is_in_patrol(tiles, x + dx, y + dy))
}

// Edges leading to a tile inside the patrol. All four when none do,
// so a staff member that wandered outside can still move.
pub fn valid_patrol_directions(tiles: &dyn TileQuery, agent: &Agent, location: TileLocation) -> EdgeMask {
    let mut directions = EdgeMask::empty();

    for direction in Direction::ALL {
        let next = location.step(direction);
        if agent.is_in_patrol(tiles, next.x, next.y) {
            directions |= direction.edge();
        }
    }

    if directions.is_empty() { EdgeMask::all() } else { directions }
}

// Wide paths can wall off part of a patrol area from the search. A wide path
// on the patrol edge is passable when its neighbors that are inside the patrol
// (but not on its edge) are:
//  - none: concave corner of the area.
//  - one or two: at most one less of them holds a connected path than there
//    are neighbors, or all of them hold connected wide paths.
pub fn staff_can_ignore_wide_flag(tiles: &dyn TileQuery, agent: &Agent, location: TileLocation, path: &PathElement) -> bool {
    if !agent.is_staff() {
        return false;
    }
    if !is_on_patrol_edge(tiles, agent, location.x, location.y) {
        return false;
    }

    let mut total = 0;
    let mut path_count = 0;
    let mut wide_count = 0;

    for direction in Direction::ALL {
        let adjacent = location.step(direction);

        if !agent.is_in_patrol(tiles, adjacent.x, adjacent.y) {
            continue;
        }
        if is_on_patrol_edge(tiles, agent, adjacent.x, adjacent.y) {
            continue;
        }

        total += 1;

        if !path.edges.has(direction) {
            continue;
        }

        let z = location.z + path.height_step_towards(direction);
        let mut path_found = false;
        let mut wide_found = false;

        for element in tiles.elements_at(adjacent.x, adjacent.y) {
            let Some(adjacent_path) = element.as_path() else {
                continue;
            };
            if !adjacent_path.is_valid_z_and_direction(element.base_z, z, direction) {
                continue;
            }
            path_found = true;
            wide_found |= adjacent_path.is_wide();
        }

        if path_found {
            path_count += 1;
        }
        if wide_found {
            wide_count += 1;
        }
    }

    match total {
        0 => true,
        1 | 2 => path_count < total || wide_count == total,
        _ => false,
    }
}

// ----------------------------------------------
// Ride stations
// ----------------------------------------------

// Exit of the station the staff member was called to, or its entrance
// when the station has no exit.
fn station_target_location(query: &Query, agent: &Agent) -> Option<TileLocation> {
    let target = agent.ride_target?;
    let ride = query.rides.ride(target.ride)?;
    let station = ride.station(target.station as usize)?;
    station.exit.or(station.entrance)
}

// Cardinal direction roughly facing `target`. Y wins ties.
fn direction_towards(from: TileLocation, target: TileLocation) -> Direction {
    let dx = target.world_x() - from.world_x();
    let dy = target.world_y() - from.world_y();

    if dx.abs() <= dy.abs() {
        if dy < 0 { Direction::SE } else { Direction::NW }
    } else if dx < 0 {
        Direction::SW
    } else {
        Direction::NE
    }
}

// ----------------------------------------------
// Direction pickers
// ----------------------------------------------

fn staff_direction_surface(query: &Query, agent: &Agent, initial: Direction) -> Direction {
    first_open_surface_direction(query, agent.location, initial).unwrap_or(initial)
}

// Mechanics called to a ride lean towards it half of the time.
fn mechanic_direction_surface(query: &Query, agent: &Agent) -> Direction {
    let mut direction = query.rand_direction();

    if agent.is_heading_to_ride_station() && query.rand_coin() {
        if let Some(target) = station_target_location(query, agent) {
            direction = direction_towards(agent.location, target);
        }
    }

    staff_direction_surface(query, agent, direction)
}

// Coin flip to keep going straight, otherwise the first usable edge
// scanning clockwise from a random start.
fn random_path_direction(query: &Query, agent: &Agent, directions: EdgeMask) -> Direction {
    if query.rand_coin() && directions.has(agent.direction) {
        return agent.direction;
    }

    let mut direction = query.rand_direction();
    for _ in 0..4 {
        if directions.has(direction) {
            return direction;
        }
        direction = direction.next();
    }

    agent.direction
}

// Removes the edge the agent came through unless it is the only way out.
fn forward_directions(agent: &Agent, directions: EdgeMask) -> EdgeMask {
    let forward = directions.without(agent.direction.reverse());
    if forward.is_empty() { directions } else { forward }
}

fn mechanic_direction_path(query: &Query, agent: &mut Agent, valid: EdgeMask, path: &PathElement) -> Direction {
    let directions = path.edges & valid;
    if directions.is_empty() {
        return mechanic_direction_surface(query, agent);
    }

    let directions = forward_directions(agent, directions);
    if directions.count() == 1 && !agent.is_heading_to_ride_station() {
        if let Some(only) = directions.first() {
            return only;
        }
    }

    if !agent.is_heading_to_ride_station() {
        return random_path_direction(query, agent, directions);
    }

    let Some(target) = station_target_location(query, agent) else {
        log::warn!(log::channel!("staff"), "Mechanic at {} heading to a station with no entrance or exit.", agent.location);
        return random_path_direction(query, agent, directions);
    };

    let goal = SearchGoal::new(target, false, None);
    match choose_direction(query, agent, &goal) {
        Some(direction) => direction,
        None => {
            // Start over next time in case the layout changed.
            agent.memory.reset_goal();
            random_path_direction(query, agent, directions)
        }
    }
}

fn staff_direction_path(query: &Query, agent: &Agent, valid: EdgeMask, path: &PathElement) -> Direction {
    let mut directions = path.edges;
    if !agent.is_heading_to_ride_station() {
        directions &= valid;
    }

    if directions.is_empty() {
        return staff_direction_surface(query, agent, query.rand_direction());
    }

    let directions = forward_directions(agent, directions);
    if directions.count() == 1 {
        if let Some(only) = directions.first() {
            return only;
        }
    }

    let mut direction = query.rand_direction();
    for _ in 0..4 {
        if directions.has(direction) {
            return direction;
        }
        direction = direction.next();
    }

    direction
}

// ----------------------------------------------
// Staff dispatcher
// ----------------------------------------------

// Next step for a staff member. Staff stay inside their patrol area where
// possible. Mechanics called to a ride search for its station, everyone
// else wanders.
pub fn staff_next_destination(query: &Query, agent: &mut Agent) -> MoveResult {
    let valid = valid_patrol_directions(query.tiles, agent, agent.location);

    let direction = if agent.on_surface {
        if agent.is_mechanic() {
            mechanic_direction_surface(query, agent)
        } else {
            staff_direction_surface(query, agent, query.rand_direction())
        }
    } else {
        let Some(path) = path_elements_at(query.tiles, agent.location).next().copied() else {
            return MoveResult::NoPathElement;
        };

        if agent.is_mechanic() {
            mechanic_direction_path(query, agent, valid, &path)
        } else {
            staff_direction_path(query, agent, valid, &path)
        }
    };

    agent.move_one_tile(direction)
}
