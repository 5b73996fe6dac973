use crate::{
    agent::{Agent, MoveResult, NavEvents},
    log,
    utils::coords::EdgeMask,
    world::{PathElement, path_elements_at},
};
use super::{
    PathSearchKind,
    Query,
    SearchGoal,
    choose_direction,
    destination_in_direction,
    next_in_direction,
    goals::{
        path_find_aimless,
        path_find_outside_park,
        path_find_park_exit,
        ride_queue_end,
        ride_station_goal,
        surface_path_finding,
    },
    staff::staff_next_destination,
};

// ----------------------------------------------
// Edge filters
// ----------------------------------------------

// Removes edges leading onto wide paths, unless that removes them all.
fn prune_wide_edges(query: &Query, agent: &Agent, path: &PathElement, edges: EdgeMask) -> EdgeMask {
    let mut adjusted = edges;

    for direction in edges.directions() {
        if next_in_direction(query.tiles, agent.location, path, direction) == PathSearchKind::Wide {
            adjusted = adjusted.without(direction);
        }
    }

    if adjusted.is_empty() { edges } else { adjusted }
}

// Removes edges that lead nowhere a guest wants to go (dead ends, ride exits
// and wide paths), unless that removes them all.
fn prune_useless_edges(query: &Query, agent: &Agent, path: &PathElement, edges: EdgeMask) -> EdgeMask {
    let mut adjusted = edges;

    for direction in edges.directions() {
        let (kind, _) = destination_in_direction(query, agent.location, path, direction);
        if matches!(kind, PathSearchKind::DeadEnd | PathSearchKind::RideExit | PathSearchKind::Wide) {
            adjusted = adjusted.without(direction);
        }
    }

    if adjusted.is_empty() { edges } else { adjusted }
}

// ----------------------------------------------
// Dispatcher
// ----------------------------------------------

// Works out the next tile for `agent` and points it there.
// Raises navigation events on the agent for the owning simulation.
pub fn calculate_next_destination(query: &Query, agent: &mut Agent) -> MoveResult {
    if agent.is_staff() {
        return staff_next_destination(query, agent);
    }

    if agent.on_surface {
        return surface_path_finding(query, agent);
    }

    let Some(path) = path_elements_at(query.tiles, agent.location).next().copied() else {
        return MoveResult::NoPathElement;
    };

    let mut edges = path.permitted_edges(false);
    if edges.is_empty() {
        return surface_path_finding(query, agent);
    }

    if !agent.outside_park && agent.is_heading_to_ride_or_park_exit() {
        edges = prune_wide_edges(query, agent, &path, edges);
    }

    let came_from = agent.direction.reverse();
    if edges.without(came_from).is_empty() {
        agent.nav_events |= NavEvents::DeadEnd;
    } else {
        edges = edges.without(came_from);
    }

    if edges.count() == 1 {
        if let Some(only) = edges.first() {
            return agent.move_one_tile(only);
        }
    }

    if agent.outside_park {
        return path_find_outside_park(query, agent, edges);
    }

    // Guests with food pay less attention to where they are going.
    let configs = query.configs;
    if !agent.has_food() && (query.rand() & 0xFFFF) >= configs.useless_edge_prune_threshold as u32 {
        edges = prune_useless_edges(query, agent, &path, edges);
    }

    if agent.has_map() && edges.count() >= 2 {
        let probability = if agent.is_heading_to_ride_or_park_exit() {
            configs.read_map_probability_heading
        } else {
            configs.read_map_probability
        };
        if (query.rand() & 0xFFFF) < probability as u32 {
            agent.nav_events |= NavEvents::ReadMap;
        }
    }

    if agent.is_leaving_park() {
        return path_find_park_exit(query, agent, edges);
    }

    let Some(ride_id) = agent.heading_to_ride else {
        return path_find_aimless(query, agent, edges);
    };

    let Some(ride) = query.rides.ride(ride_id).filter(|ride| ride.is_open()) else {
        return path_find_aimless(query, agent, edges);
    };

    let Some(station) = ride_station_goal(ride, agent) else {
        log::warn!(log::channel!("pathfind"), "Ride '{}' has no stations; guest at {} wanders instead.", ride.name, agent.location);
        return path_find_aimless(query, agent, edges);
    };

    let goal = SearchGoal::new(ride_queue_end(query.tiles, station), true, Some(ride_id));

    match choose_direction(query, agent, &goal) {
        Some(direction) => agent.move_one_tile(direction),
        None => {
            // Start over next time in case the layout changed.
            agent.memory.reset_goal();
            path_find_aimless(query, agent, edges)
        }
    }
}
