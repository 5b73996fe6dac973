use crate::{
    agent::Agent,
    config::PathfindConfigs,
    utils::coords::{Direction, EdgeMask},
    world::{PathElement, path_elements_at},
};
use super::{
    Query,
    SCORE_INFINITE,
    SearchGoal,
    junction::is_thin_junction,
    search::{SearchContext, SearchResult, SearchState, heuristic_search, search_log},
};

// Thin junctions one search path may pass through for this agent.
pub fn max_junctions_for(configs: &PathfindConfigs, agent: &Agent) -> u8 {
    if agent.is_staff() {
        return configs.staff_max_junctions;
    }
    if agent.is_leaving_park() && agent.lost_countdown < configs.lost_countdown_threshold {
        return configs.guest_lost_leaving_park_max_junctions;
    }
    if agent.has_map() {
        return configs.guest_with_map_max_junctions;
    }
    if agent.is_leaving_park() {
        return configs.guest_leaving_park_max_junctions;
    }
    configs.guest_max_junctions
}

// Picks the edge of the agent's current tile that leads towards `goal`.
// Runs one bounded search per candidate edge and updates the agent's
// junction memory. Returns None when no edge makes progress.
pub fn choose_direction(query: &Query, agent: &mut Agent, goal: &SearchGoal) -> Option<Direction> {
    let location = agent.location;
    let is_staff = agent.is_staff();

    // With overlaid path elements, the first one decides the slope.
    let mut first_path: Option<PathElement> = None;
    let mut permitted_edges = EdgeMask::empty();
    let mut is_thin = false;

    for path in path_elements_at(query.tiles, location) {
        first_path.get_or_insert(*path);
        is_thin = is_thin || is_thin_junction(query.tiles, path, location);
        permitted_edges |= path.permitted_edges(is_staff);
    }

    let first_path = first_path?;
    let mut edges = permitted_edges;

    if is_thin && agent.memory.goal() == Some(goal.location) {
        if let Some(untried) = agent.memory.lookup_mut(location) {
            // Edges may have been removed since the junction was remembered.
            *untried &= permitted_edges;
            if untried.is_empty() {
                // Everything was tried. Start over rather than getting stuck.
                *untried = permitted_edges;
            }
            edges = *untried;
        }
    }

    if agent.memory.goal() != Some(goal.location) {
        agent.memory.reset(Some(goal.location));
    }

    let mut chosen_edge = edges.first()?;

    if edges.count() > 1 {
        let configs = query.configs;
        let max_junctions = max_junctions_for(configs, agent);
        let max_tiles = if is_staff { configs.staff_max_tiles_checked } else { configs.guest_max_tiles_checked };
        // Split the whole-search budget so every edge gets searched.
        let tiles_per_edge = max_tiles / edges.count() as i32;
        let in_patrol_area = agent.is_mechanic() && agent.is_in_patrol(query.tiles, location.x, location.y);

        let ctx = SearchContext { query, agent: &*agent, goal };

        let mut best_score = SCORE_INFINITE;
        let mut best_steps = u8::MAX;

        for test_edge in edges.directions() {
            let height = location.z + first_path.height_step_towards(test_edge);

            let mut state = SearchState::new(location, max_junctions, tiles_per_edge);
            let mut result = SearchResult::new();

            heuristic_search(&ctx, &mut state, &mut result, location.with_z(height), &first_path, in_patrol_area, 0, test_edge);

            search_log!(ctx, "{location} -> {}: edge {test_edge} score {} in {} steps, {} junctions.",
                        goal.location, result.score, result.steps, result.junctions.len());

            if SearchResult::is_better(result.score, result.steps, best_score, best_steps) {
                chosen_edge = test_edge;
                best_score = result.score;
                best_steps = result.steps;
            }
        }

        if best_score == SCORE_INFINITE {
            search_log!(ctx, "{location} -> {}: no edge leads anywhere.", goal.location);
            return None;
        }
    }

    if is_thin {
        agent.memory.record_choice(location, permitted_edges, chosen_edge, agent.direction.reverse());
    }

    Some(chosen_edge)
}
