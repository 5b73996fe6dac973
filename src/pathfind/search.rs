use arrayvec::ArrayVec;

use crate::{
    agent::Agent,
    utils::coords::{Direction, TileLocation},
    world::{ElementKind, EntranceKind, PathElement},
};
use super::{
    MAX_JUNCTION_HISTORY,
    PathSearchKind,
    Query,
    SCORE_INFINITE,
    Score,
    SearchGoal,
    heuristic_score,
    junction::is_thin_junction,
    staff::staff_can_ignore_wide_flag,
};

macro_rules! search_log {
    ($ctx:expr, $($arg:tt)+) => {
        if $ctx.query.configs.debug_log_search {
            $crate::log::verbose!($crate::log::channel!("pathfind"), $($arg)+);
        }
    };
}

pub(super) use search_log;

// ----------------------------------------------
// JunctionRecord
// ----------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct JunctionRecord {
    pub location: TileLocation,
    // Edge the search path left the junction through.
    pub direction: Option<Direction>,
}

pub type JunctionList = ArrayVec<JunctionRecord, MAX_JUNCTION_HISTORY>;

// ----------------------------------------------
// SearchResult
// ----------------------------------------------

// Best end point found by one top-level search.
#[derive(Clone, Debug)]
pub struct SearchResult {
    pub score: Score,
    pub steps: u8,
    pub end_location: Option<TileLocation>,
    // Thin junctions passed on the way to `end_location`.
    pub junctions: JunctionList,
}

impl Default for SearchResult {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchResult {
    pub fn new() -> Self {
        Self { score: SCORE_INFINITE, steps: u8::MAX, end_location: None, junctions: JunctionList::new() }
    }

    #[inline]
    pub fn is_found(&self) -> bool {
        self.score != SCORE_INFINITE
    }

    // Lower score wins, fewer steps breaks ties.
    #[inline]
    pub fn is_better(score: Score, steps: u8, than_score: Score, than_steps: u8) -> bool {
        score < than_score || (score == than_score && steps < than_steps)
    }

    fn offer(&mut self, score: Score, steps: u8, location: TileLocation, junctions: &JunctionList) -> bool {
        if !Self::is_better(score, steps, self.score, self.steps) {
            return false;
        }
        self.score = score;
        self.steps = steps;
        self.end_location = Some(location);
        self.junctions = junctions.clone();
        true
    }
}

// ----------------------------------------------
// SearchState
// ----------------------------------------------

// Budgets and junction history for the search down one top-level edge.
pub(super) struct SearchState {
    origin: TileLocation,
    junctions: JunctionList,
    junctions_left: i32,
    tiles_left: i32,
}

impl SearchState {
    pub(super) fn new(origin: TileLocation, max_junctions: u8, max_tiles: i32) -> Self {
        let max_junctions = (max_junctions as usize).min(MAX_JUNCTION_HISTORY) as i32;
        Self { origin, junctions: JunctionList::new(), junctions_left: max_junctions, tiles_left: max_tiles }
    }
}

// ----------------------------------------------
// SearchContext
// ----------------------------------------------

pub(super) struct SearchContext<'q, 'a> {
    pub query: &'q Query<'a>,
    pub agent: &'q Agent,
    pub goal: &'q SearchGoal,
}

impl SearchContext<'_, '_> {
    #[inline]
    fn is_wide(&self, location: TileLocation, path: &PathElement) -> bool {
        path.is_wide() && !staff_can_ignore_wide_flag(self.query.tiles, self.agent, location, path)
    }

    fn classify_path(&self, location: TileLocation, path: &PathElement) -> PathSearchKind {
        if self.is_wide(location, path) {
            return PathSearchKind::Wide;
        }

        match path.edges.count() {
            0 | 1 => PathSearchKind::DeadEnd,
            2 => {
                let foreign_queue = path.is_queue()
                    && path.ride != self.goal.queue_ride
                    && path.ride.is_some()
                    && self.goal.ignore_foreign_queues;
                if foreign_queue { PathSearchKind::RideQueue } else { PathSearchKind::Thin }
            }
            _ => PathSearchKind::Junction,
        }
    }
}

// ----------------------------------------------
// Heuristic search
// ----------------------------------------------

// Depth-first search from `from` (standing on `current`) through `test_edge`.
// Never returns a value; the best end point found so far is kept in `best`.
pub(super) fn heuristic_search(ctx: &SearchContext,
                               state: &mut SearchState,
                               best: &mut SearchResult,
                               from: TileLocation,
                               current: &PathElement,
                               in_patrol_area: bool,
                               steps: u8,
                               test_edge: Direction) {
    let current_is_wide = ctx.is_wide(from, current);

    let next = from.step(test_edge);
    let steps = steps.saturating_add(1);
    state.tiles_left -= 1;

    // Back where this search started.
    if next == state.origin {
        search_log!(ctx, "{next}: returned to search origin.");
        return;
    }

    let mut next_in_patrol_area = in_patrol_area;
    if ctx.agent.is_mechanic() {
        next_in_patrol_area = ctx.agent.is_in_patrol(ctx.query.tiles, next.x, next.y);
        if in_patrol_area && !next_in_patrol_area {
            search_log!(ctx, "{next}: outside patrol area.");
            return;
        }
    }

    let mut z = next.z;

    for element in ctx.query.tiles.elements_at(next.x, next.y) {
        if element.is_ghost() {
            continue;
        }

        let mut next_path = None;
        let kind = match &element.kind {
            ElementKind::Track(track) => {
                if z != element.base_z {
                    continue;
                }
                if !ctx.query.rides.ride(track.ride).is_some_and(|ride| ride.is_shop) {
                    continue;
                }
                PathSearchKind::ShopEntrance
            }
            ElementKind::Entrance(entrance) => {
                if z != element.base_z {
                    continue;
                }
                match entrance.kind {
                    EntranceKind::RideEntrance if entrance.direction == test_edge => PathSearchKind::RideEntrance,
                    EntranceKind::RideExit if entrance.direction == test_edge => PathSearchKind::RideExit,
                    EntranceKind::ParkEntrance => PathSearchKind::ParkExit,
                    _ => continue,
                }
            }
            ElementKind::Path(path) => {
                if !path.is_valid_z_and_direction(element.base_z, z, test_edge) {
                    continue;
                }
                z = element.base_z;
                next_path = Some(path);
                ctx.classify_path(next.with_z(z), path)
            }
        };

        let here = next.with_z(z);
        let score = heuristic_score(here, ctx.goal.location);

        if score == 0 {
            if best.offer(score, steps, here, &state.junctions) {
                search_log!(ctx, "{here}: goal reached in {steps} steps.");
            }
            continue;
        }

        if !kind.is_path() {
            continue;
        }
        let Some(path) = next_path else {
            continue;
        };

        // Wide paths end the search unless the agent is on a wide path
        // itself, in which case the goal may still be reachable across it.
        if kind == PathSearchKind::Wide {
            if current_is_wide && best.offer(score, steps, here, &state.junctions) {
                search_log!(ctx, "{here}: wide path, score {score}.");
            }
            continue;
        }

        let mut edges = path.permitted_edges(ctx.agent.is_staff()).without(test_edge.reverse());

        // Taken before the junction memory narrows `edges`, so the lowest
        // forward edge is always searched.
        let Some(first_edge) = edges.first() else {
            search_log!(ctx, "{here}: dead end.");
            continue;
        };

        if steps >= ctx.query.configs.max_search_steps || state.tiles_left <= 0 {
            if best.offer(score, steps, here, &state.junctions) {
                search_log!(ctx, "{here}: search limit reached, score {score}.");
            }
            continue;
        }

        let mut thin_junction = false;
        if kind == PathSearchKind::Junction {
            thin_junction = is_thin_junction(ctx.query.tiles, path, here);
            if thin_junction {
                let mut path_loop = false;

                if let Some(untried) = ctx.agent.memory.lookup(here) {
                    if untried.is_empty() {
                        path_loop = true;
                    } else {
                        edges &= untried;
                    }
                }

                if !path_loop {
                    path_loop = state.junctions.iter().any(|junction| junction.location == here);
                }

                if path_loop {
                    search_log!(ctx, "{here}: loop detected.");
                    continue;
                }

                if state.junctions_left <= 0 {
                    if best.offer(score, steps, here, &state.junctions) {
                        search_log!(ctx, "{here}: junction limit reached, score {score}.");
                    }
                    continue;
                }

                debug_assert!(!state.junctions.is_full());
                state.junctions.push(JunctionRecord { location: here, direction: None });
                state.junctions_left -= 1;
            }
        }

        let remaining = edges.without(first_edge).directions();
        for edge in std::iter::once(first_edge).chain(remaining) {
            let saved_junctions_left = state.junctions_left;
            let saved_junctions_len = state.junctions.len();

            if thin_junction {
                if let Some(record) = state.junctions.last_mut() {
                    record.direction = Some(edge);
                }
            }

            let height = z + path.height_step_towards(edge);
            heuristic_search(ctx, state, best, here.with_z(height), path, next_in_patrol_area, steps, edge);

            state.junctions_left = saved_junctions_left;
            state.junctions.truncate(saved_junctions_len);
        }
    }
}
