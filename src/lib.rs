// NOTE: Allow these for the whole crate.
#![allow(clippy::collapsible_if)]
#![allow(clippy::too_many_arguments)]

pub mod log;
pub mod utils;
pub mod config;
pub mod sim;
pub mod world;
pub mod agent;
pub mod pathfind;

pub use agent::{Agent, MoveResult};
pub use config::PathfindConfigs;
pub use pathfind::{
    Query,
    SearchGoal,
    calculate_next_destination,
    choose_direction,
};
pub use utils::coords::{Direction, EdgeMask, TileLocation};
