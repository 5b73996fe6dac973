use crate::{
    utils::coords::TileLocation,
    world::{PathElement, TileQuery},
};
use super::{PathSearchKind, next_in_direction};

// A junction is "thin" when more than two of its edges lead onto ordinary
// single-width path. Wide paths, ride queues and anything that is not a
// path do not count. Only thin junctions consume the search junction budget
// and are remembered by agents.
pub fn is_thin_junction(tiles: &dyn TileQuery, path: &PathElement, location: TileLocation) -> bool {
    let mut thin_count = 0;

    for direction in path.edges.directions() {
        let kind = next_in_direction(tiles, location, path, direction);
        if !matches!(kind, PathSearchKind::Failed | PathSearchKind::Wide | PathSearchKind::RideQueue) {
            thin_count += 1;
        }
        if thin_count > 2 {
            return true;
        }
    }

    false
}
