use serde::{Serialize, Deserialize};

use crate::utils::coords::{Direction, TileLocation};
use super::ParkQuery;

// Where new guests appear, and the way they walk to leave the map.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeepSpawn {
    pub location: TileLocation,
    pub direction: Direction,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ParkInfo {
    pub entrances: Vec<TileLocation>,
    pub spawns: Vec<PeepSpawn>,
}

impl ParkQuery for ParkInfo {
    #[inline]
    fn park_entrances(&self) -> &[TileLocation] {
        &self.entrances
    }

    #[inline]
    fn peep_spawns(&self) -> &[PeepSpawn] {
        &self.spawns
    }
}
