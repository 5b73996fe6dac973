use arrayvec::ArrayVec;
use bitflags::bitflags;
use serde::{Serialize, Deserialize};
use strum::Display;

use crate::{
    bitflags_with_display,
    utils::coords::TileLocation,
};
use super::{RideId, RideQuery};

pub const MAX_STATIONS_PER_RIDE: usize = 4;

// ----------------------------------------------
// RideStatus / DepartFlags
// ----------------------------------------------

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum RideStatus {
    #[default]
    Closed,
    Open,
    Testing,
}

bitflags_with_display! {
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct DepartFlags: u8 {
        const SynchroniseWithAdjacentStations = 1 << 0;
    }
}

// ----------------------------------------------
// Station
// ----------------------------------------------

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    // First track tile of the station, with the station height.
    pub start: TileLocation,
    pub entrance: Option<TileLocation>,
    pub exit: Option<TileLocation>,
}

// ----------------------------------------------
// Ride
// ----------------------------------------------

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Ride {
    pub name: String,
    pub status: RideStatus,
    // Shops and facilities are entered directly from their track tile.
    pub is_shop: bool,
    pub depart_flags: DepartFlags,
    pub stations: ArrayVec<Station, MAX_STATIONS_PER_RIDE>,
}

impl Ride {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string(), ..Default::default() }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == RideStatus::Open
    }

    #[inline]
    pub fn synchronises_stations(&self) -> bool {
        self.depart_flags.intersects(DepartFlags::SynchroniseWithAdjacentStations)
    }

    #[inline]
    pub fn station(&self, index: usize) -> Option<&Station> {
        self.stations.get(index)
    }

    // Returns false when the ride already has MAX_STATIONS_PER_RIDE stations.
    pub fn add_station(&mut self, station: Station) -> bool {
        self.stations.try_push(station).is_ok()
    }
}

// ----------------------------------------------
// RideRegistry
// ----------------------------------------------

#[derive(Clone, Debug, Default)]
pub struct RideRegistry {
    rides: Vec<Option<Ride>>,
}

impl RideRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, ride: Ride) -> RideId {
        let id = self.rides.len() as RideId;
        self.rides.push(Some(ride));
        id
    }

    pub fn remove(&mut self, id: RideId) -> Option<Ride> {
        self.rides.get_mut(id as usize).and_then(Option::take)
    }

    #[inline]
    pub fn ride_mut(&mut self, id: RideId) -> Option<&mut Ride> {
        self.rides.get_mut(id as usize).and_then(Option::as_mut)
    }
}

impl RideQuery for RideRegistry {
    #[inline]
    fn ride(&self, id: RideId) -> Option<&Ride> {
        self.rides.get(id as usize).and_then(Option::as_ref)
    }
}
