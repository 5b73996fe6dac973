use serde::{Serialize, Deserialize};

use crate::utils::coords::{Direction, EdgeMask, TileLocation};

pub const PATH_MEMORY_CAPACITY: usize = 4;

// ----------------------------------------------
// RememberedJunction
// ----------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RememberedJunction {
    pub location: TileLocation,
    // Edges not yet taken from this junction while heading to the current goal.
    pub untried: EdgeMask,
}

// ----------------------------------------------
// AgentPathMemory
// ----------------------------------------------

// The last few thin junctions an agent walked through on its way to the
// current goal. Coming back to one of them, the agent only considers the
// directions it has not tried yet. Oldest entry is overwritten first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentPathMemory {
    goal: Option<TileLocation>,
    junctions: [Option<RememberedJunction>; PATH_MEMORY_CAPACITY],
    next_slot: usize,
}

impl AgentPathMemory {
    #[inline]
    pub fn goal(&self) -> Option<TileLocation> {
        self.goal
    }

    // Adopts a new goal, forgetting every remembered junction.
    pub fn reset(&mut self, goal: Option<TileLocation>) {
        self.goal = goal;
        self.junctions = [None; PATH_MEMORY_CAPACITY];
        self.next_slot = 0;
    }

    // Invalidates the goal so the next search starts over.
    #[inline]
    pub fn reset_goal(&mut self) {
        self.reset(None);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.junctions.iter().flatten().count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &RememberedJunction> {
        self.junctions.iter().flatten()
    }

    pub fn lookup(&self, location: TileLocation) -> Option<EdgeMask> {
        self.iter()
            .find(|junction| junction.location == location)
            .map(|junction| junction.untried)
    }

    pub fn lookup_mut(&mut self, location: TileLocation) -> Option<&mut EdgeMask> {
        self.junctions.iter_mut()
            .flatten()
            .find(|junction| junction.location == location)
            .map(|junction| &mut junction.untried)
    }

    // Stores a junction in the next slot, evicting the oldest entry when full.
    pub fn remember(&mut self, location: TileLocation, untried: EdgeMask) {
        self.junctions[self.next_slot] = Some(RememberedJunction { location, untried });
        self.next_slot = (self.next_slot + 1) % PATH_MEMORY_CAPACITY;
    }

    // Drops the junction at `location`. The slot is reused once the
    // ring wraps around to it. Returns false if it was not remembered.
    pub fn forget(&mut self, location: TileLocation) -> bool {
        for slot in &mut self.junctions {
            if slot.is_some_and(|junction| junction.location == location) {
                *slot = None;
                return true;
            }
        }
        false
    }

    // Marks `chosen` and the edge the agent arrived through as tried.
    pub fn record_choice(&mut self,
                         location: TileLocation,
                         permitted: EdgeMask,
                         chosen: Direction,
                         arrival_edge: Direction) {
        if let Some(untried) = self.lookup_mut(location) {
            *untried = untried.without(chosen).without(arrival_edge);
            return;
        }
        self.remember(location, permitted.without(chosen).without(arrival_edge));
    }
}
