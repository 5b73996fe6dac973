use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64;

// ----------------------------------------------
// RandomGenerator
// ----------------------------------------------

pub type RandomGenerator = Pcg64;

pub const SIM_DEFAULT_RANDOM_SEED: u64 = 0xB0BA_CAFE_5EED_0001;

#[inline]
pub fn new_random_generator(seed: u64) -> RandomGenerator {
    RandomGenerator::seed_from_u64(seed)
}

// ----------------------------------------------
// ScenarioRandom
// ----------------------------------------------

// Source of the 32-bit draws made by the navigation code. Every random
// decision masks the raw value (& 1, & 3, & 0xFFFF), so replaying the
// same draw sequence replays the same walk.
pub trait ScenarioRandom {
    fn next_rand(&mut self) -> u32;
}

impl ScenarioRandom for RandomGenerator {
    #[inline]
    fn next_rand(&mut self) -> u32 {
        self.next_u32()
    }
}
