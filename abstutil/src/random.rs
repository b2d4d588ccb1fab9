use rand::{RngCore, SeedableRng};
use rand_xorshift::XorShiftRng;

// Need to explain this trick -- basically keeps consistency between two different simulations when
// each one might make slightly different sequences of calls to the RNG.
pub fn fork_rng(base_rng: &mut XorShiftRng) -> XorShiftRng {
    XorShiftRng::seed_from_u64(u64::from(base_rng.next_u32()))
}

/// The single seeded stream every random choice in a simulation run consumes, in a fixed order:
/// the same `(vehicle_count, time_span, seed)` always draws the same sequence.
pub fn seeded_rng(seed: u32) -> XorShiftRng {
    XorShiftRng::seed_from_u64(u64::from(seed))
}
