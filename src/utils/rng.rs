//! Deterministic seeding and RNG utilities.
//!
//! Every environment owns one [`RngStream`]. Sampling never touches a
//! process-wide generator; only [`draw_seed`] does, to pick a seed when the
//! caller did not supply one.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Type alias for the RNG stream owned by each environment.
pub type RngStream = ChaCha8Rng;

/// Seeds drawn by [`draw_seed`] lie in `[0, MAX_SEED)`.
pub const MAX_SEED: u64 = 1 << 31;

/// Create a new RNG stream from a seed.
pub fn rng_from_seed(seed: u64) -> RngStream {
    RngStream::seed_from_u64(seed)
}

/// Draw a fresh seed uniformly from `[0, MAX_SEED)` using OS-seeded entropy.
pub fn draw_seed() -> u64 {
    rand::thread_rng().gen_range(0..MAX_SEED)
}

/// Resolve an optional seed: use it when given, otherwise draw one.
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(draw_seed)
}
