pub mod distribution;
pub mod rng;

pub use distribution::{one_hot, sample_distribution, validate_distribution, PROB_TOLERANCE};
pub use rng::{draw_seed, resolve_seed, rng_from_seed, RngStream, MAX_SEED};
