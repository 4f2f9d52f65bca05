//! Fixed-horizon benchmark environments for reward learning and imitation.
//!
//! The centerpiece is [`ResettableEnv`], an episode driver for any model with
//! known [`Dynamics`], and its tabular instantiation [`TabularModelEnv`].
//! Wrappers turn variable-length episodes into fixed-length ones and the
//! registry builds environments by string id.

pub mod core;
pub mod spaces;
pub mod utils;
pub mod resettable;
pub mod tabular;
pub mod envs;
pub mod wrappers;
pub mod registry;
pub mod vector;

pub use crate::core::{Env, EnvError, Info, InfoValue, Result, Step};
pub use crate::spaces::{Discrete, Space};
pub use crate::resettable::{Dynamics, ResettableEnv};
pub use crate::tabular::{Horizon, RewardMatrix, TabularModel, TabularModelEnv};
pub use crate::envs::{register_builtin, RiskyPath};
pub use crate::wrappers::{AbsorbAfterDone, TimeLimit};
pub use crate::registry::{make, register, EnvSpec, KwArgs};
pub use crate::utils::{rng_from_seed, sample_distribution, RngStream};
pub use crate::vector::SyncVectorEnv;
