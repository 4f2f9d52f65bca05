pub mod risky_path;

use std::sync::OnceLock;

use crate::core::Result;
use crate::registry::{kwarg, register, EnvSpec};

pub use risky_path::RiskyPath;

/// Id under which [`register_builtin`] registers [`RiskyPath`].
pub const RISKY_PATH_ID: &str = "seals/RiskyPath-v0";

/// Register the built-in environments. Safe to call more than once.
///
/// Made environments accept an optional `seed` kwarg.
pub fn register_builtin() -> Result<()> {
    static REGISTERED: OnceLock<Result<()>> = OnceLock::new();
    REGISTERED
        .get_or_init(|| {
            register(EnvSpec::new(RISKY_PATH_ID).with_max_episode_steps(RiskyPath::HORIZON + 1), |kwargs| {
                let seed = kwargs.contains_key("seed").then(|| kwarg(&kwargs, "seed", 0u64)).transpose()?;
                RiskyPath::env(seed)
            })
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{get_spec, make, EnvDyn, KwArgs};

    #[test]
    fn make_risky_path_from_registry() {
        register_builtin().unwrap();
        register_builtin().unwrap();
        assert_eq!(get_spec(RISKY_PATH_ID).and_then(|s| s.max_episode_steps), Some(6));

        let mut kwargs = KwArgs::new();
        kwargs.insert("seed".into(), "3".into());
        let mut env = make(RISKY_PATH_ID, kwargs).unwrap();
        let obs = env.reset().unwrap();
        assert_eq!(obs.downcast_ref::<usize>(), Some(&0));
        let s = env.step(Box::new(0usize)).unwrap();
        assert_eq!(s.observation.downcast_ref::<usize>(), Some(&1));
        assert_eq!(s.info.get_i64("old_state"), Some(0));
    }
}
