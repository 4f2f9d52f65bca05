// Vectorized environments: N independent instances driven in lockstep.

use crate::core::{Env, EnvError, Result, Step};

/// Runs N copies of an environment in the current thread.
///
/// Every slot is its own environment object with its own random source, so
/// copies never share mutable state.
///
/// - Construct with `SyncVectorEnv::new(n, || make_env())`
/// - Seed each copy with `seed_all(Some(base))`: env i gets `base + i`, wrapping at `u64::MAX`
/// - Step with a batch of actions: `step_all(actions)`
pub struct SyncVectorEnv<E: Env> {
    envs: Vec<E>,
}

impl<E: Env> SyncVectorEnv<E> {
    /// Create N copies using the provided factory closure.
    pub fn new<F>(n: usize, factory: F) -> Self
    where
        F: FnMut() -> E,
    {
        Self { envs: std::iter::repeat_with(factory).take(n).collect() }
    }

    /// Build N copies with a fallible factory, stopping at the first error.
    pub fn try_new<F>(n: usize, factory: F) -> Result<Self>
    where
        F: FnMut(usize) -> Result<E>,
    {
        let envs = (0..n).map(factory).collect::<Result<Vec<_>>>()?;
        Ok(Self { envs })
    }

    pub fn len(&self) -> usize { self.envs.len() }
    pub fn is_empty(&self) -> bool { self.envs.is_empty() }

    /// Seed all environments. With a base seed, env i gets `base + i`;
    /// without one, every env draws its own seed.
    pub fn seed_all(&mut self, base_seed: Option<u64>) -> Vec<u64> {
        self.envs
            .iter_mut()
            .enumerate()
            .flat_map(|(i, e)| e.seed(base_seed.map(|s| s.wrapping_add(i as u64))))
            .collect()
    }

    pub fn reset_all(&mut self) -> Result<Vec<E::Obs>> {
        self.envs.iter_mut().map(|e| e.reset()).collect()
    }

    /// Step all environments with a batch of actions, one per env.
    pub fn step_all(&mut self, actions: Vec<E::Act>) -> Result<Vec<Step<E::Obs>>> {
        if actions.len() != self.envs.len() {
            return Err(EnvError::InvalidShape(format!(
                "got {} actions for {} environments",
                actions.len(),
                self.envs.len()
            )));
        }
        self.envs.iter_mut().zip(actions).map(|(e, a)| e.step(a)).collect()
    }

    pub fn envs(&self) -> &[E] { &self.envs }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Info;

    #[derive(Clone, Default)]
    struct DummyEnv { s: Option<i32>, seed: u64 }

    impl Env for DummyEnv {
        type Obs = i32;
        type Act = i32;
        fn seed(&mut self, seed: Option<u64>) -> Vec<u64> {
            self.seed = seed.unwrap_or(7);
            vec![self.seed]
        }
        fn reset(&mut self) -> Result<i32> {
            self.s = Some(0);
            Ok(0)
        }
        fn step(&mut self, a: i32) -> Result<Step<i32>> {
            let s = self.s.as_mut().ok_or(EnvError::ResetNeeded)?;
            *s += a;
            Ok(Step::new(*s, 1.0, *s >= 5, Info::new()))
        }
    }

    #[test]
    fn vector_env_runs_batch() {
        let mut v = SyncVectorEnv::new(3, DummyEnv::default);
        assert_eq!(v.seed_all(Some(10)), vec![10, 11, 12]);
        assert_eq!(v.reset_all().unwrap(), vec![0, 0, 0]);
        let steps = v.step_all(vec![1, 2, 5]).unwrap();
        let obs: Vec<i32> = steps.iter().map(|s| s.observation).collect();
        assert_eq!(obs, vec![1, 2, 5]);
        assert!(steps[2].done);
    }

    #[test]
    fn seed_all_wraps_near_max_seed() {
        let mut v = SyncVectorEnv::new(3, DummyEnv::default);
        assert_eq!(v.seed_all(Some(u64::MAX - 1)), vec![u64::MAX - 1, u64::MAX, 0]);
        assert_eq!(v.envs()[2].seed, 0);
    }

    #[test]
    fn action_count_must_match() {
        let mut v = SyncVectorEnv::new(2, DummyEnv::default);
        v.reset_all().unwrap();
        assert!(matches!(v.step_all(vec![1]), Err(EnvError::InvalidShape(_))));
    }

    #[test]
    fn step_before_reset_surfaces_error() {
        let mut v = SyncVectorEnv::new(2, DummyEnv::default);
        assert_eq!(v.step_all(vec![1, 1]), Err(EnvError::ResetNeeded));
    }
}
