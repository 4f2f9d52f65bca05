//! Environments with known, queryable dynamics.
//!
//! A [`Dynamics`] implementation supplies four primitives (initial-state
//! sampling, transition sampling, reward and termination) plus the projection
//! from states to observations. [`ResettableEnv`] drives episodes on top of
//! any such implementation and owns everything that changes during an
//! episode: the random source, the current state and the step counter.

use log::{debug, trace};

use crate::core::{Env, Info, InfoValue, Result, Step};
use crate::spaces::Space;
use crate::utils::rng::{resolve_seed, rng_from_seed, RngStream};

/// Oracle access to an environment's dynamics.
///
/// Implementations hold no per-episode state. All randomness comes from the
/// `rng` argument, so a seeded [`RngStream`] fully determines every sample.
pub trait Dynamics {
    type State: Clone + Into<InfoValue>;
    type Obs;
    type Act;
    type StateSpace: Space<Element = Self::State>;
    type ObsSpace: Space<Element = Self::Obs>;
    type ActionSpace: Space<Element = Self::Act>;

    fn state_space(&self) -> &Self::StateSpace;

    /// Often the same as the state space; differs for partially observed models.
    fn observation_space(&self) -> &Self::ObsSpace;

    fn action_space(&self) -> &Self::ActionSpace;

    /// Sample from the initial state distribution.
    fn initial_state(&self, rng: &mut RngStream) -> Result<Self::State>;

    /// Sample the successor of `state` under `action`.
    fn transition(&self, state: &Self::State, action: &Self::Act, rng: &mut RngStream) -> Result<Self::State>;

    /// Reward for one transition. Deterministic in its arguments.
    fn reward(&self, state: &Self::State, action: &Self::Act, new_state: &Self::State) -> Result<f64>;

    /// Whether the episode ends in the newly reached `state`, given the
    /// number of steps taken before the one that led to it.
    fn terminal(&self, state: &Self::State, step: u64) -> bool;

    /// Observation produced by a given state.
    fn obs_from_state(&self, state: &Self::State) -> Self::Obs;
}

/// Episode driver for any [`Dynamics`].
///
/// Freshly constructed environments are unreset: `step` fails with
/// [`EnvError::ResetNeeded`](crate::core::EnvError::ResetNeeded) until `reset` is called.
#[derive(Clone, Debug)]
pub struct ResettableEnv<D: Dynamics> {
    dynamics: D,
    rng: RngStream,
    cur_state: Option<D::State>,
    n_actions_taken: Option<u64>,
}

impl<D: Dynamics> ResettableEnv<D> {
    /// Wrap `dynamics`, seeding the random source with a freshly drawn seed.
    pub fn new(dynamics: D) -> Self {
        Self::from_seed(dynamics, None)
    }

    /// Wrap `dynamics` with a reproducible random source.
    pub fn with_seed(dynamics: D, seed: u64) -> Self {
        Self::from_seed(dynamics, Some(seed))
    }

    fn from_seed(dynamics: D, seed: Option<u64>) -> Self {
        let mut env = Self { dynamics, rng: rng_from_seed(0), cur_state: None, n_actions_taken: None };
        env.reseed(seed);
        env
    }

    fn reseed(&mut self, seed: Option<u64>) -> u64 {
        let seed = resolve_seed(seed);
        debug!("seeding environment rng with {seed}");
        self.rng = rng_from_seed(seed);
        seed
    }

    pub fn dynamics(&self) -> &D { &self.dynamics }

    pub fn state_space(&self) -> &D::StateSpace { self.dynamics.state_space() }

    pub fn observation_space(&self) -> &D::ObsSpace { self.dynamics.observation_space() }

    pub fn action_space(&self) -> &D::ActionSpace { self.dynamics.action_space() }

    /// Current state, `None` before the first reset.
    pub fn cur_state(&self) -> Option<&D::State> { self.cur_state.as_ref() }

    /// Number of steps taken since the last reset, `None` before the first reset.
    pub fn n_actions_taken(&self) -> Option<u64> { self.n_actions_taken }
}

impl<D> Env for ResettableEnv<D>
where
    D: Dynamics,
    D::State: std::fmt::Debug,
{
    type Obs = D::Obs;
    type Act = D::Act;

    fn seed(&mut self, seed: Option<u64>) -> Vec<u64> {
        vec![self.reseed(seed)]
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        let state = self.dynamics.initial_state(&mut self.rng)?;
        debug!("reset to initial state {state:?}");
        let obs = self.dynamics.obs_from_state(&state);
        self.cur_state = Some(state);
        self.n_actions_taken = Some(0);
        Ok(obs)
    }

    fn step(&mut self, action: Self::Act) -> Result<Step<Self::Obs>> {
        let (Some(old_state), Some(n_taken)) = (self.cur_state.as_ref(), self.n_actions_taken) else {
            return Err(crate::core::EnvError::ResetNeeded);
        };

        // Reward is computed before committing so a failed step leaves the episode untouched.
        let new_state = self.dynamics.transition(old_state, &action, &mut self.rng)?;
        let reward = self.dynamics.reward(old_state, &action, &new_state)?;
        let obs = self.dynamics.obs_from_state(&new_state);
        let done = self.dynamics.terminal(&new_state, n_taken);
        trace!("step {n_taken}: {old_state:?} -> {new_state:?}, reward {reward}, done {done}");

        let mut info = Info::new();
        info.insert("old_state", old_state.clone());
        info.insert("new_state", new_state.clone());

        self.cur_state = Some(new_state);
        self.n_actions_taken = Some(n_taken + 1);
        Ok(Step::new(obs, reward, done, info))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EnvError;
    use crate::spaces::Discrete;
    use rand::Rng;

    /// Random walk on a ring of `n` cells; action 0 steps left, 1 steps right,
    /// and with probability `slip` the walker stays put.
    struct Ring {
        cells: Discrete,
        moves: Discrete,
        slip: f64,
        horizon: u64,
    }

    impl Dynamics for Ring {
        type State = usize;
        type Obs = bool;
        type Act = usize;
        type StateSpace = Discrete;
        type ObsSpace = BoolSpace;
        type ActionSpace = Discrete;

        fn state_space(&self) -> &Discrete { &self.cells }
        fn observation_space(&self) -> &BoolSpace { &BoolSpace }
        fn action_space(&self) -> &Discrete { &self.moves }

        fn initial_state(&self, rng: &mut RngStream) -> Result<usize> {
            Ok(self.cells.sample(rng))
        }

        fn transition(&self, state: &usize, action: &usize, rng: &mut RngStream) -> Result<usize> {
            let action = self.moves.check("action", *action)?;
            let n = self.cells.n();
            if rng.gen_bool(self.slip) {
                return Ok(*state);
            }
            Ok(if action == 0 { (state + n - 1) % n } else { (state + 1) % n })
        }

        fn reward(&self, _state: &usize, _action: &usize, new_state: &usize) -> Result<f64> {
            Ok(if *new_state == 0 { 1.0 } else { 0.0 })
        }

        fn terminal(&self, _state: &usize, step: u64) -> bool { step >= self.horizon }

        fn obs_from_state(&self, state: &usize) -> bool { *state == 0 }
    }

    struct BoolSpace;

    impl Space for BoolSpace {
        type Element = bool;
        fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> bool { rng.gen_bool(0.5) }
        fn contains(&self, _elem: &bool) -> bool { true }
    }

    fn ring() -> Ring {
        Ring { cells: Discrete::new(5), moves: Discrete::new(2), slip: 0.3, horizon: 4 }
    }

    #[test]
    fn step_before_reset_fails() {
        let mut env = ResettableEnv::with_seed(ring(), 0);
        assert_eq!(env.n_actions_taken(), None);
        assert!(env.cur_state().is_none());
        assert_eq!(env.step(1), Err(EnvError::ResetNeeded));
    }

    #[test]
    fn seed_returns_single_seed() {
        let mut env = ResettableEnv::with_seed(ring(), 0);
        assert_eq!(env.seed(Some(99)), vec![99]);
        let drawn = env.seed(None);
        assert_eq!(drawn.len(), 1);
        assert!(drawn[0] < crate::utils::MAX_SEED);
    }

    #[test]
    fn info_records_old_and_new_state() {
        let mut env = ResettableEnv::with_seed(ring(), 3);
        env.reset().unwrap();
        for _ in 0..10 {
            let before = *env.cur_state().unwrap();
            let s = env.step(1).unwrap();
            let after = *env.cur_state().unwrap();
            assert_eq!(s.info.get_i64("old_state"), Some(before as i64));
            assert_eq!(s.info.get_i64("new_state"), Some(after as i64));
            assert_eq!(s.observation, after == 0);
            assert_eq!(s.reward, if after == 0 { 1.0 } else { 0.0 });
        }
    }

    #[test]
    fn counter_increments_and_resets() {
        let mut env = ResettableEnv::with_seed(ring(), 5);
        env.reset().unwrap();
        assert_eq!(env.n_actions_taken(), Some(0));
        let dones: Vec<bool> = (0..5).map(|_| env.step(0).unwrap().done).collect();
        assert_eq!(env.n_actions_taken(), Some(5));
        // terminal sees 0..=4 steps already taken; the horizon is 4
        assert_eq!(dones, vec![false, false, false, false, true]);
        env.reset().unwrap();
        assert_eq!(env.n_actions_taken(), Some(0));
    }

    #[test]
    fn failed_step_leaves_episode_untouched() {
        let mut env = ResettableEnv::with_seed(ring(), 8);
        env.reset().unwrap();
        let state = *env.cur_state().unwrap();
        let err = env.step(7).unwrap_err();
        assert_eq!(err, EnvError::OutOfBounds { what: "action", index: 7, len: 2 });
        assert_eq!(env.cur_state(), Some(&state));
        assert_eq!(env.n_actions_taken(), Some(0));
    }

    #[test]
    fn same_seed_same_rollout() {
        let rollout = |seed| {
            let mut env = ResettableEnv::with_seed(ring(), seed);
            let mut out = vec![env.reset().unwrap()];
            for a in [0, 1, 1, 0, 1, 0, 0, 1] {
                out.push(env.step(a).unwrap().observation);
            }
            (out, *env.cur_state().unwrap())
        };
        assert_eq!(rollout(21), rollout(21));
    }
}
