// Wrappers that turn variable-length episodes into fixed-length ones.
//
// - TimeLimit: forces `done` after a fixed number of steps
// - AbsorbAfterDone: freezes the episode in an absorbing state once the inner env is done

use crate::core::{Env, Result, Step};

/// Info key set by [`TimeLimit`] on the step where it ends the episode.
pub const TRUNCATED_KEY: &str = "TimeLimit.truncated";
/// Info key set by [`AbsorbAfterDone`] on every step taken inside the absorbing state.
pub const ABSORBING_KEY: &str = "absorbing";

/// A wrapper that ends every episode after `max_episode_steps` steps.
///
/// On the final step `done` is forced to true and `info["TimeLimit.truncated"]`
/// records whether the inner environment had not finished by itself.
pub struct TimeLimit<E: Env> {
    inner: E,
    max_episode_steps: u64,
    elapsed_steps: u64,
}

impl<E: Env> TimeLimit<E> {
    pub fn new(inner: E, max_episode_steps: u64) -> Self {
        Self { inner, max_episode_steps, elapsed_steps: 0 }
    }

    pub fn max_episode_steps(&self) -> u64 { self.max_episode_steps }
    pub fn elapsed_steps(&self) -> u64 { self.elapsed_steps }

    pub fn inner(&self) -> &E { &self.inner }
    pub fn inner_mut(&mut self) -> &mut E { &mut self.inner }
    pub fn into_inner(self) -> E { self.inner }
}

impl<E: Env> Env for TimeLimit<E> {
    type Obs = E::Obs;
    type Act = E::Act;

    fn seed(&mut self, seed: Option<u64>) -> Vec<u64> { self.inner.seed(seed) }

    fn reset(&mut self) -> Result<Self::Obs> {
        self.elapsed_steps = 0;
        self.inner.reset()
    }

    fn step(&mut self, action: Self::Act) -> Result<Step<Self::Obs>> {
        let mut s = self.inner.step(action)?;
        self.elapsed_steps += 1;
        if self.elapsed_steps >= self.max_episode_steps {
            s.info.insert(TRUNCATED_KEY, !s.done);
            s.done = true;
        }
        Ok(s)
    }
}

/// Once the inner environment reports `done`, enter an absorbing state.
///
/// The step on which the inner env finishes is passed through with `done = false`.
/// Every later step repeats the absorbing observation (the last inner observation
/// unless one was given) with `absorb_reward`, without stepping the inner env.
/// `done` is never set; pair this wrapper with an outer [`TimeLimit`].
pub struct AbsorbAfterDone<E: Env> {
    inner: E,
    absorb_reward: f64,
    absorb_obs: Option<E::Obs>,
    absorb_obs_this_episode: Option<E::Obs>,
}

impl<E: Env> AbsorbAfterDone<E>
where
    E::Obs: Clone,
{
    /// Absorb with reward 0 and the final observation of each episode.
    pub fn new(inner: E) -> Self {
        Self { inner, absorb_reward: 0.0, absorb_obs: None, absorb_obs_this_episode: None }
    }

    pub fn with_absorb_reward(mut self, reward: f64) -> Self {
        self.absorb_reward = reward;
        self
    }

    /// Use a fixed observation inside the absorbing state instead of the final one.
    pub fn with_absorb_obs(mut self, obs: E::Obs) -> Self {
        self.absorb_obs = Some(obs);
        self
    }

    pub fn at_absorb_state(&self) -> bool { self.absorb_obs_this_episode.is_some() }

    pub fn inner(&self) -> &E { &self.inner }
    pub fn inner_mut(&mut self) -> &mut E { &mut self.inner }
    pub fn into_inner(self) -> E { self.inner }
}

impl<E: Env> Env for AbsorbAfterDone<E>
where
    E::Obs: Clone,
{
    type Obs = E::Obs;
    type Act = E::Act;

    fn seed(&mut self, seed: Option<u64>) -> Vec<u64> { self.inner.seed(seed) }

    fn reset(&mut self) -> Result<Self::Obs> {
        self.absorb_obs_this_episode = None;
        self.inner.reset()
    }

    fn step(&mut self, action: Self::Act) -> Result<Step<Self::Obs>> {
        if let Some(obs) = &self.absorb_obs_this_episode {
            let mut info = crate::core::Info::new();
            info.insert(ABSORBING_KEY, true);
            return Ok(Step::new(obs.clone(), self.absorb_reward, false, info));
        }

        let mut s = self.inner.step(action)?;
        if s.done {
            log::debug!("inner environment done, entering absorbing state");
            let absorb = self.absorb_obs.clone().unwrap_or_else(|| s.observation.clone());
            self.absorb_obs_this_episode = Some(absorb);
            s.done = false;
        }
        Ok(s)
    }
}
