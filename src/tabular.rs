//! Finite MDPs with explicit transition, reward and initial-state tables.

use log::debug;
use ndarray::{Array1, Array2, Array3, ArrayD, Ix1, Ix2, Ix3};

use crate::core::{EnvError, Result};
use crate::resettable::{Dynamics, ResettableEnv};
use crate::spaces::Discrete;
use crate::utils::distribution::{one_hot, sample_distribution, validate_distribution};
use crate::utils::rng::RngStream;

/// Maximum episode length in steps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Horizon {
    Finite(u64),
    #[default]
    Infinite,
}

impl Horizon {
    /// True once `n_actions_taken` has reached the horizon. The count excludes
    /// the step being taken, so a finite horizon `H` ends the episode on step `H + 1`.
    pub fn reached(&self, n_actions_taken: u64) -> bool {
        match self {
            Horizon::Finite(h) => n_actions_taken >= *h,
            Horizon::Infinite => false,
        }
    }
}

/// Reward table tagged by what the reward depends on.
#[derive(Clone, Debug, PartialEq)]
pub enum RewardMatrix {
    /// `r[s]`
    State(Array1<f64>),
    /// `r[s, a]`
    StateAction(Array2<f64>),
    /// `r[s, a, s']`
    Transition(Array3<f64>),
}

impl RewardMatrix {
    /// Pick the variant from the rank of `table`. Ranks other than 1, 2 or 3 are rejected.
    pub fn from_dyn(table: ArrayD<f64>) -> Result<Self> {
        let shape = table.shape().to_vec();
        let bad_rank = || EnvError::InvalidShape(format!("reward matrix must have rank 1, 2 or 3, got shape {shape:?}"));
        match table.ndim() {
            1 => table.into_dimensionality::<Ix1>().map(RewardMatrix::State).map_err(|_| bad_rank()),
            2 => table.into_dimensionality::<Ix2>().map(RewardMatrix::StateAction).map_err(|_| bad_rank()),
            3 => table.into_dimensionality::<Ix3>().map(RewardMatrix::Transition).map_err(|_| bad_rank()),
            _ => Err(bad_rank()),
        }
    }

    pub fn rank(&self) -> usize {
        match self {
            RewardMatrix::State(_) => 1,
            RewardMatrix::StateAction(_) => 2,
            RewardMatrix::Transition(_) => 3,
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            RewardMatrix::State(r) => r.shape(),
            RewardMatrix::StateAction(r) => r.shape(),
            RewardMatrix::Transition(r) => r.shape(),
        }
    }

    /// Look up the reward, ignoring the arguments beyond this table's rank.
    pub fn get(&self, state: usize, action: usize, new_state: usize) -> Option<f64> {
        match self {
            RewardMatrix::State(r) => r.get(state).copied(),
            RewardMatrix::StateAction(r) => r.get((state, action)).copied(),
            RewardMatrix::Transition(r) => r.get((state, action, new_state)).copied(),
        }
    }
}

impl From<Array1<f64>> for RewardMatrix {
    fn from(r: Array1<f64>) -> Self { RewardMatrix::State(r) }
}

impl From<Array2<f64>> for RewardMatrix {
    fn from(r: Array2<f64>) -> Self { RewardMatrix::StateAction(r) }
}

impl From<Array3<f64>> for RewardMatrix {
    fn from(r: Array3<f64>) -> Self { RewardMatrix::Transition(r) }
}

/// Dynamics of a tabular MDP.
///
/// - `transition_matrix[[s, a, s']]` is the probability of `s -> s'` under `a`.
/// - the reward table depends on `s`, `(s, a)` or `(s, a, s')` depending on its rank.
/// - `initial_state_dist` defaults to always starting in state 0.
///
/// All tables are validated once at construction and are immutable afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct TabularModel {
    transition_matrix: Array3<f64>,
    reward_matrix: RewardMatrix,
    horizon: Horizon,
    initial_state_dist: Array1<f64>,
    state_space: Discrete,
    action_space: Discrete,
}

impl TabularModel {
    pub fn new(
        transition_matrix: Array3<f64>,
        reward_matrix: impl Into<RewardMatrix>,
        horizon: Horizon,
        initial_state_dist: Option<Array1<f64>>,
    ) -> Result<Self> {
        let (n_states, n_actions, n_next) = transition_matrix.dim();
        if n_states == 0 || n_actions == 0 {
            return Err(EnvError::InvalidShape(format!(
                "transition matrix needs at least one state and one action, got {:?}",
                transition_matrix.shape()
            )));
        }
        if n_next != n_states {
            return Err(EnvError::InvalidShape(format!(
                "transition matrix must have shape (S, A, S), got {:?}",
                transition_matrix.shape()
            )));
        }
        for (s, rows) in transition_matrix.outer_iter().enumerate() {
            for (a, row) in rows.outer_iter().enumerate() {
                validate_distribution(row).map_err(|e| match e {
                    EnvError::InvalidDistribution(msg) => {
                        EnvError::InvalidDistribution(format!("transition_matrix[{s}, {a}]: {msg}"))
                    }
                    other => other,
                })?;
            }
        }

        let reward_matrix = reward_matrix.into();
        let expected = [n_states, n_actions, n_states];
        if reward_matrix.shape() != &expected[..reward_matrix.rank()] {
            return Err(EnvError::InvalidShape(format!(
                "reward matrix of rank {} must have shape {:?}, got {:?}",
                reward_matrix.rank(),
                &expected[..reward_matrix.rank()],
                reward_matrix.shape()
            )));
        }

        let initial_state_dist = match initial_state_dist {
            Some(dist) => dist,
            None => one_hot(0, n_states)?,
        };
        if initial_state_dist.len() != n_states {
            return Err(EnvError::InvalidShape(format!(
                "initial state distribution has length {}, expected {n_states}",
                initial_state_dist.len()
            )));
        }
        validate_distribution(initial_state_dist.view())?;

        debug!(
            "built tabular model: {n_states} states, {n_actions} actions, rank-{} reward, horizon {horizon:?}",
            reward_matrix.rank()
        );
        Ok(Self {
            transition_matrix,
            reward_matrix,
            horizon,
            initial_state_dist,
            state_space: Discrete::new(n_states),
            action_space: Discrete::new(n_actions),
        })
    }

    pub fn n_states(&self) -> usize { self.state_space.n() }

    pub fn n_actions(&self) -> usize { self.action_space.n() }

    pub fn transition_matrix(&self) -> &Array3<f64> { &self.transition_matrix }

    pub fn reward_matrix(&self) -> &RewardMatrix { &self.reward_matrix }

    pub fn initial_state_dist(&self) -> &Array1<f64> { &self.initial_state_dist }

    pub fn horizon(&self) -> Horizon { self.horizon }
}

impl Dynamics for TabularModel {
    type State = usize;
    type Obs = usize;
    type Act = usize;
    type StateSpace = Discrete;
    type ObsSpace = Discrete;
    type ActionSpace = Discrete;

    fn state_space(&self) -> &Discrete { &self.state_space }

    fn observation_space(&self) -> &Discrete { &self.state_space }

    fn action_space(&self) -> &Discrete { &self.action_space }

    fn initial_state(&self, rng: &mut RngStream) -> Result<usize> {
        sample_distribution(self.initial_state_dist.view(), rng)
    }

    fn transition(&self, state: &usize, action: &usize, rng: &mut RngStream) -> Result<usize> {
        let state = self.state_space.check("state", *state)?;
        let action = self.action_space.check("action", *action)?;
        let row = self.transition_matrix.slice(ndarray::s![state, action, ..]);
        sample_distribution(row, rng)
    }

    fn reward(&self, state: &usize, action: &usize, new_state: &usize) -> Result<f64> {
        let state = self.state_space.check("state", *state)?;
        let action = self.action_space.check("action", *action)?;
        let new_state = self.state_space.check("state", *new_state)?;
        self.reward_matrix
            .get(state, action, new_state)
            .ok_or_else(|| EnvError::InvalidShape(format!("reward matrix {:?} too small", self.reward_matrix.shape())))
    }

    fn terminal(&self, _state: &usize, n_actions_taken: u64) -> bool {
        self.horizon.reached(n_actions_taken)
    }

    fn obs_from_state(&self, state: &usize) -> usize { *state }
}

/// A resettable environment over a [`TabularModel`].
pub type TabularModelEnv = ResettableEnv<TabularModel>;

impl TabularModelEnv {
    /// Build and wrap a tabular model in one go, with a reproducible seed.
    pub fn from_tables(
        transition_matrix: Array3<f64>,
        reward_matrix: impl Into<RewardMatrix>,
        horizon: Horizon,
        initial_state_dist: Option<Array1<f64>>,
        seed: u64,
    ) -> Result<Self> {
        let model = TabularModel::new(transition_matrix, reward_matrix, horizon, initial_state_dist)?;
        Ok(ResettableEnv::with_seed(model, seed))
    }
}
