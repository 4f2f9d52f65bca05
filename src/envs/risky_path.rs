use ndarray::{array, Array3};

use crate::core::Result;
use crate::tabular::{Horizon, TabularModel, TabularModelEnv};
use crate::resettable::ResettableEnv;

/// Risky path diagnostic MDP.
///
/// States: 0 start, 1 detour, 2 goal (+1), 3 trap (-100). Goal and trap absorb.
/// Action 0 is safe: 0 -> 1 -> 2. Action 1 is risky: from 0 it reaches the
/// goal with probability 1/2 and the trap otherwise; from 1 it stays in place.
/// The reward depends on the current state only, so an agent that maximizes
/// reward (rather than imitating a lucky risky rollout) takes the safe path.
pub struct RiskyPath;

impl RiskyPath {
    pub const N_STATES: usize = 4;
    pub const N_ACTIONS: usize = 2;
    pub const HORIZON: u64 = 5;

    pub fn transition_matrix() -> Array3<f64> {
        let mut t = Array3::zeros((Self::N_STATES, Self::N_ACTIONS, Self::N_STATES));
        t[[0, 0, 1]] = 1.0;
        t[[0, 1, 2]] = 0.5;
        t[[0, 1, 3]] = 0.5;
        t[[1, 0, 2]] = 1.0;
        t[[1, 1, 1]] = 1.0;
        for s in [2, 3] {
            for a in 0..Self::N_ACTIONS {
                t[[s, a, s]] = 1.0;
            }
        }
        t
    }

    pub fn model() -> Result<TabularModel> {
        TabularModel::new(
            Self::transition_matrix(),
            array![0.0, 0.0, 1.0, -100.0],
            Horizon::Finite(Self::HORIZON),
            None,
        )
    }

    pub fn env(seed: Option<u64>) -> Result<TabularModelEnv> {
        let model = Self::model()?;
        Ok(match seed {
            Some(s) => ResettableEnv::with_seed(model, s),
            None => ResettableEnv::new(model),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Env;

    #[test]
    fn safe_path_collects_goal_reward() {
        let mut env = RiskyPath::env(Some(0)).unwrap();
        assert_eq!(env.reset().unwrap(), 0);
        let rewards: Vec<f64> = (0..5).map(|_| env.step(0).unwrap().reward).collect();
        assert_eq!(rewards, vec![0.0, 0.0, 1.0, 1.0, 1.0]);
        assert_eq!(env.cur_state(), Some(&2));
    }

    #[test]
    fn risky_action_splits_between_goal_and_trap() {
        let mut env = RiskyPath::env(Some(1)).unwrap();
        let mut outcomes = [0usize; 4];
        for _ in 0..400 {
            env.reset().unwrap();
            outcomes[env.step(1).unwrap().observation] += 1;
        }
        assert_eq!(outcomes[0] + outcomes[1], 0);
        assert!(outcomes[2] > 150 && outcomes[3] > 150, "{outcomes:?}");
    }

    #[test]
    fn episode_ends_at_horizon() {
        let mut env = RiskyPath::env(Some(2)).unwrap();
        env.reset().unwrap();
        let dones: Vec<bool> = (0..6).map(|_| env.step(0).unwrap().done).collect();
        assert_eq!(dones, vec![false, false, false, false, false, true]);
    }
}
