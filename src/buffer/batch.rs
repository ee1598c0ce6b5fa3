//! Training batches
//!
//! A [`Batch`] flattens the trajectories of one epoch into per-timestep
//! arrays with their GAE advantages and critic targets. It lives for a single
//! update and is then dropped.

use anyhow::{Result, anyhow};
use tch::{Device, Tensor};

use super::{gae::trajectory_advantages, trajectory::Trajectory};
use crate::{env::Action, policy::ActionHead, utils::normalize::standardize};

/// Flattened batch of whole episodes
#[derive(Debug, Clone)]
pub struct Batch {
    /// Observations, row-major `[len, obs_dim]`
    pub observations: Vec<f32>,

    /// Observation dimensionality
    pub obs_dim: usize,

    /// Actions taken
    pub actions: Vec<Action>,

    /// Log probabilities under the collecting policy
    pub log_probs: Vec<f32>,

    /// Critic estimates at collection time
    pub values: Vec<f32>,

    /// GAE advantages, standardized if requested
    pub advantages: Vec<f32>,

    /// Critic targets `A_t + V(s_t)` (from the raw advantages)
    pub returns: Vec<f32>,

    /// Undiscounted return of each episode
    pub episode_returns: Vec<f32>,

    /// Length of each episode
    pub episode_lengths: Vec<usize>,

    /// Number of episodes that were truncated
    pub truncated_episodes: usize,

    /// Whether `advantages` were standardized
    pub standardized: bool,
}

/// Tensor view of a [`Batch`] on a device
#[derive(Debug)]
pub struct BatchTensors {
    /// `[N, obs_dim]`
    pub observations: Tensor,
    /// `[N]` (categorical) or `[N, dim]` (Gaussian)
    pub actions: Tensor,
    /// `[N]`
    pub log_probs: Tensor,
    /// `[N]`
    pub advantages: Tensor,
    /// `[N]`
    pub returns: Tensor,
}

impl Batch {
    /// Build a batch from finished trajectories
    ///
    /// GAE runs per trajectory, then advantages are optionally standardized
    /// over the whole batch. Returns always use the raw advantages.
    ///
    /// # Arguments
    /// * `trajectories` - Whole episodes collected under the current policy
    /// * `gamma` - Discount factor
    /// * `gae_lambda` - GAE lambda parameter
    /// * `standardize_advantages` - Rescale advantages to zero mean, unit variance
    pub fn from_trajectories(
        trajectories: &[Trajectory],
        gamma: f32,
        gae_lambda: f32,
        standardize_advantages: bool,
    ) -> Result<Self> {
        let Some(first) = trajectories.first().and_then(|t| t.transitions().first()) else {
            return Err(anyhow!("cannot build a batch from zero trajectories"));
        };
        let obs_dim = first.observation.len();
        let total: usize = trajectories.iter().map(|t| t.len()).sum();

        let mut batch = Self {
            observations: Vec::with_capacity(total * obs_dim),
            obs_dim,
            actions: Vec::with_capacity(total),
            log_probs: Vec::with_capacity(total),
            values: Vec::with_capacity(total),
            advantages: Vec::with_capacity(total),
            returns: Vec::with_capacity(total),
            episode_returns: Vec::with_capacity(trajectories.len()),
            episode_lengths: Vec::with_capacity(trajectories.len()),
            truncated_episodes: 0,
            standardized: false,
        };

        for trajectory in trajectories {
            let (advantages, returns) = trajectory_advantages(trajectory, gamma, gae_lambda);

            for t in trajectory.transitions() {
                if t.observation.len() != obs_dim {
                    return Err(anyhow!(
                        "observation of size {} in a batch of size {}",
                        t.observation.len(),
                        obs_dim
                    ));
                }
                batch.observations.extend_from_slice(&t.observation);
                batch.actions.push(t.action.clone());
                batch.log_probs.push(t.log_prob);
                batch.values.push(t.value);
            }
            batch.advantages.extend(advantages);
            batch.returns.extend(returns);

            batch.episode_returns.push(trajectory.total_reward());
            batch.episode_lengths.push(trajectory.len());
            if trajectory.is_truncated() {
                batch.truncated_episodes += 1;
            }
        }

        if standardize_advantages {
            batch.standardized = standardize(&mut batch.advantages);
        }
        Ok(batch)
    }

    /// Number of timesteps
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether the batch holds no timesteps
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Number of episodes
    pub fn num_episodes(&self) -> usize {
        self.episode_returns.len()
    }

    /// Move the batch onto `device` in the layout the networks consume
    pub fn to_tensors(&self, head: &ActionHead, device: Device) -> Result<BatchTensors> {
        let n = self.len() as i64;
        Ok(BatchTensors {
            observations: Tensor::from_slice(&self.observations)
                .view([n, self.obs_dim as i64])
                .to_device(device),
            actions: head.actions_to_tensor(&self.actions)?.to_device(device),
            log_probs: Tensor::from_slice(&self.log_probs).to_device(device),
            advantages: Tensor::from_slice(&self.advantages).to_device(device),
            returns: Tensor::from_slice(&self.returns).to_device(device),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        buffer::trajectory::{EpisodeEnd, Transition, tests::transition},
        utils::normalize::mean_std,
    };

    fn episodes() -> Vec<Trajectory> {
        vec![
            Trajectory::new(
                vec![transition(1.0, 0.5, false), transition(2.0, 0.5, true)],
                EpisodeEnd::Terminated,
            )
            .unwrap(),
            Trajectory::new(
                vec![transition(-1.0, 0.0, false)],
                EpisodeEnd::Truncated { bootstrap_value: 2.0 },
            )
            .unwrap(),
        ]
    }

    #[test]
    fn test_concatenates_trajectories() {
        let batch = Batch::from_trajectories(&episodes(), 0.99, 0.95, false).unwrap();

        assert_eq!(batch.len(), 3);
        assert_eq!(batch.obs_dim, 2);
        assert_eq!(batch.observations.len(), 6);
        assert_eq!(batch.num_episodes(), 2);
        assert_eq!(batch.episode_lengths, vec![2, 1]);
        assert_eq!(batch.episode_returns, vec![3.0, -1.0]);
        assert_eq!(batch.truncated_episodes, 1);

        // First episode matches the two-step GAE scenario
        assert!((batch.advantages[0] - 2.40575).abs() < 1e-5);
        assert!((batch.advantages[1] - 1.5).abs() < 1e-5);
        // Second episode bootstraps: -1 + 0.99 * 2 - 0
        assert!((batch.advantages[2] - 0.98).abs() < 1e-5);
    }

    #[test]
    fn test_returns_use_raw_advantages() {
        let raw = Batch::from_trajectories(&episodes(), 0.99, 0.95, false).unwrap();
        let std = Batch::from_trajectories(&episodes(), 0.99, 0.95, true).unwrap();

        assert!(std.standardized);
        assert_eq!(raw.returns, std.returns);
        for t in 0..raw.len() {
            assert_eq!(raw.returns[t], raw.advantages[t] + raw.values[t]);
        }

        let (mean, sd) = mean_std(&std.advantages);
        assert!(mean.abs() < 1e-5);
        assert!((sd - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_zero_variance_advantages_left_alone() {
        let trajs = vec![Trajectory::new(vec![transition(1.0, 0.0, true)], EpisodeEnd::Terminated).unwrap()];
        let batch = Batch::from_trajectories(&trajs, 0.99, 0.95, true).unwrap();
        assert!(!batch.standardized);
        assert_eq!(batch.advantages, vec![1.0]);
    }

    #[test]
    fn test_rejects_empty_and_ragged() {
        assert!(Batch::from_trajectories(&[], 0.99, 0.95, true).is_err());

        let ragged = Transition { observation: vec![0.0; 3], ..transition(0.0, 0.0, true) };
        let trajs = vec![
            Trajectory::new(vec![transition(0.0, 0.0, true)], EpisodeEnd::Terminated).unwrap(),
            Trajectory::new(vec![ragged], EpisodeEnd::Terminated).unwrap(),
        ];
        assert!(Batch::from_trajectories(&trajs, 0.99, 0.95, true).is_err());
    }

    #[test]
    fn test_to_tensors_shapes() {
        let batch = Batch::from_trajectories(&episodes(), 0.99, 0.95, true).unwrap();
        let tensors = batch.to_tensors(&ActionHead::Categorical { n: 4 }, Device::Cpu).unwrap();

        assert_eq!(tensors.observations.size(), vec![3, 2]);
        assert_eq!(tensors.actions.size(), vec![3]);
        assert_eq!(tensors.log_probs.size(), vec![3]);
        assert_eq!(tensors.advantages.size(), vec![3]);
        assert_eq!(tensors.returns.size(), vec![3]);

        // Discrete actions cannot feed a Gaussian head
        assert!(batch.to_tensors(&ActionHead::Gaussian { dim: 2 }, Device::Cpu).is_err());
    }
}
