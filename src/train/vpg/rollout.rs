//! Rollout collection
//!
//! Runs whole episodes under the current policy until the batch holds at
//! least the configured number of timesteps. Every episode starts with a
//! reset, and an episode is never split across batches.

use anyhow::Result;

use crate::{
    buffer::{EpisodeEnd, Trajectory, Transition},
    env::{Action, Environment},
    policy::{PolicyNetwork, ValueNetwork},
};

/// Collects complete episodes for one training epoch
#[derive(Debug, Clone, Copy)]
pub struct RolloutCollector {
    min_batch_steps: usize,
    max_episode_len: usize,
}

impl RolloutCollector {
    /// Create a collector
    ///
    /// # Arguments
    /// * `min_batch_steps` - Keep starting episodes until this many steps are collected
    /// * `max_episode_len` - Truncate episodes at this length
    pub fn new(min_batch_steps: usize, max_episode_len: usize) -> Self {
        Self { min_batch_steps, max_episode_len: max_episode_len.max(1) }
    }

    /// Run episodes until at least `min_batch_steps` timesteps are collected
    ///
    /// Environment errors are returned as-is and end the collection.
    pub fn collect<E>(
        &self,
        env: &mut E,
        policy: &PolicyNetwork,
        value: &ValueNetwork,
    ) -> Result<Vec<Trajectory>>
    where
        E: Environment<Observation = Vec<f32>, Action = Action> + ?Sized,
    {
        let mut trajectories = Vec::new();
        let mut steps = 0;

        while steps < self.min_batch_steps || trajectories.is_empty() {
            let trajectory = self.run_episode(env, policy, value)?;
            steps += trajectory.len();
            trajectories.push(trajectory);
        }

        tracing::debug!("Collected {} episodes ({} steps)", trajectories.len(), steps);
        Ok(trajectories)
    }

    /// Run a single episode from reset to termination or truncation
    pub fn run_episode<E>(
        &self,
        env: &mut E,
        policy: &PolicyNetwork,
        value: &ValueNetwork,
    ) -> Result<Trajectory>
    where
        E: Environment<Observation = Vec<f32>, Action = Action> + ?Sized,
    {
        let mut observation = env.reset()?;
        let mut transitions = Vec::new();

        loop {
            let (action, log_prob) = policy.sample(&observation)?;
            let v = value.value(&observation)?;
            let step = env.step(action.clone())?;

            transitions.push(Transition {
                observation,
                action,
                reward: step.reward,
                log_prob,
                value: v,
                done: step.terminated,
            });

            if step.terminated {
                return Trajectory::new(transitions, EpisodeEnd::Terminated);
            }
            if step.truncated || transitions.len() >= self.max_episode_len {
                let bootstrap_value = value.value(&step.observation)?;
                return Trajectory::new(transitions, EpisodeEnd::Truncated { bootstrap_value });
            }
            observation = step.observation;
        }
    }
}
