//! VPG Trainer implementation
//!
//! This module contains the VPGTrainer struct, which owns the environment,
//! both networks and their optimizers for the lifetime of a run.

use std::{path::Path, time::Instant};

use anyhow::{Result, anyhow};
use tch::nn;

use super::{
    config::VPGConfig,
    loss::{approx_kl, compute_policy_loss, compute_value_loss, finite_scalar},
    rollout::RolloutCollector,
    stats::{EpochStats, PolicyStats, ReturnStats, ValueStats},
};
use crate::{
    artifacts::{ACTOR_FILE, CRITIC_FILE},
    buffer::{Batch, BatchTensors, Trajectory},
    env::{Action, Environment, SpaceType},
    policy::{PolicyNetwork, ValueNetwork},
};

/// VPG Trainer for actor-critic policy optimization
///
/// Each epoch collects a batch of whole episodes, computes GAE advantages,
/// takes `policy_iters` policy gradient steps and `value_iters` critic
/// regression steps.
pub struct VPGTrainer<E> {
    config: VPGConfig,
    env: E,
    policy: PolicyNetwork,
    value: ValueNetwork,
    pi_optimizer: nn::Optimizer,
    vf_optimizer: nn::Optimizer,
    collector: RolloutCollector,
    history: Vec<EpochStats>,
    total_steps: usize,
    total_episodes: usize,
}

impl<E> VPGTrainer<E>
where
    E: Environment<Observation = Vec<f32>, Action = Action>,
{
    /// Create a new VPG trainer
    ///
    /// Seeds libtorch with `config.seed` before building the networks, so
    /// initial weights and action sampling are reproducible. The environment
    /// is seeded by whoever constructs it.
    ///
    /// # Arguments
    ///
    /// * `config` - VPG configuration parameters
    /// * `env` - Environment to train in
    pub fn new(config: VPGConfig, env: E) -> Result<Self> {
        config.validate()?;
        tch::manual_seed(config.seed as i64);

        let obs_space = env.observation_space();
        if !matches!(obs_space.dtype, SpaceType::Continuous { .. }) || obs_space.shape.len() != 1 {
            return Err(anyhow!("expected a flat continuous observation space, got {:?}", obs_space));
        }
        let obs_dim = obs_space.flat_dim() as i64;
        let action_space = env.action_space();

        let mlp = config.mlp_config();
        let policy = PolicyNetwork::new(obs_dim, &action_space, &mlp)?;
        let value = ValueNetwork::new(obs_dim, &mlp)?;
        let pi_optimizer = policy.optimizer(config.pi_lr)?;
        let vf_optimizer = value.optimizer(config.vf_lr)?;
        let collector = RolloutCollector::new(config.steps_per_epoch, config.max_episode_len);

        tracing::info!(
            "VPG trainer: obs_dim={} action_space={:?} hidden={:?} activation={:?}",
            obs_dim,
            action_space.dtype,
            config.hidden_sizes,
            config.activation
        );

        Ok(Self {
            config,
            env,
            policy,
            value,
            pi_optimizer,
            vf_optimizer,
            collector,
            history: Vec::new(),
            total_steps: 0,
            total_episodes: 0,
        })
    }

    /// Collect one epoch of whole episodes with the current policy
    pub fn collect(&mut self) -> Result<Vec<Trajectory>> {
        self.collector.collect(&mut self.env, &self.policy, &self.value)
    }

    /// Take `policy_iters` gradient steps on the policy loss
    pub fn update_policy(&mut self, batch: &BatchTensors) -> Result<PolicyStats> {
        let mut stats = PolicyStats::default();

        for i in 0..self.config.policy_iters {
            let log_probs = self.policy.log_prob(&batch.observations, &batch.actions);
            let loss = compute_policy_loss(&log_probs, &batch.advantages);
            let loss_val = finite_scalar(&loss, "policy")?;
            if i == 0 {
                stats.loss_before = loss_val;
            }

            self.pi_optimizer.zero_grad();
            loss.backward();
            if let Some(max_norm) = self.config.max_grad_norm {
                self.pi_optimizer.clip_grad_norm(max_norm);
            }
            self.pi_optimizer.step();
            stats.num_updates += 1;
        }

        tch::no_grad(|| -> Result<()> {
            let log_probs = self.policy.log_prob(&batch.observations, &batch.actions);
            stats.loss_after =
                finite_scalar(&compute_policy_loss(&log_probs, &batch.advantages), "policy")?;
            stats.approx_kl = approx_kl(&batch.log_probs, &log_probs);
            stats.entropy = f64::try_from(self.policy.entropy(&batch.observations))?;
            Ok(())
        })?;

        Ok(stats)
    }

    /// Take `value_iters` regression steps on the critic
    pub fn update_value(&mut self, batch: &BatchTensors) -> Result<ValueStats> {
        let mut stats = ValueStats::default();

        for i in 0..self.config.value_iters {
            let values = self.value.forward(&batch.observations);
            let (loss, _) = compute_value_loss(&values, &batch.returns);
            let loss_val = finite_scalar(&loss, "value")?;
            if i == 0 {
                stats.loss_before = loss_val;
            }

            self.vf_optimizer.zero_grad();
            loss.backward();
            if let Some(max_norm) = self.config.max_grad_norm {
                self.vf_optimizer.clip_grad_norm(max_norm);
            }
            self.vf_optimizer.step();
            stats.num_updates += 1;
        }

        tch::no_grad(|| -> Result<()> {
            let values = self.value.forward(&batch.observations);
            let (loss, explained_var) = compute_value_loss(&values, &batch.returns);
            stats.loss_after = finite_scalar(&loss, "value")?;
            stats.explained_var = explained_var;
            Ok(())
        })?;

        Ok(stats)
    }

    /// Run one full epoch: collect, estimate advantages, update both networks
    pub fn train_epoch(&mut self) -> Result<EpochStats> {
        let start = Instant::now();
        let epoch = self.history.len();

        let trajectories = self.collect()?;
        let batch = Batch::from_trajectories(
            &trajectories,
            self.config.gamma as f32,
            self.config.gae_lambda as f32,
            self.config.standardize_advantages,
        )?;
        drop(trajectories);

        let tensors = batch.to_tensors(&self.policy.head(), self.policy.device())?;
        let policy = self.update_policy(&tensors)?;
        let value = self.update_value(&tensors)?;

        let stats = EpochStats {
            epoch,
            steps: batch.len(),
            returns: ReturnStats::from_returns(&batch.episode_returns),
            mean_episode_len: batch.len() as f32 / batch.num_episodes() as f32,
            truncated_episodes: batch.truncated_episodes,
            policy,
            value,
            elapsed_secs: start.elapsed().as_secs_f64(),
        };

        self.total_steps += stats.steps;
        self.total_episodes += stats.returns.count;

        if stats.all_truncated() {
            tracing::warn!(
                "Epoch {}: all {} episodes were truncated (max_episode_len = {})",
                epoch,
                stats.returns.count,
                self.config.max_episode_len
            );
        }
        tracing::info!(
            "Epoch {}/{} | Episodes: {} | Return: {:.1} (min {:.1}, max {:.1}) | Len: {:.1} | Pi loss: {:.4} | V loss: {:.3} -> {:.3} | Entropy: {:.3} | KL: {:.5} | EV: {:.3} | {:.1}s",
            epoch + 1,
            self.config.epochs,
            stats.returns.count,
            stats.returns.mean,
            stats.returns.min,
            stats.returns.max,
            stats.mean_episode_len,
            stats.policy.loss_before,
            stats.value.loss_before,
            stats.value.loss_after,
            stats.policy.entropy,
            stats.policy.approx_kl,
            stats.value.explained_var,
            stats.elapsed_secs,
        );

        self.history.push(stats.clone());
        Ok(stats)
    }

    /// Run all configured epochs
    ///
    /// Any error (environment failure, non-finite loss) halts training.
    pub fn train(&mut self) -> Result<&[EpochStats]> {
        tracing::info!(
            "Training VPG for {} epochs of at least {} steps",
            self.config.epochs,
            self.config.steps_per_epoch
        );
        for _ in 0..self.config.epochs {
            self.train_epoch()?;
        }
        Ok(&self.history)
    }

    /// Save actor and critic parameters into `dir`
    pub fn save<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        self.policy.save(dir.join(ACTOR_FILE))?;
        self.value.save(dir.join(CRITIC_FILE))?;
        tracing::info!("Saved actor and critic to {}", dir.display());
        Ok(())
    }

    /// Get reference to the policy
    pub fn policy(&self) -> &PolicyNetwork {
        &self.policy
    }

    /// Get reference to the value network
    pub fn value(&self) -> &ValueNetwork {
        &self.value
    }

    /// Get the configuration
    pub fn config(&self) -> &VPGConfig {
        &self.config
    }

    /// Get mutable reference to the environment
    pub fn env_mut(&mut self) -> &mut E {
        &mut self.env
    }

    /// Statistics of every completed epoch
    pub fn history(&self) -> &[EpochStats] {
        &self.history
    }

    /// Get total environment steps collected
    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    /// Get total episodes completed
    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }

    /// Hand back the environment, dropping networks and optimizers
    pub fn into_env(self) -> E {
        self.env
    }
}
