//! VPG configuration and hyperparameters
//!
//! This module defines the configuration parameters for VPG training
//! and provides validation and builder pattern methods.

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::policy::{Activation, MlpConfig};

/// VPG configuration parameters
///
/// Defaults follow the LunarLander training script: small MLPs, a single
/// policy step and many critic steps per batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VPGConfig {
    /// Policy (actor) learning rate
    pub pi_lr: f64,

    /// Value function (critic) learning rate
    pub vf_lr: f64,

    /// Discount factor (gamma)
    pub gamma: f64,

    /// GAE lambda parameter
    pub gae_lambda: f64,

    /// Minimum timesteps collected per epoch (whole episodes only)
    pub steps_per_epoch: usize,

    /// Number of training epochs
    pub epochs: usize,

    /// Episodes longer than this are truncated by the collector
    pub max_episode_len: usize,

    /// Policy gradient steps per batch
    pub policy_iters: usize,

    /// Critic regression steps per batch
    pub value_iters: usize,

    /// Standardize advantages over the batch before the policy step
    pub standardize_advantages: bool,

    /// Maximum gradient norm for clipping, off when `None`
    pub max_grad_norm: Option<f64>,

    /// Hidden layer widths, shared by actor and critic
    pub hidden_sizes: Vec<i64>,

    /// Hidden layer activation
    pub activation: Activation,

    /// Seed for libtorch and the environment
    pub seed: u64,
}

impl Default for VPGConfig {
    fn default() -> Self {
        Self {
            pi_lr: 3e-3,
            vf_lr: 1e-3,
            gamma: 0.99,
            gae_lambda: 0.97,
            steps_per_epoch: 3000,
            epochs: 50,
            max_episode_len: 300,
            policy_iters: 1,
            value_iters: 100,
            standardize_advantages: true,
            max_grad_norm: None,
            hidden_sizes: vec![64, 64],
            activation: Activation::Tanh,
            seed: 0,
        }
    }
}

impl VPGConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !(self.pi_lr > 0.0 && self.pi_lr.is_finite()) {
            return Err(anyhow!("pi_lr must be positive"));
        }
        if !(self.vf_lr > 0.0 && self.vf_lr.is_finite()) {
            return Err(anyhow!("vf_lr must be positive"));
        }
        if !(0.0..1.0).contains(&self.gamma) {
            return Err(anyhow!("gamma must be in [0, 1)"));
        }
        if !(0.0..=1.0).contains(&self.gae_lambda) {
            return Err(anyhow!("gae_lambda must be in [0, 1]"));
        }
        if self.steps_per_epoch == 0 {
            return Err(anyhow!("steps_per_epoch must be positive"));
        }
        if self.epochs == 0 {
            return Err(anyhow!("epochs must be positive"));
        }
        if self.max_episode_len == 0 {
            return Err(anyhow!("max_episode_len must be positive"));
        }
        if self.policy_iters == 0 {
            return Err(anyhow!("policy_iters must be positive"));
        }
        if self.value_iters == 0 {
            return Err(anyhow!("value_iters must be positive"));
        }
        if let Some(norm) = self.max_grad_norm
            && norm <= 0.0
        {
            return Err(anyhow!("max_grad_norm must be positive"));
        }
        self.mlp_config().validate()
    }

    /// Network architecture for actor and critic
    pub fn mlp_config(&self) -> MlpConfig {
        MlpConfig {
            hidden_sizes: self.hidden_sizes.clone(),
            activation: self.activation,
            ..Default::default()
        }
    }

    /// Set policy learning rate
    pub fn pi_lr(mut self, lr: f64) -> Self {
        self.pi_lr = lr;
        self
    }

    /// Set value function learning rate
    pub fn vf_lr(mut self, lr: f64) -> Self {
        self.vf_lr = lr;
        self
    }

    /// Set discount factor
    pub fn gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    /// Set GAE lambda
    pub fn gae_lambda(mut self, lambda: f64) -> Self {
        self.gae_lambda = lambda;
        self
    }

    /// Set minimum timesteps per epoch
    pub fn steps_per_epoch(mut self, steps: usize) -> Self {
        self.steps_per_epoch = steps;
        self
    }

    /// Set number of epochs
    pub fn epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Set episode length cap
    pub fn max_episode_len(mut self, len: usize) -> Self {
        self.max_episode_len = len;
        self
    }

    /// Set policy gradient steps per batch
    pub fn policy_iters(mut self, iters: usize) -> Self {
        self.policy_iters = iters;
        self
    }

    /// Set critic regression steps per batch
    pub fn value_iters(mut self, iters: usize) -> Self {
        self.value_iters = iters;
        self
    }

    /// Enable or disable advantage standardization
    pub fn standardize_advantages(mut self, enabled: bool) -> Self {
        self.standardize_advantages = enabled;
        self
    }

    /// Set maximum gradient norm
    pub fn max_grad_norm(mut self, norm: Option<f64>) -> Self {
        self.max_grad_norm = norm;
        self
    }

    /// Set hidden layer widths
    pub fn hidden_sizes(mut self, sizes: Vec<i64>) -> Self {
        self.hidden_sizes = sizes;
        self
    }

    /// Set hidden activation
    pub fn activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    /// Set random seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = VPGConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pi_lr, 3e-3);
        assert_eq!(config.vf_lr, 1e-3);
        assert_eq!(config.gae_lambda, 0.97);
        assert_eq!(config.steps_per_epoch, 3000);
        assert_eq!(config.value_iters, 100);
        assert_eq!(config.hidden_sizes, vec![64, 64]);
        assert!(config.standardize_advantages);
    }

    #[test]
    fn test_config_validation() {
        assert!(VPGConfig::new().pi_lr(0.0).validate().is_err());
        assert!(VPGConfig::new().vf_lr(-1.0).validate().is_err());

        // gamma must stay below 1
        assert!(VPGConfig::new().gamma(1.0).validate().is_err());
        assert!(VPGConfig::new().gamma(0.0).validate().is_ok());

        // lambda = 1 is Monte Carlo and allowed
        assert!(VPGConfig::new().gae_lambda(1.0).validate().is_ok());
        assert!(VPGConfig::new().gae_lambda(1.1).validate().is_err());

        assert!(VPGConfig::new().steps_per_epoch(0).validate().is_err());
        assert!(VPGConfig::new().epochs(0).validate().is_err());
        assert!(VPGConfig::new().max_episode_len(0).validate().is_err());
        assert!(VPGConfig::new().policy_iters(0).validate().is_err());
        assert!(VPGConfig::new().value_iters(0).validate().is_err());
        assert!(VPGConfig::new().max_grad_norm(Some(0.0)).validate().is_err());
        assert!(VPGConfig::new().max_grad_norm(Some(0.5)).validate().is_ok());
        assert!(VPGConfig::new().hidden_sizes(vec![0]).validate().is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = VPGConfig::new()
            .pi_lr(1e-2)
            .epochs(5)
            .steps_per_epoch(200)
            .activation(Activation::ReLU)
            .seed(42);

        assert_eq!(config.pi_lr, 1e-2);
        assert_eq!(config.epochs, 5);
        assert_eq!(config.steps_per_epoch, 200);
        assert_eq!(config.mlp_config().activation, Activation::ReLU);
        assert_eq!(config.seed, 42);

        // Other values should remain default
        assert_eq!(config.gamma, 0.99);
        assert_eq!(config.max_episode_len, 300);
    }

    #[test]
    fn test_config_serde() {
        let config = VPGConfig::new().max_grad_norm(Some(0.5)).hidden_sizes(vec![32]);
        let json = serde_json::to_string(&config).unwrap();
        let back: VPGConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
