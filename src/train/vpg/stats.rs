//! Training statistics for VPG
//!
//! Per-update statistics for the actor and critic, and the per-epoch
//! summary that is logged and written into the run summary.

use serde::{Deserialize, Serialize};

/// Statistics from one policy update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyStats {
    /// Policy loss before the first gradient step
    pub loss_before: f64,

    /// Policy loss after the last gradient step
    pub loss_after: f64,

    /// Mean entropy of the updated policy over the batch
    pub entropy: f64,

    /// Approximate KL between the collecting and the updated policy
    pub approx_kl: f64,

    /// Number of gradient steps taken
    pub num_updates: usize,
}

/// Statistics from one critic update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueStats {
    /// Mean squared error before the first gradient step
    pub loss_before: f64,

    /// Mean squared error after the last gradient step
    pub loss_after: f64,

    /// Explained variance of the returns after the update
    pub explained_var: f64,

    /// Number of gradient steps taken
    pub num_updates: usize,
}

/// Summary of undiscounted episode returns
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReturnStats {
    /// Mean return
    pub mean: f32,
    /// Lowest return
    pub min: f32,
    /// Highest return
    pub max: f32,
    /// Number of episodes
    pub count: usize,
}

impl ReturnStats {
    /// Summarize a list of episode returns
    pub fn from_returns(returns: &[f32]) -> Self {
        if returns.is_empty() {
            return Self::default();
        }
        Self {
            mean: returns.iter().sum::<f32>() / returns.len() as f32,
            min: returns.iter().copied().fold(f32::INFINITY, f32::min),
            max: returns.iter().copied().fold(f32::NEG_INFINITY, f32::max),
            count: returns.len(),
        }
    }
}

/// Everything recorded about one training epoch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// Zero-based epoch index
    pub epoch: usize,

    /// Timesteps collected this epoch
    pub steps: usize,

    /// Episode returns collected this epoch
    pub returns: ReturnStats,

    /// Mean episode length
    pub mean_episode_len: f32,

    /// Episodes cut off by truncation or the length cap
    pub truncated_episodes: usize,

    /// Actor update
    pub policy: PolicyStats,

    /// Critic update
    pub value: ValueStats,

    /// Wall clock time for the epoch
    pub elapsed_secs: f64,
}

impl EpochStats {
    /// Whether every episode in the epoch ended by truncation
    pub fn all_truncated(&self) -> bool {
        self.returns.count > 0 && self.truncated_episodes == self.returns.count
    }
}
