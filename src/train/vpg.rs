//! Vanilla Policy Gradient (VPG) with a learned baseline
//!
//! This module implements actor-critic VPG with Generalized Advantage
//! Estimation.
//!
//! # Algorithm Overview
//!
//! ```text
//! For each epoch:
//!   1. Collect whole episodes with the current policy (>= steps_per_epoch steps)
//!   2. Compute advantages per episode using GAE
//!   3. Optionally standardize advantages over the batch
//!   4. Policy step(s) on -mean(log π(a|s) * A)
//!   5. Critic steps on mean((V(s) - R)^2)
//! ```
//!
//! Unlike PPO the policy batch is used once: the gradient estimate is only
//! valid for the policy that generated the data.
//!
//! # References
//!
//! - [High-Dimensional Continuous Control Using Generalized Advantage Estimation](https://arxiv.org/abs/1506.02438)
//! - [OpenAI Spinning Up: VPG](https://spinningup.openai.com/en/latest/algorithms/vpg.html)

pub mod config;
pub mod evaluate;
pub mod loss;
pub mod rollout;
pub mod stats;
pub mod trainer;

pub use config::VPGConfig;
pub use evaluate::evaluate;
pub use loss::{approx_kl, compute_policy_loss, compute_value_loss, finite_scalar};
pub use rollout::RolloutCollector;
pub use stats::{EpochStats, PolicyStats, ReturnStats, ValueStats};
pub use trainer::VPGTrainer;
