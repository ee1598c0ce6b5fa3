//! # lander-vpg
//!
//! Vanilla Policy Gradient with Generalized Advantage Estimation on
//! LunarLander, built on tch-rs.
//!
//! The crate trains two small MLPs, a stochastic policy and a state value
//! critic, on a built-in LunarLander simulation, saves their parameters and
//! records GIF videos of selected episodes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lander_vpg::prelude::*;
//!
//! let config = VPGConfig::new().epochs(10);
//! let env = LunarLander::with_config(LanderConfig { seed: config.seed, ..Default::default() });
//! let mut trainer = VPGTrainer::new(config, env)?;
//! trainer.train()?;
//! trainer.save(DEFAULT_RUN_DIR)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Environment traits and implementations
pub mod env;

/// Policy and value networks
pub mod policy;

/// Trajectories, GAE and training batches
pub mod buffer;

/// Training algorithms (VPG)
pub mod train;

/// Utility functions and helpers
pub mod utils;

/// Run output directory and summary
pub mod artifacts;

/// Prelude module for convenient imports
///
/// This module re-exports commonly used types and traits for convenience.
pub mod prelude {
    pub use crate::{
        artifacts::{DEFAULT_RUN_DIR, RunDir, RunSummary},
        env::{
            Action, Environment, Render,
            lunar_lander::{LanderConfig, LunarLander},
            record::{RecordVideo, capped_cubic_schedule, every_episode, every_n},
        },
        policy::{Activation, MlpConfig, PolicyNetwork, ValueNetwork},
        train::vpg::{EpochStats, VPGConfig, VPGTrainer, evaluate},
    };
}

/// Current version of lander-vpg
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
