//! Training algorithms
//!
//! This module implements actor-critic VPG.

pub mod vpg;

pub use vpg::{
    EpochStats, PolicyStats, RolloutCollector, VPGConfig, VPGTrainer, ValueStats, evaluate,
};
