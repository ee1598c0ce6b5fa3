//! Environment traits and implementations
//!
//! This module defines the core environment interface used by the rollout
//! collector, the action representation shared with the policy, and the
//! built-in LunarLander environment.

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Core trait for RL environments
pub trait Environment {
    /// Observation type
    type Observation;

    /// Action type
    type Action;

    /// Reset the environment and return initial observation
    fn reset(&mut self) -> Result<Self::Observation>;

    /// Step the environment with an action
    fn step(&mut self, action: Self::Action) -> Result<StepResult<Self::Observation>>;

    /// Get the observation space dimensions
    fn observation_space(&self) -> SpaceInfo;

    /// Get the action space dimensions
    fn action_space(&self) -> SpaceInfo;
}

/// Environments that can draw their current state as an RGB frame
pub trait Render {
    /// Rasterize the current state into a packed RGB buffer of
    /// `width * height * 3` bytes, row-major from the top-left corner.
    fn render_rgb(&self, width: u32, height: u32) -> Result<Vec<u8>>;
}

/// Result of an environment step
#[derive(Debug, Clone)]
pub struct StepResult<O> {
    /// Next observation
    pub observation: O,

    /// Reward received
    pub reward: f32,

    /// Whether the episode terminated
    pub terminated: bool,

    /// Whether the episode was truncated
    pub truncated: bool,
}

impl<O> StepResult<O> {
    /// Whether this step ended the episode for any reason
    pub fn is_done(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// Space information for observations and actions
#[derive(Debug, Clone, PartialEq)]
pub struct SpaceInfo {
    /// Shape of the space
    pub shape: Vec<usize>,

    /// Data type
    pub dtype: SpaceType,
}

impl SpaceInfo {
    /// Flattened number of elements in one sample of this space
    pub fn flat_dim(&self) -> usize {
        self.shape.iter().product()
    }
}

/// Space data types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpaceType {
    /// Discrete space with n options
    Discrete(usize),

    /// Continuous space (Box) bounded to `[low, high]` per dimension
    Continuous {
        /// Lower bound
        low: f32,
        /// Upper bound
        high: f32,
    },
}

/// An action emitted by the policy
///
/// The variant matches the action head the policy was built with, which in
/// turn matches the environment's action space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Index into a discrete action set
    Discrete(i64),

    /// Real-valued action vector
    Continuous(Vec<f32>),
}

impl Action {
    /// Discrete index, if this is a discrete action
    pub fn as_discrete(&self) -> Option<i64> {
        match self {
            Action::Discrete(a) => Some(*a),
            Action::Continuous(_) => None,
        }
    }

    /// Continuous components, if this is a continuous action
    pub fn as_continuous(&self) -> Option<&[f32]> {
        match self {
            Action::Discrete(_) => None,
            Action::Continuous(a) => Some(a),
        }
    }
}

pub mod lunar_lander;
pub mod record;
