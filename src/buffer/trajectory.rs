//! Single-episode trajectories
//!
//! A [`Trajectory`] is built by the rollout collector while an episode runs
//! and is immutable once the episode ends. How it ended decides the GAE
//! bootstrap: nothing after a true termination, the critic's estimate of
//! the next state after a truncation.

use anyhow::{Result, anyhow};

use crate::env::Action;

/// One environment step as seen by the learner
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Observation the action was chosen from
    pub observation: Vec<f32>,

    /// Action taken
    pub action: Action,

    /// Reward received
    pub reward: f32,

    /// Log probability of `action` under the collecting policy
    pub log_prob: f32,

    /// Critic estimate V(observation)
    pub value: f32,

    /// True termination after this step (never set on truncation)
    pub done: bool,
}

/// How an episode ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EpisodeEnd {
    /// The environment reached a terminal state
    Terminated,

    /// The episode was cut short; the next state still has value
    Truncated {
        /// Critic estimate of the state after the last transition
        bootstrap_value: f32,
    },
}

impl EpisodeEnd {
    /// Value used for V(s_T) when computing the last TD residual
    pub fn bootstrap_value(&self) -> f32 {
        match *self {
            EpisodeEnd::Terminated => 0.0,
            EpisodeEnd::Truncated { bootstrap_value } => bootstrap_value,
        }
    }
}

/// Ordered transitions of one finished episode
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    transitions: Vec<Transition>,
    end: EpisodeEnd,
}

impl Trajectory {
    /// Seal a finished episode
    ///
    /// Only the final transition may carry `done`, and it must carry it
    /// exactly when the episode terminated.
    pub fn new(transitions: Vec<Transition>, end: EpisodeEnd) -> Result<Self> {
        let Some(last) = transitions.last() else {
            return Err(anyhow!("trajectory must contain at least one transition"));
        };
        if last.done != matches!(end, EpisodeEnd::Terminated) {
            return Err(anyhow!("final done flag {} does not match episode end {:?}", last.done, end));
        }
        if let Some(t) = transitions[..transitions.len() - 1].iter().position(|t| t.done) {
            return Err(anyhow!("transition {} is marked done before the end of the trajectory", t));
        }
        Ok(Self { transitions, end })
    }

    /// Transitions in time order
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// How the episode ended
    pub fn end(&self) -> EpisodeEnd {
        self.end
    }

    /// Number of timesteps
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Always false for a sealed trajectory
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Whether the episode was truncated rather than terminated
    pub fn is_truncated(&self) -> bool {
        matches!(self.end, EpisodeEnd::Truncated { .. })
    }

    /// Per-step rewards
    pub fn rewards(&self) -> Vec<f32> {
        self.transitions.iter().map(|t| t.reward).collect()
    }

    /// Per-step value estimates
    pub fn values(&self) -> Vec<f32> {
        self.transitions.iter().map(|t| t.value).collect()
    }

    /// Per-step termination flags
    pub fn dones(&self) -> Vec<bool> {
        self.transitions.iter().map(|t| t.done).collect()
    }

    /// Undiscounted episode return
    pub fn total_reward(&self) -> f32 {
        self.transitions.iter().map(|t| t.reward).sum()
    }
}
