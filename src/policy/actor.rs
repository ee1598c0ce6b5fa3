//! Policy network (actor)
//!
//! Maps observations to an action distribution. The distribution family is
//! fixed at construction from the environment's action space:
//!
//! - discrete spaces get a categorical head over `n` logits
//! - continuous spaces get a diagonal Gaussian whose mean comes from the
//!   MLP and whose log standard deviation is a free, state-independent
//!   parameter initialised to -0.5

use std::{f64::consts::PI, path::Path};

use anyhow::{Context, Result, anyhow};
use tch::{
    Device, Kind, Tensor,
    nn::{self, Init, Module, OptimizerConfig},
};

use super::mlp::{MlpConfig, build_mlp};
use crate::env::{Action, SpaceInfo, SpaceType};

/// Initial value of the Gaussian head's log standard deviation
pub const INITIAL_LOG_STD: f64 = -0.5;

/// Action distribution family
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActionHead {
    /// Categorical distribution over `n` actions
    Categorical {
        /// Number of actions
        n: i64,
    },

    /// Diagonal Gaussian over a `dim`-dimensional action
    Gaussian {
        /// Action dimensionality
        dim: i64,
    },
}

impl ActionHead {
    /// Pick the head matching an action space
    pub fn for_space(space: &SpaceInfo) -> Result<Self> {
        match space.dtype {
            SpaceType::Discrete(0) => Err(anyhow!("discrete action space must have at least one action")),
            SpaceType::Discrete(n) => Ok(ActionHead::Categorical { n: n as i64 }),
            SpaceType::Continuous { .. } => match space.flat_dim() {
                0 => Err(anyhow!("continuous action space must have at least one dimension")),
                dim => Ok(ActionHead::Gaussian { dim: dim as i64 }),
            },
        }
    }

    /// Width of the MLP output layer
    pub fn output_dim(&self) -> i64 {
        match *self {
            ActionHead::Categorical { n } => n,
            ActionHead::Gaussian { dim } => dim,
        }
    }

    /// Stack a slice of actions into the tensor `log_prob` expects
    ///
    /// Categorical actions become an `Int64` tensor `[N]`, Gaussian actions a
    /// `Float` tensor `[N, dim]`.
    pub fn actions_to_tensor(&self, actions: &[Action]) -> Result<Tensor> {
        match *self {
            ActionHead::Categorical { n } => {
                let indices = actions
                    .iter()
                    .map(|a| match a {
                        Action::Discrete(i) if (0..n).contains(i) => Ok(*i),
                        other => Err(anyhow!("expected discrete action in [0, {}), got {:?}", n, other)),
                    })
                    .collect::<Result<Vec<i64>>>()?;
                Ok(Tensor::from_slice(&indices))
            }
            ActionHead::Gaussian { dim } => {
                let mut flat = Vec::with_capacity(actions.len() * dim as usize);
                for a in actions {
                    match a {
                        Action::Continuous(v) if v.len() == dim as usize => flat.extend_from_slice(v),
                        other => {
                            return Err(anyhow!("expected continuous action of dim {}, got {:?}", dim, other));
                        }
                    }
                }
                Ok(Tensor::from_slice(&flat).view([actions.len() as i64, dim]))
            }
        }
    }
}

/// Stochastic policy network
pub struct PolicyNetwork {
    vs: nn::VarStore,
    net: nn::Sequential,
    log_std: Option<Tensor>,
    head: ActionHead,
    obs_dim: i64,
    device: Device,
}

impl PolicyNetwork {
    /// Create a new policy
    ///
    /// # Arguments
    ///
    /// * `obs_dim` - Observation space dimensionality
    /// * `action_space` - Environment action space, selects the head
    /// * `config` - Hidden layer architecture
    pub fn new(obs_dim: i64, action_space: &SpaceInfo, config: &MlpConfig) -> Result<Self> {
        config.validate()?;
        if obs_dim <= 0 {
            return Err(anyhow!("obs_dim must be positive, got {}", obs_dim));
        }
        let head = ActionHead::for_space(action_space)?;

        let device = Device::cuda_if_available();
        tracing::info!("PolicyNetwork using device: {:?}", device);
        let vs = nn::VarStore::new(device);
        let root = vs.root();

        let net = build_mlp(&(&root / "pi"), obs_dim, head.output_dim(), 0.01, config);
        let log_std = match head {
            ActionHead::Gaussian { dim } => {
                Some(root.var("log_std", &[dim], Init::Const(INITIAL_LOG_STD)))
            }
            ActionHead::Categorical { .. } => None,
        };

        Ok(Self { vs, net, log_std, head, obs_dim, device })
    }

    /// Logits (categorical) or means (Gaussian) for a batch `[N, obs_dim]`
    pub fn forward(&self, obs: &Tensor) -> Tensor {
        self.net.forward(obs)
    }

    /// Sample one action for a single observation
    ///
    /// Runs without gradient tracking. Randomness comes from libtorch's
    /// generator, so `tch::manual_seed` makes sampling reproducible.
    ///
    /// Returns the action and its log probability.
    pub fn sample(&self, obs: &[f32]) -> Result<(Action, f32)> {
        if obs.len() as i64 != self.obs_dim {
            return Err(anyhow!("observation has {} values, policy expects {}", obs.len(), self.obs_dim));
        }

        tch::no_grad(|| -> Result<(Action, f32)> {
            let obs_t = Tensor::from_slice(obs).to_device(self.device).unsqueeze(0);
            let out = self.forward(&obs_t);

            let (action, action_t) = match (self.head, &self.log_std) {
                (ActionHead::Categorical { .. }, _) => {
                    let index = out.softmax(-1, Kind::Float).multinomial(1, true).view([1]);
                    let a = i64::try_from(&index)?;
                    (Action::Discrete(a), index)
                }
                (ActionHead::Gaussian { .. }, Some(log_std)) => {
                    let noise = out.randn_like() * log_std.exp();
                    let sample = &out + noise;
                    let values = Vec::<f32>::try_from(&sample.view([-1]))?;
                    (Action::Continuous(values), sample)
                }
                (ActionHead::Gaussian { .. }, None) => {
                    return Err(anyhow!("Gaussian head without log_std parameter"));
                }
            };

            let log_prob = f32::try_from(&self.log_prob(&obs_t, &action_t).view([1]))?;
            Ok((action, log_prob))
        })
    }

    /// Log probability of `actions` under the current policy
    ///
    /// Differentiable with respect to the policy parameters.
    ///
    /// # Arguments
    ///
    /// * `obs` - Observations `[N, obs_dim]`
    /// * `actions` - `Int64 [N]` for categorical, `Float [N, dim]` for Gaussian
    ///
    /// # Returns
    /// Log probabilities `[N]`
    pub fn log_prob(&self, obs: &Tensor, actions: &Tensor) -> Tensor {
        let out = self.forward(obs);
        match &self.log_std {
            None => out
                .log_softmax(-1, Kind::Float)
                .gather(-1, &actions.to_kind(Kind::Int64).unsqueeze(-1), false)
                .squeeze_dim(-1),
            Some(log_std) => {
                let z = (actions - &out) / log_std.exp();
                (z.square() * -0.5 - log_std - 0.5 * (2.0 * PI).ln())
                    .sum_dim_intlist(-1, false, Kind::Float)
            }
        }
    }

    /// Mean entropy of the action distribution over a batch
    pub fn entropy(&self, obs: &Tensor) -> Tensor {
        match &self.log_std {
            None => {
                let log_probs = self.forward(obs).log_softmax(-1, Kind::Float);
                let probs = log_probs.exp();
                -(probs * log_probs).sum_dim_intlist(-1, false, Kind::Float).mean(Kind::Float)
            }
            // State independent: sum over dims of 0.5 * ln(2*pi*e) + log_std
            Some(log_std) => (log_std + 0.5 + 0.5 * (2.0 * PI).ln()).sum(Kind::Float),
        }
    }

    /// Action distribution family
    pub fn head(&self) -> ActionHead {
        self.head
    }

    /// Observation dimensionality
    pub fn obs_dim(&self) -> i64 {
        self.obs_dim
    }

    /// Get the device this policy is on (CPU or CUDA)
    pub fn device(&self) -> Device {
        self.device
    }

    /// Get reference to variable store
    pub fn var_store(&self) -> &nn::VarStore {
        &self.vs
    }

    /// Create an Adam optimizer over this policy's parameters
    pub fn optimizer(&self, learning_rate: f64) -> Result<nn::Optimizer> {
        Ok(nn::Adam::default().build(&self.vs, learning_rate)?)
    }

    /// Save model parameters to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.vs.save(path).with_context(|| format!("failed to save policy to {}", path.display()))
    }

    /// Load model parameters from a file
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.vs.load(path).with_context(|| format!("failed to load policy from {}", path.display()))
    }
}
