//! Value network (critic)
//!
//! Estimates the state value V(s) used as the GAE baseline and as the
//! bootstrap for truncated episodes.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tch::{
    Device, Tensor,
    nn::{self, Module, OptimizerConfig},
};

use super::mlp::{MlpConfig, build_mlp};

/// State value estimator
pub struct ValueNetwork {
    vs: nn::VarStore,
    net: nn::Sequential,
    obs_dim: i64,
    device: Device,
}

impl ValueNetwork {
    /// Create a new value network
    ///
    /// # Arguments
    ///
    /// * `obs_dim` - Observation space dimensionality
    /// * `config` - Hidden layer architecture
    pub fn new(obs_dim: i64, config: &MlpConfig) -> Result<Self> {
        config.validate()?;
        if obs_dim <= 0 {
            return Err(anyhow!("obs_dim must be positive, got {}", obs_dim));
        }

        let device = Device::cuda_if_available();
        tracing::info!("ValueNetwork using device: {:?}", device);
        let vs = nn::VarStore::new(device);
        let net = build_mlp(&(vs.root() / "vf"), obs_dim, 1, 1.0, config);

        Ok(Self { vs, net, obs_dim, device })
    }

    /// Values for a batch of observations `[N, obs_dim]` -> `[N]`
    pub fn forward(&self, obs: &Tensor) -> Tensor {
        self.net.forward(obs).squeeze_dim(-1)
    }

    /// Value of a single observation, without gradient tracking
    pub fn value(&self, obs: &[f32]) -> Result<f32> {
        if obs.len() as i64 != self.obs_dim {
            return Err(anyhow!("observation has {} values, critic expects {}", obs.len(), self.obs_dim));
        }
        tch::no_grad(|| -> Result<f32> {
            let obs_t = Tensor::from_slice(obs).to_device(self.device).unsqueeze(0);
            Ok(f32::try_from(&self.forward(&obs_t))?)
        })
    }

    /// Observation dimensionality
    pub fn obs_dim(&self) -> i64 {
        self.obs_dim
    }

    /// Get the device this network is on (CPU or CUDA)
    pub fn device(&self) -> Device {
        self.device
    }

    /// Get reference to variable store
    pub fn var_store(&self) -> &nn::VarStore {
        &self.vs
    }

    /// Create an Adam optimizer over this network's parameters
    pub fn optimizer(&self, learning_rate: f64) -> Result<nn::Optimizer> {
        Ok(nn::Adam::default().build(&self.vs, learning_rate)?)
    }

    /// Save model parameters to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.vs.save(path).with_context(|| format!("failed to save critic to {}", path.display()))
    }

    /// Load model parameters from a file
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.vs.load(path).with_context(|| format!("failed to load critic from {}", path.display()))
    }
}
