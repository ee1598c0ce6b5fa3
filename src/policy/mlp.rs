//! Multi-Layer Perceptron (MLP) trunk shared by the actor and critic
//!
//! Both networks are plain feedforward stacks with an identity output:
//!
//! ```text
//! Input (observations)
//!         |
//!   [Dense(hidden_0)]
//!         |
//!    Tanh / ReLU
//!         |
//!        ...
//!         |
//!   [Dense(hidden_k)]
//!         |
//!    Tanh / ReLU
//!         |
//!    [Dense(out)]
//!         |
//!      Output
//! ```

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use tch::nn::{self, Init};

/// Hidden layer activation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    /// Rectified linear unit
    ReLU,
    /// Hyperbolic tangent
    Tanh,
}

impl Activation {
    fn apply(self, x: &tch::Tensor) -> tch::Tensor {
        match self {
            Activation::ReLU => x.relu(),
            Activation::Tanh => x.tanh(),
        }
    }
}

/// Configuration for MLP architecture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlpConfig {
    /// Width of each hidden layer, input side first
    pub hidden_sizes: Vec<i64>,

    /// Activation after every hidden layer
    pub activation: Activation,

    /// Orthogonal init (sqrt(2) hidden gain) instead of the tch default
    pub use_orthogonal_init: bool,
}

impl Default for MlpConfig {
    fn default() -> Self {
        Self { hidden_sizes: vec![64, 64], activation: Activation::Tanh, use_orthogonal_init: false }
    }
}

impl MlpConfig {
    /// Check that every hidden layer has a positive width
    pub fn validate(&self) -> Result<()> {
        if self.hidden_sizes.iter().any(|&h| h <= 0) {
            return Err(anyhow!("hidden_sizes must all be positive, got {:?}", self.hidden_sizes));
        }
        Ok(())
    }
}

/// Build `[in_dim] + hidden_sizes + [out_dim]` under `path`
///
/// Layers are named `fc0`, `fc1`, ... so saved parameters stay stable as
/// long as the architecture does.
///
/// # Arguments
///
/// * `path` - Variable store path the layers are registered under
/// * `in_dim` - Input features
/// * `out_dim` - Output features (identity activation)
/// * `output_gain` - Orthogonal gain for the output layer when orthogonal
///   init is enabled
/// * `config` - Architecture configuration
pub fn build_mlp(
    path: &nn::Path,
    in_dim: i64,
    out_dim: i64,
    output_gain: f64,
    config: &MlpConfig,
) -> nn::Sequential {
    let mut hidden_config = nn::LinearConfig::default();
    let mut output_config = nn::LinearConfig::default();
    if config.use_orthogonal_init {
        hidden_config.ws_init = Init::Orthogonal { gain: 2.0_f64.sqrt() };
        output_config.ws_init = Init::Orthogonal { gain: output_gain };
    }

    let mut seq = nn::seq();
    let mut last = in_dim;
    for (i, &width) in config.hidden_sizes.iter().enumerate() {
        let activation = config.activation;
        seq = seq
            .add(nn::linear(path / format!("fc{}", i), last, width, hidden_config))
            .add_fn(move |x| activation.apply(x));
        last = width;
    }

    let out_name = format!("fc{}", config.hidden_sizes.len());
    seq.add(nn::linear(path / out_name, last, out_dim, output_config))
}
