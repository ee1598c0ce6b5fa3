//! Policy and value networks
//!
//! Both networks are tch-rs MLPs that own their own `VarStore`, so each
//! optimizer only ever touches the parameters of one network.

pub mod actor;
pub mod critic;
pub mod mlp;

pub use actor::{ActionHead, PolicyNetwork};
pub use critic::ValueNetwork;
pub use mlp::{Activation, MlpConfig};
