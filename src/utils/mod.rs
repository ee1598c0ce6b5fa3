//! Utility functions and helpers

pub mod normalize;

pub use normalize::{mean_std, standardize};
