//! Experience storage and advantage estimation
//!
//! - [`trajectory`]: transitions of a single episode and how it ended
//! - [`gae`]: Generalized Advantage Estimation per trajectory
//! - [`batch`]: flattened epoch batches ready for the update step

pub mod batch;
pub mod gae;
pub mod trajectory;

pub use batch::{Batch, BatchTensors};
pub use gae::{compute_gae, discount_cumsum, trajectory_advantages};
pub use trajectory::{EpisodeEnd, Trajectory, Transition};
