//! Generalized Advantage Estimation (GAE) computation
//!
//! Advantages are computed one trajectory at a time, so nothing leaks
//! across episode boundaries within a batch.
//!
//! # Mathematical Formula
//! ```text
//! δ_t = r_t + γ * V_{t+1} * (1 - d_t) - V_t
//! A_t = δ_t + γ * λ * (1 - d_t) * A_{t+1}
//! R_t = A_t + V_t
//! ```
//!
//! Where V_T (one past the last step) is the trajectory's bootstrap value:
//! zero after a termination, the critic estimate after a truncation.

use super::trajectory::Trajectory;

/// Compute GAE advantages and critic targets for one trajectory
///
/// # Arguments
/// * `rewards` - Rewards r_0..r_{T-1}
/// * `values` - Value estimates V(s_0)..V(s_{T-1})
/// * `dones` - Termination flags
/// * `last_value` - Bootstrap value V(s_T)
/// * `gamma` - Discount factor
/// * `gae_lambda` - GAE lambda parameter
///
/// # Returns
/// (advantages, returns), both of length T
pub fn compute_gae(
    rewards: &[f32],
    values: &[f32],
    dones: &[bool],
    last_value: f32,
    gamma: f32,
    gae_lambda: f32,
) -> (Vec<f32>, Vec<f32>) {
    let num_steps = rewards.len();
    debug_assert_eq!(values.len(), num_steps);
    debug_assert_eq!(dones.len(), num_steps);

    let mut advantages = vec![0.0; num_steps];
    let mut returns = vec![0.0; num_steps];
    let mut gae = 0.0;

    for t in (0..num_steps).rev() {
        let next_value = if t == num_steps - 1 { last_value } else { values[t + 1] };
        let non_terminal = if dones[t] { 0.0 } else { 1.0 };

        let delta = rewards[t] + gamma * next_value * non_terminal - values[t];
        gae = delta + gamma * gae_lambda * non_terminal * gae;

        advantages[t] = gae;
        returns[t] = gae + values[t];
    }

    (advantages, returns)
}

/// GAE over a sealed trajectory, bootstrapping from how it ended
pub fn trajectory_advantages(
    trajectory: &Trajectory,
    gamma: f32,
    gae_lambda: f32,
) -> (Vec<f32>, Vec<f32>) {
    compute_gae(
        &trajectory.rewards(),
        &trajectory.values(),
        &trajectory.dones(),
        trajectory.end().bootstrap_value(),
        gamma,
        gae_lambda,
    )
}

/// Discounted cumulative sum: `y_t = Σ_{k≥t} discount^(k-t) x_k`
///
/// With the rewards of an episode this gives the reward-to-go.
pub fn discount_cumsum(x: &[f32], discount: f32) -> Vec<f32> {
    let mut out = vec![0.0; x.len()];
    let mut running = 0.0;
    for t in (0..x.len()).rev() {
        running = x[t] + discount * running;
        out[t] = running;
    }
    out
}
