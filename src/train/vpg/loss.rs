//! Loss computation functions for VPG
//!
//! The policy loss is the plain score-function estimator; the critic is
//! fit by mean squared error against the GAE returns.

use anyhow::{Result, anyhow};
use tch::{Kind, Tensor};

/// Compute the policy gradient loss `-mean(log π(a|s) * A)`
///
/// # Arguments
/// * `log_probs` - Log probabilities of the taken actions under the current policy
/// * `advantages` - Advantage estimates, treated as constants
pub fn compute_policy_loss(log_probs: &Tensor, advantages: &Tensor) -> Tensor {
    -(log_probs * advantages.detach()).mean(Kind::Float)
}

/// Compute value function loss
///
/// Returns (value_loss, explained_variance)
///
/// # Arguments
/// * `values` - Predicted values under current value function
/// * `returns` - Computed returns (targets)
pub fn compute_value_loss(values: &Tensor, returns: &Tensor) -> (Tensor, f64) {
    let returns = returns.detach();
    let value_loss = (values - &returns).square().mean(Kind::Float);

    // Compute explained variance
    let var_returns = f64::try_from(returns.var(false)).unwrap_or(0.0);
    let explained_var = if var_returns == 0.0 {
        1.0 // Perfect prediction if no variance in returns
    } else {
        let var_residual = f64::try_from((&returns - values.detach()).var(false)).unwrap_or(0.0);
        1.0 - var_residual / var_returns
    };

    (value_loss, explained_var)
}

/// Sample estimate of KL(old || new) from log probabilities of the same actions
pub fn approx_kl(old_log_probs: &Tensor, new_log_probs: &Tensor) -> f64 {
    f64::try_from((old_log_probs - new_log_probs).mean(Kind::Float)).unwrap_or(0.0)
}

/// Read a scalar loss, failing on NaN or infinity
///
/// Training cannot recover from a non-finite loss, so the caller halts.
pub fn finite_scalar(loss: &Tensor, name: &str) -> Result<f64> {
    let value = f64::try_from(loss)?;
    if !value.is_finite() {
        return Err(anyhow!("{} loss is not finite ({})", name, value));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_loss_value() {
        let log_probs = Tensor::from_slice(&[-1.0_f32, -2.0]);
        let advantages = Tensor::from_slice(&[1.0_f32, -0.5]);
        // -mean(-1 * 1, -2 * -0.5) = -mean(-1, 1) = 0
        let loss = f64::try_from(compute_policy_loss(&log_probs, &advantages)).unwrap();
        assert!(loss.abs() < 1e-6);

        let advantages = Tensor::from_slice(&[2.0_f32, 2.0]);
        let loss = f64::try_from(compute_policy_loss(&log_probs, &advantages)).unwrap();
        assert!((loss - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_policy_gradient_follows_advantage() {
        let log_probs = Tensor::from_slice(&[-1.0_f32, -1.0]).set_requires_grad(true);
        let advantages = Tensor::from_slice(&[1.0_f32, -1.0]);

        let loss = compute_policy_loss(&log_probs, &advantages);
        loss.backward();
        let grad = Vec::<f32>::try_from(log_probs.grad()).unwrap();

        // Descending the loss raises log π for positive advantage
        assert!(grad[0] < 0.0);
        assert!(grad[1] > 0.0);
    }

    #[test]
    fn test_value_loss_and_explained_variance() {
        let returns = Tensor::from_slice(&[1.0_f32, 2.0, 3.0]);

        let (loss, ev) = compute_value_loss(&returns, &returns);
        assert!(f64::try_from(loss).unwrap().abs() < 1e-9);
        assert!((ev - 1.0).abs() < 1e-6);

        let zeros = Tensor::zeros([3], (Kind::Float, tch::Device::Cpu));
        let (loss, ev) = compute_value_loss(&zeros, &returns);
        assert!((f64::try_from(loss).unwrap() - 14.0 / 3.0).abs() < 1e-5);
        assert!(ev.abs() < 1e-6);
    }

    #[test]
    fn test_approx_kl_zero_for_same_policy() {
        let lp = Tensor::from_slice(&[-0.3_f32, -1.2, -0.7]);
        assert!(approx_kl(&lp, &lp).abs() < 1e-9);
    }

    #[test]
    fn test_finite_scalar() {
        let ok = Tensor::from_slice(&[1.5_f32]).view([]);
        assert_eq!(finite_scalar(&ok, "policy").unwrap(), 1.5);

        let nan = Tensor::from_slice(&[f32::NAN]).view([]);
        let err = finite_scalar(&nan, "policy").unwrap_err();
        assert!(err.to_string().contains("policy loss is not finite"));

        let inf = Tensor::from_slice(&[f32::INFINITY]).view([]);
        assert!(finite_scalar(&inf, "value").is_err());
    }
}
