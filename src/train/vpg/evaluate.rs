//! Policy evaluation
//!
//! Runs the trained policy without touching its parameters and reports the
//! undiscounted return of each episode.

use anyhow::Result;

use crate::{
    env::{Action, Environment},
    policy::PolicyNetwork,
};

/// Run `episodes` episodes and return their undiscounted returns
///
/// Actions are sampled from the policy. Episodes end on termination,
/// truncation, or after `max_episode_len` steps.
///
/// # Arguments
/// * `env` - Environment to evaluate in (wrap it in `RecordVideo` to get videos)
/// * `policy` - Policy to run
/// * `episodes` - Number of episodes
/// * `max_episode_len` - Step cap per episode
pub fn evaluate<E>(
    env: &mut E,
    policy: &PolicyNetwork,
    episodes: usize,
    max_episode_len: usize,
) -> Result<Vec<f32>>
where
    E: Environment<Observation = Vec<f32>, Action = Action> + ?Sized,
{
    let mut returns = Vec::with_capacity(episodes);

    for episode in 0..episodes {
        let mut observation = env.reset()?;
        let mut total = 0.0;
        let mut length = 0;

        while length < max_episode_len {
            let (action, _) = policy.sample(&observation)?;
            let step = env.step(action)?;
            total += step.reward;
            length += 1;
            if step.is_done() {
                break;
            }
            observation = step.observation;
        }

        tracing::info!("Eval episode {}: return {:.2}, length {}", episode, total, length);
        returns.push(total);
    }

    Ok(returns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{policy::MlpConfig, train::vpg::rollout::tests::Corridor};

    #[test]
    fn test_evaluate_returns_per_episode() {
        let mut env = Corridor::new(3, 100);
        let config = MlpConfig { hidden_sizes: vec![8], ..Default::default() };
        let policy = PolicyNetwork::new(2, &env.action_space(), &config).unwrap();

        let returns = evaluate(&mut env, &policy, 4, 100).unwrap();
        assert_eq!(returns, vec![3.0; 4]);
        assert_eq!(env.resets, 4);
    }

    #[test]
    fn test_evaluate_respects_length_cap() {
        let mut env = Corridor::new(50, 100);
        let config = MlpConfig { hidden_sizes: vec![8], ..Default::default() };
        let policy = PolicyNetwork::new(2, &env.action_space(), &config).unwrap();

        let returns = evaluate(&mut env, &policy, 2, 7).unwrap();
        assert_eq!(returns, vec![7.0, 7.0]);
    }

    #[test]
    fn test_evaluate_does_not_change_parameters() {
        let mut env = Corridor::new(5, 100);
        let config = MlpConfig { hidden_sizes: vec![8], ..Default::default() };
        let policy = PolicyNetwork::new(2, &env.action_space(), &config).unwrap();

        let obs = tch::Tensor::from_slice(&[0.5_f32, 1.0]).view([1, 2]).to_device(policy.device());
        let before = policy.forward(&obs);
        evaluate(&mut env, &policy, 3, 100).unwrap();
        let after = policy.forward(&obs);
        assert!(f64::try_from((before - after).abs().max()).unwrap() == 0.0);
    }
}
