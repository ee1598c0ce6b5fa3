//! Evaluate a trained LunarLander actor
//!
//! Loads `actor.safetensors` from the run directory written by
//! `train_lunar_lander`, runs a few episodes and records each one.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example evaluate_lunar_lander --release
//! ```

use anyhow::{Context, Result};
use lander_vpg::{
    artifacts::{DEFAULT_RUN_DIR, RunDir, RunSummary},
    env::{
        Environment,
        lunar_lander::{LanderConfig, LunarLander},
        record::{RecordVideo, every_episode},
    },
    policy::PolicyNetwork,
    train::vpg::evaluate,
};

const EPISODES: usize = 5;
const SEED: u64 = 1234;

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let run = RunDir::open(DEFAULT_RUN_DIR);
    let summary = RunSummary::load_json(run.summary_path())
        .context("no run summary found, train first with `cargo run --example train_lunar_lander`")?;
    let config = summary.config;

    let env = LunarLander::with_config(LanderConfig { seed: SEED, ..Default::default() });
    let obs_dim = env.observation_space().flat_dim() as i64;
    let mut policy = PolicyNetwork::new(obs_dim, &env.action_space(), &config.mlp_config())?;
    policy.load(run.actor_path())?;
    tracing::info!("Loaded actor from {}", run.actor_path().display());

    tch::manual_seed(SEED as i64);
    let mut env = RecordVideo::new(env, run.video_dir())
        .with_trigger(every_episode())
        .with_name_prefix("replay");
    let returns = evaluate(&mut env, &policy, EPISODES, config.max_episode_len)?;
    env.close()?;

    let mean = returns.iter().sum::<f32>() / returns.len() as f32;
    let best = returns.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    tracing::info!("Mean return: {:.1} | Best: {:.1} | Episodes: {}", mean, best, returns.len());

    Ok(())
}
