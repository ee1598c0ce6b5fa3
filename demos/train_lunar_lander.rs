//! Train VPG on LunarLander-v3
//!
//! Trains the actor and critic with the default hyperparameters, recording
//! training episodes on the capped cubic schedule, then evaluates the final
//! policy and writes everything to `runs/lunar_lander_vpg/`.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example train_lunar_lander --release
//! ```

use anyhow::Result;
use lander_vpg::{
    artifacts::{DEFAULT_RUN_DIR, RunDir, RunSummary},
    env::{
        lunar_lander::{LanderConfig, LunarLander},
        record::{RecordVideo, capped_cubic_schedule, every_episode},
    },
    train::vpg::{VPGConfig, VPGTrainer, evaluate},
};

const EVAL_EPISODES: usize = 3;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt().with_env_filter("info").init();

    tracing::info!("Starting LunarLander VPG training");

    let config = VPGConfig::new();
    let run = RunDir::create(DEFAULT_RUN_DIR)?;

    let env = LunarLander::with_config(LanderConfig { seed: config.seed, ..Default::default() });
    let env = RecordVideo::new(env, run.video_dir()).with_trigger(capped_cubic_schedule());

    let mut trainer = VPGTrainer::new(config.clone(), env)?;
    let device = trainer.policy().device();
    let mut summary = RunSummary::new("LunarLander-v3", config.clone(), format!("{:?}", device));

    let start = std::time::Instant::now();
    let history = trainer.train()?.to_vec();
    trainer.env_mut().close()?;
    tracing::info!("Training complete in {:.1}s", start.elapsed().as_secs_f64());
    tracing::info!("Total steps: {}", trainer.total_steps());
    tracing::info!("Total episodes: {}", trainer.total_episodes());

    trainer.save(run.root())?;
    summary.finish(&history, trainer.total_steps(), trainer.total_episodes());

    // Evaluation episodes on fresh terrain, each recorded
    let eval_env = LunarLander::with_config(LanderConfig {
        seed: config.seed.wrapping_add(1),
        ..Default::default()
    });
    let mut eval_env = RecordVideo::new(eval_env, run.video_dir())
        .with_trigger(every_episode())
        .with_name_prefix("eval");
    let returns = evaluate(&mut eval_env, trainer.policy(), EVAL_EPISODES, config.max_episode_len)?;
    eval_env.close()?;

    let mean = returns.iter().sum::<f32>() / returns.len() as f32;
    tracing::info!("Evaluation mean return over {} episodes: {:.1}", returns.len(), mean);

    summary.evaluation_returns = returns;
    summary.save_json(run.summary_path())?;

    Ok(())
}
