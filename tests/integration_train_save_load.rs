//! End-to-end: train briefly on LunarLander, write the run directory,
//! reload the actor and evaluate it while recording videos.

use lander_vpg::{
    artifacts::{RunDir, RunSummary},
    env::{
        Environment,
        lunar_lander::{LanderConfig, LunarLander},
        record::{RecordVideo, every_episode},
    },
    policy::{PolicyNetwork, ValueNetwork},
    train::vpg::{VPGConfig, VPGTrainer, evaluate},
};
use tch::{Kind, Tensor};

fn tiny_config() -> VPGConfig {
    VPGConfig::new()
        .steps_per_epoch(150)
        .epochs(2)
        .max_episode_len(80)
        .value_iters(5)
        .hidden_sizes(vec![16, 16])
        .seed(11)
}

#[test]
fn test_train_save_reload_evaluate() {
    let tmp = tempfile::tempdir().unwrap();
    let run = RunDir::create(tmp.path().join("lunar_lander_vpg")).unwrap();
    let config = tiny_config();

    let env = LunarLander::with_config(LanderConfig { seed: config.seed, ..Default::default() });
    let obs_dim = env.observation_space().flat_dim() as i64;
    let action_space = env.action_space();

    let mut summary = RunSummary::new("LunarLander-v3", config.clone(), "Cpu".to_string());
    let mut trainer = VPGTrainer::new(config.clone(), env).unwrap();
    let history = trainer.train().unwrap().to_vec();

    assert_eq!(history.len(), 2);
    for epoch in &history {
        assert!(epoch.steps >= 150);
        assert!(epoch.returns.count >= 2);
        assert!(epoch.returns.min <= epoch.returns.mean && epoch.returns.mean <= epoch.returns.max);
        assert!(epoch.policy.loss_before.is_finite());
        assert!(epoch.value.loss_after.is_finite());
    }

    trainer.save(run.root()).unwrap();
    summary.finish(&history, trainer.total_steps(), trainer.total_episodes());

    // Reloaded networks reproduce the trained ones
    let mlp = config.mlp_config();
    let mut actor = PolicyNetwork::new(obs_dim, &action_space, &mlp).unwrap();
    actor.load(run.actor_path()).unwrap();
    let mut critic = ValueNetwork::new(obs_dim, &mlp).unwrap();
    critic.load(run.critic_path()).unwrap();

    let obs = Tensor::randn([4, obs_dim], (Kind::Float, actor.device()));
    let diff = (trainer.policy().forward(&obs) - actor.forward(&obs)).abs().max();
    assert!(f64::try_from(diff).unwrap() < 1e-6);
    let probe = [0.1_f32, 0.9, 0.0, -0.2, 0.05, 0.0, 0.0, 0.0];
    assert!((trainer.value().value(&probe).unwrap() - critic.value(&probe).unwrap()).abs() < 1e-6);

    // Evaluate with video recording
    let eval_env = LunarLander::with_config(LanderConfig { seed: 99, ..Default::default() });
    let mut recorder = RecordVideo::new(eval_env, run.video_dir())
        .with_trigger(every_episode())
        .with_frame_size(120, 80);
    let returns = evaluate(&mut recorder, &actor, 2, 60).unwrap();
    recorder.close().unwrap();

    assert_eq!(returns.len(), 2);
    assert!(returns.iter().all(|r| r.is_finite()));
    assert_eq!(recorder.saved_videos().len(), 2);
    assert!(run.video_dir().join("rl-video-episode-0.gif").exists());
    assert!(run.video_dir().join("rl-video-episode-1.gif").exists());

    summary.evaluation_returns = returns;
    summary.save_json(run.summary_path()).unwrap();
    let loaded = RunSummary::load_json(run.summary_path()).unwrap();
    assert_eq!(loaded.epochs.len(), 2);
    assert_eq!(loaded.config, config);
    assert_eq!(loaded.total_steps, history.iter().map(|e| e.steps).sum::<usize>());
}

#[test]
fn test_continuous_lander_trains() {
    let config = tiny_config().epochs(1);
    let env = LunarLander::with_config(LanderConfig { continuous: true, seed: 5, ..Default::default() });
    let mut trainer = VPGTrainer::new(config, env).unwrap();

    let stats = trainer.train_epoch().unwrap();
    assert!(stats.steps >= 150);
    assert!(stats.policy.entropy.is_finite());
    assert!(stats.policy.approx_kl.is_finite());
}
