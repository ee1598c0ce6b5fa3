//! Run output directory layout and the JSON run summary
//!
//! ```text
//! runs/lunar_lander_vpg/
//! ├── actor.safetensors
//! ├── critic.safetensors
//! ├── run.json
//! └── videos/
//!     └── rl-video-episode-<n>.gif
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::train::vpg::{EpochStats, VPGConfig};

/// Default output directory for the LunarLander run
pub const DEFAULT_RUN_DIR: &str = "runs/lunar_lander_vpg";

/// Actor parameters file name
pub const ACTOR_FILE: &str = "actor.safetensors";

/// Critic parameters file name
pub const CRITIC_FILE: &str = "critic.safetensors";

/// Run summary file name
pub const SUMMARY_FILE: &str = "run.json";

/// Video subdirectory name
pub const VIDEO_DIR: &str = "videos";

/// Paths inside one run's output directory
#[derive(Debug, Clone)]
pub struct RunDir {
    root: PathBuf,
}

impl RunDir {
    /// Use `root` as the run directory, creating it and `videos/`
    pub fn create<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let videos = root.join(VIDEO_DIR);
        std::fs::create_dir_all(&videos)
            .with_context(|| format!("failed to create run directory {}", videos.display()))?;
        tracing::info!("Run directory: {}", root.display());
        Ok(Self { root })
    }

    /// Open an existing run directory without creating anything
    pub fn open<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Actor parameters
    pub fn actor_path(&self) -> PathBuf {
        self.root.join(ACTOR_FILE)
    }

    /// Critic parameters
    pub fn critic_path(&self) -> PathBuf {
        self.root.join(CRITIC_FILE)
    }

    /// Run summary
    pub fn summary_path(&self) -> PathBuf {
        self.root.join(SUMMARY_FILE)
    }

    /// Video output directory
    pub fn video_dir(&self) -> PathBuf {
        self.root.join(VIDEO_DIR)
    }
}

/// Everything worth keeping about a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Environment name
    pub environment: String,

    /// Algorithm name
    pub algorithm: String,

    /// Hyperparameters the run used
    pub config: VPGConfig,

    /// Device the networks ran on
    pub device: String,

    /// RFC 3339 start time
    pub started_at: String,

    /// RFC 3339 finish time
    pub finished_at: Option<String>,

    /// Total environment steps collected
    pub total_steps: usize,

    /// Total training episodes
    pub total_episodes: usize,

    /// Per-epoch statistics
    pub epochs: Vec<EpochStats>,

    /// Returns of the post-training evaluation episodes
    pub evaluation_returns: Vec<f32>,
}

impl RunSummary {
    /// Start a summary stamped with the current time
    pub fn new(environment: &str, config: VPGConfig, device: String) -> Self {
        Self {
            environment: environment.to_string(),
            algorithm: "VPG (actor-critic, GAE)".to_string(),
            config,
            device,
            started_at: chrono::Utc::now().to_rfc3339(),
            finished_at: None,
            total_steps: 0,
            total_episodes: 0,
            epochs: Vec::new(),
            evaluation_returns: Vec::new(),
        }
    }

    /// Record the end of training
    pub fn finish(&mut self, epochs: &[EpochStats], total_steps: usize, total_episodes: usize) {
        self.epochs = epochs.to_vec();
        self.total_steps = total_steps;
        self.total_episodes = total_episodes;
        self.finished_at = Some(chrono::Utc::now().to_rfc3339());
    }

    /// Mean return of the final training epoch
    pub fn final_mean_return(&self) -> Option<f32> {
        self.epochs.last().map(|e| e.returns.mean)
    }

    /// Save summary to JSON file
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write run summary {}", path.display()))?;
        tracing::info!("Run summary written to {}", path.display());
        Ok(())
    }

    /// Load summary from JSON file
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read run summary {}", path.display()))?;
        let summary = serde_json::from_str(&json)?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::train::vpg::stats::ReturnStats;

    #[test]
    fn test_run_dir_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let run = RunDir::create(tmp.path().join("run")).unwrap();

        assert!(run.video_dir().is_dir());
        assert_eq!(run.actor_path(), tmp.path().join("run/actor.safetensors"));
        assert_eq!(run.critic_path(), tmp.path().join("run/critic.safetensors"));
        assert_eq!(run.summary_path(), tmp.path().join("run/run.json"));
    }

    #[test]
    fn test_summary_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(SUMMARY_FILE);

        let mut summary = RunSummary::new("LunarLander-v3", VPGConfig::default(), "Cpu".to_string());
        assert!(summary.finished_at.is_none());
        assert_eq!(summary.final_mean_return(), None);

        let epoch = EpochStats {
            epoch: 0,
            steps: 3012,
            returns: ReturnStats::from_returns(&[-150.0, -90.0]),
            ..Default::default()
        };
        summary.finish(&[epoch], 3012, 2);
        summary.evaluation_returns = vec![12.5];
        summary.save_json(&path).unwrap();

        let loaded = RunSummary::load_json(&path).unwrap();
        assert_eq!(loaded, summary);
        assert_eq!(loaded.final_mean_return(), Some(-120.0));
        assert!(loaded.finished_at.is_some());
    }

    #[test]
    fn test_summary_timestamp_is_rfc3339() {
        let summary = RunSummary::new("LunarLander-v3", VPGConfig::default(), "Cpu".to_string());
        assert!(chrono::DateTime::parse_from_rfc3339(&summary.started_at).is_ok());
    }

    #[test]
    fn test_load_missing_summary() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(RunSummary::load_json(tmp.path().join("nope.json")).is_err());
    }
}
