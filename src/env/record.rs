//! Episode video recording
//!
//! [`RecordVideo`] wraps any environment that implements [`Render`] and
//! writes selected episodes to animated GIF files. Which episodes are
//! recorded is decided by an episode trigger, by default the same capped
//! cubic schedule Gym's `RecordVideo` uses.
//!
//! # Example
//!
//! ```rust,no_run
//! use lander_vpg::env::{Environment, lunar_lander::LunarLander, record::{RecordVideo, every_episode}};
//!
//! let mut env = RecordVideo::new(LunarLander::new(), "videos").with_trigger(every_episode());
//! env.reset()?;
//! // ... step until done, the GIF is written when the episode ends
//! env.close()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use gif::{Encoder, Frame, Repeat};

use crate::env::{Environment, Render, SpaceInfo, StepResult};

/// Decides from the episode index whether an episode gets recorded
pub type EpisodeTrigger = Box<dyn Fn(usize) -> bool + Send>;

/// Record episodes 0, 1, 8, 27, ..., 729 and then every 1000th
pub fn capped_cubic_schedule() -> EpisodeTrigger {
    Box::new(|episode| {
        if episode < 1000 {
            let root = (episode as f64).cbrt().round() as usize;
            root * root * root == episode
        } else {
            episode % 1000 == 0
        }
    })
}

/// Record every episode
pub fn every_episode() -> EpisodeTrigger {
    Box::new(|_| true)
}

/// Record every `n`-th episode, starting with the first
pub fn every_n(n: usize) -> EpisodeTrigger {
    let n = n.max(1);
    Box::new(move |episode| episode % n == 0)
}

/// Environment wrapper that captures frames and saves GIF videos
pub struct RecordVideo<E> {
    env: E,
    video_dir: PathBuf,
    name_prefix: String,
    trigger: EpisodeTrigger,
    width: u16,
    height: u16,
    frame_delay: u16,
    max_frames: Option<usize>,

    episodes_started: usize,
    recording: Option<usize>,
    frames: Vec<Vec<u8>>,
    saved: Vec<PathBuf>,
}

impl<E: Environment + Render> RecordVideo<E> {
    /// Wrap `env`, writing videos into `video_dir`
    ///
    /// Frames are 300x200 pixels at 50 fps, matching the simulation rate.
    pub fn new<P: AsRef<Path>>(env: E, video_dir: P) -> Self {
        Self {
            env,
            video_dir: video_dir.as_ref().to_path_buf(),
            name_prefix: "rl-video".to_string(),
            trigger: capped_cubic_schedule(),
            width: 300,
            height: 200,
            frame_delay: 2,
            max_frames: Some(1000),
            episodes_started: 0,
            recording: None,
            frames: Vec::new(),
            saved: Vec::new(),
        }
    }

    /// Replace the episode trigger
    pub fn with_trigger(mut self, trigger: EpisodeTrigger) -> Self {
        self.trigger = trigger;
        self
    }

    /// Set the file name prefix (`<prefix>-episode-<n>.gif`)
    pub fn with_name_prefix(mut self, prefix: &str) -> Self {
        self.name_prefix = prefix.to_string();
        self
    }

    /// Set frame size in pixels
    pub fn with_frame_size(mut self, width: u16, height: u16) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set playback rate
    ///
    /// GIF delays are in centiseconds, so rates above 100 fps are clamped.
    pub fn with_fps(mut self, fps: u16) -> Self {
        self.frame_delay = (100 / fps.max(1)).max(1);
        self
    }

    /// Limit frames kept per episode; `None` keeps everything
    pub fn with_max_frames(mut self, max: Option<usize>) -> Self {
        self.max_frames = max;
        self
    }

    /// Wrapped environment
    pub fn inner(&self) -> &E {
        &self.env
    }

    /// Mutable wrapped environment
    pub fn inner_mut(&mut self) -> &mut E {
        &mut self.env
    }

    /// Paths of all videos written so far
    pub fn saved_videos(&self) -> &[PathBuf] {
        &self.saved
    }

    /// Whether the current episode is being recorded
    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    /// Finish any in-progress recording
    pub fn close(&mut self) -> Result<()> {
        self.flush()
    }

    fn capture(&mut self) -> Result<()> {
        if self.max_frames.is_some_and(|max| self.frames.len() >= max) {
            return Ok(());
        }
        let frame = self.env.render_rgb(self.width as u32, self.height as u32)?;
        self.frames.push(frame);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        let Some(episode) = self.recording.take() else {
            return Ok(());
        };
        let frames = std::mem::take(&mut self.frames);
        if frames.is_empty() {
            return Ok(());
        }

        fs::create_dir_all(&self.video_dir).with_context(|| {
            format!("failed to create video directory {}", self.video_dir.display())
        })?;
        let path = self.video_dir.join(format!("{}-episode-{}.gif", self.name_prefix, episode));
        write_gif(&path, self.width, self.height, self.frame_delay, &frames)
            .with_context(|| format!("failed to write video {}", path.display()))?;

        tracing::info!("Saved episode {} video ({} frames) to {}", episode, frames.len(), path.display());
        self.saved.push(path);
        Ok(())
    }
}

impl<E: Environment + Render> Environment for RecordVideo<E> {
    type Observation = E::Observation;
    type Action = E::Action;

    fn reset(&mut self) -> Result<Self::Observation> {
        self.flush()?;

        let episode = self.episodes_started;
        self.episodes_started += 1;
        let observation = self.env.reset()?;

        if (self.trigger)(episode) {
            self.recording = Some(episode);
            self.capture()?;
        }
        Ok(observation)
    }

    fn step(&mut self, action: Self::Action) -> Result<StepResult<Self::Observation>> {
        let result = self.env.step(action)?;
        if self.recording.is_some() {
            self.capture()?;
            if result.is_done() {
                self.flush()?;
            }
        }
        Ok(result)
    }

    fn observation_space(&self) -> SpaceInfo {
        self.env.observation_space()
    }

    fn action_space(&self) -> SpaceInfo {
        self.env.action_space()
    }
}

impl<E> Drop for RecordVideo<E> {
    fn drop(&mut self) {
        if let Some(episode) = self.recording.take()
            && !self.frames.is_empty()
        {
            let path = self.video_dir.join(format!("{}-episode-{}.gif", self.name_prefix, episode));
            let written = fs::create_dir_all(&self.video_dir)
                .map_err(anyhow::Error::from)
                .and_then(|_| write_gif(&path, self.width, self.height, self.frame_delay, &self.frames));
            if let Err(e) = written {
                tracing::warn!("Failed to save video {} on drop: {}", path.display(), e);
            }
        }
    }
}

/// Encode packed RGB frames as an endlessly looping GIF
fn write_gif(path: &Path, width: u16, height: u16, delay: u16, frames: &[Vec<u8>]) -> Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);

    let mut encoder = Encoder::new(writer, width, height, &[])?;
    encoder.set_repeat(Repeat::Infinite)?;

    for data in frames {
        // Speed: 1-30, lower = better quality but slower
        let mut frame = Frame::from_rgb_speed(width, height, data, 10);
        frame.delay = delay;
        encoder.write_frame(&frame)?;
    }
    Ok(())
}
