use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::environment::{Environment, EpisodeStats, StepInfo, StepResult};
use crate::error::{Error, Result};
use crate::spaces::Space;

/// Tracks per-episode return and length. Resetting mid-episode is allowed;
/// the partial episode is discarded.
///
/// An episode is finished once. Steps taken after it ended and before the
/// next `reset` are passed through without being counted.
pub struct Monitor<E> {
    inner: E,
    sink: Option<(PathBuf, File)>,
    episodes: usize,
    reward: f32,
    length: usize,
    episode_done: bool,
}

impl<E: Environment> Monitor<E> {
    /// With a `path`, finished episodes are appended to it as JSON lines.
    pub fn new(inner: E, path: Option<&Path>) -> Result<Self> {
        let sink = path
            .map(|path| {
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map(|file| (path.to_path_buf(), file))
                    .map_err(|source| Error::Io {
                        path: path.to_path_buf(),
                        source,
                    })
            })
            .transpose()?;
        Ok(Self {
            inner,
            sink,
            episodes: 0,
            reward: 0.0,
            length: 0,
            episode_done: false,
        })
    }

    pub fn episodes(&self) -> usize {
        self.episodes
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    fn finish_episode(&mut self) -> Result<EpisodeStats> {
        let stats = EpisodeStats {
            episode: self.episodes,
            reward: self.reward,
            length: self.length,
        };
        self.episodes += 1;
        self.reward = 0.0;
        self.length = 0;
        info!(
            episode = stats.episode,
            reward = stats.reward,
            length = stats.length,
            "episode finished"
        );
        if let Some((path, sink)) = self.sink.as_mut() {
            let line = serde_json::to_string(&stats)?;
            writeln!(sink, "{line}").map_err(|source| Error::Io {
                path: path.clone(),
                source,
            })?;
        }
        Ok(stats)
    }
}

#[async_trait(?Send)]
impl<E: Environment> Environment for Monitor<E> {
    type Observation = E::Observation;
    type Action = E::Action;

    async fn reset(&mut self) -> Result<(E::Observation, StepInfo)> {
        if self.length > 0 {
            debug!(length = self.length, "early reset, dropping partial episode");
        }
        self.reward = 0.0;
        self.length = 0;
        self.episode_done = false;
        self.inner.reset().await
    }

    async fn step(&mut self, action: &E::Action) -> Result<StepResult<E::Observation>> {
        let mut result = self.inner.step(action).await?;
        if self.episode_done {
            return Ok(result);
        }
        self.reward += result.reward;
        self.length += 1;
        if result.episode_over() {
            self.episode_done = true;
            result.info.episode = Some(self.finish_episode()?);
        }
        Ok(result)
    }

    fn observation_space(&self) -> &Space {
        self.inner.observation_space()
    }

    fn action_space(&self) -> &Space {
        self.inner.action_space()
    }
}
