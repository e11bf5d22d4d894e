use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::spaces::Space;
use crate::vehicle::VehicleControl;

#[derive(Debug)]
pub struct StepResult<O> {
    pub observation: O,
    pub reward: f32,
    /// The episode reached a terminal state (e.g. collision).
    pub terminated: bool,
    /// The episode was cut short (e.g. step limit).
    pub truncated: bool,
    pub info: StepInfo,
}

impl<O> StepResult<O> {
    pub fn try_map_observation<P>(self, f: impl FnOnce(O) -> Result<P>) -> Result<StepResult<P>> {
        Ok(StepResult {
            observation: f(self.observation)?,
            reward: self.reward,
            terminated: self.terminated,
            truncated: self.truncated,
            info: self.info,
        })
    }

    pub fn episode_over(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// Auxiliary per-step data, passed through every wrapper untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepInfo {
    /// Control actually sent to the actuator.
    pub control: VehicleControl,
    pub waypoint_index: usize,
    pub collision_impulse: f32,
    /// Set by [`Monitor`](crate::wrappers::Monitor) on the last step of an episode.
    pub episode: Option<EpisodeStats>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeStats {
    pub episode: usize,
    pub reward: f32,
    pub length: usize,
}

#[async_trait(?Send)]
pub trait Environment {
    type Observation;
    type Action;

    async fn reset(&mut self) -> Result<(Self::Observation, StepInfo)>;
    async fn step(&mut self, action: &Self::Action) -> Result<StepResult<Self::Observation>>;

    fn observation_space(&self) -> &Space;
    fn action_space(&self) -> &Space;
}
