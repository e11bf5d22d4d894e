use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Top-level configuration for a [`Pilot`](crate::pilot::Pilot).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PilotConfig {
    pub strategy: Strategy,
    pub environment: EnvConfig,
}

impl PilotConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Which driver runs on every tick.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Strategy {
    LearnedPolicy(LearnedPolicyConfig),
    GeometricController(GeometricConfig),
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::LearnedPolicy(LearnedPolicyConfig::default())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LearnedPolicyConfig {
    pub model_path: PathBuf,
    pub hidden_layers: Vec<i64>,
    /// `false` samples from the policy distribution.
    pub deterministic: bool,
    pub seed: Option<i64>,
    pub observation_channels: Vec<String>,
    pub action_channels: Vec<String>,
    /// Episode summaries are appended here as JSON lines.
    pub monitor_path: Option<PathBuf>,
}

impl Default for LearnedPolicyConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/sac_actor.ot"),
            hidden_layers: vec![256, 256],
            deterministic: false,
            seed: None,
            observation_channels: vec![
                "gyroscope".into(),
                "waypoints_information".into(),
                "local_velocimeter".into(),
            ],
            action_channels: vec!["throttle".into(), "steer".into()],
            monitor_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EnvConfig {
    /// Metres along the path, negative values look behind the vehicle.
    pub waypoint_information_distances: Vec<f32>,
    pub collision_threshold: f32,
    pub max_episode_steps: Option<usize>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            waypoint_information_distances: vec![
                -10.0, 0.0, 1.0, 2.0, 3.0, 5.0, 7.0, 10.0, 15.0, 20.0, 30.0, 40.0, 50.0, 100.0,
            ],
            collision_threshold: 10.0,
            max_episode_steps: None,
        }
    }
}

impl EnvConfig {
    /// Distances as a sorted set.
    pub fn sorted_distances(&self) -> Vec<f32> {
        let mut distances = self.waypoint_information_distances.clone();
        distances.retain(|d| d.is_finite());
        distances.sort_by(f32::total_cmp);
        distances.dedup();
        distances
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeometricConfig {
    pub start_index: usize,
    pub proximity_threshold: f32,
    /// How many waypoints past the tracked one to aim at.
    pub lookahead: usize,
    pub steer_gain: f32,
    pub target_speed: f32,
    pub throttle_gain: f32,
    /// Below this speed steering falls back to the sign of the heading error.
    pub min_speed: f32,
}

impl Default for GeometricConfig {
    fn default() -> Self {
        Self {
            start_index: 10,
            proximity_threshold: crate::waypoint::PROXIMITY_THRESHOLD,
            lookahead: 3,
            steer_gain: 8.0,
            target_speed: 20.0,
            throttle_gain: 0.05,
            min_speed: 1e-2,
        }
    }
}
