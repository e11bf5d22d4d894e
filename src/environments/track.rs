use std::f32::consts::PI;

use async_trait::async_trait;
use tracing::debug;

use crate::config::EnvConfig;
use crate::environment::{Environment, StepInfo, StepResult};
use crate::error::{Error, Result};
use crate::spaces::{Space, Value};
use crate::vehicle::{Actuator, SensorKind, SensorSuite, VehicleControl};
use crate::waypoint::{Track, filter_waypoints, normalize_rad};

pub const WAYPOINTS_INFORMATION: &str = "waypoints_information";
/// Values per entry of `waypoints_information`: local x, local y, heading delta, lane width.
pub const WAYPOINT_FEATURES: usize = 4;
/// Gears selectable through `target_gear`.
pub const GEAR_COUNT: usize = 6;

/// Base environment over a live vehicle: dict observations built from cached
/// sensor reads and the reference path, dict actions forwarded to the actuator.
pub struct TrackEnv {
    sensors: SensorSuite,
    actuator: Box<dyn Actuator>,
    track: Track,
    distances: Vec<f32>,
    collision_threshold: f32,
    max_episode_steps: Option<usize>,
    observation_space: Space,
    action_space: Space,
    waypoint_idx: usize,
    steps: usize,
}

impl TrackEnv {
    pub fn new(
        sensors: SensorSuite,
        actuator: Box<dyn Actuator>,
        track: Track,
        config: &EnvConfig,
    ) -> Result<Self> {
        sensors.require(SensorKind::Location)?;
        sensors.require(SensorKind::RollPitchYaw)?;

        let distances = config.sorted_distances();
        let observation_space = Self::build_observation_space(&sensors, distances.len());
        Ok(Self {
            sensors,
            actuator,
            track,
            distances,
            collision_threshold: config.collision_threshold,
            max_episode_steps: config.max_episode_steps,
            observation_space,
            action_space: Self::full_action_space(),
            waypoint_idx: 0,
            steps: 0,
        })
    }

    fn build_observation_space(sensors: &SensorSuite, n_distances: usize) -> Space {
        let mut channels: Vec<(&str, Space)> = SensorKind::ALL
            .into_iter()
            .filter(|kind| sensors.has(*kind))
            .map(|kind| (kind.channel(), Space::uniform(f32::NEG_INFINITY, f32::INFINITY, &[3])))
            .collect();

        let feature_low = [f32::NEG_INFINITY, f32::NEG_INFINITY, -PI, 0.0];
        let feature_high = [f32::INFINITY, f32::INFINITY, PI, f32::INFINITY];
        channels.push((
            WAYPOINTS_INFORMATION,
            Space::Box {
                low: feature_low.repeat(n_distances),
                high: feature_high.repeat(n_distances),
                shape: vec![n_distances, WAYPOINT_FEATURES],
            },
        ));
        Space::dict(channels)
    }

    /// Every control field the actuator understands.
    pub fn full_action_space() -> Space {
        Space::dict([
            ("throttle", Space::uniform(-1.0, 1.0, &[1])),
            ("steer", Space::uniform(-1.0, 1.0, &[1])),
            ("brake", Space::uniform(0.0, 1.0, &[1])),
            ("hand_brake", Space::uniform(0.0, 1.0, &[1])),
            ("reverse", Space::Discrete(2)),
            ("target_gear", Space::Discrete(GEAR_COUNT)),
        ])
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn waypoint_index(&self) -> usize {
        self.waypoint_idx
    }

    fn observe(&self) -> Result<Value> {
        let mut channels = Vec::with_capacity(SensorKind::ALL.len() + 1);
        for kind in SensorKind::ALL {
            if self.sensors.has(kind) {
                let reading = self.sensors.read_vec3(kind)?;
                channels.push((kind.channel(), Value::Array(reading.to_array().to_vec())));
            }
        }
        channels.push((WAYPOINTS_INFORMATION, Value::Array(self.waypoints_information()?)));
        Ok(Value::dict(channels))
    }

    fn waypoints_information(&self) -> Result<Vec<f32>> {
        let location = self.sensors.read_vec3(SensorKind::Location)?.truncate();
        let yaw = self.sensors.read_vec3(SensorKind::RollPitchYaw)?.z;
        let (sin, cos) = yaw.sin_cos();

        let mut features = Vec::with_capacity(self.distances.len() * WAYPOINT_FEATURES);
        for &distance in &self.distances {
            let target = self.track.point_at(self.waypoint_idx, distance);
            let delta = target.planar() - location;
            features.extend_from_slice(&[
                cos * delta.x + sin * delta.y,
                -sin * delta.x + cos * delta.y,
                normalize_rad(target.yaw() - yaw),
                target.lane_width,
            ]);
        }
        Ok(features)
    }

    fn collision_impulse(&self) -> Result<f32> {
        if !self.sensors.has(SensorKind::Collision) {
            return Ok(0.0);
        }
        Ok(self.sensors.read_vec3(SensorKind::Collision)?.length())
    }

    fn info(&self, control: VehicleControl, collision_impulse: f32) -> StepInfo {
        StepInfo {
            control,
            waypoint_index: self.waypoint_idx,
            collision_impulse,
            episode: None,
        }
    }
}

/// Decodes a (possibly partial) action dict. Absent fields stay zero and a
/// negative throttle is applied as brake.
pub fn control_from_action(action: &Value) -> Result<VehicleControl> {
    let Value::Dict(fields) = action else {
        return Err(Error::OutOfSpace("vehicle action must be a dict".into()));
    };
    let scalar = |key: &str| fields.get(key).and_then(Value::as_scalar).unwrap_or(0.0);

    let throttle = scalar("throttle").clamp(-1.0, 1.0);
    let gear = match fields.get("target_gear") {
        Some(Value::Discrete(g)) => *g,
        Some(other) => other.as_scalar().unwrap_or(0.0).max(0.0) as usize,
        None => 0,
    };
    Ok(VehicleControl {
        throttle: throttle.max(0.0),
        steer: scalar("steer").clamp(-1.0, 1.0),
        brake: scalar("brake").max(-throttle).clamp(0.0, 1.0),
        hand_brake: scalar("hand_brake").clamp(0.0, 1.0),
        reverse: scalar("reverse") >= 0.5,
        target_gear: gear.min(GEAR_COUNT - 1) as u8,
    })
}

#[async_trait(?Send)]
impl Environment for TrackEnv {
    type Observation = Value;
    type Action = Value;

    async fn reset(&mut self) -> Result<(Value, StepInfo)> {
        let location = self.sensors.read_vec3(SensorKind::Location)?.truncate();
        self.waypoint_idx = self.track.nearest(location);
        self.steps = 0;
        debug!(waypoint = self.waypoint_idx, "track env reset");

        let info = self.info(VehicleControl::default(), self.collision_impulse()?);
        Ok((self.observe()?, info))
    }

    async fn step(&mut self, action: &Value) -> Result<StepResult<Value>> {
        let control = control_from_action(action)?;
        self.actuator.apply_action(&control).await?;
        self.steps += 1;

        let location = self.sensors.read_vec3(SensorKind::Location)?.truncate();
        let previous = self.waypoint_idx;
        self.waypoint_idx = filter_waypoints(location, previous, self.track.waypoints());
        let progress = self.track.arc_between(previous, self.waypoint_idx);

        let collision_impulse = self.collision_impulse()?;
        let terminated = collision_impulse > self.collision_threshold;
        let truncated = self.max_episode_steps.is_some_and(|limit| self.steps >= limit);

        Ok(StepResult {
            observation: self.observe()?,
            reward: progress,
            terminated,
            truncated,
            info: self.info(control, collision_impulse),
        })
    }

    fn observation_space(&self) -> &Space {
        &self.observation_space
    }

    fn action_space(&self) -> &Space {
        &self.action_space
    }
}
