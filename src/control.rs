//! Proportional waypoint follower, the non-learned driving strategy.

use std::f32::consts::PI;

use glam::Vec3;

use crate::config::GeometricConfig;
use crate::vehicle::VehicleControl;
use crate::waypoint::{Track, filter_waypoints_within, normalize_rad};

#[derive(Debug, Clone)]
pub struct GeometricController {
    config: GeometricConfig,
}

impl GeometricController {
    pub fn new(config: GeometricConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeometricConfig {
        &self.config
    }

    /// Steering from the heading error, softened as speed grows.
    /// Near standstill only the direction of the error is used.
    pub fn steer(&self, delta_heading: f32, speed: f32) -> f32 {
        let steer = if speed > self.config.min_speed {
            -self.config.steer_gain / speed.sqrt() * delta_heading / PI
        } else if delta_heading == 0.0 {
            0.0
        } else {
            -delta_heading.signum()
        };
        steer.clamp(-1.0, 1.0)
    }

    /// `(throttle, brake)` driving speed towards the target speed.
    pub fn throttle_brake(&self, speed: f32) -> (f32, f32) {
        let command = self.config.throttle_gain * (self.config.target_speed - speed);
        (command.clamp(0.0, 1.0), (-command).clamp(0.0, 1.0))
    }

    /// Advances the tracked waypoint and computes the control for one tick.
    /// Returns the control and the new tracked index.
    pub fn control(
        &self,
        location: Vec3,
        rotation: Vec3,
        velocity: Vec3,
        track: &Track,
        current_idx: usize,
    ) -> (VehicleControl, usize) {
        let idx = filter_waypoints_within(
            location.truncate(),
            current_idx,
            track.waypoints(),
            self.config.proximity_threshold,
        );
        let target = track.get(idx + self.config.lookahead);

        let to_target = target.planar() - location.truncate();
        let heading_to_target = to_target.y.atan2(to_target.x);
        let delta_heading = normalize_rad(heading_to_target - rotation.z);

        let speed = velocity.length();
        let (throttle, brake) = self.throttle_brake(speed);
        let control = VehicleControl {
            throttle,
            steer: self.steer(delta_heading, speed),
            brake,
            ..VehicleControl::default()
        };
        (control, idx)
    }
}
