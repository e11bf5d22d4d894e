//! The simulator boundary: cached sensor reads and an async actuator.

use std::fmt;

use async_trait::async_trait;
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorKind {
    Location,
    RollPitchYaw,
    Velocimeter,
    LocalVelocimeter,
    Gyroscope,
    Collision,
}

impl SensorKind {
    pub const ALL: [SensorKind; 6] = [
        SensorKind::Location,
        SensorKind::RollPitchYaw,
        SensorKind::Velocimeter,
        SensorKind::LocalVelocimeter,
        SensorKind::Gyroscope,
        SensorKind::Collision,
    ];

    /// Observation channel name.
    pub fn channel(self) -> &'static str {
        match self {
            SensorKind::Location => "location",
            SensorKind::RollPitchYaw => "roll_pitch_yaw",
            SensorKind::Velocimeter => "velocimeter",
            SensorKind::LocalVelocimeter => "local_velocimeter",
            SensorKind::Gyroscope => "gyroscope",
            SensorKind::Collision => "collision",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.channel())
    }
}

pub trait Sensor {
    /// Last cached observation. Never blocks on the simulator.
    fn last_observation(&self) -> Option<Vec<f32>>;
}

/// Sensors attached to the vehicle. Any of them may be absent.
#[derive(Default)]
pub struct SensorSuite {
    pub location: Option<Box<dyn Sensor>>,
    pub roll_pitch_yaw: Option<Box<dyn Sensor>>,
    pub velocimeter: Option<Box<dyn Sensor>>,
    pub local_velocimeter: Option<Box<dyn Sensor>>,
    pub gyroscope: Option<Box<dyn Sensor>>,
    pub collision: Option<Box<dyn Sensor>>,
}

impl SensorSuite {
    pub fn get(&self, kind: SensorKind) -> Option<&dyn Sensor> {
        let slot = match kind {
            SensorKind::Location => &self.location,
            SensorKind::RollPitchYaw => &self.roll_pitch_yaw,
            SensorKind::Velocimeter => &self.velocimeter,
            SensorKind::LocalVelocimeter => &self.local_velocimeter,
            SensorKind::Gyroscope => &self.gyroscope,
            SensorKind::Collision => &self.collision,
        };
        slot.as_deref()
    }

    pub fn has(&self, kind: SensorKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn require(&self, kind: SensorKind) -> Result<()> {
        if self.has(kind) {
            Ok(())
        } else {
            Err(Error::MissingSensor(kind))
        }
    }

    /// Reads a three-component sensor.
    pub fn read_vec3(&self, kind: SensorKind) -> Result<Vec3> {
        let sensor = self.get(kind).ok_or(Error::MissingSensor(kind))?;
        let reading = sensor.last_observation().ok_or(Error::NoReading(kind))?;
        match reading.as_slice() {
            [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
            other => Err(Error::ShapeMismatch {
                context: "sensor reading",
                expected: 3,
                actual: other.len(),
            }),
        }
    }
}

/// Applies a control command to the simulated vehicle.
#[async_trait(?Send)]
pub trait Actuator {
    async fn apply_action(&mut self, control: &VehicleControl) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleControl {
    pub throttle: f32,
    pub steer: f32,
    pub brake: f32,
    pub hand_brake: f32,
    pub reverse: bool,
    pub target_gear: u8,
}
