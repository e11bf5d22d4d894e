use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use glam::{Vec2, Vec3};
use rand::random_range;

use crate::error::Result;
use crate::vehicle::{Actuator, Sensor, SensorKind, SensorSuite, VehicleControl};
use crate::waypoint::{Track, normalize_rad};

/// State of the planar kinematic bicycle model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleState {
    pub position: Vec2,
    pub yaw: f32,
    pub speed: f32,
    pub yaw_rate: f32,
    pub collision: Vec3,
    pub ticks: usize,
}

/// Offline stand-in for the simulator. Every applied control advances the
/// world by one tick of `dt` seconds; sensors read the shared state.
///
/// Positive steer turns clockwise, matching the simulator's convention.
pub struct KinematicVehicle {
    state: Rc<RefCell<VehicleState>>,
}

impl KinematicVehicle {
    pub const DT: f32 = 0.05;
    pub const WHEELBASE: f32 = 2.9;
    pub const MAX_STEER: f32 = 0.6; // rad
    pub const MAX_ACCEL: f32 = 6.0;
    pub const MAX_DECEL: f32 = 10.0;
    pub const DRAG: f32 = 0.02;

    pub fn new(position: Vec2, yaw: f32) -> Self {
        Self {
            state: Rc::new(RefCell::new(VehicleState {
                position,
                yaw: normalize_rad(yaw),
                speed: 0.0,
                yaw_rate: 0.0,
                collision: Vec3::ZERO,
                ticks: 0,
            })),
        }
    }

    /// Spawns near waypoint `idx` with a small random pose perturbation.
    pub fn spawn_on(track: &Track, idx: usize) -> Self {
        let waypoint = track.get(idx);
        let jitter = Vec2::new(random_range(-0.5..0.5), random_range(-0.5..0.5));
        Self::new(
            waypoint.planar() + jitter,
            waypoint.yaw() + random_range(-0.05..0.05),
        )
    }

    pub fn state(&self) -> VehicleState {
        *self.state.borrow()
    }

    pub fn set_speed(&self, speed: f32) {
        self.state.borrow_mut().speed = speed;
    }

    /// Impulse reported by the collision sensor from now on.
    pub fn set_collision(&self, impulse: Vec3) {
        self.state.borrow_mut().collision = impulse;
    }

    pub fn sensors(&self) -> SensorSuite {
        let sensor = |kind| -> Option<Box<dyn Sensor>> {
            Some(Box::new(KinematicSensor {
                kind,
                state: Rc::clone(&self.state),
            }))
        };
        SensorSuite {
            location: sensor(SensorKind::Location),
            roll_pitch_yaw: sensor(SensorKind::RollPitchYaw),
            velocimeter: sensor(SensorKind::Velocimeter),
            local_velocimeter: sensor(SensorKind::LocalVelocimeter),
            gyroscope: sensor(SensorKind::Gyroscope),
            collision: sensor(SensorKind::Collision),
        }
    }

    pub fn actuator(&self) -> Box<dyn Actuator> {
        Box::new(KinematicActuator {
            state: Rc::clone(&self.state),
        })
    }
}

struct KinematicSensor {
    kind: SensorKind,
    state: Rc<RefCell<VehicleState>>,
}

impl Sensor for KinematicSensor {
    fn last_observation(&self) -> Option<Vec<f32>> {
        let s = self.state.borrow();
        let (sin, cos) = s.yaw.sin_cos();
        let reading = match self.kind {
            SensorKind::Location => [s.position.x, s.position.y, 0.0],
            SensorKind::RollPitchYaw => [0.0, 0.0, s.yaw],
            SensorKind::Velocimeter => [s.speed * cos, s.speed * sin, 0.0],
            SensorKind::LocalVelocimeter => [s.speed, 0.0, 0.0],
            SensorKind::Gyroscope => [0.0, 0.0, s.yaw_rate],
            SensorKind::Collision => s.collision.to_array(),
        };
        Some(reading.to_vec())
    }
}

struct KinematicActuator {
    state: Rc<RefCell<VehicleState>>,
}

#[async_trait(?Send)]
impl Actuator for KinematicActuator {
    async fn apply_action(&mut self, control: &VehicleControl) -> Result<()> {
        let mut s = self.state.borrow_mut();
        let dt = KinematicVehicle::DT;

        // 动力学
        let direction = if control.reverse { -1.0 } else { 1.0 };
        let drive = direction * control.throttle.clamp(0.0, 1.0) * KinematicVehicle::MAX_ACCEL;
        let braking = (control.brake.max(control.hand_brake)).clamp(0.0, 1.0)
            * KinematicVehicle::MAX_DECEL;
        let drag = KinematicVehicle::DRAG * s.speed * s.speed.abs();

        let mut speed = s.speed + (drive - drag) * dt;
        // brakes stop the car, never push it backwards
        let slowed = speed.abs() - braking * dt;
        speed = if slowed > 0.0 { speed.signum() * slowed } else { 0.0 };

        let wheel_angle = control.steer.clamp(-1.0, 1.0) * KinematicVehicle::MAX_STEER;
        let yaw_rate = -speed * wheel_angle.tan() / KinematicVehicle::WHEELBASE;

        let heading = Vec2::from_angle(s.yaw);
        s.position += heading * speed * dt;
        s.yaw = normalize_rad(s.yaw + yaw_rate * dt);
        s.speed = speed;
        s.yaw_rate = yaw_rate;
        s.ticks += 1;
        Ok(())
    }
}
