use std::f32::consts::{FRAC_PI_4, FRAC_PI_8, PI};

use glam::Vec3;
use roarpilot::config::GeometricConfig;
use roarpilot::control::GeometricController;
use roarpilot::waypoint::{Track, Waypoint};

fn controller() -> GeometricController {
    GeometricController::new(GeometricConfig::default())
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

#[test]
fn steering_scales_with_inverse_sqrt_speed() {
    let c = controller();
    assert!(approx(c.steer(FRAC_PI_8, 4.0), -0.5));
    assert!(approx(c.steer(-FRAC_PI_8, 16.0), 0.25));
    // -8 / sqrt(4) * (pi/4) / pi saturates
    assert!(approx(c.steer(FRAC_PI_4, 4.0), -1.0));
    assert_eq!(c.steer(-PI, 1.0), 1.0);
}

#[test]
fn steering_near_standstill_uses_the_error_sign() {
    let c = controller();
    assert_eq!(c.steer(0.3, 0.0), -1.0);
    assert_eq!(c.steer(-0.3, 0.005), 1.0);
    assert_eq!(c.steer(0.0, 0.0), 0.0);
}

#[test]
fn throttle_deficit_and_brake_surplus() {
    let c = controller();
    assert_eq!(c.throttle_brake(0.0), (1.0, 0.0));
    assert_eq!(c.throttle_brake(20.0), (0.0, 0.0));
    let (throttle, brake) = c.throttle_brake(10.0);
    assert!(approx(throttle, 0.5) && brake == 0.0);
    let (throttle, brake) = c.throttle_brake(30.0);
    assert!(throttle == 0.0 && approx(brake, 0.5));
}

#[test]
fn aims_several_waypoints_ahead() {
    let track = Track::new(
        (0..8)
            .map(|i| Waypoint::new(Vec3::new(2.0 * i as f32, 2.0 * i as f32, 0.0), FRAC_PI_4))
            .collect(),
    )
    .unwrap();
    let (control, idx) = controller().control(
        Vec3::ZERO,
        Vec3::ZERO,
        Vec3::new(4.0, 0.0, 0.0),
        &track,
        0,
    );
    assert_eq!(idx, 0);
    // target (6, 6) sits 45 degrees to the left
    assert!(approx(control.steer, -1.0));
    assert!(approx(control.throttle, 0.8));
    assert_eq!(control.brake, 0.0);
    assert_eq!(control.hand_brake, 0.0);
    assert!(!control.reverse);
    assert_eq!(control.target_gear, 0);
}

#[test]
fn straight_ahead_needs_no_steering() {
    let track = Track::new(
        (0..10)
            .map(|i| Waypoint::new(Vec3::new(2.0 * i as f32, 0.0, 0.0), 0.0))
            .collect(),
    )
    .unwrap();
    let (control, idx) = controller().control(
        Vec3::new(2.2, 0.0, 0.0),
        Vec3::ZERO,
        Vec3::new(5.0, 0.0, 0.0),
        &track,
        0,
    );
    assert_eq!(idx, 0);
    assert_eq!(control.steer, 0.0);
}

#[test]
fn lookahead_wraps_past_the_end_of_the_track() {
    let track = Track::new(
        (1..=4)
            .map(|i| Waypoint::new(Vec3::new(10.0 * i as f32, 0.0, 0.0), 0.0))
            .collect(),
    )
    .unwrap();
    // nothing within reach, so tracking stays on 3 and aims at 3 + 3 = 6 -> 2
    let (control, idx) = controller().control(
        Vec3::ZERO,
        Vec3::ZERO,
        Vec3::new(5.0, 0.0, 0.0),
        &track,
        3,
    );
    assert_eq!(idx, 3);
    assert_eq!(control.steer, 0.0);
}
