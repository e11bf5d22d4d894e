use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::{Vec2, Vec3};
use roarpilot::waypoint::{Track, Waypoint, filter_waypoints, normalize_rad};

fn line(points: &[(f32, f32)]) -> Vec<Waypoint> {
    points
        .iter()
        .map(|&(x, y)| Waypoint::new(Vec3::new(x, y, 0.0), 0.0))
        .collect()
}

#[test]
fn advances_to_the_next_close_waypoint() {
    let waypoints = line(&[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)]);
    assert_eq!(filter_waypoints(Vec2::new(9.5, 0.0), 0, &waypoints), 1);
}

#[test]
fn vehicle_on_a_waypoint_keeps_it() {
    let waypoints = line(&[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0), (30.0, 5.0)]);
    for (k, w) in waypoints.iter().enumerate() {
        assert_eq!(filter_waypoints(w.planar(), k, &waypoints), k);
    }
}

#[test]
fn no_waypoint_in_reach_leaves_index_unchanged() {
    let waypoints = line(&[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)]);
    let far = Vec2::new(100.0, 100.0);
    for idx in 0..waypoints.len() {
        assert_eq!(filter_waypoints(far, idx, &waypoints), idx);
    }
}

#[test]
fn search_wraps_around_the_end() {
    let waypoints = line(&[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)]);
    assert_eq!(filter_waypoints(Vec2::new(0.5, 0.0), 2, &waypoints), 0);
}

#[test]
fn index_stays_on_the_track() {
    let track = Track::circle(20.0, 37).unwrap();
    let n = track.len();
    let probes = [Vec2::new(20.0, 0.0), Vec2::new(0.0, -19.0), Vec2::new(-14.0, 14.5)];
    for location in probes {
        for start in 0..n {
            let idx = filter_waypoints(location, start, track.waypoints());
            assert!(idx < n);
        }
    }
}

#[test]
fn empty_path_returns_current_index() {
    assert_eq!(filter_waypoints(Vec2::ZERO, 4, &[]), 4);
}

#[test]
fn normalize_rad_range() {
    for i in -400..=400 {
        let x = i as f32 * 0.173;
        let y = normalize_rad(x);
        assert!(y > -PI && y <= PI, "{x} -> {y}");
        assert!(((y - x) / TAU - ((y - x) / TAU).round()).abs() < 1e-3);
    }
    assert_eq!(normalize_rad(-PI), PI);
    assert_eq!(normalize_rad(PI), PI);
    assert_eq!(normalize_rad(0.0), 0.0);
}

#[test]
fn normalize_rad_wraps_odd_multiples_and_large_angles() {
    for x in [3.0 * PI, -3.0 * PI, 5.0 * PI, -7.0 * PI] {
        let y = normalize_rad(x);
        assert!(y > -PI && y <= PI, "{x} -> {y}");
        assert!((y.abs() - PI).abs() < 1e-3, "{x} -> {y}");
    }
    for x in [1e4_f32, -1e4, 12345.678] {
        let y = normalize_rad(x);
        assert!(y > -PI && y <= PI, "{x} -> {y}");
        assert!((y.sin() - x.sin()).abs() < 1e-2, "{x} -> {y}");
        assert!((y.cos() - x.cos()).abs() < 1e-2, "{x} -> {y}");
    }
}

#[test]
fn normalize_rad_is_idempotent() {
    for i in -200..=200 {
        let x = i as f32 * 0.41 + 0.003;
        let once = normalize_rad(x);
        assert_eq!(normalize_rad(once), once);
    }
}

#[test]
fn track_arc_lengths() {
    let track = Track::new(line(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)])).unwrap();
    assert_eq!(track.length(), 40.0);
    assert_eq!(track.arc_between(0, 2), 20.0);
    assert_eq!(track.arc_between(3, 1), 20.0);
    assert_eq!(track.arc_between(2, 2), 0.0);
}

#[test]
fn track_points_along_the_path() {
    let track = Track::new(line(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)])).unwrap();

    let ahead = track.point_at(0, 15.0);
    assert!(ahead.planar().distance(Vec2::new(10.0, 5.0)) < 1e-4);

    let behind = track.point_at(0, -5.0);
    assert!(behind.planar().distance(Vec2::new(0.0, 5.0)) < 1e-4);

    let lap = track.point_at(1, 40.0);
    assert!(lap.planar().distance(Vec2::new(10.0, 0.0)) < 1e-4);
}

#[test]
fn circle_waypoints_face_along_the_track() {
    let track = Track::circle(50.0, 100).unwrap();
    assert!((track.get(0).yaw() - FRAC_PI_2).abs() < 1e-5);
    assert_eq!(track.nearest(Vec2::new(0.0, 49.0)), 25);
    assert!(Track::new(Vec::new()).is_err());
}
