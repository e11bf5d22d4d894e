use std::f32::consts::{PI, TAU};
use std::path::Path;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A waypoint counts as reached once the vehicle is closer than this.
pub const PROXIMITY_THRESHOLD: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub location: Vec3,
    /// Radians.
    pub roll_pitch_yaw: Vec3,
    pub lane_width: f32,
}

impl Waypoint {
    pub fn new(location: Vec3, yaw: f32) -> Self {
        Self {
            location,
            roll_pitch_yaw: Vec3::new(0.0, 0.0, yaw),
            lane_width: 4.0,
        }
    }

    pub fn yaw(&self) -> f32 {
        self.roll_pitch_yaw.z
    }

    pub fn planar(&self) -> Vec2 {
        self.location.truncate()
    }
}

/// Reads a JSON array of waypoints.
pub fn load_waypoints(path: impl AsRef<Path>) -> Result<Vec<Waypoint>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&raw)?)
}

/// Wraps an angle into `(-PI, PI]`. Angles already in range come back untouched.
pub fn normalize_rad(rad: f32) -> f32 {
    if rad > -PI && rad <= PI {
        return rad;
    }
    let wrapped = (rad + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { PI } else { wrapped }
}

/// First waypoint at or after `current_idx` (cyclically) within
/// [`PROXIMITY_THRESHOLD`] of `location`, or `current_idx` if none is.
pub fn filter_waypoints(location: Vec2, current_idx: usize, waypoints: &[Waypoint]) -> usize {
    filter_waypoints_within(location, current_idx, waypoints, PROXIMITY_THRESHOLD)
}

pub fn filter_waypoints_within(
    location: Vec2,
    current_idx: usize,
    waypoints: &[Waypoint],
    threshold: f32,
) -> usize {
    let n = waypoints.len();
    (current_idx..current_idx + n)
        .map(|i| i % n)
        .find(|&i| waypoints[i].planar().distance(location) < threshold)
        .unwrap_or(current_idx)
}

/// Cyclic reference path with precomputed arc lengths.
#[derive(Debug, Clone)]
pub struct Track {
    waypoints: Vec<Waypoint>,
    // arc length from waypoint 0 to waypoint i
    cumulative: Vec<f32>,
    length: f32,
}

impl Track {
    pub fn new(waypoints: Vec<Waypoint>) -> Result<Self> {
        if waypoints.is_empty() {
            return Err(Error::EmptyTrack);
        }
        let n = waypoints.len();
        let mut cumulative = Vec::with_capacity(n);
        let mut arc = 0.0;
        for i in 0..n {
            cumulative.push(arc);
            arc += waypoints[i].planar().distance(waypoints[(i + 1) % n].planar());
        }
        Ok(Self {
            waypoints,
            cumulative,
            length: arc,
        })
    }

    /// `n` waypoints counter-clockwise on a circle around the origin.
    pub fn circle(radius: f32, n: usize) -> Result<Self> {
        let waypoints = (0..n)
            .map(|i| {
                let angle = TAU * i as f32 / n as f32;
                Waypoint::new(
                    Vec3::new(radius * angle.cos(), radius * angle.sin(), 0.0),
                    normalize_rad(angle + PI / 2.0),
                )
            })
            .collect();
        Self::new(waypoints)
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Waypoint at `idx`, wrapping around the end.
    pub fn get(&self, idx: usize) -> &Waypoint {
        &self.waypoints[idx % self.waypoints.len()]
    }

    pub fn nearest(&self, location: Vec2) -> usize {
        self.waypoints
            .iter()
            .enumerate()
            .min_by(|a, b| {
                let da = a.1.planar().distance_squared(location);
                let db = b.1.planar().distance_squared(location);
                da.total_cmp(&db)
            })
            .map_or(0, |(i, _)| i)
    }

    /// Forward arc length from waypoint `from` to waypoint `to`.
    pub fn arc_between(&self, from: usize, to: usize) -> f32 {
        let n = self.len();
        let delta = self.cumulative[to % n] - self.cumulative[from % n];
        if delta < 0.0 { delta + self.length } else { delta }
    }

    /// Point `offset` metres along the path from waypoint `idx`, interpolated
    /// between neighbours. Yaw and lane width come from the segment start.
    pub fn point_at(&self, idx: usize, offset: f32) -> Waypoint {
        let origin = *self.get(idx);
        if self.length <= f32::EPSILON {
            return origin;
        }
        let s = (self.cumulative[idx % self.len()] + offset).rem_euclid(self.length);
        let seg = self.cumulative.partition_point(|c| *c <= s).saturating_sub(1);
        let start = self.get(seg);
        let end = self.get(seg + 1);
        let seg_len = start.planar().distance(end.planar());
        let t = if seg_len > f32::EPSILON {
            ((s - self.cumulative[seg]) / seg_len).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Waypoint {
            location: start.location.lerp(end.location, t),
            ..*start
        }
    }
}
