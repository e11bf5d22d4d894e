//! Drives a simulated race car from a pretrained policy, or from a
//! proportional waypoint follower, one simulator tick at a time.

pub mod config;
pub mod control;
pub mod environments;
pub mod error;
pub mod logging;
pub mod networks;
pub mod pilot;
pub mod policies;
pub mod spaces;
pub mod utils;
pub mod waypoint;
pub mod wrappers;

// Traits
pub mod environment;
pub mod policy;
pub mod vehicle; // sensor / actuator boundary

pub use error::{Error, Result};
pub use pilot::{Pilot, Vehicle};
