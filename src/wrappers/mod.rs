//! Observation/action reshaping layers around a base [`Environment`](crate::environment::Environment).
//!
//! Applied innermost first: [`RestrictAction`], [`FilterObservation`],
//! [`FlattenObservation`], [`FlattenAction`], then [`Monitor`]. Each stage
//! relies on the shape the previous one produces.

mod filter_observation;
mod flatten_action;
mod flatten_observation;
mod monitor;
mod restrict_action;

pub use filter_observation::FilterObservation;
pub use flatten_action::FlattenAction;
pub use flatten_observation::FlattenObservation;
pub use monitor::Monitor;
pub use restrict_action::RestrictAction;
