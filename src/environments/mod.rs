pub mod kinematic;
pub mod track;

pub use kinematic::KinematicVehicle;
pub use track::TrackEnv;
