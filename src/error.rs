use std::path::PathBuf;

use crate::vehicle::SensorKind;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything here is fatal: the competition harness owns run-level recovery.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("sensor `{0}` is required but was not provided")]
    MissingSensor(SensorKind),

    #[error("sensor `{0}` has not produced an observation yet")]
    NoReading(SensorKind),

    #[error("shape mismatch in {context}: expected {expected} values, got {actual}")]
    ShapeMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("unknown channel `{0}`")]
    UnknownChannel(String),

    #[error("value does not belong to space: {0}")]
    OutOfSpace(String),

    #[error("empty waypoint list")]
    EmptyTrack,

    #[error("pilot lifecycle: {0}")]
    Lifecycle(&'static str),

    #[error("model error: {0}")]
    Model(#[from] tch::TchError),

    #[error("i/o on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("plotting failed: {0}")]
    Plot(String),
}
