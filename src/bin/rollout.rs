//! Offline harness: drives the kinematic test vehicle with a [`Pilot`],
//! standing in for the competition driver loop.

use std::path::PathBuf;

use clap::Parser;
use tracing::{Level, info};

use roarpilot::config::{GeometricConfig, PilotConfig, Strategy};
use roarpilot::environments::KinematicVehicle;
use roarpilot::waypoint::{Track, load_waypoints};
use roarpilot::{Pilot, Vehicle, logging, utils};

#[derive(Parser, Debug)]
#[command(about = "Drive a simulated car around a track with the pilot")]
struct Args {
    /// Pilot configuration (JSON). Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// JSON array of waypoints. A circular track is used when omitted.
    #[arg(long)]
    waypoints: Option<PathBuf>,
    #[arg(long, default_value_t = 60.0)]
    radius: f32,
    #[arg(long, default_value_t = 400)]
    ticks: usize,
    /// Use the geometric controller regardless of the configured strategy.
    #[arg(long)]
    geometric: bool,
    /// Write a PNG of the driven path here.
    #[arg(long)]
    plot: Option<PathBuf>,
    #[arg(long, default_value_t = Level::INFO)]
    log_level: Level,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> roarpilot::Result<()> {
    let args = Args::parse();
    logging::init(args.log_level);

    let mut config = match &args.config {
        Some(path) => PilotConfig::from_file(path)?,
        None => PilotConfig::default(),
    };
    if args.geometric {
        // the car spawns at waypoint 0, so start tracking there
        config.strategy = Strategy::GeometricController(GeometricConfig {
            start_index: 0,
            ..GeometricConfig::default()
        });
    }

    let track = match &args.waypoints {
        Some(path) => Track::new(load_waypoints(path)?)?,
        None => Track::circle(args.radius, 200)?,
    };
    info!(waypoints = track.len(), length = track.length(), "track loaded");

    let car = KinematicVehicle::spawn_on(&track, 0);
    let vehicle = Vehicle {
        sensors: car.sensors(),
        actuator: car.actuator(),
    };
    let mut pilot = Pilot::new(track.waypoints().to_vec(), vehicle, config)?;
    pilot.initialize().await?;

    let mut trajectory = Vec::with_capacity(args.ticks + 1);
    trajectory.push(car.state().position);
    for tick in 1..=args.ticks {
        let control = pilot.step().await?;
        let state = car.state();
        trajectory.push(state.position);
        if tick % 50 == 0 {
            info!(
                tick,
                speed = state.speed,
                waypoint = ?pilot.waypoint_index(),
                throttle = control.throttle,
                steer = control.steer,
                "rollout progress"
            );
        }
    }
    pilot.shutdown();

    if let Some(path) = &args.plot {
        utils::plot_trajectory(
            track.waypoints(),
            &trajectory,
            &path.to_string_lossy(),
            "Rollout",
        )?;
    }
    Ok(())
}
