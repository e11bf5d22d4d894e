//! The per-tick control loop driven by the competition harness.
//!
//! ```text
//! Uninitialized --initialize--> Learned | Geometric --step--> (same)
//!        \___________________________________\__shutdown__--> Shutdown
//! ```

use std::mem;

use tch::Device;
use tracing::{debug, info, warn};

use crate::config::{GeometricConfig, LearnedPolicyConfig, PilotConfig, Strategy};
use crate::control::GeometricController;
use crate::environment::{Environment, EpisodeStats, StepInfo};
use crate::environments::TrackEnv;
use crate::error::{Error, Result};
use crate::policies::SacPolicy;
use crate::policy::Policy;
use crate::vehicle::{Actuator, SensorKind, SensorSuite, VehicleControl};
use crate::waypoint::{Track, Waypoint, filter_waypoints_within};
use crate::wrappers::{FilterObservation, FlattenAction, FlattenObservation, Monitor, RestrictAction};

/// The adapter chain the learned policy talks to.
pub type AdaptedEnv =
    Monitor<FlattenAction<FlattenObservation<FilterObservation<RestrictAction<TrackEnv>>>>>;

pub type BoxedPolicy = Box<dyn Policy<Vec<f32>, Vec<f32>>>;

/// Builds [`AdaptedEnv`] around `base`. Order matters: the action space is
/// restricted before it is flattened, and channels are filtered before the
/// observation is flattened.
pub fn adapt(base: TrackEnv, config: &LearnedPolicyConfig) -> Result<AdaptedEnv> {
    let env = RestrictAction::new(base, config.action_channels.as_slice())?;
    let env = FilterObservation::new(env, config.observation_channels.as_slice())?;
    let env = FlattenObservation::new(env);
    let env = FlattenAction::new(env);
    Monitor::new(env, config.monitor_path.as_deref())
}

/// Handles to the simulated vehicle, handed over by the harness.
pub struct Vehicle {
    pub sensors: SensorSuite,
    pub actuator: Box<dyn Actuator>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EpisodeStatus {
    pub terminated: bool,
    pub truncated: bool,
}

enum Stage {
    Uninitialized(Vehicle),
    Learned(LearnedDriver),
    Geometric(GeometricDriver),
    Shutdown,
}

pub struct Pilot {
    config: PilotConfig,
    track: Track,
    stage: Stage,
}

impl Pilot {
    pub fn new(waypoints: Vec<Waypoint>, vehicle: Vehicle, config: PilotConfig) -> Result<Self> {
        Ok(Self {
            config,
            track: Track::new(waypoints)?,
            stage: Stage::Uninitialized(vehicle),
        })
    }

    pub fn config(&self) -> &PilotConfig {
        &self.config
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    /// Loads the configured strategy and primes it with a first observation.
    /// Must complete before the first [`Pilot::step`]. On failure the vehicle
    /// handles are gone and the pilot is left shut down.
    pub async fn initialize(&mut self) -> Result<()> {
        match self.config.strategy.clone() {
            Strategy::LearnedPolicy(config) => {
                if let Some(seed) = config.seed {
                    tch::manual_seed(seed);
                }
                let env = self.build_env(&config)?;
                let policy = SacPolicy::load(
                    &config.model_path,
                    Device::Cpu,
                    env.observation_space().flatdim(),
                    env.action_space(),
                    &config.hidden_layers,
                )?;
                info!(model = %config.model_path.display(), "loaded policy");
                self.start_learned(env, Box::new(policy), config.deterministic)
                    .await
            }
            Strategy::GeometricController(config) => {
                let vehicle = self.take_vehicle()?;
                let driver = GeometricDriver::start(vehicle, &self.track, config)?;
                info!(waypoint = driver.waypoint_idx, "geometric controller ready");
                self.stage = Stage::Geometric(driver);
                Ok(())
            }
        }
    }

    /// Like [`Pilot::initialize`] for the learned strategy, with a policy
    /// supplied by the caller instead of read from `model_path`.
    pub async fn initialize_with_policy(&mut self, policy: BoxedPolicy) -> Result<()> {
        let Strategy::LearnedPolicy(config) = self.config.strategy.clone() else {
            return Err(Error::Lifecycle("a policy needs the learned_policy strategy"));
        };
        let env = self.build_env(&config)?;
        self.start_learned(env, policy, config.deterministic).await
    }

    fn build_env(&mut self, config: &LearnedPolicyConfig) -> Result<AdaptedEnv> {
        let vehicle = self.take_vehicle()?;
        let base = TrackEnv::new(
            vehicle.sensors,
            vehicle.actuator,
            self.track.clone(),
            &self.config.environment,
        )?;
        adapt(base, config)
    }

    async fn start_learned(
        &mut self,
        mut env: AdaptedEnv,
        policy: BoxedPolicy,
        deterministic: bool,
    ) -> Result<()> {
        let (observation, info) = env.reset().await?;
        info!(
            observation_dim = observation.len(),
            waypoint = info.waypoint_index,
            "learned policy ready"
        );
        self.stage = Stage::Learned(LearnedDriver {
            env,
            policy,
            deterministic,
            observation,
            info,
            status: EpisodeStatus::default(),
        });
        Ok(())
    }

    fn take_vehicle(&mut self) -> Result<Vehicle> {
        match mem::replace(&mut self.stage, Stage::Shutdown) {
            Stage::Uninitialized(vehicle) => Ok(vehicle),
            Stage::Shutdown => Err(Error::Lifecycle("pilot was shut down")),
            other => {
                self.stage = other;
                Err(Error::Lifecycle("pilot is already initialized"))
            }
        }
    }

    /// One simulation tick. Returns the control sent to the vehicle.
    pub async fn step(&mut self) -> Result<VehicleControl> {
        match &mut self.stage {
            Stage::Learned(driver) => driver.step().await,
            Stage::Geometric(driver) => driver.step(&self.track).await,
            Stage::Uninitialized(_) => Err(Error::Lifecycle("step called before initialize")),
            Stage::Shutdown => Err(Error::Lifecycle("step called after shutdown")),
        }
    }

    /// Starts a new episode on the learned strategy: the environment is reset
    /// and the next step acts on the fresh observation. The geometric strategy
    /// has no episodes, so this is a no-op there.
    pub async fn reset_episode(&mut self) -> Result<()> {
        match &mut self.stage {
            Stage::Learned(driver) => driver.reset().await,
            Stage::Geometric(_) => Ok(()),
            Stage::Uninitialized(_) => Err(Error::Lifecycle("reset called before initialize")),
            Stage::Shutdown => Err(Error::Lifecycle("reset called after shutdown")),
        }
    }

    /// Episodes the monitor has finished so far. Zero for the geometric strategy.
    pub fn episodes(&self) -> usize {
        match &self.stage {
            Stage::Learned(driver) => driver.env.episodes(),
            _ => 0,
        }
    }

    /// Stats of the episode that ended on the last learned step, if any.
    pub fn finished_episode(&self) -> Option<EpisodeStats> {
        match &self.stage {
            Stage::Learned(driver) => driver.info.episode,
            _ => None,
        }
    }

    /// Releases the environment, policy and vehicle handles.
    pub fn shutdown(&mut self) {
        if !matches!(self.stage, Stage::Shutdown) {
            info!("pilot shut down");
        }
        self.stage = Stage::Shutdown;
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.stage, Stage::Learned(_) | Stage::Geometric(_))
    }

    /// Termination flags of the last learned step. They are reported, not
    /// acted on: the harness decides when to call [`Pilot::reset_episode`].
    pub fn episode_status(&self) -> EpisodeStatus {
        match &self.stage {
            Stage::Learned(driver) => driver.status,
            _ => EpisodeStatus::default(),
        }
    }

    /// Observation the next learned step will act on.
    pub fn observation(&self) -> Option<&[f32]> {
        match &self.stage {
            Stage::Learned(driver) => Some(&driver.observation),
            _ => None,
        }
    }

    pub fn waypoint_index(&self) -> Option<usize> {
        match &self.stage {
            Stage::Learned(driver) => Some(driver.info.waypoint_index),
            Stage::Geometric(driver) => Some(driver.waypoint_idx),
            _ => None,
        }
    }
}

struct LearnedDriver {
    env: AdaptedEnv,
    policy: BoxedPolicy,
    deterministic: bool,
    observation: Vec<f32>,
    info: StepInfo,
    status: EpisodeStatus,
}

impl LearnedDriver {
    async fn step(&mut self) -> Result<VehicleControl> {
        let action = self.policy.predict(&self.observation, self.deterministic)?;
        let result = self.env.step(&action).await?;
        debug!(?action, reward = result.reward, "learned step");

        let was_over = self.status.terminated || self.status.truncated;
        if result.episode_over() && !was_over {
            warn!(
                terminated = result.terminated,
                truncated = result.truncated,
                "episode over, still driving until reset_episode"
            );
        }
        self.status = EpisodeStatus {
            terminated: result.terminated,
            truncated: result.truncated,
        };
        self.observation = result.observation;
        self.info = result.info;
        Ok(self.info.control)
    }

    async fn reset(&mut self) -> Result<()> {
        let (observation, info) = self.env.reset().await?;
        debug!(waypoint = info.waypoint_index, "episode reset");
        self.observation = observation;
        self.info = info;
        self.status = EpisodeStatus::default();
        Ok(())
    }
}

struct GeometricDriver {
    sensors: SensorSuite,
    actuator: Box<dyn Actuator>,
    controller: GeometricController,
    waypoint_idx: usize,
}

impl GeometricDriver {
    fn start(vehicle: Vehicle, track: &Track, config: GeometricConfig) -> Result<Self> {
        let sensors = vehicle.sensors;
        for kind in [SensorKind::Location, SensorKind::RollPitchYaw, SensorKind::Velocimeter] {
            sensors.require(kind)?;
        }
        let location = sensors.read_vec3(SensorKind::Location)?.truncate();
        let waypoint_idx = filter_waypoints_within(
            location,
            config.start_index % track.len(),
            track.waypoints(),
            config.proximity_threshold,
        );
        Ok(Self {
            sensors,
            actuator: vehicle.actuator,
            controller: GeometricController::new(config),
            waypoint_idx,
        })
    }

    async fn step(&mut self, track: &Track) -> Result<VehicleControl> {
        let location = self.sensors.read_vec3(SensorKind::Location)?;
        let rotation = self.sensors.read_vec3(SensorKind::RollPitchYaw)?;
        let velocity = self.sensors.read_vec3(SensorKind::Velocimeter)?;

        let (control, waypoint_idx) = self.controller.control(
            location,
            rotation,
            velocity,
            track,
            self.waypoint_idx,
        );
        self.waypoint_idx = waypoint_idx;
        debug!(waypoint = waypoint_idx, ?control, "geometric step");

        self.actuator.apply_action(&control).await?;
        Ok(control)
    }
}
