// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains a controller which deliberately violates the torque limits of every joint.
//!
//! Each cycle it commands `max_effort + jitter` with jitter drawn uniformly from
//! `[0, jitter_bound)`, and the sign of all commands flips from one cycle to the next.
//! It is meant to check that the torque limiting in front of the robot clamps or rejects
//! the commands. **Never run it on hardware without such a limiter!**
use std::time::Duration;

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info, warn};

use crate::controller::Controller;
use crate::exception::{ControllerException, ControllerResult};
use crate::hardware_interface::{EffortJointInterface, JointHandle, RobotHw};
use crate::joint_limits::JointLimitsSource;
use crate::mock_hw::JOINT_NAMES_PARAM;
use crate::params::ParameterStore;
use crate::urdf::UrdfModel;

/// Parameter holding the URDF text of the robot.
pub static ROBOT_DESCRIPTION_PARAM: &str = "robot_description";
/// Parameter for the exclusive upper bound of the jitter.
pub static JITTER_BOUND_PARAM: &str = "joint_torque_limits_controller/jitter_bound";
/// Parameter for the seed of the jitter generator.
pub static SEED_PARAM: &str = "joint_torque_limits_controller/seed";
/// Default exclusive upper bound of the jitter in \[Nm\].
pub static DEFAULT_JITTER_BOUND: f64 = 3.0;
/// Degrees of freedom of a Franka arm.
pub const FRANKA_DOF: usize = 7;

/// A controlled joint and the effort limit it is tested against.
#[derive(Debug, Clone, PartialEq)]
pub struct JointSpec {
    pub name: String,
    /// Maximum effort in \[Nm\], never negative.
    pub max_effort: f64,
}

/// Commands efforts beyond the limit of every joint with alternating sign.
pub struct JointTorqueLimitsController {
    joints: Vec<JointSpec>,
    handles: Vec<JointHandle>,
    commands: Vec<f64>,
    phase: bool,
    jitter_bound: f64,
    jitter: Uniform<f64>,
    rng: StdRng,
}

impl Default for JointTorqueLimitsController {
    fn default() -> Self {
        JointTorqueLimitsController::new()
    }
}

impl JointTorqueLimitsController {
    /// Creates a controller whose jitter generator is seeded from the operating system.
    pub fn new() -> Self {
        JointTorqueLimitsController::from_rng(StdRng::from_entropy())
    }

    /// Creates a controller with a reproducible jitter sequence.
    pub fn with_seed(seed: u64) -> Self {
        JointTorqueLimitsController::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        JointTorqueLimitsController {
            joints: Vec::new(),
            handles: Vec::new(),
            commands: Vec::new(),
            phase: false,
            jitter_bound: DEFAULT_JITTER_BOUND,
            jitter: Uniform::new(0., DEFAULT_JITTER_BOUND),
            rng,
        }
    }

    /// Sets the exclusive upper bound of the jitter added on top of each limit.
    /// # Errors
    /// * InvalidParameter if `bound` is not finite and positive.
    pub fn set_jitter_bound(&mut self, bound: f64) -> ControllerResult<()> {
        if !(bound.is_finite() && bound > 0.) {
            return Err(ControllerException::InvalidParameter {
                name: JITTER_BOUND_PARAM.to_string(),
                message: format!("jitter bound must be finite and positive, got {}", bound),
            });
        }
        self.jitter_bound = bound;
        self.jitter = Uniform::new(0., bound);
        Ok(())
    }

    /// Reseeds the jitter generator.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Resolves the effort limit of every joint and acquires its command handle.
    ///
    /// Nothing is changed if an error is returned.
    /// # Arguments
    /// * `limits` - Source of the joint limits, `None` if no robot description is available.
    /// * `joint_names` - Joints to control, in command order.
    /// * `interface` - Effort interface of the hardware, `None` if the hardware has none.
    /// # Errors
    /// * LimitResolutionFailure if the limits of a joint cannot be resolved.
    /// * InterfaceUnavailable if `interface` is `None`.
    /// * HandleAcquisitionFailure if the interface has no handle for a joint.
    pub fn setup(
        &mut self,
        limits: Option<&dyn JointLimitsSource>,
        joint_names: &[String],
        interface: Option<&dyn EffortJointInterface>,
    ) -> ControllerResult<()> {
        let mut joints = Vec::with_capacity(joint_names.len());
        for name in joint_names {
            let joint_limits = limits
                .ok_or_else(|| ControllerException::LimitResolutionFailure {
                    joint: name.clone(),
                    message: "no robot description available".to_string(),
                })
                .and_then(|source| source.joint_limits(name))
                .map_err(log_error)?;
            if !(joint_limits.max_effort.is_finite() && joint_limits.max_effort >= 0.) {
                return Err(log_error(ControllerException::LimitResolutionFailure {
                    joint: name.clone(),
                    message: format!("invalid effort limit {}", joint_limits.max_effort),
                }));
            }
            info!(
                "Got joint {} with limits: effort={} upper={} lower={} velocity={}",
                name,
                joint_limits.max_effort,
                joint_limits.max_position,
                joint_limits.min_position,
                joint_limits.max_velocity
            );
            joints.push(JointSpec {
                name: name.clone(),
                max_effort: joint_limits.max_effort,
            });
        }

        let interface = interface.ok_or_else(|| {
            log_error(ControllerException::InterfaceUnavailable {
                message: "hardware has no effort joint interface".to_string(),
            })
        })?;
        if joints.len() != FRANKA_DOF {
            warn!(
                "Controlling {} joints, but a Franka arm has {}",
                joints.len(),
                FRANKA_DOF
            );
        }
        let handles = joints
            .iter()
            .map(|joint| interface.get_handle(&joint.name))
            .collect::<ControllerResult<Vec<_>>>()
            .map_err(log_error)?;

        self.commands = vec![0.; joints.len()];
        self.joints = joints;
        self.handles = handles;
        self.phase = false;
        Ok(())
    }

    /// Computes one command per joint, writes it to the joint's handle and flips the phase.
    ///
    /// Returns the commands in joint order. Never allocates.
    pub fn step(&mut self) -> &[f64] {
        let sign = if self.phase { 1. } else { -1. };
        for ((joint, handle), command) in self
            .joints
            .iter()
            .zip(&self.handles)
            .zip(self.commands.iter_mut())
        {
            *command = sign * (joint.max_effort + self.jitter.sample(&mut self.rng));
            handle.set_command(*command);
        }
        self.phase = !self.phase;
        &self.commands
    }

    /// Controlled joints in command order.
    pub fn joints(&self) -> &[JointSpec] {
        &self.joints
    }

    /// `true` if the next step commands positive efforts.
    pub fn phase(&self) -> bool {
        self.phase
    }

    pub fn jitter_bound(&self) -> f64 {
        self.jitter_bound
    }

    /// Commands of the last step, zero before the first one.
    pub fn last_commands(&self) -> &[f64] {
        &self.commands
    }

    fn configure_jitter(&mut self, params: &ParameterStore) -> ControllerResult<()> {
        if let Some(bound) = params.get_f64(JITTER_BOUND_PARAM)? {
            self.set_jitter_bound(bound)?;
        }
        if let Some(seed) = params.get_u64(SEED_PARAM)? {
            self.reseed(seed);
        }
        Ok(())
    }
}

fn log_error(error: ControllerException) -> ControllerException {
    error!("{}", error);
    error
}

fn load_robot_description(params: &ParameterStore) -> ControllerResult<UrdfModel> {
    let xml = params.get_string(ROBOT_DESCRIPTION_PARAM)?.ok_or_else(|| {
        ControllerException::ConfigurationUnavailable {
            message: format!("parameter {} is not set", ROBOT_DESCRIPTION_PARAM),
        }
    })?;
    UrdfModel::from_str(&xml).map_err(|e| ControllerException::ConfigurationUnavailable {
        message: e.to_string(),
    })
}

fn load_joint_names(params: &ParameterStore) -> ControllerResult<Vec<String>> {
    params.get_string_list(JOINT_NAMES_PARAM)?.ok_or_else(|| {
        ControllerException::ConfigurationUnavailable {
            message: format!("parameter {} is not set", JOINT_NAMES_PARAM),
        }
    })
}

impl Controller for JointTorqueLimitsController {
    fn init(
        &mut self,
        robot_hw: &mut dyn RobotHw,
        params: &ParameterStore,
    ) -> ControllerResult<()> {
        self.configure_jitter(params).map_err(log_error)?;

        // A missing description or joint list is only logged. Setup then either fails on
        // the first joint or runs with no joints at all.
        let urdf_model = match load_robot_description(params) {
            Ok(model) => {
                info!("Successfully initialized urdf model {}", model.name());
                Some(model)
            }
            Err(e) => {
                error!(
                    "Could not initialize urdf model parsing {} in JointTorqueLimitsController: {}",
                    ROBOT_DESCRIPTION_PARAM, e
                );
                None
            }
        };
        let joint_names = match load_joint_names(params) {
            Ok(names) => {
                info!("Successfully parsed joint names");
                names
            }
            Err(e) => {
                error!(
                    "Could not parse joint names in JointTorqueLimitsController: {}",
                    e
                );
                Vec::new()
            }
        };

        let limits = urdf_model
            .as_ref()
            .map(|model| model as &dyn JointLimitsSource);
        let interface = robot_hw
            .effort_joint_interface()
            .map(|interface| &*interface);
        self.setup(limits, &joint_names, interface)
    }

    fn update(&mut self, _time: &Duration, _period: &Duration) {
        let commands = self.step();
        info!("controller: Sent commands effort = {:?}", commands);
    }
}
