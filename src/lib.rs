// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! # franka-hw-test
//! franka-hw-test contains controllers for testing the hardware side of a
//! [Franka Emika](https://franka.de) robot setup.
//!
//! **THE CONTROLLERS IN THIS CRATE COMMAND EFFORTS BEYOND THE ROBOT'S LIMITS. ONLY RUN THEM
//! BEHIND A TORQUE LIMITER AND ALWAYS HAVE THE USER STOP BUTTON AT HAND!**
//!
//! ## Design
//! A controller is loaded by its type name from a [`ControllerRegistry`](`crate::ControllerRegistry`),
//! initialized once against a [`RobotHw`](`crate::RobotHw`) and a
//! [`ParameterStore`](`crate::ParameterStore`) and then updated once per control cycle by a
//! [`ControlLoop`](`crate::ControlLoop`).
//!
//! * [joint_torque_limits_controller](`crate::joint_torque_limits_controller`) - commands
//!   efforts beyond the limit of each joint with alternating sign.
//! * [urdf](`crate::urdf`) and [joint_limits](`crate::joint_limits`) - resolve joint limits
//!   from the robot description.
//! * [hardware_interface](`crate::hardware_interface`) and [mock_hw](`crate::mock_hw`) -
//!   command handles and a mock hardware to run without a robot.
//!
//! # Example:
//!```no_run
//! use std::time::Duration;
//! use franka_hw_test::{
//!     ControlLoop, ControllerRegistry, ControllerResult, MockFrankaHw, ParameterStore,
//!     RealtimeConfig, JOINT_TORQUE_LIMITS_CONTROLLER,
//! };
//! fn main() -> ControllerResult<()> {
//!     let params = ParameterStore::from_file("mock_franka_hw.toml")?;
//!     let robot_hw = MockFrankaHw::from_params(&params)?;
//!     let registry = ControllerRegistry::with_builtin_controllers();
//!     let controller = registry.create_controller(JOINT_TORQUE_LIMITS_CONTROLLER)?;
//!     let mut control_loop = ControlLoop::new(
//!         robot_hw,
//!         controller,
//!         &params,
//!         Duration::from_millis(1),
//!         RealtimeConfig::Ignore,
//!     )?;
//!     control_loop.run(1000);
//!     control_loop.stop();
//!     Ok(())
//! }
//! ```
//! The parameter file holds the URDF under `robot_description` and the joints to control
//! under `mock_franka_hw_node.joint_names`. Every cycle the controller logs the commanded
//! efforts through [`tracing`](https://docs.rs/tracing), so install a subscriber to see them.

pub mod control_loop;
pub mod control_tools;
pub mod controller;
pub mod exception;
pub mod hardware_interface;
pub mod joint_limits;
pub mod joint_torque_limits_controller;
pub mod mock_hw;
pub mod params;
pub mod registry;
pub mod urdf;

pub use control_loop::{ControlLoop, RealtimeConfig};
pub use controller::Controller;
pub use exception::{ControllerException, ControllerResult};
pub use hardware_interface::{EffortJointInterface, JointHandle, JointSlot, RobotHw};
pub use joint_limits::{get_joint_limits, JointLimits, JointLimitsSource};
pub use joint_torque_limits_controller::{JointSpec, JointTorqueLimitsController};
pub use mock_hw::MockFrankaHw;
pub use params::ParameterStore;
pub use registry::{ControllerFactory, ControllerRegistry, JOINT_TORQUE_LIMITS_CONTROLLER};
pub use urdf::UrdfModel;
