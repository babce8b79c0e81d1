// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the registry which makes controllers loadable by their type name.
use std::collections::HashMap;

use crate::controller::Controller;
use crate::exception::{ControllerException, ControllerResult};
use crate::joint_torque_limits_controller::JointTorqueLimitsController;

/// Creates a fresh, uninitialized controller.
pub type ControllerFactory = fn() -> Box<dyn Controller>;

/// Type name of the [`JointTorqueLimitsController`](`JointTorqueLimitsController`).
pub static JOINT_TORQUE_LIMITS_CONTROLLER: &str = "franka_hw_test/JointTorqueLimitsController";

fn create_joint_torque_limits_controller() -> Box<dyn Controller> {
    Box::new(JointTorqueLimitsController::new())
}

/// Maps controller type names to factories.
///
/// Built once at startup and handed to whatever loads controllers, there is no global
/// registry.
#[derive(Default)]
pub struct ControllerRegistry {
    factories: HashMap<&'static str, ControllerFactory>,
}

impl ControllerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        ControllerRegistry::default()
    }

    /// Creates a registry holding every controller of this crate.
    pub fn with_builtin_controllers() -> Self {
        let mut registry = ControllerRegistry::new();
        registry.register(
            JOINT_TORQUE_LIMITS_CONTROLLER,
            create_joint_torque_limits_controller,
        );
        registry
    }

    /// Registers a controller factory.
    ///
    /// # Panics
    /// Panics if a controller with the same name is already registered.
    pub fn register(&mut self, name: &'static str, factory: ControllerFactory) {
        if self.factories.insert(name, factory).is_some() {
            panic!("Controller {} is already registered", name);
        }
    }

    pub fn get_factory(&self, name: &str) -> Option<ControllerFactory> {
        self.factories.get(name).copied()
    }

    /// Creates a controller by its type name.
    ///
    /// # Errors
    /// * ControllerNotFound if no controller is registered under `name`.
    pub fn create_controller(&self, name: &str) -> ControllerResult<Box<dyn Controller>> {
        let factory =
            self.get_factory(name)
                .ok_or_else(|| ControllerException::ControllerNotFound {
                    name: name.to_string(),
                })?;
        Ok(factory())
    }

    /// Names of all registered controllers in alphabetical order.
    pub fn list_controllers(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }
}
