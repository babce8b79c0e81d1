// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains a mock Franka hardware which exposes an effort joint interface without a robot.
use std::sync::Arc;
use std::time::Duration;

use crate::exception::{ControllerException, ControllerResult};
use crate::hardware_interface::{EffortJointInterface, JointHandle, JointSlot, RobotHw};
use crate::params::ParameterStore;

/// Parameter holding the ordered joint names of the mock hardware.
pub static JOINT_NAMES_PARAM: &str = "/mock_franka_hw_node/joint_names";

/// Effort joint interface over the joint slots of a [`MockFrankaHw`](`MockFrankaHw`).
#[derive(Debug, Default)]
pub struct JointCommandSlots {
    slots: Vec<(String, Arc<JointSlot>)>,
}

impl JointCommandSlots {
    fn new<S: AsRef<str>>(joint_names: &[S]) -> Self {
        JointCommandSlots {
            slots: joint_names
                .iter()
                .map(|name| (name.as_ref().to_string(), Arc::new(JointSlot::default())))
                .collect(),
        }
    }
}

impl EffortJointInterface for JointCommandSlots {
    fn get_handle(&self, name: &str) -> ControllerResult<JointHandle> {
        self.slots
            .iter()
            .find(|(joint, _)| joint == name)
            .map(|(joint, slot)| JointHandle::new(joint, slot.clone()))
            .ok_or_else(|| ControllerException::HandleAcquisitionFailure {
                joint: name.to_string(),
            })
    }

    fn names(&self) -> Vec<String> {
        self.slots.iter().map(|(name, _)| name.clone()).collect()
    }
}

/// Hardware stand-in for a Franka arm.
///
/// The joint state follows the commands immediately: after [`read`](`RobotHw::read`) the measured
/// effort of every joint equals the last command written to it. Nothing is limited, so the mock
/// shows exactly what a controller sent.
#[derive(Debug)]
pub struct MockFrankaHw {
    joints: JointCommandSlots,
    has_effort_interface: bool,
}

impl MockFrankaHw {
    /// Creates a mock with one joint per name.
    pub fn new<S: AsRef<str>>(joint_names: &[S]) -> Self {
        MockFrankaHw {
            joints: JointCommandSlots::new(joint_names),
            has_effort_interface: true,
        }
    }

    /// Creates a mock whose joints are listed under `/mock_franka_hw_node/joint_names`.
    /// # Errors
    /// * ConfigurationUnavailable if the parameter is missing or not a list of strings.
    pub fn from_params(params: &ParameterStore) -> ControllerResult<Self> {
        let joint_names = params.get_string_list(JOINT_NAMES_PARAM)?.ok_or_else(|| {
            ControllerException::ConfigurationUnavailable {
                message: format!("parameter {} is not set", JOINT_NAMES_PARAM),
            }
        })?;
        Ok(MockFrankaHw::new(&joint_names))
    }

    /// Creates a mock which does not provide an effort joint interface at all.
    pub fn without_effort_interface<S: AsRef<str>>(joint_names: &[S]) -> Self {
        MockFrankaHw {
            joints: JointCommandSlots::new(joint_names),
            has_effort_interface: false,
        }
    }

    /// Joint names in hardware order.
    pub fn joint_names(&self) -> Vec<String> {
        self.joints.names()
    }

    /// Latest effort command of every joint in hardware order.
    pub fn commands(&self) -> Vec<f64> {
        self.joints
            .slots
            .iter()
            .map(|(_, slot)| slot.command())
            .collect()
    }

    /// Latest effort command of `joint`.
    pub fn command(&self, joint: &str) -> Option<f64> {
        self.joints
            .slots
            .iter()
            .find(|(name, _)| name == joint)
            .map(|(_, slot)| slot.command())
    }
}

impl RobotHw for MockFrankaHw {
    fn effort_joint_interface(&mut self) -> Option<&mut dyn EffortJointInterface> {
        if self.has_effort_interface {
            Some(&mut self.joints)
        } else {
            None
        }
    }

    fn read(&mut self, _time: &Duration, _period: &Duration) {
        for (_, slot) in &self.joints.slots {
            slot.set_state(0., 0., slot.command());
        }
    }
}
