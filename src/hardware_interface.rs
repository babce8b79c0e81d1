// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the hardware abstraction controllers command the robot through.
//!
//! The hardware owns one [`JointSlot`](`JointSlot`) per joint. Controllers never own joint data,
//! they acquire [`JointHandle`](`JointHandle`)s which share the slot and write their effort
//! command into it.
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;

use crate::exception::ControllerResult;

/// Lock-free storage of a joint's state and its latest effort command.
#[derive(Debug, Default)]
pub struct JointSlot {
    position: AtomicU64,
    velocity: AtomicU64,
    effort: AtomicU64,
    command: AtomicU64,
}

fn load(value: &AtomicU64) -> f64 {
    f64::from_bits(value.load(Ordering::Relaxed))
}

fn store(value: &AtomicU64, x: f64) {
    value.store(x.to_bits(), Ordering::Relaxed);
}

impl JointSlot {
    /// Updates the measured state of the joint.
    pub fn set_state(&self, position: f64, velocity: f64, effort: f64) {
        store(&self.position, position);
        store(&self.velocity, velocity);
        store(&self.effort, effort);
    }
    /// Latest effort command written by a controller.
    pub fn command(&self) -> f64 {
        load(&self.command)
    }
}

/// Named handle to read a joint's state and write its effort command.
#[derive(Debug, Clone)]
pub struct JointHandle {
    name: String,
    slot: Arc<JointSlot>,
}

impl JointHandle {
    pub fn new(name: &str, slot: Arc<JointSlot>) -> Self {
        JointHandle {
            name: name.to_string(),
            slot,
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Joint position in \[rad\].
    pub fn position(&self) -> f64 {
        load(&self.slot.position)
    }
    /// Joint velocity in \[rad/s\].
    pub fn velocity(&self) -> f64 {
        load(&self.slot.velocity)
    }
    /// Measured joint effort in \[Nm\].
    pub fn effort(&self) -> f64 {
        load(&self.slot.effort)
    }
    /// Sets the effort command in \[Nm\].
    pub fn set_command(&self, command: f64) {
        store(&self.slot.command, command);
    }
    /// Latest effort command.
    pub fn command(&self) -> f64 {
        self.slot.command()
    }
}

/// Hands out effort command handles by joint name.
#[cfg_attr(test, automock)]
pub trait EffortJointInterface {
    /// Acquires the effort handle of `name`.
    /// # Errors
    /// * HandleAcquisitionFailure if the hardware has no such joint.
    fn get_handle(&self, name: &str) -> ControllerResult<JointHandle>;
    /// Names of all joints exposed by this interface.
    fn names(&self) -> Vec<String>;
}

/// A robot hardware abstraction as seen by a controller and its host loop.
pub trait RobotHw {
    /// Returns the effort joint interface if the hardware provides one.
    fn effort_joint_interface(&mut self) -> Option<&mut dyn EffortJointInterface>;
    /// Reads the current joint state from the hardware.
    fn read(&mut self, _time: &std::time::Duration, _period: &std::time::Duration) {}
    /// Sends the current commands to the hardware.
    fn write(&mut self, _time: &std::time::Duration, _period: &std::time::Duration) {}
}
