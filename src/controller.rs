// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the interface between controllers and the loop hosting them.
use std::time::Duration;

use crate::exception::ControllerResult;
use crate::hardware_interface::RobotHw;
use crate::params::ParameterStore;

/// A controller which is set up once and then updated every control cycle.
///
/// The host calls [`init`](`Controller::init`) exactly once. Only if it succeeds the controller
/// is started and [`update`](`Controller::update`) is called serially from the control thread.
pub trait Controller {
    /// Resolves the configuration and acquires the hardware handles of the controller.
    /// # Errors
    /// Any error means the controller must not be started.
    fn init(&mut self, robot_hw: &mut dyn RobotHw, params: &ParameterStore)
        -> ControllerResult<()>;

    /// Called once before the first update.
    fn starting(&mut self, _time: &Duration) {}

    /// Computes and writes the commands of one control cycle.
    /// # Arguments
    /// * `time` - Time since the host loop was started.
    /// * `period` - Time since the last update.
    fn update(&mut self, time: &Duration, period: &Duration);

    /// Called once after the last update.
    fn stopping(&mut self, _time: &Duration) {}
}
