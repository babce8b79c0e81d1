// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains exception and Result definitions
use thiserror::Error;

/// Represents all kind of errors which can occur while setting up or hosting a controller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ControllerException {
    /// ConfigurationUnavailable is reported if the robot description or the joint name list
    /// cannot be read from the parameter store.
    #[error("configuration unavailable: {message}")]
    ConfigurationUnavailable {
        /// Explanatory string.
        message: String,
    },

    /// LimitResolutionFailure is returned if a requested joint has no resolvable
    /// torque/velocity/position limits.
    #[error("Could not parse joint limits of joint {joint}: {message}")]
    LimitResolutionFailure {
        /// Name of the joint.
        joint: String,
        /// Explanatory string.
        message: String,
    },

    /// InterfaceUnavailable is returned if the hardware does not expose the required command
    /// interface.
    #[error("interfaces for controller not properly initialized: {message}")]
    InterfaceUnavailable { message: String },

    /// HandleAcquisitionFailure is returned if the hardware has no handle for a joint.
    #[error("No effort joint handle for joint {joint}")]
    HandleAcquisitionFailure { joint: String },

    /// InvalidParameter is returned if a tuning parameter is present but out of range.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter { name: String, message: String },

    /// UrdfException is returned if a robot description cannot be parsed.
    #[error("{message:?}")]
    UrdfException { message: String },

    /// ControllerNotFound is returned if no controller is registered under the requested type.
    #[error("Could not load controller of type {name}: no such controller registered")]
    ControllerNotFound { name: String },

    /// RealTimeException is returned if the real-time priority cannot be set
    #[error("{message:?}")]
    RealTimeException { message: String },
}

/// creates an UrdfException from anything printable
pub(crate) fn create_urdf_exception<T: ToString>(message: T) -> ControllerException {
    ControllerException::UrdfException {
        message: message.to_string(),
    }
}

/// Result type which can have ControllerException as Error
pub type ControllerResult<T> = Result<T, ControllerException>;
